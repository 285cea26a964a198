// src/count/visited.rs
// =============================================================================
// This module tracks which resource identifiers a traversal has already
// started processing, so cycles and duplicate paths never cause a page to
// be counted twice.
//
// The one operation that matters is insert_if_absent: a single indivisible
// check-and-insert. Sibling branches of the traversal run concurrently, so
// a plain "check, then insert" would let two branches both think they were
// first and double-count a page. Holding the mutex across both steps makes
// exactly one caller the owner of each identifier.
// =============================================================================

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// The set of identifiers this traversal has begun processing.
///
/// One instance lives for exactly one root-to-completion run - it is
/// created inside `ImageCounter::count` and dropped when the count returns.
/// Entries are only ever added, never removed.
#[derive(Debug, Default)]
pub struct VisitedSet {
    uris: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically records `uri` as visited.
    ///
    /// Returns true iff this call performed the insertion - i.e. the caller
    /// is the first (and only) branch to see this identifier.
    pub fn insert_if_absent(&self, uri: &str) -> bool {
        // A poisoned lock means some branch panicked mid-insert; the set
        // itself is still valid, so keep going with it.
        self.uris
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(uri.to_string())
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why Mutex<HashSet> instead of just HashSet?
//    - Several traversal branches run at the same time and all share this set
//    - Rust will not let us mutate a plain HashSet from two places at once
//    - The Mutex serializes access: one branch at a time gets the lock
//
// 2. What is HashSet::insert's return value?
//    - true if the value was newly added, false if it was already there
//    - That is exactly the "did I get here first?" answer we need, in one
//      operation - no separate contains() check required
//
// 3. What is lock poisoning?
//    - If a thread panics while holding a Mutex, the Mutex is marked poisoned
//    - lock() then returns an Err wrapping the still-valid guard
//    - PoisonError::into_inner unwraps that guard so we can keep using the set
// -----------------------------------------------------------------------------
