// src/count/mod.rs
// =============================================================================
// This module contains the heart of the tool: the traversal engine that
// counts images reachable from a root resource.
//
// Submodules:
// - engine: the depth-bounded, cycle-safe recursive counter
// - visited: the shared once-only visitation set
//
// This file (mod.rs) is the module root - it re-exports the public API so
// the rest of the application writes `count::ImageCounter`.
// =============================================================================

mod engine;
mod visited;

// Re-export public items from submodules
pub use engine::{CrawlError, ImageCounter};
pub use visited::VisitedSet;
