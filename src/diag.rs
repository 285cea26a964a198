// src/diag.rs
// =============================================================================
// This module is the diagnostics sink: a small, cloneable handle the
// traversal engine uses to report what it is doing (depth-limit hits,
// already-visited skips, per-page counts, per-page failures).
//
// Three flavours exist:
// - disabled: every message is dropped (the default, like the original
//   tool's diagnostics-off mode)
// - stdout:   every message is printed as its own line
// - capture:  every message is pushed into a shared Vec, so tests can
//             assert on exactly what was logged
//
// Correctness never depends on this module - it is observability only.
// The handle is passed in explicitly wherever it is needed; there is no
// process-wide logging global to configure.
// =============================================================================

use std::sync::{Arc, Mutex, PoisonError};

/// A cheap-to-clone diagnostics handle.
#[derive(Clone)]
pub struct Diagnostics {
    sink: Sink,
}

// Where emitted messages go
#[derive(Clone)]
enum Sink {
    Disabled,
    Stdout,
    Capture(Arc<Mutex<Vec<String>>>),
}

impl Diagnostics {
    /// A sink that drops every message.
    pub fn disabled() -> Self {
        Self { sink: Sink::Disabled }
    }

    /// A sink that prints every message to stdout.
    pub fn stdout() -> Self {
        Self { sink: Sink::Stdout }
    }

    /// A sink that records every message into a shared buffer.
    ///
    /// Returns the handle plus the buffer, so tests can inspect what the
    /// engine logged after a traversal finishes.
    pub fn capture() -> (Self, Arc<Mutex<Vec<String>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let handle = Self {
            sink: Sink::Capture(Arc::clone(&buffer)),
        };
        (handle, buffer)
    }

    /// Emits one diagnostic message.
    pub fn emit(&self, message: String) {
        match &self.sink {
            Sink::Disabled => {}
            Sink::Stdout => println!("{message}"),
            Sink::Capture(buffer) => {
                // A poisoned lock just means another branch panicked while
                // emitting; the buffer itself is still usable.
                buffer
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(message);
            }
        }
    }
}
