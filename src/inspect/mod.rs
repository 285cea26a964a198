// src/inspect/mod.rs
// =============================================================================
// This module is the document inspector: given a parsed HTML page it pulls
// out the two things the counter cares about - image references and link
// references - and resolves raw link references into absolute resource
// identifiers.
//
// Submodules:
// - dom: CSS-selector extraction and link resolution
// =============================================================================

mod dom;

// Re-export the public API
pub use dom::{image_references, link_references, resolve_link, ResolutionError};
