// src/fetch/mod.rs
// =============================================================================
// This module is the resource fetcher: it turns a resource identifier
// (an absolute URL string) into a parsed HTML document.
//
// Submodules:
// - page: the PageFetcher trait, the production WebFetcher, the error
//   taxonomy, and root-identifier normalization
//
// The fetcher is behind a trait so the counting engine can be exercised in
// tests with an in-memory fake instead of a live network.
// =============================================================================

mod page;

// Re-export the public API so callers write `fetch::WebFetcher` instead of
// `fetch::page::WebFetcher`
pub use page::{normalize_root, FetchError, PageError, PageFetcher, ParseError, WebFetcher};
