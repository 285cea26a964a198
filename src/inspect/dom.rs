// src/inspect/dom.rs
// =============================================================================
// This module extracts image and link references from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// We also use the `url` crate to resolve relative link references against
// the URL of the page they appeared on, the same way a browser would.
//
// The counter never looks inside an image reference - only how many there
// are - but we still return the src values so diagnostics and tests have
// something concrete to look at.
// =============================================================================

use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

/// A raw link reference could not be turned into an absolute identifier.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The href is neither absolute nor joinable against the page URL.
    #[error("cannot resolve link '{href}': {source}")]
    Unresolvable {
        href: String,
        source: url::ParseError,
    },
}

// Extracts all image references (img src values) from a page
//
// Returns: Vec<String> of src attribute values, in document order.
// Images without a src attribute still count - they are still an <img>
// element on the page - and are returned as an empty string.
pub fn image_references(page: &Html) -> Vec<String> {
    // Selector::parse returns Result, so we use .unwrap() which panics on error
    // This is OK here because our selector is a constant and known to be valid
    let selector = Selector::parse("img").unwrap();

    page.select(&selector)
        .map(|element| element.value().attr("src").unwrap_or("").to_string())
        .collect()
}

// Extracts all raw link references (a href values) from a page
//
// Returns: Vec<String> of href values, in document order. No resolution or
// filtering happens here - that is resolve_link's job.
pub fn link_references(page: &Html) -> Vec<String> {
    let selector = Selector::parse("a[href]").unwrap();

    page.select(&selector)
        // The selector guarantees href exists, but attr still returns Option
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.to_string())
        .collect()
}

// Resolves a possibly-relative link reference to an absolute identifier
//
// Parameters:
//   base: the URL of the page the reference appeared on
//   href: the raw href value (might be relative, might be absolute)
//
// Examples:
//   base = "https://example.com/page"
//   href = "/docs" -> "https://example.com/docs"
//   href = "../other" -> "https://example.com/other"
//   href = "https://other.com" -> "https://other.com/"
pub fn resolve_link(base: &Url, href: &str) -> Result<String, ResolutionError> {
    // Try to parse href as a URL
    // If it's already absolute (has a scheme), this works
    // If it's relative, this fails, so we join it with base
    match Url::parse(href) {
        Ok(url) => Ok(url.to_string()),
        Err(_) => base
            .join(href)
            .map(|url| url.to_string())
            .map_err(|source| ResolutionError::Unresolvable {
                href: href.to_string(),
                source,
            }),
    }
}
