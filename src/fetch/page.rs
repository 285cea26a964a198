// src/fetch/page.rs
// =============================================================================
// This module fetches a resource identifier and parses it into an HTML
// document the inspector can query.
//
// Two kinds of resources are supported, matching the two kinds of roots
// the tool accepts:
// - http:// and https:// URLs, fetched with reqwest
// - file:// URLs, read from the local filesystem with tokio::fs
//
// Everything that can go wrong here is resource-scoped and typed:
// - FetchError: the bytes could not be retrieved (bad identifier, bad
//   scheme, network failure, non-2xx status, unreadable file)
// - ParseError: the bytes were retrieved but are not decodable text
// PageError is the union the fetcher actually returns.
//
// The counting engine talks to this module only through the PageFetcher
// trait, so tests can swap in an in-memory fake site.
// =============================================================================

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use scraper::Html;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// The bytes for a resource could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The identifier is not a valid absolute URL.
    #[error("invalid resource identifier '{uri}': {source}")]
    InvalidUri {
        uri: String,
        source: url::ParseError,
    },

    /// The identifier uses a scheme we cannot fetch (mailto:, tel:, ...).
    #[error("unsupported scheme '{scheme}' in '{uri}'")]
    UnsupportedScheme { uri: String, scheme: String },

    /// A file:// identifier does not name a usable local path.
    #[error("'{uri}' does not name a local file path")]
    BadFilePath { uri: String },

    /// The HTTP request itself failed (connection, DNS, timeout, ...).
    #[error("request for '{uri}' failed: {source}")]
    Http { uri: String, source: reqwest::Error },

    /// The server answered, but not with a success status.
    #[error("'{uri}' returned HTTP {status}")]
    Status {
        uri: String,
        status: reqwest::StatusCode,
    },

    /// Reading a local file failed.
    #[error("could not read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// The bytes were retrieved but could not be turned into a document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The resource's bytes are not valid UTF-8 text.
    #[error("'{uri}' is not valid UTF-8 text")]
    Encoding { uri: String },
}

/// Everything a fetch can fail with - what `PageFetcher::fetch` returns.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Resolves a resource identifier to a parsed HTML document.
///
/// The engine only ever calls `fetch`; implementations decide how bytes are
/// actually obtained.
pub trait PageFetcher {
    async fn fetch(&self, uri: &str) -> Result<Html, PageError>;
}

/// The production fetcher: reqwest for remote pages, tokio::fs for file://
/// pages.
pub struct WebFetcher {
    client: Client,
}

impl WebFetcher {
    /// Builds a fetcher with sane HTTP defaults.
    pub fn new() -> Result<Self> {
        // Reused for every request (connection pooling)
        let client = Client::builder()
            .timeout(Duration::from_secs(10)) // 10 second timeout per request
            .redirect(reqwest::redirect::Policy::limited(5)) // Follow up to 5 redirects
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self { client })
    }

    // Fetches an http(s) page body as text
    async fn fetch_remote(&self, uri: &str, parsed: Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                uri: uri.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                uri: uri.to_string(),
                status,
            });
        }

        response.text().await.map_err(|source| FetchError::Http {
            uri: uri.to_string(),
            source,
        })
    }

    // Reads a file:// page body from disk
    async fn fetch_local(&self, uri: &str, parsed: Url) -> Result<String, PageError> {
        let path = parsed
            .to_file_path()
            .map_err(|()| FetchError::BadFilePath {
                uri: uri.to_string(),
            })?;

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| FetchError::Io {
                path: path.display().to_string(),
                source,
            })?;

        // scraper wants a &str, so the bytes must decode as UTF-8
        String::from_utf8(bytes)
            .map_err(|_| {
                ParseError::Encoding {
                    uri: uri.to_string(),
                }
                .into()
            })
    }
}

impl PageFetcher for WebFetcher {
    async fn fetch(&self, uri: &str) -> Result<Html, PageError> {
        let parsed = Url::parse(uri).map_err(|source| FetchError::InvalidUri {
            uri: uri.to_string(),
            source,
        })?;

        let text = match parsed.scheme() {
            "http" | "https" => self.fetch_remote(uri, parsed).await?,
            "file" => self.fetch_local(uri, parsed).await?,
            other => {
                return Err(FetchError::UnsupportedScheme {
                    uri: uri.to_string(),
                    scheme: other.to_string(),
                }
                .into())
            }
        };

        // Html::parse_document is infallible - malformed HTML just produces
        // a best-effort tree, like a browser would
        Ok(Html::parse_document(&text))
    }
}

/// Turns the user-supplied root into an absolute resource identifier.
///
/// A root that already parses as an absolute URL passes through unchanged.
/// Anything else is treated as a filesystem path: it is canonicalized, a
/// directory is mapped to its index.html, and the result becomes a file://
/// URL. Failures here are configuration errors, reported before any
/// traversal starts.
pub fn normalize_root(root: &str) -> Result<String> {
    if let Ok(parsed) = Url::parse(root) {
        return match parsed.scheme() {
            "http" | "https" | "file" => Ok(parsed.to_string()),
            other => Err(anyhow!(
                "unsupported scheme '{}' in root '{}' (expected http, https or a local path)",
                other,
                root
            )),
        };
    }

    // Not a URL, so it must be a local path
    let mut path: PathBuf = std::fs::canonicalize(root)
        .with_context(|| format!("root '{root}' is not a URL or an existing local path"))?;

    // A folder root means "start at the folder's index page"
    if path.is_dir() {
        path.push("index.html");
    }

    let url = Url::from_file_path(&path)
        .map_err(|()| anyhow!("local path '{}' cannot be expressed as a file:// URL", path.display()))?;

    Ok(url.to_string())
}
