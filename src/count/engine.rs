// src/count/engine.rs
// =============================================================================
// This module implements the recursive image counter.
//
// How it works, for one (identifier, depth) pair:
// 1. Depth gate: past the configured maximum, the branch contributes 0.
//    This runs first and does NOT mark the page visited, so a page first
//    seen too deep can still be counted later via a shorter path.
// 2. Dedup gate: an atomic insert-if-absent into the shared visited set.
//    Losing that race means some other branch owns this page; contribute 0.
// 3. Otherwise fetch the page, count its images, resolve its links, and
//    recurse into every link at depth + 1. Sibling links run as concurrent
//    futures and their counts are summed once all of them finish.
//
// Failure isolation: everything that can fail for one page (fetch, decode,
// link resolution) happens inside survey_page, and its error is converted
// to a 0 count plus a diagnostic right at that boundary. A broken page
// never takes down its siblings or the traversal as a whole. The page
// stays marked visited, so it is not retried.
//
// Termination is guaranteed twice over: depth is bounded, and the visited
// set only ever hands out finitely many first visits.
// =============================================================================

use futures::future::LocalBoxFuture;
use futures::stream::{self, StreamExt};
use thiserror::Error;
use url::Url;

use crate::count::VisitedSet;
use crate::diag::Diagnostics;
use crate::fetch::{PageError, PageFetcher};
use crate::inspect::{self, ResolutionError};

// How many sibling link branches may fetch at the same time.
// Fan-out is per page and recursive, so this stays modest.
const SIBLING_FAN_OUT: usize = 16;

/// Everything that can go wrong while processing one page.
///
/// Consumed only at the survey_page boundary - never crosses a recursion
/// level.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Page(#[from] PageError),
    #[error(transparent)]
    Resolve(#[from] ResolutionError),
}

/// Counts images reachable from a root resource, following links down to a
/// maximum depth and visiting each distinct resource at most once.
pub struct ImageCounter<F> {
    fetcher: F,
    max_depth: usize,
    diagnostics: Diagnostics,
}

impl<F: PageFetcher> ImageCounter<F> {
    pub fn new(fetcher: F, max_depth: usize, diagnostics: Diagnostics) -> Self {
        Self {
            fetcher,
            max_depth,
            diagnostics,
        }
    }

    /// Counts all images reachable from `root`.
    ///
    /// Never fails: per-page failures are absorbed as 0. A fresh visited
    /// set is created for each call, so repeated counts on one
    /// ImageCounter are independent traversals.
    pub async fn count(&self, root: &str) -> usize {
        let visited = VisitedSet::new();
        self.count_from(&visited, root.to_string(), 1).await
    }

    // One (identifier, depth) step: depth gate, then dedup gate, then the
    // actual page survey.
    //
    // An async fn cannot call itself directly (the compiler cannot size an
    // infinitely nested future), so recursion goes through a boxed future.
    // LocalBoxFuture because documents are not Send and we never spawn -
    // sibling futures are polled concurrently inside one task instead.
    fn count_from<'a>(
        &'a self,
        visited: &'a VisitedSet,
        uri: String,
        depth: usize,
    ) -> LocalBoxFuture<'a, usize> {
        Box::pin(async move {
            // Depth gate first: past the limit is not a visit at all
            if depth > self.max_depth {
                self.diagnostics.emit(format!(
                    "[depth {depth}] exceeded max depth of {}",
                    self.max_depth
                ));
                return 0;
            }

            // Dedup gate: exactly one branch ever gets past this line for a
            // given identifier
            if !visited.insert_if_absent(&uri) {
                self.diagnostics
                    .emit(format!("[depth {depth}] already processed {uri}"));
                return 0;
            }

            // First visit within budget: survey the page. This is the one
            // place errors are absorbed.
            match self.survey_page(visited, &uri, depth).await {
                Ok(count) => {
                    self.diagnostics
                        .emit(format!("[depth {depth}] found {count} image(s) for {uri}"));
                    count
                }
                Err(error) => {
                    self.diagnostics
                        .emit(format!("[depth {depth}] for '{uri}': {error}"));
                    0
                }
            }
        })
    }

    // Fetches one page, counts its direct images, and recurses into its
    // links. Any error returned here is turned into a 0 count by the caller.
    async fn survey_page(
        &self,
        visited: &VisitedSet,
        uri: &str,
        depth: usize,
    ) -> Result<usize, CrawlError> {
        // The parsed document is only needed to pull out these two lists,
        // so it is dropped again before any recursion starts
        let (direct_images, raw_links) = {
            let page = self.fetcher.fetch(uri).await?;
            (
                inspect::image_references(&page).len(),
                inspect::link_references(&page),
            )
        };

        // Resolve every link against this page's own URL before spawning
        // any child work, so a bad reference fails this page cleanly
        let base = Url::parse(uri).map_err(|source| ResolutionError::Unresolvable {
            href: uri.to_string(),
            source,
        })?;

        let mut children = Vec::with_capacity(raw_links.len());
        for href in &raw_links {
            children.push(inspect::resolve_link(&base, href)?);
        }

        // Fan out: sibling branches run concurrently, bounded by
        // SIBLING_FAN_OUT, and the order results come back in does not
        // matter because we only sum them
        let child_counts: Vec<usize> = stream::iter(
            children
                .into_iter()
                .map(|child| self.count_from(visited, child, depth + 1)),
        )
        .buffer_unordered(SIBLING_FAN_OUT)
        .collect()
        .await;

        Ok(direct_images + child_counts.iter().sum::<usize>())
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is count_from not an async fn?
//    - It calls itself, and an async fn's future type would then contain
//      itself - the compiler cannot compute its size
//    - Returning a boxed future (a pointer to a future) breaks the cycle
//    - This is the standard pattern for recursive async functions
//
// 2. What is buffer_unordered?
//    - It takes a stream of futures and polls up to N of them at once
//    - Results arrive in completion order, not submission order
//    - It's like Promise.all() with a concurrency limit
//    - Fine here because addition does not care about order
//
// 3. Why does the error get eaten in count_from instead of returned?
//    - One broken page must not abort its siblings or the whole count
//    - So the Result stops at this boundary: log it, count the page as 0
//    - The page stays in the visited set, so it will not be retried
//
// 4. Why generic over F instead of taking WebFetcher directly?
//    - The engine only needs "something that fetches pages"
//    - Tests hand it an in-memory fake site; main hands it the real fetcher
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use scraper::Html;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // An in-memory "site": a map of identifier -> HTML, plus a counter of
    // how many fetches actually happened
    struct FakeSite {
        pages: HashMap<String, String>,
        fetches: AtomicUsize,
    }

    impl FakeSite {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(uri, html)| (uri.to_string(), html.to_string()))
                    .collect(),
                fetches: AtomicUsize::new(0),
            }
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    impl PageFetcher for FakeSite {
        async fn fetch(&self, uri: &str) -> Result<Html, PageError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            match self.pages.get(uri) {
                Some(html) => Ok(Html::parse_document(html)),
                None => Err(FetchError::Status {
                    uri: uri.to_string(),
                    status: reqwest::StatusCode::NOT_FOUND,
                }
                .into()),
            }
        }
    }

    fn counter(site: FakeSite, max_depth: usize) -> ImageCounter<FakeSite> {
        ImageCounter::new(site, max_depth, Diagnostics::disabled())
    }

    // The reference scenario: R has 2 images and links to A and B; A has
    // 1 image; B has none but links back to R.
    fn triangle_site() -> FakeSite {
        FakeSite::new(&[
            (
                "https://site.test/r",
                r#"<img src="r1.png"><img src="r2.png"><a href="/a">a</a><a href="/b">b</a>"#,
            ),
            ("https://site.test/a", r#"<img src="a1.png">"#),
            ("https://site.test/b", r#"<a href="/r">back</a>"#),
        ])
    }

    #[tokio::test]
    async fn test_counts_root_and_linked_pages() {
        let counter = counter(triangle_site(), 2);
        // 2 on R + 1 on A + 0 on B, and B's link back to R adds nothing
        assert_eq!(counter.count("https://site.test/r").await, 3);
        assert_eq!(counter.fetcher.fetches(), 3);
    }

    #[tokio::test]
    async fn test_depth_one_counts_only_the_root() {
        let counter = counter(triangle_site(), 1);
        assert_eq!(counter.count("https://site.test/r").await, 2);
        // A and B sit at depth 2: past the limit, so never even fetched
        assert_eq!(counter.fetcher.fetches(), 1);
    }

    #[tokio::test]
    async fn test_cycle_terminates_and_counts_each_page_once() {
        let site = FakeSite::new(&[
            (
                "https://site.test/a",
                r#"<img src="1.png"><img src="2.png"><a href="/b">b</a>"#,
            ),
            ("https://site.test/b", r#"<img src="3.png"><a href="/a">a</a>"#),
        ]);
        let counter = counter(site, 5);

        assert_eq!(counter.count("https://site.test/a").await, 3);
        assert_eq!(counter.fetcher.fetches(), 2);
    }

    #[tokio::test]
    async fn test_diamond_counts_shared_page_once() {
        // R links to A and B; both link to C
        let site = FakeSite::new(&[
            (
                "https://site.test/r",
                r#"<a href="/a">a</a><a href="/b">b</a>"#,
            ),
            ("https://site.test/a", r#"<a href="/c">c</a>"#),
            ("https://site.test/b", r#"<a href="/c">c</a>"#),
            ("https://site.test/c", r#"<img src="only.png">"#),
        ]);
        let counter = counter(site, 3);

        assert_eq!(counter.count("https://site.test/r").await, 1);
        assert_eq!(counter.fetcher.fetches(), 4);
    }

    #[tokio::test]
    async fn test_broken_page_counts_zero_without_hurting_siblings() {
        let site = FakeSite::new(&[
            (
                "https://site.test/r",
                r#"<img src="r.png"><a href="/missing">gone</a><a href="/a">a</a>"#,
            ),
            ("https://site.test/a", r#"<img src="a.png">"#),
        ]);
        let counter = counter(site, 2);

        // /missing 404s: contributes 0, /a is still counted
        assert_eq!(counter.count("https://site.test/r").await, 2);
    }

    #[tokio::test]
    async fn test_unresolvable_link_fails_only_its_own_page() {
        let site = FakeSite::new(&[
            (
                "https://site.test/r",
                r#"<img src="r.png"><a href="/bad">bad</a>"#,
            ),
            // The linked page has images, but also a link that cannot be
            // resolved - so the whole linked page counts as 0
            (
                "https://site.test/bad",
                r#"<img src="1.png"><img src="2.png"><a href="https://[broken">x</a>"#,
            ),
        ]);
        let counter = counter(site, 3);

        assert_eq!(counter.count("https://site.test/r").await, 1);
    }

    #[tokio::test]
    async fn test_revisit_is_logged_as_already_processed() {
        let (diagnostics, buffer) = Diagnostics::capture();
        let counter = ImageCounter::new(triangle_site(), 3, diagnostics);

        // With depth 3, B's link back to R is within budget and hits the
        // dedup gate
        counter.count("https://site.test/r").await;

        let messages = buffer.lock().unwrap();
        assert!(messages
            .iter()
            .any(|message| message.contains("already processed https://site.test/r")));
    }

    #[tokio::test]
    async fn test_depth_limit_is_logged() {
        let (diagnostics, buffer) = Diagnostics::capture();
        let counter = ImageCounter::new(triangle_site(), 1, diagnostics);

        counter.count("https://site.test/r").await;

        let messages = buffer.lock().unwrap();
        assert!(messages
            .iter()
            .any(|message| message.contains("exceeded max depth of 1")));
    }

    #[tokio::test]
    async fn test_failed_page_is_not_retried() {
        let site = FakeSite::new(&[
            (
                "https://site.test/r",
                // Two links to the same missing page
                r#"<a href="/gone">1</a><a href="/gone">2</a>"#,
            ),
        ]);
        let counter = counter(site, 2);

        assert_eq!(counter.count("https://site.test/r").await, 0);
        // Root once, missing page once - the second reference hit the
        // dedup gate, not the fetcher
        assert_eq!(counter.fetcher.fetches(), 2);
    }

    #[tokio::test]
    async fn test_each_count_call_is_a_fresh_traversal() {
        let counter = counter(triangle_site(), 2);

        assert_eq!(counter.count("https://site.test/r").await, 3);
        // Nothing carries over: the second run sees every page as new
        assert_eq!(counter.count("https://site.test/r").await, 3);
        assert_eq!(counter.fetcher.fetches(), 6);
    }

    #[tokio::test]
    async fn test_missing_root_counts_zero() {
        let counter = counter(FakeSite::new(&[]), 2);
        assert_eq!(counter.count("https://site.test/nowhere").await, 0);
    }
}
