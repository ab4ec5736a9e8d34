//! Where fact-check results come from.
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Google Fact Check Tools | [`factcheck`] | JSON API | Requires an API key; primary source |
//! | Nigerian fact-checkers | [`regional`] | Crawling + JSON-LD | Dubawa, FactCheckHub, TheCable, Premium Times, Africa Check, AFP |
//!
//! The aggregator only sees the two traits below, so tests drive it with
//! scripted sources instead of the network.

use crate::error::SearchError;
use crate::models::SearchResult;
use std::future::Future;

pub mod factcheck;
pub mod regional;

/// A searchable fact-check index taking a query and a language code.
pub trait PrimarySource {
    /// Search `query`; `language` is an ISO code or `"auto"` for any language.
    fn search(
        &self,
        query: &str,
        language: &str,
    ) -> impl Future<Output = Result<SearchResult, SearchError>> + Send;
}

/// A best-effort crawl of regional sites. Individual failures are absorbed,
/// so the search itself cannot fail.
pub trait RegionalSearch {
    fn search(&self, query: &str) -> impl Future<Output = SearchResult> + Send;
}
