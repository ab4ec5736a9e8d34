//! Error types shared by the fetcher, the sources and the HTTP service.
//!
//! [`FetchError`] covers a single page retrieval. [`SearchError`] is the
//! taxonomy a search can end in; the HTTP layer maps each variant to a
//! status code, while the crawler and aggregator log and skip the
//! recoverable ones.

use thiserror::Error;

/// A crawl target or upstream page could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("Fetch failed {status} for {url}")]
    Status { status: u16, url: String },

    /// The request never produced a response (DNS, TLS, connection reset, body read).
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Every way a search request can fail.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The client omitted a required query parameter.
    #[error("Missing {0}")]
    MissingParameter(&'static str),

    /// The deployment has no credential for the fact-check API.
    #[error("Missing FACTCHECK_API_KEY")]
    MissingCredential,

    /// The fact-check API answered with a non-success status.
    #[error("Upstream error")]
    Upstream { status: u16, body: String },

    /// The fact-check API could not be reached or its body could not be read.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// An upstream payload was not the JSON we expected.
    #[error("Invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl SearchError {
    /// Whether an aggregation run may skip this failure and try the next attempt.
    ///
    /// Missing parameters and credentials are configuration problems that
    /// every later attempt would hit too, so they abort the run.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            SearchError::MissingParameter(_) | SearchError::MissingCredential
        )
    }
}
