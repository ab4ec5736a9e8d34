//! Data models for normalized fact-check results.
//!
//! - [`ClaimRecord`]: one claim and its review, whatever source it came from
//! - [`SearchResult`]: the records found for a query, in discovery order
//! - [`ErrorBody`]: the JSON body of every error response
//!
//! Field names serialize as camelCase so the HTTP payloads keep the shape
//! existing front-ends already consume.

use serde::{Deserialize, Serialize};

/// A normalized claim and the review attached to it.
///
/// Every field is a plain string that is empty when the upstream source did
/// not provide it, so consumers never deal with nulls. An empty `rating` is
/// meaningful: the record is a related article, not a verdict (see [`Verdict`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClaimRecord {
    /// The claim statement.
    pub text: String,
    /// Who made the claim.
    pub claimant: String,
    /// When the claim was made, as reported upstream.
    pub claim_date: String,
    /// Name of the organization that reviewed the claim.
    pub review_publisher: String,
    /// Link to the review article.
    pub review_url: String,
    /// Textual verdict ("False", "Misleading", ...). Empty when there is none.
    pub rating: String,
    /// Headline of the review.
    pub title: String,
}

/// How a record should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The record carries a formal rating.
    Rated,
    /// No rating: an article about the topic rather than a fact-check verdict.
    Related,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Rated => "Fact-Check",
            Verdict::Related => "Related Article",
        }
    }
}

impl ClaimRecord {
    /// Key used to drop duplicate records: the `(title, review_url)` pair.
    pub fn identity_key(&self) -> (String, String) {
        (self.title.clone(), self.review_url.clone())
    }

    pub fn verdict(&self) -> Verdict {
        if self.rating.trim().is_empty() {
            Verdict::Related
        } else {
            Verdict::Rated
        }
    }

    /// Title for display: the headline, else the claim text, else `"Untitled"`.
    pub fn display_title(&self) -> &str {
        [self.title.as_str(), self.text.as_str()]
            .into_iter()
            .find(|s| !s.trim().is_empty())
            .unwrap_or("Untitled")
    }
}

/// The outcome of one search: the query as received and the records found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchResult {
    pub query: String,
    pub results: Vec<ClaimRecord>,
}

/// JSON body returned with every non-success response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status: None,
            body: None,
        }
    }
}
