//! Mapping of Google Fact Check Tools `claims:search` payloads.
//!
//! The payload types mirror only the fields we read. Every field defaults
//! when absent so a sparse upstream response still deserializes.

use crate::models::{ClaimRecord, SearchResult};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClaimsPayload {
    pub claims: Vec<ApiClaim>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiClaim {
    pub text: String,
    pub claimant: String,
    pub claim_date: String,
    pub claim_review: Vec<ApiClaimReview>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiClaimReview {
    pub publisher: ApiPublisher,
    pub url: String,
    pub title: String,
    pub textual_rating: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApiPublisher {
    pub name: String,
}

/// One [`ClaimRecord`] per claim in the payload, in payload order.
///
/// Only the first review of each claim is kept; the API lists the most
/// relevant review first.
///
/// # Arguments
///
/// * `query` - Echoed back as [`SearchResult::query`]
/// * `payload` - A decoded `claims:search` response
pub fn normalize(query: &str, payload: ClaimsPayload) -> SearchResult {
    let results = payload
        .claims
        .into_iter()
        .map(|claim| {
            let review = claim.claim_review.into_iter().next().unwrap_or_default();
            let title = if review.title.is_empty() {
                review.url.clone()
            } else {
                review.title
            };
            ClaimRecord {
                text: claim.text,
                claimant: claim.claimant,
                claim_date: claim.claim_date,
                review_publisher: review.publisher.name,
                review_url: review.url,
                rating: review.textual_rating,
                title,
            }
        })
        .collect();

    SearchResult {
        query: query.to_string(),
        results,
    }
}
