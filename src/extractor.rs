//! Turn arbitrary article pages into [`ClaimRecord`]s.
//!
//! Fact-check publishers embed schema.org `ClaimReview` annotations as
//! JSON-LD. [`extract_claim_reviews`] scans the raw markup for those blocks;
//! when a page has none, [`title_fallback`] builds a single related-article
//! record from the page `<title>`.
//!
//! The JSON-LD scan is a pattern match over the raw text, not an HTML parse,
//! and is best-effort: a block that is not valid JSON is skipped.

use crate::models::ClaimRecord;
use crate::utils::host_of;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

static LD_JSON_SCRIPT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("valid ld+json regex")
});

static TITLE_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\|.*").expect("valid suffix regex"));

/// Every `ClaimReview` embedded in `html`, normalized.
///
/// All `application/ld+json` blocks are scanned, including arrays and
/// `@graph` containers. Blocks that are not valid JSON are skipped.
///
/// # Arguments
///
/// * `html` - Raw page markup
/// * `page_url` - URL the page was fetched from
///
/// # Returns
///
/// One [`ClaimRecord`] per `ClaimReview` node, in document order. Records
/// whose review carries no URL get `page_url` instead. Empty when the page
/// has no usable annotation.
pub fn extract_claim_reviews(html: &str, page_url: &str) -> Vec<ClaimRecord> {
    let mut out = Vec::new();

    for caps in LD_JSON_SCRIPT.captures_iter(html) {
        let raw = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        if raw.is_empty() {
            continue;
        }

        let parsed: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                debug!(%page_url, error = %e, "Skipping unparsable JSON-LD block");
                continue;
            }
        };

        for node in flatten_nodes(&parsed) {
            if !is_claim_review(node) {
                continue;
            }
            let mut record = claim_review_to_record(node);
            if record.review_url.is_empty() {
                record.review_url = page_url.to_string();
            }
            out.push(record);
        }
    }

    out
}

/// Related-article record for a page without structured data.
///
/// The title is the page `<title>` with any ` | Site Name` suffix removed;
/// the publisher is the page hostname.
pub fn title_fallback(html: &str, page_url: &str) -> ClaimRecord {
    ClaimRecord {
        title: page_title(html),
        review_publisher: host_of(page_url).unwrap_or_default(),
        review_url: page_url.to_string(),
        ..Default::default()
    }
}

/// The records of an article page: its `ClaimReview`s, or the title fallback.
pub fn claims_from_article(html: &str, page_url: &str) -> Vec<ClaimRecord> {
    let records = extract_claim_reviews(html, page_url);
    if records.is_empty() {
        vec![title_fallback(html, page_url)]
    } else {
        records
    }
}

fn page_title(html: &str) -> String {
    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };
    let document = Html::parse_document(html);
    let title = document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default();
    TITLE_SUFFIX.replace(&title, "").trim().to_string()
}

/// Top-level arrays and `@graph` containers, flattened into their items.
fn flatten_nodes(parsed: &Value) -> Vec<&Value> {
    let top: Vec<&Value> = match parsed {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    top.into_iter()
        .flat_map(|node| match node.get("@graph") {
            Some(Value::Array(graph)) => graph.iter().collect::<Vec<_>>(),
            Some(single @ Value::Object(_)) => vec![single],
            _ => vec![node],
        })
        .collect()
}

fn is_claim_review(node: &Value) -> bool {
    match node.get("@type") {
        Some(Value::String(t)) => t == "ClaimReview",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("ClaimReview")),
        _ => false,
    }
}

fn claim_review_to_record(node: &Value) -> ClaimRecord {
    ClaimRecord {
        text: first_str(node, &[&["itemReviewed", "claimReviewed"], &["itemReviewed", "name"]]),
        claimant: first_str(node, &[&["itemReviewed", "author", "name"]]),
        claim_date: first_str(node, &[&["itemReviewed", "datePublished"]]),
        review_publisher: first_str(node, &[&["author", "name"], &["publisher", "name"]]),
        review_url: first_str(node, &[&["url"]]),
        rating: first_str(
            node,
            &[&["reviewRating", "alternateName"], &["reviewRating", "name"]],
        ),
        title: first_str(node, &[&["headline"], &["itemReviewed", "name"]]),
    }
}

/// The first non-empty string found along `paths`, or `""`.
fn first_str(node: &Value, paths: &[&[&str]]) -> String {
    paths
        .iter()
        .find_map(|path| {
            path.iter()
                .try_fold(node, |cur, key| cur.get(key))
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
        })
        .unwrap_or_default()
        .to_string()
}
