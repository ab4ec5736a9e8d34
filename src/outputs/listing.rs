//! Plain-text rendering of search results.
//!
//! Each record is labelled "Fact-Check" when it carries a rating and
//! "Related Article" when it does not, so the two never blend together.

use crate::models::SearchResult;
use std::fmt::Write;

/// Shown when every source came back empty.
pub const NO_RESULTS: &str =
    "No results found. Try rephrasing, switching language, or enabling regional mode.";

pub fn render_results(result: &SearchResult) -> String {
    if result.results.is_empty() {
        return format!("{NO_RESULTS}\n");
    }

    let mut out = String::new();
    for record in &result.results {
        let _ = writeln!(out, "[{}] {}", record.verdict().label(), record.display_title());

        let meta: Vec<String> = [
            ("Claimant", &record.claimant),
            ("Date", &record.claim_date),
            ("Publisher", &record.review_publisher),
            ("Rating", &record.rating),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(label, value)| format!("{label}: {value}"))
        .collect();
        if !meta.is_empty() {
            let _ = writeln!(out, "    {}", meta.join(" • "));
        }
        if !record.review_url.is_empty() {
            let _ = writeln!(out, "    {}", record.review_url);
        }
    }
    out
}
