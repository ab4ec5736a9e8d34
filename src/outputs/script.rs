//! Short video script built from search findings.
//!
//! The script follows a fixed five-beat structure with suggested timings:
//! hook, context, findings, nuance, outro. Only the findings depend on the
//! results; at most [`MAX_FINDINGS`] of them are read out.

use crate::models::SearchResult;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

pub const MAX_FINDINGS: usize = 6;

const NO_FINDINGS: &str =
    "- No verified reviews found. Consider rephrasing the query or trying regional mode.";

/// Render the script for `topic` from `result`.
pub fn build_script(topic: &str, result: &SearchResult) -> String {
    let findings: Vec<String> = result
        .results
        .iter()
        .take(MAX_FINDINGS)
        .map(|r| {
            let mut line = format!("- {}", r.display_title());
            if !r.rating.is_empty() {
                line.push_str(&format!(" ({})", r.rating));
            }
            if !r.review_publisher.is_empty() {
                line.push_str(&format!(" — {}", r.review_publisher));
            }
            if !r.review_url.is_empty() {
                line.push_str(&format!("\nSource: {}", r.review_url));
            }
            line
        })
        .collect();

    let findings = if findings.is_empty() {
        NO_FINDINGS.to_string()
    } else {
        findings.join("\n")
    };

    [
        format!("HOOK: {topic}? Let's check what fact-checkers and trusted sources say."),
        "\nCONTEXT (5–8s):".to_string(),
        "• Here's the claim and what reviewers report.".to_string(),
        String::new(),
        "FINDINGS (15–30s):".to_string(),
        findings,
        String::new(),
        "NUANCE (5–10s):".to_string(),
        "• Ratings vary by context, date, and wording. Always open the source.".to_string(),
        String::new(),
        "OUTRO (3–5s):".to_string(),
        "Thanks for watching. Like & follow for more verified explainers.".to_string(),
    ]
    .join("\n")
}

/// Write the script to `path` as plain text.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn write_script(script: &str, path: &str) -> Result<(), Box<dyn Error>> {
    fs::write(path, script).await?;
    info!(bytes = script.len(), "Wrote video script");
    Ok(())
}
