//! JSON output of a search.
//!
//! The file holds the same `{ query, results }` document the HTTP API
//! returns, pretty-printed so it can be diffed and read.

use crate::models::SearchResult;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Write `result` as JSON to `path`, creating parent directories as needed.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn write_search_result(result: &SearchResult, path: &str) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(result)?;

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    fs::write(path, json).await?;
    info!(count = result.results.len(), "Wrote search results JSON");
    Ok(())
}
