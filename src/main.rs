//! # Round Script
//!
//! Look up fact-checks for a claim and turn them into a short video script.
//!
//! ## Features
//!
//! - Searches the Google Fact Check Tools API, retrying with query variants
//!   and alternate languages when the literal query finds nothing
//! - Crawls Nigerian fact-check publishers (Dubawa, FactCheckHub, TheCable,
//!   Premium Times, Africa Check, AFP) and reads their `ClaimReview` JSON-LD
//! - Serves the results over a small CORS-enabled HTTP API
//! - Drafts a hook/findings/outro video script from the findings
//!
//! ## Usage
//!
//! ```sh
//! FACTCHECK_API_KEY=... round_script serve
//! round_script search "the earth is flat" --lang en --script-out script.txt
//! ```
//!
//! ## Architecture
//!
//! 1. **Sources**: the fact-check API client and the regional crawler
//! 2. **Extraction**: link discovery and JSON-LD parsing of article pages
//! 3. **Aggregation**: staged fallback across variants, languages and sources
//! 4. **Delivery**: HTTP handlers, terminal listing, script and JSON files

use clap::Parser;
use std::error::Error;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregator;
mod cli;
mod config;
mod crawler;
mod error;
mod extractor;
mod fetcher;
mod models;
mod normalize;
mod outputs;
mod server;
mod sources;
mod utils;

use aggregator::Aggregator;
use cli::{Cli, Command};
use config::AppConfig;
use outputs::{json, listing, script};
use server::AppState;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    let config = AppConfig::from_args(&args.upstream);
    debug!(
        api_base = %config.api_base,
        credential = config.api_key.is_some(),
        early_stop = config.aggregator.early_stop,
        "Loaded configuration"
    );

    let state = AppState::from_config(config)?;

    match args.command {
        Command::Serve { bind } => {
            info!(version = env!("CARGO_PKG_VERSION"), "round_script starting up");
            server::serve(state, &bind).await?;
        }
        Command::Search {
            query,
            lang,
            regional,
            script_out,
            json_out,
        } => {
            let start_time = std::time::Instant::now();
            let aggregator = Aggregator::new(
                state.primary.as_ref(),
                state.regional.as_ref(),
                &state.config.aggregator,
            );
            let result = aggregator.search(&query, &lang, regional).await?;

            print!("{}", listing::render_results(&result));

            let script = script::build_script(&result.query, &result);
            match script_out {
                Some(path) => script::write_script(&script, &path).await?,
                None => println!("\n{script}"),
            }
            if let Some(path) = json_out {
                json::write_search_result(&result, &path).await?;
            }

            let elapsed = start_time.elapsed();
            info!(
                found = result.results.len(),
                millis = elapsed.as_millis() as u64,
                "Search complete"
            );
        }
    }

    Ok(())
}
