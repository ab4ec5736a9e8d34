//! Command-line interface definitions for Round Script.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Upstream settings can be provided via flags or environment variables and
//! are turned into an [`AppConfig`](crate::config::AppConfig) once at startup.

use crate::config::DEFAULT_API_BASE;
use clap::{Args, Parser, Subcommand};

/// Command-line arguments for Round Script.
///
/// # Examples
///
/// ```sh
/// # Serve the HTTP API
/// FACTCHECK_API_KEY=... round_script serve --bind 0.0.0.0:8787
///
/// # One-off search, preferring Nigerian fact-checkers, saving the script
/// round_script search "the earth is flat" --regional --script-out script.txt
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub upstream: UpstreamArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Settings for the fact-check API and the crawl/expansion bounds.
#[derive(Args, Debug, Clone)]
pub struct UpstreamArgs {
    /// Google Fact Check Tools API key
    #[arg(long, env = "FACTCHECK_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Base URL of the fact-check API
    #[arg(long, env = "FACTCHECK_API_BASE", default_value = DEFAULT_API_BASE, global = true)]
    pub api_base: String,

    /// Results requested per API call
    #[arg(long, default_value_t = 10, global = true)]
    pub page_size: u32,

    /// Stop query expansion once this many unique results are collected
    #[arg(long, default_value_t = 6, global = true, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    pub early_stop: usize,

    /// Maximum article links followed per regional listing page
    #[arg(long, default_value_t = 12, global = true)]
    pub listing_limit: usize,

    /// Maximum article links followed per regional site search
    #[arg(long, default_value_t = 10, global = true)]
    pub search_limit: usize,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        /// Address to listen on
        #[arg(short, long, env = "ROUND_SCRIPT_BIND", default_value = "0.0.0.0:8787")]
        bind: String,
    },

    /// Run one aggregated search and print the findings and video script
    Search {
        /// Claim to look up
        query: String,

        /// Preferred language code, or "auto"
        #[arg(short, long, default_value = "en")]
        lang: String,

        /// Prefer regional fact-check sites over the fact-check API
        #[arg(short, long)]
        regional: bool,

        /// Write the video script to this file instead of stdout
        #[arg(short, long)]
        script_out: Option<String>,

        /// Also write the raw results as JSON to this file
        #[arg(short, long)]
        json_out: Option<String>,
    },
}
