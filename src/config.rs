//! Process-wide configuration.
//!
//! [`AppConfig`] is built once at startup from the parsed CLI and handed by
//! reference to the fetcher, the API client and the aggregator. Nothing in
//! the search core reads the environment on its own.

use crate::cli::UpstreamArgs;

/// Default endpoint of the Google Fact Check Tools API.
pub const DEFAULT_API_BASE: &str = "https://factchecktools.googleapis.com/v1alpha1";

/// Bounds on how many article links one crawl may follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlLimits {
    /// Maximum candidate links taken from one listing page.
    pub listing_max: usize,
    /// Maximum candidate links taken from one site-search results page.
    pub search_max: usize,
}

impl Default for CrawlLimits {
    fn default() -> Self {
        Self {
            listing_max: 12,
            search_max: 10,
        }
    }
}

/// Tunables of the variant/language expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorSettings {
    /// Stop expanding once this many unique records have been collected.
    pub early_stop: usize,
    /// Words appended to the query to build the expansion variants.
    pub variant_suffixes: Vec<String>,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            early_stop: 6,
            variant_suffixes: ["fact-check", "false", "misinformation", "verificación", "falso"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl AggregatorSettings {
    /// Query variants in the order they are tried: the query itself, the
    /// quoted exact phrase, then one variant per suffix.
    pub fn variants(&self, query: &str) -> Vec<String> {
        let mut out = vec![query.to_string(), format!("\"{query}\"")];
        out.extend(
            self.variant_suffixes
                .iter()
                .map(|suffix| format!("{query} {suffix}")),
        );
        out
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the fact-check API, without the `claims:search` suffix.
    pub api_base: String,
    /// API key; `None` makes primary searches fail with a missing-credential error.
    pub api_key: Option<String>,
    /// `pageSize` sent to the fact-check API.
    pub page_size: u32,
    /// User agent sent when crawling regional sites.
    pub user_agent: String,
    pub crawl: CrawlLimits,
    pub aggregator: AggregatorSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            page_size: 10,
            user_agent: default_user_agent(),
            crawl: CrawlLimits::default(),
            aggregator: AggregatorSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn from_args(args: &UpstreamArgs) -> Self {
        Self {
            api_base: args.api_base.trim_end_matches('/').to_string(),
            // A blank key is as good as none.
            api_key: args
                .api_key
                .as_ref()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            page_size: args.page_size,
            user_agent: default_user_agent(),
            crawl: CrawlLimits {
                listing_max: args.listing_limit,
                search_max: args.search_limit,
            },
            aggregator: AggregatorSettings {
                early_stop: args.early_stop,
                ..AggregatorSettings::default()
            },
        }
    }
}

fn default_user_agent() -> String {
    format!(
        "{}/{} (fact-check aggregator)",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variants_order() {
        let settings = AggregatorSettings::default();
        let v = settings.variants("the earth is flat");
        assert_eq!(v[0], "the earth is flat");
        assert_eq!(v[1], "\"the earth is flat\"");
        assert_eq!(v[2], "the earth is flat fact-check");
        assert!(v.contains(&"the earth is flat misinformation".to_string()));
        assert_eq!(v.len(), 2 + settings.variant_suffixes.len());
    }

    #[test]
    fn test_from_args_drops_blank_key_and_trailing_slash() {
        let args = UpstreamArgs {
            api_key: Some("   ".to_string()),
            api_base: "https://example.test/v1/".to_string(),
            page_size: 10,
            early_stop: 5,
            listing_limit: 20,
            search_limit: 8,
        };
        let config = AppConfig::from_args(&args);
        assert_eq!(config.api_key, None);
        assert_eq!(config.api_base, "https://example.test/v1");
        assert_eq!(config.aggregator.early_stop, 5);
        assert_eq!(config.crawl.listing_max, 20);
        assert_eq!(config.crawl.search_max, 8);
    }

    #[test]
    fn test_user_agent_names_the_crate() {
        assert!(AppConfig::default().user_agent.starts_with("round_script/"));
    }
}
