//! Nigerian fact-check sites, crawled directly.
//!
//! None of these publishers offer a search API, so each search:
//!
//! 1. crawls every listing page for recent fact-check links,
//! 2. when a query is given, also runs each site's own `/?s=` search,
//! 3. fetches every candidate article and extracts its `ClaimReview`s (or
//!    falls back to the page title),
//! 4. drops duplicates and, when a query is given, keeps only records whose
//!    title or text mentions it.
//!
//! Every page is fetched sequentially. A failing listing or article is
//! recorded and skipped; one unreachable site never fails the search.

use crate::config::CrawlLimits;
use crate::crawler::{crawl_listing, crawl_site_search};
use crate::error::FetchError;
use crate::extractor::claims_from_article;
use crate::fetcher::PageFetcher;
use crate::models::{ClaimRecord, SearchResult};
use crate::sources::RegionalSearch;
use crate::utils::{contains_ignore_case, host_filter_for};
use futures::stream::{self, StreamExt};
use itertools::{Either, Itertools};
use tracing::{debug, info, instrument, warn};

/// Listing pages with many recent fact-checks.
pub const NIGERIA_LISTINGS: &[&str] = &[
    "https://dubawa.org/category/fact-check/",
    "https://factcheckhub.com/",
    "https://factcheck.thecable.ng/",
    "https://www.premiumtimesng.com/category/news/fact-checks",
    "https://africacheck.org/fact-checks",
    "https://factcheck.afp.com/AFP-Nigeria",
];

/// Home pages whose WordPress-style search is queried directly.
pub const NIGERIA_SEARCH_SEEDS: &[&str] = &[
    "https://dubawa.org",
    "https://factcheckhub.com",
    "https://factcheck.thecable.ng",
    "https://www.premiumtimesng.com",
    "https://africacheck.org",
    "https://factcheck.afp.com/AFP-Nigeria",
];

type PageOutcome = Result<Vec<ClaimRecord>, FetchError>;

#[derive(Debug)]
pub struct RegionalSource<F> {
    fetcher: F,
    listings: Vec<String>,
    search_seeds: Vec<String>,
    limits: CrawlLimits,
}

impl<F> RegionalSource<F>
where
    F: PageFetcher + Sync,
{
    pub fn new(fetcher: F, listings: Vec<String>, search_seeds: Vec<String>, limits: CrawlLimits) -> Self {
        Self {
            fetcher,
            listings,
            search_seeds,
            limits,
        }
    }

    /// The fixed set of Nigerian fact-check publishers.
    pub fn nigeria(fetcher: F, limits: CrawlLimits) -> Self {
        let owned = |urls: &[&str]| urls.iter().map(|u| u.to_string()).collect();
        Self::new(fetcher, owned(NIGERIA_LISTINGS), owned(NIGERIA_SEARCH_SEEDS), limits)
    }

    /// Fetch each article in turn and extract its records.
    async fn articles(&self, links: Vec<String>) -> Vec<PageOutcome> {
        stream::iter(links)
            .then(|url| async move {
                let html = self.fetcher.fetch_text(&url).await?;
                let records = claims_from_article(&html, &url);
                debug!(%url, count = records.len(), "Extracted article records");
                Ok::<_, FetchError>(records)
            })
            .collect()
            .await
    }

    async fn crawl_listings(&self) -> Vec<PageOutcome> {
        let mut outcomes = Vec::new();
        for listing in &self.listings {
            let host = host_filter_for(listing);
            match crawl_listing(&self.fetcher, listing, host.as_deref(), self.limits.listing_max).await {
                Ok(links) => outcomes.extend(self.articles(links).await),
                Err(e) => outcomes.push(Err(e)),
            }
        }
        outcomes
    }

    async fn crawl_searches(&self, query: &str) -> Vec<PageOutcome> {
        let mut outcomes = Vec::new();
        for seed in &self.search_seeds {
            let host = host_filter_for(seed);
            match crawl_site_search(&self.fetcher, seed, query, host.as_deref(), self.limits.search_max).await {
                Ok(links) => outcomes.extend(self.articles(links).await),
                Err(e) => outcomes.push(Err(e)),
            }
        }
        outcomes
    }
}

impl<F> RegionalSearch for RegionalSource<F>
where
    F: PageFetcher + Sync,
{
    #[instrument(level = "info", skip(self))]
    async fn search(&self, query: &str) -> SearchResult {
        let query = query.trim();

        let mut outcomes = self.crawl_listings().await;
        if !query.is_empty() {
            outcomes.extend(self.crawl_searches(query).await);
        }

        let (pages, failures): (Vec<Vec<ClaimRecord>>, Vec<FetchError>) =
            outcomes.into_iter().partition_map(|outcome| match outcome {
                Ok(records) => Either::Left(records),
                Err(e) => Either::Right(e),
            });

        for failure in &failures {
            debug!(error = %failure, "Skipped regional page");
        }
        if !failures.is_empty() {
            warn!(
                failed = failures.len(),
                fetched = pages.len(),
                "Some regional pages could not be fetched"
            );
        }

        let results: Vec<ClaimRecord> = pages
            .into_iter()
            .flatten()
            .unique_by(ClaimRecord::identity_key)
            .filter(|r| {
                query.is_empty()
                    || contains_ignore_case(&r.title, query)
                    || contains_ignore_case(&r.text, query)
            })
            .collect();

        info!(count = results.len(), "Regional search complete");
        SearchResult {
            query: query.to_string(),
            results,
        }
    }
}
