//! Candidate article discovery on sites without an API.
//!
//! Listing and search-result pages are fetched whole and scanned for
//! absolute `href` targets. There is no HTML parse: the patterns below are a
//! best-effort heuristic and silently find nothing if a site changes its
//! markup.

use crate::error::FetchError;
use crate::fetcher::PageFetcher;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument};
use url::Url;

static HREF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)href\s*=\s*["'](https?://[^"'\s<>]+)["']"#).expect("valid href regex")
});

static DATE_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\d{4}/\d{2}/\d{2}/").expect("valid date path regex"));

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg"];
const FEED_SUFFIXES: &[&str] = &[".rss", ".xml"];
const ADMIN_MARKERS: &[&str] = &["/wp-admin", "/wp-login", "/wp-json"];
const FACT_KEYWORDS: &[&str] = &["fact", "verif", "debunk", "claim", "false", "misleading"];

/// Which heuristic decides that a link looks like an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPolicy {
    /// Category/listing pages: dated paths or fact-check keywords in the path.
    Listing,
    /// Site search results: dated paths only.
    SiteSearch,
}

/// Candidate article URLs found on a listing page, first-seen order.
#[instrument(level = "info", skip(fetcher))]
pub async fn crawl_listing<F: PageFetcher>(
    fetcher: &F,
    listing_url: &str,
    host_filter: Option<&str>,
    max: usize,
) -> Result<Vec<String>, FetchError> {
    let html = fetcher.fetch_text(listing_url).await?;
    let links = extract_links(&html, host_filter, LinkPolicy::Listing, max);
    debug!(count = links.len(), "Crawled listing");
    Ok(links)
}

/// Candidate article URLs from the site's own search (`/?s=<query>`).
#[instrument(level = "info", skip(fetcher))]
pub async fn crawl_site_search<F: PageFetcher>(
    fetcher: &F,
    base_url: &str,
    query: &str,
    host_filter: Option<&str>,
    max: usize,
) -> Result<Vec<String>, FetchError> {
    let url = site_search_url(base_url, query);
    let html = fetcher.fetch_text(&url).await?;
    let links = extract_links(&html, host_filter, LinkPolicy::SiteSearch, max);
    debug!(%url, count = links.len(), "Crawled site search");
    Ok(links)
}

pub fn site_search_url(base_url: &str, query: &str) -> String {
    format!(
        "{}/?s={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(query)
    )
}

/// Scan raw markup for absolute links that look like articles.
///
/// Images, fragment links, feeds and admin endpoints are discarded, as are
/// links not containing `host_filter` when one is given.
///
/// # Arguments
///
/// * `html` - Raw listing or search-result markup
/// * `host_filter` - Substring every kept link must contain, usually the site host
/// * `policy` - Which article heuristic to apply
/// * `max` - Cap on the number of links returned
///
/// # Returns
///
/// At most `max` distinct links in first-seen order.
pub fn extract_links(
    html: &str,
    host_filter: Option<&str>,
    policy: LinkPolicy,
    max: usize,
) -> Vec<String> {
    HREF.captures_iter(html)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .filter(|href| !is_excluded(href))
        .filter(|href| host_filter.is_none_or(|host| href.contains(host)))
        .filter(|href| looks_like_article(href, policy))
        .unique()
        .take(max)
        .map(str::to_string)
        .collect()
}

fn is_excluded(href: &str) -> bool {
    if href.contains('#') {
        return true;
    }
    let lower = href.to_lowercase();
    let path = Url::parse(&lower)
        .map(|u| u.path().trim_end_matches('/').to_string())
        .unwrap_or_else(|_| lower.clone());

    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
        || is_feed(&path)
        || ADMIN_MARKERS.iter().any(|m| path.contains(m))
}

/// Feed endpoints: a `feed` path segment or an `.rss`/`.xml` document.
/// `path` is lowercase without a trailing slash.
fn is_feed(path: &str) -> bool {
    path.ends_with("/feed")
        || path.contains("/feed/")
        || FEED_SUFFIXES.iter().any(|s| path.ends_with(s))
}

fn looks_like_article(href: &str, policy: LinkPolicy) -> bool {
    let Ok(url) = Url::parse(href) else {
        return false;
    };
    let path = url.path().to_lowercase();
    if DATE_PATH.is_match(&path) {
        return true;
    }
    match policy {
        LinkPolicy::Listing => FACT_KEYWORDS.iter().any(|k| path.contains(k)),
        LinkPolicy::SiteSearch => false,
    }
}
