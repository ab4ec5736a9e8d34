//! Google Fact Check Tools API client.
//!
//! Calls `GET {api_base}/claims:search` and normalizes the payload with
//! [`normalize`](crate::normalize::normalize). Non-success responses are
//! passed through verbatim as [`SearchError::Upstream`] so the HTTP layer can
//! surface the upstream status and body.

use crate::config::AppConfig;
use crate::error::{FetchError, SearchError};
use crate::models::SearchResult;
use crate::normalize::{ClaimsPayload, normalize};
use crate::sources::PrimarySource;
use crate::utils::truncate_for_log;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use tracing::{info, instrument, warn};
use url::Url;

#[derive(Debug, Clone)]
pub struct FactCheckClient {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
    page_size: u32,
}

impl FactCheckClient {
    pub fn new(config: &AppConfig) -> Result<Self, SearchError> {
        let endpoint = Url::parse(&format!("{}/claims:search", config.api_base))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            page_size: config.page_size,
        })
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// The request URL for `query`; `languageCode` is omitted for `"auto"`.
    fn request_url(&self, query: &str, language: &str, key: &str) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", query);
            if !language.is_empty() && language != "auto" {
                pairs.append_pair("languageCode", language);
            }
            pairs.append_pair("pageSize", &self.page_size.to_string());
            pairs.append_pair("key", key);
        }
        url
    }
}

impl PrimarySource for FactCheckClient {
    #[instrument(level = "info", skip(self))]
    async fn search(&self, query: &str, language: &str) -> Result<SearchResult, SearchError> {
        let key = self.api_key.as_deref().ok_or(SearchError::MissingCredential)?;
        let url = self.request_url(query, language, key);

        // The endpoint without the query string, so the key never reaches logs.
        let transport = |source| FetchError::Transport {
            url: self.endpoint.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                body = %truncate_for_log(&body, 300),
                "Fact-check API returned an error"
            );
            return Err(SearchError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let payload: ClaimsPayload = serde_json::from_str(&body)?;
        let result = normalize(query, payload);
        info!(count = result.results.len(), "Fact-check API search complete");
        Ok(result)
    }
}
