//! HTTP API.
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /` | Plain-text banner |
//! | `GET /api/search?q=&lang=` | One fact-check API search, upstream errors passed through |
//! | `GET /api/ng-search?q=` | Regional crawl |
//! | `GET /api/smart-search?q=&lang=&regional=` | Full staged aggregation |
//! | `OPTIONS *` | CORS preflight |
//!
//! Every response, errors included, carries permissive CORS headers.

use crate::aggregator::Aggregator;
use crate::config::AppConfig;
use crate::error::SearchError;
use crate::fetcher::{HttpFetcher, PageFetcher};
use crate::models::{ErrorBody, SearchResult};
use crate::sources::factcheck::FactCheckClient;
use crate::sources::regional::RegionalSource;
use crate::sources::{PrimarySource, RegionalSearch};
use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{MethodRouter, get},
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{error, info};

const BANNER: &str =
    "Round Script API is running. Try /api/search?q=example&lang=en or /api/ng-search?q=example";

const ALLOW_METHODS: &str = "GET,OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization, Accept";

/// Shared, read-only state of the service.
///
/// Generic over the page fetcher used by the regional crawl; the running
/// service uses [`HttpFetcher`].
pub struct AppState<F = HttpFetcher> {
    pub config: Arc<AppConfig>,
    pub primary: Arc<FactCheckClient>,
    pub regional: Arc<RegionalSource<F>>,
}

impl<F> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            primary: Arc::clone(&self.primary),
            regional: Arc::clone(&self.regional),
        }
    }
}

impl<F> AppState<F> {
    pub fn new(config: AppConfig, primary: FactCheckClient, regional: RegionalSource<F>) -> Self {
        Self {
            config: Arc::new(config),
            primary: Arc::new(primary),
            regional: Arc::new(regional),
        }
    }
}

impl AppState {
    /// Live state: the fact-check API client and the Nigerian publishers.
    pub fn from_config(config: AppConfig) -> Result<Self, SearchError> {
        let primary = FactCheckClient::new(&config)?;
        let fetcher = HttpFetcher::new(&config)?;
        let regional = RegionalSource::nigeria(fetcher, config.crawl);
        Ok(Self::new(config, primary, regional))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
    lang: Option<String>,
    regional: Option<bool>,
}

impl SearchParams {
    fn query(&self) -> Result<&str, SearchError> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or(SearchError::MissingParameter("q"))
    }

    fn language(&self) -> &str {
        self.lang
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or("en")
    }
}

/// A [`SearchError`] on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(SearchError);

impl From<SearchError> for ApiError {
    fn from(e: SearchError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            e @ SearchError::MissingParameter(_) => {
                (StatusCode::BAD_REQUEST, ErrorBody::new(e.to_string()))
            }
            SearchError::Upstream { status, body } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                ErrorBody {
                    error: "Upstream error".to_string(),
                    status: Some(status),
                    body: Some(body),
                },
            ),
            e => {
                error!(error = %e, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new(e.to_string()))
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Build the service router.
///
/// Known paths answer `GET` only; any other method falls through to the same
/// JSON 404 as an unknown path. `OPTIONS` never reaches a route: the CORS
/// layer answers every preflight with an empty 200.
pub fn create_router<F>(state: AppState<F>) -> Router
where
    F: PageFetcher + Send + Sync + 'static,
{
    Router::new()
        .route("/", get_only(get(root)))
        .route("/api/search", get_only(get(search::<F>)))
        .route("/api/search/", get_only(get(search::<F>)))
        .route("/api/ng-search", get_only(get(ng_search::<F>)))
        .route("/api/ng-search/", get_only(get(ng_search::<F>)))
        .route("/api/smart-search", get_only(get(smart_search::<F>)))
        .route("/api/smart-search/", get_only(get(smart_search::<F>)))
        .fallback(not_found)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]),
        )
        // CorsLayer only sends these on preflights; every response carries them.
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
        .with_state(state)
}

fn get_only<S>(route: MethodRouter<S>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.fallback(not_found)
}

/// Bind `bind` and serve until the process is stopped.
pub async fn serve(state: AppState, bind: &str) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(bind).await?;
    info!(%bind, credential = state.primary.has_credential(), "Listening");
    axum::serve(listener, create_router(state)).await
}

async fn root() -> &'static str {
    BANNER
}

async fn search<F>(
    State(state): State<AppState<F>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResult>, ApiError> {
    let query = params.query()?;
    let result = state.primary.search(query, params.language()).await?;
    Ok(Json(result))
}

/// Always 200; a missing `q` crawls the listings unfiltered.
async fn ng_search<F>(
    State(state): State<AppState<F>>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResult>
where
    F: PageFetcher + Sync,
{
    let query = params.q.as_deref().unwrap_or_default();
    Json(state.regional.search(query).await)
}

async fn smart_search<F>(
    State(state): State<AppState<F>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResult>, ApiError>
where
    F: PageFetcher + Sync,
{
    let query = params.query()?;
    let aggregator = Aggregator::new(
        state.primary.as_ref(),
        state.regional.as_ref(),
        &state.config.aggregator,
    );
    let result = aggregator
        .search(query, params.language(), params.regional.unwrap_or(false))
        .await?;
    Ok(Json(result))
}

async fn not_found() -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::testing::CannedFetcher;
    use axum::body::Body;
    use axum::http::{HeaderMap, Request};
    use tower::ServiceExt;

    const LISTING: &str = "https://dubawa.test/category/fact-check/";
    const ARTICLE: &str = "https://dubawa.test/2024/05/01/earth-is-flat/";

    fn app(api_key: Option<&str>) -> Router {
        let config = AppConfig {
            api_key: api_key.map(str::to_string),
            ..AppConfig::default()
        };
        create_router(AppState::from_config(config).unwrap())
    }

    /// Router whose regional source crawls one canned listing with one article.
    fn regional_app() -> Router {
        let config = AppConfig::default();
        let fetcher = CannedFetcher::new()
            .page(LISTING, &format!(r#"<a href="{ARTICLE}">story</a>"#))
            .page(ARTICLE, "<html><head><title>Is the Earth flat? | Dubawa</title></head></html>");
        let primary = FactCheckClient::new(&config).unwrap();
        let regional = RegionalSource::new(fetcher, vec![LISTING.to_string()], vec![], config.crawl);
        create_router(AppState::new(config, primary, regional))
    }

    async fn call(app: Router, method: &str, uri: &str) -> (StatusCode, HeaderMap, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, body.to_vec())
    }

    fn assert_cors(headers: &HeaderMap) {
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET,OPTIONS");
    }

    #[tokio::test]
    async fn test_root_banner() {
        let (status, headers, body) = call(app(None), "GET", "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_cors(&headers);
        assert!(String::from_utf8(body).unwrap().starts_with("Round Script API is running"));
    }

    #[tokio::test]
    async fn test_search_without_query_is_bad_request() {
        let (status, headers, body) = call(app(Some("key")), "GET", "/api/search?lang=en").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_cors(&headers);
        let err: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(err.error, "Missing q");
    }

    #[tokio::test]
    async fn test_search_without_credential_is_server_error() {
        let (status, _, body) = call(app(None), "GET", "/api/search/?q=flat").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let err: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(err.error, "Missing FACTCHECK_API_KEY");
    }

    #[tokio::test]
    async fn test_smart_search_without_credential_is_server_error() {
        let (status, _, _) = call(app(None), "GET", "/api/smart-search?q=flat&regional=false").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_options_preflight() {
        let (status, headers, body) = call(app(None), "OPTIONS", "/api/search").await;
        assert_eq!(status, StatusCode::OK);
        assert_cors(&headers);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let (status, headers, body) = call(app(None), "GET", "/api/unknown").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_cors(&headers);
        let err: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(err.error, "Not found");
    }

    #[tokio::test]
    async fn test_other_methods_on_known_route_are_not_found() {
        for method in ["POST", "DELETE"] {
            let (status, headers, body) = call(app(None), method, "/api/search?q=flat").await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{method}");
            assert_cors(&headers);
            let err: ErrorBody = serde_json::from_slice(&body).unwrap();
            assert_eq!(err.error, "Not found");
        }
    }

    #[tokio::test]
    async fn test_ng_search_without_query_lists_everything() {
        let (status, headers, body) = call(regional_app(), "GET", "/api/ng-search").await;
        assert_eq!(status, StatusCode::OK);
        assert_cors(&headers);
        let result: SearchResult = serde_json::from_slice(&body).unwrap();
        assert_eq!(result.query, "");
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.results[0].title, "Is the Earth flat?");
        assert_eq!(result.results[0].review_url, ARTICLE);
    }

    #[tokio::test]
    async fn test_ng_search_filters_by_query_and_stays_ok_when_empty() {
        let (status, _, body) = call(regional_app(), "GET", "/api/ng-search?q=FLAT").await;
        assert_eq!(status, StatusCode::OK);
        let result: SearchResult = serde_json::from_slice(&body).unwrap();
        assert_eq!(result.results.len(), 1);

        let (status, _, body) = call(regional_app(), "GET", "/api/ng-search/?q=fuel").await;
        assert_eq!(status, StatusCode::OK);
        let result: SearchResult = serde_json::from_slice(&body).unwrap();
        assert_eq!(result.query, "fuel");
        assert!(result.results.is_empty());
    }

    #[tokio::test]
    async fn test_smart_search_regional_mode_succeeds_without_credential() {
        let (status, headers, body) =
            call(regional_app(), "GET", "/api/smart-search?q=flat&regional=true").await;
        assert_eq!(status, StatusCode::OK);
        assert_cors(&headers);
        let result: SearchResult = serde_json::from_slice(&body).unwrap();
        assert_eq!(result.query, "flat");
        assert_eq!(result.results[0].title, "Is the Earth flat?");
        assert!(result.results[0].rating.is_empty());
    }

    #[test]
    fn test_upstream_error_passes_status_and_body_through() {
        let response = ApiError(SearchError::Upstream {
            status: 403,
            body: "API key not valid".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_search_params_defaults() {
        let params = SearchParams::default();
        assert_eq!(params.language(), "en");
        assert!(matches!(params.query(), Err(SearchError::MissingParameter("q"))));
    }
}
