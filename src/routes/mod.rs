// HTTP routes

mod http;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::insight::AggregatorRegistry;
use crate::refresh_worker::SeriesCache;
use crate::search_repo::SearchRepo;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) registry: Arc<AggregatorRegistry>,
    pub(crate) search_repo: Arc<SearchRepo>,
    pub(crate) cache: SeriesCache,
    pub(crate) config: AppConfig,
}

pub fn app(
    registry: Arc<AggregatorRegistry>,
    search_repo: Arc<SearchRepo>,
    cache: SeriesCache,
    config: AppConfig,
) -> Router {
    let state = AppState {
        registry,
        search_repo,
        cache,
        config,
    };
    Router::new()
        .route("/", get(|| async { "Hello from Rust usage-insights!" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/kinds", get(http::kinds_handler)) // GET /api/kinds
        .route("/api/insights/{kind}", get(http::insights_handler)) // GET /api/insights/{kind}
        .route(
            "/api/insights/{kind}/latest",
            get(http::latest_handler),
        ) // GET /api/insights/{kind}/latest
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
