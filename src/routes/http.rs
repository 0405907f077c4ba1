// GET handlers: version, kinds, insights

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use super::AppState;
use crate::insight::{AggregationError, normalize_response};
use crate::models::{MetricKind, MetricRecord};
use crate::version::{NAME, VERSION};

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/kinds — ids of every registered metric kind.
pub(super) async fn kinds_handler(State(state): State<AppState>) -> impl IntoResponse {
    let kinds: Vec<&'static str> = state.registry.kinds().map(|k| k.as_str()).collect();
    Json(kinds)
}

/// Optional [from_ts, to_ts) range in epoch millis; defaults to the trailing
/// configured window ending now.
#[derive(Debug, Deserialize)]
pub(super) struct RangeParams {
    from_ts: Option<i64>,
    to_ts: Option<i64>,
}

impl RangeParams {
    fn resolve(&self, default_days: u32) -> (i64, i64) {
        let to_ts = self
            .to_ts
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
        let from_ts = self
            .from_ts
            .unwrap_or(to_ts - (default_days as i64) * 86_400_000);
        (from_ts, to_ts)
    }
}

/// GET /api/insights/{kind} — fetch from the search backend and normalize.
pub(super) async fn insights_handler(
    Path(kind): Path<String>,
    Query(range): Query<RangeParams>,
    State(state): State<AppState>,
) -> Result<Json<Vec<MetricRecord>>, (StatusCode, String)> {
    let kind = parse_kind(&kind)?;
    let metric = state.registry.config(kind).map_err(error_response)?;
    let (from_ts, to_ts) = range.resolve(state.config.insights.refresh_range_days);
    let raw = state
        .search_repo
        .fetch_histogram(metric, from_ts, to_ts)
        .await
        .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))?;
    let records = normalize_response(&state.registry, state.config.search.backend, kind, &raw)
        .map_err(error_response)?;
    Ok(Json(records))
}

/// GET /api/insights/{kind}/latest — background-refreshed series (empty
/// array until the first refresh completes).
pub(super) async fn latest_handler(
    Path(kind): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<MetricRecord>>, (StatusCode, String)> {
    let kind = parse_kind(&kind)?;
    let records = state.cache.get(kind).await.unwrap_or_default();
    Ok(Json(records))
}

fn parse_kind(kind: &str) -> Result<MetricKind, (StatusCode, String)> {
    kind.parse::<MetricKind>().map_err(error_response)
}

fn error_response(error: AggregationError) -> (StatusCode, String) {
    let status = match &error {
        AggregationError::UnknownMetricKind(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    };
    (status, error.to_string())
}
