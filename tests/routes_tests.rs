// Route tests: version, kinds, and cache-backed insights endpoints

use axum_test::TestServer;
use std::collections::BTreeMap;
use std::sync::Arc;
use usage_insights::config::AppConfig;
use usage_insights::insight::AggregatorRegistry;
use usage_insights::models::{MetricKind, MetricRecord};
use usage_insights::refresh_worker::SeriesCache;
use usage_insights::routes;
use usage_insights::search_repo::SearchRepo;

const TEST_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[search]
url = "http://localhost:9200"
index = "usage_snapshots"
backend = "elasticsearch"

[insights]
refresh_interval_secs = 60
refresh_range_days = 7
"#;

fn test_app() -> (axum::Router, SeriesCache) {
    let config = AppConfig::load_from_str(TEST_CONFIG).unwrap();
    let registry = Arc::new(AggregatorRegistry::with_defaults());
    let search_repo = Arc::new(SearchRepo::connect(&config.search).unwrap());
    let cache = SeriesCache::new();
    let app = routes::app(registry, search_repo, cache.clone(), config);
    (app, cache)
}

fn sample_record() -> MetricRecord {
    let mut fields = BTreeMap::new();
    fields.insert("used".to_string(), 80.0);
    fields.insert("unused".to_string(), 20.0);
    fields.insert("usedPercentage".to_string(), 0.8);
    fields.insert("unusedPercentage".to_string(), 0.2);
    MetricRecord {
        timestamp: 1_704_067_200_000,
        fields,
    }
}

#[tokio::test]
async fn test_root_endpoint() {
    let (app, _) = test_app();
    let server = TestServer::try_new(app).unwrap();
    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_text("Hello from Rust usage-insights!");
}

#[tokio::test]
async fn test_version_endpoint() {
    let (app, _) = test_app();
    let server = TestServer::try_new(app).unwrap();
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(
        json.get("name").and_then(|v| v.as_str()),
        Some("usage-insights")
    );
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_kinds_endpoint_lists_registered_kinds() {
    let (app, _) = test_app();
    let server = TestServer::try_new(app).unwrap();
    let response = server.get("/api/kinds").await;
    response.assert_status_ok();
    let kinds: Vec<String> = response.json();
    assert_eq!(kinds.len(), MetricKind::ALL.len());
    assert!(kinds.contains(&"used-vs-unused-assets".to_string()));
    assert!(kinds.contains(&"daily-active-users".to_string()));
}

#[tokio::test]
async fn test_unknown_kind_is_not_found() {
    let (app, _) = test_app();
    let server = TestServer::try_new(app).unwrap();

    // Kind parsing happens before any backend I/O on both endpoints.
    let response = server.get("/api/insights/nonexistent-kind").await;
    response.assert_status_not_found();
    let response = server.get("/api/insights/nonexistent-kind/latest").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_latest_is_empty_before_first_refresh() {
    let (app, _) = test_app();
    let server = TestServer::try_new(app).unwrap();
    let response = server.get("/api/insights/used-vs-unused-assets/latest").await;
    response.assert_status_ok();
    let records: Vec<MetricRecord> = response.json();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_latest_serves_the_seeded_cache() {
    let (app, cache) = test_app();
    cache
        .put(MetricKind::UsedVsUnusedAssets, vec![sample_record()])
        .await;
    let server = TestServer::try_new(app).unwrap();

    let response = server.get("/api/insights/used-vs-unused-assets/latest").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(
        json,
        serde_json::json!([{
            "timestamp": 1_704_067_200_000i64,
            "used": 80.0,
            "unused": 20.0,
            "usedPercentage": 0.8,
            "unusedPercentage": 0.2
        }])
    );

    // Other kinds stay empty.
    let response = server.get("/api/insights/page-views/latest").await;
    response.assert_status_ok();
    let records: Vec<MetricRecord> = response.json();
    assert!(records.is_empty());
}
