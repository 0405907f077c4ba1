// Bucket walker tests: malformed structure, type mismatches, key handling,
// and cross-backend agreement

mod common;

use common::{search_response, usage_bucket};
use serde_json::json;
use usage_insights::insight::opensearch::SearchBody;
use usage_insights::insight::{
    AggregationError, AggregatorRegistry, BucketWalker, ElasticWalker, OpenSearchWalker,
};
use usage_insights::models::MetricKind;

#[test]
fn response_without_aggregations_is_malformed() {
    let response = json!({ "took": 1, "hits": { "hits": [] } });
    let registry = AggregatorRegistry::with_defaults();
    let err = registry
        .aggregate(MetricKind::UsedVsUnusedAssets, &ElasticWalker, &response)
        .unwrap_err();

    assert!(matches!(err, AggregationError::MalformedResponse(_)));
}

#[test]
fn histogram_without_buckets_is_malformed() {
    let response = json!({ "aggregations": { "timestamp": { "doc_count_error_upper_bound": 0 } } });
    let registry = AggregatorRegistry::with_defaults();
    let err = registry
        .aggregate(MetricKind::UsedVsUnusedAssets, &ElasticWalker, &response)
        .unwrap_err();

    assert!(matches!(err, AggregationError::MalformedResponse(_)));
}

#[test]
fn non_numeric_sub_aggregation_value_is_type_mismatch() {
    let bucket = json!({
        "key_as_string": "2024-01-01",
        "doc_count": 2,
        "totalUsed": { "value": "high" },
        "totalUnused": { "value": 1.0 }
    });
    let registry = AggregatorRegistry::with_defaults();
    let err = registry
        .aggregate(
            MetricKind::UsedVsUnusedAssets,
            &ElasticWalker,
            &search_response(vec![bucket]),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        AggregationError::TypeMismatch { ref name, .. } if name == "totalUsed"
    ));
}

#[test]
fn non_object_sub_aggregation_is_type_mismatch() {
    let bucket = json!({
        "key_as_string": "2024-01-01",
        "doc_count": 2,
        "totalUsed": 5,
        "totalUnused": { "value": 1.0 }
    });
    let registry = AggregatorRegistry::with_defaults();
    let err = registry
        .aggregate(
            MetricKind::UsedVsUnusedAssets,
            &ElasticWalker,
            &search_response(vec![bucket]),
        )
        .unwrap_err();

    assert!(matches!(err, AggregationError::TypeMismatch { .. }));
}

#[test]
fn numeric_key_is_used_when_key_as_string_missing() {
    let bucket = json!({
        "key": 1_704_067_200_000i64,
        "doc_count": 1,
        "totalUsed": { "value": 1.0 },
        "totalUnused": { "value": 0.0 }
    });
    let registry = AggregatorRegistry::with_defaults();
    let records = registry
        .aggregate(
            MetricKind::UsedVsUnusedAssets,
            &ElasticWalker,
            &search_response(vec![bucket]),
        )
        .unwrap();

    assert_eq!(records[0].timestamp, 1_704_067_200_000);
}

#[test]
fn bucket_without_any_key_is_malformed() {
    let bucket = json!({ "doc_count": 1, "totalUsed": { "value": 1.0 } });
    let registry = AggregatorRegistry::with_defaults();
    let err = registry
        .aggregate(
            MetricKind::UsedVsUnusedAssets,
            &ElasticWalker,
            &search_response(vec![bucket]),
        )
        .unwrap_err();

    assert!(matches!(err, AggregationError::MalformedResponse(_)));
}

#[test]
fn opensearch_walker_agrees_with_elastic_walker() {
    // Same wire body, two object models: records must be identical.
    let raw = search_response(vec![
        usage_bucket("2024-01-01", 80.0, 20.0),
        usage_bucket("2024-01-02", 0.0, 0.0),
        usage_bucket("2024-01-03", 3.0, 7.0),
    ]);
    let registry = AggregatorRegistry::with_defaults();

    let from_elastic = registry
        .aggregate(MetricKind::UsedVsUnusedAssets, &ElasticWalker, &raw)
        .unwrap();
    let body = SearchBody::from_value(&raw).unwrap();
    let from_opensearch = registry
        .aggregate(MetricKind::UsedVsUnusedAssets, &OpenSearchWalker, &body)
        .unwrap();

    assert_eq!(from_elastic, from_opensearch);
}

#[test]
fn opensearch_walker_handles_epoch_millis_keys() {
    let raw = search_response(vec![json!({
        "key": 1_704_067_200_000i64,
        "doc_count": 5,
        "totalUsed": { "value": 4.0 },
        "totalUnused": { "value": 1.0 }
    })]);
    let body = SearchBody::from_value(&raw).unwrap();
    let registry = AggregatorRegistry::with_defaults();
    let records = registry
        .aggregate(MetricKind::UsedVsUnusedAssets, &OpenSearchWalker, &body)
        .unwrap();

    assert_eq!(records[0].timestamp, 1_704_067_200_000);
    assert_eq!(records[0].field("usedPercentage"), 0.8);
}

#[test]
fn opensearch_walker_reports_absent_sub_aggregation_as_none() {
    let raw = search_response(vec![json!({
        "key_as_string": "2024-01-01",
        "doc_count": 0
    })]);
    let body = SearchBody::from_value(&raw).unwrap();
    let buckets = OpenSearchWalker.extract_buckets(&body, "timestamp").unwrap();

    let value = OpenSearchWalker
        .scalar_value(&buckets[0], "totalUsed")
        .unwrap();
    assert_eq!(value, None);
}

#[test]
fn walkers_expose_bucket_doc_count() {
    let raw = search_response(vec![usage_bucket("2024-01-01", 1.0, 2.0)]);

    let elastic_buckets = ElasticWalker.extract_buckets(&raw, "timestamp").unwrap();
    assert_eq!(ElasticWalker.doc_count(&elastic_buckets[0]).unwrap(), 10);

    let body = SearchBody::from_value(&raw).unwrap();
    let os_buckets = OpenSearchWalker.extract_buckets(&body, "timestamp").unwrap();
    assert_eq!(OpenSearchWalker.doc_count(&os_buckets[0]).unwrap(), 10);
}
