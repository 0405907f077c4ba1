// Shared test helpers: raw aggregation response fixtures

use serde_json::{Value, json};

/// Wraps histogram buckets in a search response body, under the "timestamp"
/// date-histogram aggregation (the name every built-in kind uses).
pub fn search_response(buckets: Vec<Value>) -> Value {
    json!({
        "took": 3,
        "timed_out": false,
        "hits": { "total": { "value": 42, "relation": "eq" }, "hits": [] },
        "aggregations": { "timestamp": { "buckets": buckets } }
    })
}

/// A usage bucket with totalUsed/totalUnused sum sub-aggregations.
pub fn usage_bucket(key: &str, used: f64, unused: f64) -> Value {
    json!({
        "key_as_string": key,
        "doc_count": 10,
        "totalUsed": { "value": used },
        "totalUnused": { "value": unused }
    })
}
