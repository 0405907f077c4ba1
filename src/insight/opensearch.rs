// Bucket walker for the OpenSearch client, which deserializes the wire body
// into a typed model. Same wire format as Elasticsearch, different object
// model; the walker contract absorbs the difference.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use super::{AggregationError, BucketWalker};

/// Typed view of a search response body (hits are ignored; only the
/// aggregations section matters here).
#[derive(Debug, Clone, Deserialize)]
pub struct SearchBody {
    #[serde(default)]
    pub aggregations: BTreeMap<String, HistogramAggregation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistogramAggregation {
    #[serde(default)]
    pub buckets: Vec<HistogramBucket>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistogramBucket {
    #[serde(default)]
    pub key: Option<BucketKey>,
    #[serde(default)]
    pub key_as_string: Option<String>,
    #[serde(default)]
    pub doc_count: u64,
    /// Named sub-aggregations nested in this bucket.
    #[serde(flatten)]
    pub sub_aggregations: BTreeMap<String, MetricAggregation>,
}

/// A date-bucket key is epoch millis when the field is mapped numerically,
/// or a formatted date string otherwise.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BucketKey {
    Millis(i64),
    Date(String),
}

/// A scalar sub-aggregation result. `value` stays untyped so that a
/// present-but-non-numeric payload surfaces as TypeMismatch instead of a
/// deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricAggregation {
    #[serde(default)]
    pub value: Value,
}

impl SearchBody {
    /// Deserializes a raw response body; structural mismatch is a malformed
    /// response.
    pub fn from_value(raw: &Value) -> Result<Self, AggregationError> {
        SearchBody::deserialize(raw)
            .map_err(|e| AggregationError::MalformedResponse(e.to_string()))
    }
}

pub struct OpenSearchWalker;

impl<'r> BucketWalker<'r> for OpenSearchWalker {
    type Response = SearchBody;
    type Bucket = &'r HistogramBucket;

    fn extract_buckets(
        &self,
        response: &'r SearchBody,
        histogram: &str,
    ) -> Result<Vec<&'r HistogramBucket>, AggregationError> {
        let hist = response.aggregations.get(histogram).ok_or_else(|| {
            AggregationError::MalformedResponse(format!("missing `aggregations.{histogram}`"))
        })?;
        Ok(hist.buckets.iter().collect())
    }

    fn key_as_string(&self, bucket: &&'r HistogramBucket) -> Result<String, AggregationError> {
        if let Some(key) = &bucket.key_as_string {
            return Ok(key.clone());
        }
        match &bucket.key {
            Some(BucketKey::Millis(millis)) => Ok(millis.to_string()),
            Some(BucketKey::Date(date)) => Ok(date.clone()),
            None => Err(AggregationError::MalformedResponse(
                "bucket without key".to_string(),
            )),
        }
    }

    fn scalar_value(
        &self,
        bucket: &&'r HistogramBucket,
        name: &str,
    ) -> Result<Option<f64>, AggregationError> {
        let Some(sub) = bucket.sub_aggregations.get(name) else {
            return Ok(None);
        };
        match &sub.value {
            Value::Null => Ok(None),
            value => value.as_f64().map(Some).ok_or_else(|| {
                AggregationError::TypeMismatch {
                    name: name.to_string(),
                    value: value.to_string(),
                }
            }),
        }
    }

    fn doc_count(&self, bucket: &&'r HistogramBucket) -> Result<u64, AggregationError> {
        Ok(bucket.doc_count)
    }
}
