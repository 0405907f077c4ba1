// Bucket walker for the Elasticsearch REST client, whose responses arrive as
// untyped JSON. Buckets live at aggregations.<histogram>.buckets; each
// sub-aggregation is an object whose numeric result sits under "value".

use serde_json::Value;

use super::{AggregationError, BucketWalker};

pub struct ElasticWalker;

impl<'r> BucketWalker<'r> for ElasticWalker {
    type Response = Value;
    type Bucket = &'r Value;

    fn extract_buckets(
        &self,
        response: &'r Value,
        histogram: &str,
    ) -> Result<Vec<&'r Value>, AggregationError> {
        let buckets = response
            .get("aggregations")
            .and_then(|aggs| aggs.get(histogram))
            .and_then(|hist| hist.get("buckets"))
            .and_then(Value::as_array)
            .ok_or_else(|| {
                AggregationError::MalformedResponse(format!(
                    "missing `aggregations.{histogram}.buckets`"
                ))
            })?;
        Ok(buckets.iter().collect())
    }

    fn key_as_string(&self, bucket: &&'r Value) -> Result<String, AggregationError> {
        if let Some(key) = bucket.get("key_as_string").and_then(Value::as_str) {
            return Ok(key.to_string());
        }
        // Date histograms always carry key_as_string; a numeric-only key
        // shows up when the histogram field is mapped as epoch millis.
        match bucket.get("key") {
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(AggregationError::MalformedResponse(
                "bucket without key".to_string(),
            )),
        }
    }

    fn scalar_value(
        &self,
        bucket: &&'r Value,
        name: &str,
    ) -> Result<Option<f64>, AggregationError> {
        let Some(sub) = bucket.get(name) else {
            return Ok(None);
        };
        if !sub.is_object() {
            return Err(AggregationError::TypeMismatch {
                name: name.to_string(),
                value: sub.to_string(),
            });
        }
        match sub.get("value") {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value.as_f64().map(Some).ok_or_else(|| {
                AggregationError::TypeMismatch {
                    name: name.to_string(),
                    value: value.to_string(),
                }
            }),
        }
    }

    fn doc_count(&self, bucket: &&'r Value) -> Result<u64, AggregationError> {
        bucket
            .get("doc_count")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                AggregationError::MalformedResponse("bucket without doc_count".to_string())
            })
    }
}
