// Shared normalization algorithm. Backend-specific extraction lives behind
// BucketWalker; everything here is pure computation over one borrowed
// response. A failure on any bucket aborts the whole call.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime};

use super::registry::MetricConfig;
use super::{AggregationError, BucketWalker};
use crate::models::MetricRecord;

/// Walks the configured histogram and emits one MetricRecord per bucket, in
/// bucket order. Absent sub-aggregation values coalesce to 0.0; derived
/// fields are computed after all source fields are in place.
pub fn normalize<'r, W: BucketWalker<'r>>(
    walker: &W,
    response: &'r W::Response,
    config: &MetricConfig,
) -> Result<Vec<MetricRecord>, AggregationError> {
    let buckets = walker.extract_buckets(response, config.histogram)?;
    let mut records = Vec::with_capacity(buckets.len());

    for bucket in &buckets {
        let key = walker.key_as_string(bucket)?;
        let timestamp = parse_to_epoch_millis(&key)?;

        let mut fields = BTreeMap::new();
        for &(source, field) in config.sub_aggregations {
            let value = walker.scalar_value(bucket, source)?.unwrap_or(0.0);
            fields.insert(field.to_string(), value);
        }
        if let Some(field) = config.doc_count_field {
            fields.insert(field.to_string(), walker.doc_count(bucket)? as f64);
        }
        if let Some(derive) = config.derive {
            derive(&mut fields);
        }

        records.push(MetricRecord { timestamp, fields });
    }

    Ok(records)
}

/// Parses a date-bucket key into epoch milliseconds. Accepted formats, in
/// order: integer epoch millis, RFC 3339 date-time, plain date (midnight
/// UTC). Anything else fails the call; defaulting would corrupt the series.
pub fn parse_to_epoch_millis(key: &str) -> Result<i64, AggregationError> {
    if let Ok(millis) = key.parse::<i64>() {
        return Ok(millis);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(key) {
        return Ok(datetime.timestamp_millis());
    }
    if let Ok(date) = NaiveDate::parse_from_str(key, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc().timestamp_millis());
    }
    Err(AggregationError::InvalidTimestamp(key.to_string()))
}

/// part / total with the zero-total policy: a zero-activity bucket reports
/// 0.0, not NaN or Infinity.
pub fn ratio(part: f64, total: f64) -> f64 {
    if total > 0.0 { part / total } else { 0.0 }
}
