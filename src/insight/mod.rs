// Aggregation normalization: turns search-backend histogram responses into
// canonical MetricRecords. The walker contract is implemented once per
// backend; the normalizer and registry are backend-independent.

pub mod elastic;
mod error;
pub mod normalize;
pub mod opensearch;
pub mod registry;

use serde_json::Value;

use crate::config::SearchBackend;
use crate::models::{MetricKind, MetricRecord};

pub use elastic::ElasticWalker;
pub use error::AggregationError;
pub use normalize::{normalize, parse_to_epoch_millis};
pub use opensearch::OpenSearchWalker;
pub use registry::{AggregatorRegistry, MetricConfig};

/// Capability contract over one backend's aggregation object model.
/// `'r` is the lifetime of the borrowed raw response; buckets are views into
/// it and never outlive the normalization call. Implementations are purely
/// extractive: no I/O, no mutation.
pub trait BucketWalker<'r> {
    /// The backend's raw response type, owned by the caller.
    type Response: ?Sized;
    /// One time-partitioned group borrowed from the response.
    type Bucket;

    /// Ordered sequence of time buckets under the named histogram
    /// aggregation. Missing structure is a malformed response.
    fn extract_buckets(
        &self,
        response: &'r Self::Response,
        histogram: &str,
    ) -> Result<Vec<Self::Bucket>, AggregationError>;

    /// The backend's native date-bucket key, as a string amenable to
    /// `parse_to_epoch_millis`.
    fn key_as_string(&self, bucket: &Self::Bucket) -> Result<String, AggregationError>;

    /// The named sub-aggregation's numeric value. `None` means the
    /// sub-aggregation was not computed for this bucket (zero matching
    /// documents) and is a valid state; a present but non-numeric payload is
    /// a `TypeMismatch`.
    fn scalar_value(
        &self,
        bucket: &Self::Bucket,
        name: &str,
    ) -> Result<Option<f64>, AggregationError>;

    /// Number of documents that fell into this bucket.
    fn doc_count(&self, bucket: &Self::Bucket) -> Result<u64, AggregationError>;
}

/// Normalizes a raw JSON response with the walker matching the configured
/// backend. Used by the route layer and the refresh worker.
pub fn normalize_response(
    registry: &AggregatorRegistry,
    backend: SearchBackend,
    kind: MetricKind,
    raw: &Value,
) -> Result<Vec<MetricRecord>, AggregationError> {
    match backend {
        SearchBackend::Elasticsearch => registry.aggregate(kind, &ElasticWalker, raw),
        SearchBackend::OpenSearch => {
            let body = opensearch::SearchBody::from_value(raw)?;
            registry.aggregate(kind, &OpenSearchWalker, &body)
        }
    }
}
