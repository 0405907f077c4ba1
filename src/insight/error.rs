// Failure taxonomy for aggregation normalization. All variants abort the
// whole call; absent sub-aggregation values are not an error (they coalesce
// to 0.0 in the normalizer).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregationError {
    /// Response lacks the expected histogram/bucket structure.
    #[error("malformed aggregation response: {0}")]
    MalformedResponse(String),

    /// A sub-aggregation value is present but not numeric.
    #[error("sub-aggregation `{name}` has non-numeric value {value}")]
    TypeMismatch { name: String, value: String },

    /// A bucket key matched none of the accepted date formats.
    #[error("unparsable date bucket key `{0}`")]
    InvalidTimestamp(String),

    /// No aggregator configuration registered for the requested kind.
    #[error("unknown metric kind `{0}`")]
    UnknownMetricKind(String),
}
