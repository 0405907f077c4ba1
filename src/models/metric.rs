// Canonical metric record: one row per time bucket, backend-independent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One normalized time bucket: epoch-millis timestamp plus named numeric
/// fields (used, unused, usedPercentage, ...). Field names are stable and
/// serialize flat, so consumers see `{"timestamp": ..., "used": ...}`.
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub timestamp: i64,
    #[serde(flatten)]
    pub fields: BTreeMap<String, f64>,
}

impl MetricRecord {
    /// Named field value; 0.0 when the field is not present.
    pub fn field(&self, name: &str) -> f64 {
        self.fields.get(name).copied().unwrap_or(0.0)
    }
}
