// Metric kind -> aggregation configuration. The table is built once at
// startup and passed explicitly; it is never mutated afterwards.

use std::collections::BTreeMap;

use super::normalize::{normalize, ratio};
use super::{AggregationError, BucketWalker};
use crate::models::{MetricKind, MetricRecord};

/// Derived-field formula, applied after all source fields are coalesced.
pub type DeriveFn = fn(&mut BTreeMap<String, f64>);

/// One kind's configuration: the histogram aggregation name, which
/// sub-aggregations feed which output fields, and any derived fields.
#[derive(Clone)]
pub struct MetricConfig {
    pub histogram: &'static str,
    /// (sub-aggregation name in the response, output field name)
    pub sub_aggregations: &'static [(&'static str, &'static str)],
    /// Output field fed from the bucket document count, if any.
    pub doc_count_field: Option<&'static str>,
    pub derive: Option<DeriveFn>,
}

pub struct AggregatorRegistry {
    table: BTreeMap<MetricKind, MetricConfig>,
}

impl AggregatorRegistry {
    /// Table covering every built-in metric kind.
    pub fn with_defaults() -> Self {
        let mut table = BTreeMap::new();
        table.insert(
            MetricKind::UsedVsUnusedAssets,
            MetricConfig {
                histogram: "timestamp",
                sub_aggregations: &[("totalUsed", "used"), ("totalUnused", "unused")],
                doc_count_field: None,
                derive: Some(derive_used_vs_unused as DeriveFn),
            },
        );
        table.insert(
            MetricKind::PageViews,
            MetricConfig {
                histogram: "timestamp",
                sub_aggregations: &[("totalPageViews", "pageViews")],
                doc_count_field: None,
                derive: None,
            },
        );
        table.insert(
            MetricKind::EntitiesWithDescription,
            MetricConfig {
                histogram: "timestamp",
                sub_aggregations: &[
                    ("completedDescription", "completedDescription"),
                    ("entityCount", "entityCount"),
                ],
                doc_count_field: None,
                derive: Some(derive_description_fraction as DeriveFn),
            },
        );
        table.insert(
            MetricKind::DailyActiveUsers,
            MetricConfig {
                histogram: "timestamp",
                sub_aggregations: &[],
                doc_count_field: Some("activeUsers"),
                derive: None,
            },
        );
        Self { table }
    }

    /// Registry from explicit entries (tests, partial deployments).
    pub fn from_entries(entries: impl IntoIterator<Item = (MetricKind, MetricConfig)>) -> Self {
        Self {
            table: entries.into_iter().collect(),
        }
    }

    /// Registered kinds, in table order.
    pub fn kinds(&self) -> impl Iterator<Item = MetricKind> + '_ {
        self.table.keys().copied()
    }

    pub fn config(&self, kind: MetricKind) -> Result<&MetricConfig, AggregationError> {
        self.table
            .get(&kind)
            .ok_or_else(|| AggregationError::UnknownMetricKind(kind.to_string()))
    }

    /// Normalizes `response` with the configuration registered for `kind`.
    pub fn aggregate<'r, W: BucketWalker<'r>>(
        &self,
        kind: MetricKind,
        walker: &W,
        response: &'r W::Response,
    ) -> Result<Vec<MetricRecord>, AggregationError> {
        normalize(walker, response, self.config(kind)?)
    }
}

fn derive_used_vs_unused(fields: &mut BTreeMap<String, f64>) {
    let used = fields.get("used").copied().unwrap_or(0.0);
    let unused = fields.get("unused").copied().unwrap_or(0.0);
    let total = used + unused;
    fields.insert("usedPercentage".to_string(), ratio(used, total));
    fields.insert("unusedPercentage".to_string(), ratio(unused, total));
}

fn derive_description_fraction(fields: &mut BTreeMap<String, f64>) {
    let completed = fields.get("completedDescription").copied().unwrap_or(0.0);
    let entity_count = fields.get("entityCount").copied().unwrap_or(0.0);
    fields.insert(
        "completedDescriptionFraction".to_string(),
        ratio(completed, entity_count),
    );
}
