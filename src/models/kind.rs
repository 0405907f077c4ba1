// Metric kind selector. Ids are the kebab-case strings used in route paths
// and serialized payloads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::insight::AggregationError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKind {
    UsedVsUnusedAssets,
    PageViews,
    EntitiesWithDescription,
    DailyActiveUsers,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::UsedVsUnusedAssets,
        MetricKind::PageViews,
        MetricKind::EntitiesWithDescription,
        MetricKind::DailyActiveUsers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::UsedVsUnusedAssets => "used-vs-unused-assets",
            MetricKind::PageViews => "page-views",
            MetricKind::EntitiesWithDescription => "entities-with-description",
            MetricKind::DailyActiveUsers => "daily-active-users",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AggregationError::UnknownMetricKind(s.to_string()))
    }
}
