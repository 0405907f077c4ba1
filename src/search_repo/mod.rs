// Search backend transport. Executes one fixed-shape date-histogram query
// per metric kind and returns the raw body; index schema and query tuning
// live upstream.

use std::time::Duration;

use serde_json::{Map, Value, json};
use tracing::instrument;

use crate::config::SearchConfig;
use crate::insight::MetricConfig;

pub struct SearchRepo {
    client: reqwest::Client,
    search_url: String,
}

impl SearchRepo {
    pub fn connect(config: &SearchConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        let search_url = format!(
            "{}/{}/_search",
            config.url.trim_end_matches('/'),
            config.index
        );
        Ok(Self { client, search_url })
    }

    /// Runs the histogram query for one metric kind over [from_ts, to_ts)
    /// and returns the raw response body.
    #[instrument(
        skip(self, metric),
        fields(repo = "search", operation = "fetch_histogram")
    )]
    pub async fn fetch_histogram(
        &self,
        metric: &MetricConfig,
        from_ts: i64,
        to_ts: i64,
    ) -> anyhow::Result<Value> {
        let body = histogram_request(metric, from_ts, to_ts);
        let response = self
            .client
            .post(&self.search_url)
            .json(&body)
            .send()
            .await?;
        anyhow::ensure!(
            response.status().is_success(),
            "search backend returned {} for {}",
            response.status(),
            self.search_url
        );
        Ok(response.json().await?)
    }
}

/// Daily date-histogram with one sum sub-aggregation per configured source
/// field, filtered to [from_ts, to_ts).
fn histogram_request(metric: &MetricConfig, from_ts: i64, to_ts: i64) -> Value {
    let mut subs = Map::new();
    for &(source, _) in metric.sub_aggregations {
        subs.insert(source.to_string(), json!({ "sum": { "field": source } }));
    }

    let mut histogram = Map::new();
    histogram.insert(
        "date_histogram".to_string(),
        json!({ "field": "timestamp", "calendar_interval": "1d", "format": "yyyy-MM-dd" }),
    );
    if !subs.is_empty() {
        histogram.insert("aggs".to_string(), Value::Object(subs));
    }

    let mut aggs = Map::new();
    aggs.insert(metric.histogram.to_string(), Value::Object(histogram));

    json!({
        "size": 0,
        "query": {
            "range": {
                "timestamp": { "gte": from_ts, "lt": to_ts, "format": "epoch_millis" }
            }
        },
        "aggs": aggs
    })
}
