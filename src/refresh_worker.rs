// Background worker: refresh the normalized series cache for every
// registered kind on an interval. The usage report log runs on a
// configurable cron schedule (local time).

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::config::SearchBackend;
use crate::insight::{AggregatorRegistry, normalize_response};
use crate::models::{MetricKind, MetricRecord};
use crate::search_repo::SearchRepo;

const MS_PER_DAY: i64 = 86_400_000;

/// In-memory cache of the latest normalized series per kind.
#[derive(Clone, Default)]
pub struct SeriesCache {
    inner: Arc<RwLock<HashMap<MetricKind, Vec<MetricRecord>>>>,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, kind: MetricKind, records: Vec<MetricRecord>) {
        self.inner.write().await.insert(kind, records);
    }

    pub async fn get(&self, kind: MetricKind) -> Option<Vec<MetricRecord>> {
        self.inner.read().await.get(&kind).cloned()
    }
}

/// Config for the refresh worker.
#[derive(Debug, Clone)]
pub struct RefreshWorkerConfig {
    pub refresh_interval_secs: u64,
    pub refresh_range_days: u32,
    /// Optional cron expression for the usage report log (e.g. "0 8 * * *" =
    /// 08:00 daily). Uses local time.
    pub report_schedule: Option<String>,
}

/// Registry, transport, and shared cache for the worker.
pub struct RefreshWorkerDeps {
    pub registry: Arc<AggregatorRegistry>,
    pub search_repo: Arc<SearchRepo>,
    pub cache: SeriesCache,
    pub backend: SearchBackend,
}

/// Spawns the refresh worker. Returns a join handle.
pub fn spawn(deps: RefreshWorkerDeps, config: RefreshWorkerConfig) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        run(deps, config).await;
    })
}

#[instrument(skip(deps, config), fields(interval_secs = config.refresh_interval_secs))]
async fn run(deps: RefreshWorkerDeps, config: RefreshWorkerConfig) {
    let mut refresh_interval =
        tokio::time::interval(Duration::from_secs(config.refresh_interval_secs));
    refresh_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut report_enabled = config.report_schedule.is_some();
    let (report_tx, mut report_rx) = tokio::sync::mpsc::channel::<()>(1);
    if report_enabled {
        tokio::spawn(report_scheduler(config.clone(), report_tx));
    }

    loop {
        tokio::select! {
            _ = refresh_interval.tick() => {
                refresh_all(&deps, config.refresh_range_days).await;
            }
            msg = report_rx.recv(), if report_enabled => {
                match msg {
                    Some(()) => log_usage_report(&deps.cache).await,
                    // Scheduler exited (e.g. invalid cron); stop polling the channel.
                    None => report_enabled = false,
                }
            }
        }
    }
}

/// Sends a message on `tx` at each report time. Uses local time for cron.
async fn report_scheduler(config: RefreshWorkerConfig, tx: tokio::sync::mpsc::Sender<()>) {
    let Some(ref cron_str) = config.report_schedule else {
        return;
    };
    let Ok(schedule) = cron::Schedule::from_str(cron_str) else {
        warn!(cron = %cron_str, "invalid report_schedule; usage report will not run");
        return;
    };
    loop {
        let now = chrono::Local::now();
        let Some(next) = schedule.after(&now).next() else {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            continue;
        };
        let delay = (next - now).to_std().unwrap_or(Duration::from_secs(1));
        tokio::time::sleep(delay).await;
        if tx.send(()).await.is_err() {
            break;
        }
    }
}

/// Fetches and normalizes every registered kind for the trailing window.
/// A kind that fails keeps its previous cached series.
pub async fn refresh_all(deps: &RefreshWorkerDeps, range_days: u32) {
    let to_ts = chrono::Utc::now().timestamp_millis();
    let from_ts = to_ts - (range_days as i64) * MS_PER_DAY;

    let mut refreshed: u32 = 0;
    for kind in deps.registry.kinds() {
        match refresh_one(deps, kind, from_ts, to_ts).await {
            Ok(count) => {
                refreshed += 1;
                tracing::debug!(kind = %kind, records = count, "series refreshed");
            }
            Err(e) => warn!(kind = %kind, error = %e, "series refresh failed"),
        }
    }
    if refreshed > 0 {
        info!(refreshed_kinds = refreshed, "insight cache refresh");
    }
}

async fn refresh_one(
    deps: &RefreshWorkerDeps,
    kind: MetricKind,
    from_ts: i64,
    to_ts: i64,
) -> anyhow::Result<usize> {
    let metric = deps.registry.config(kind)?;
    let raw = deps
        .search_repo
        .fetch_histogram(metric, from_ts, to_ts)
        .await?;
    let records = normalize_response(&deps.registry, deps.backend, kind, &raw)?;
    let count = records.len();
    deps.cache.put(kind, records).await;
    Ok(count)
}

async fn log_usage_report(cache: &SeriesCache) {
    let series = cache
        .get(MetricKind::UsedVsUnusedAssets)
        .await
        .unwrap_or_default();
    match summarize_latest(&series) {
        Some(line) => info!(report = %line, "usage report"),
        None => info!("usage report: no data yet"),
    }
}

/// Formats the most recent used/unused record for the report log.
pub fn summarize_latest(records: &[MetricRecord]) -> Option<String> {
    let last = records.last()?;
    Some(format!(
        "used {:.1}% / unused {:.1}% at {}",
        last.field("usedPercentage") * 100.0,
        last.field("unusedPercentage") * 100.0,
        last.timestamp
    ))
}
