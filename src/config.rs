use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub search: SearchConfig,
    pub insights: InsightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

/// Which search backend the configured index lives on; selects the bucket
/// walker used for normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackend {
    Elasticsearch,
    OpenSearch,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the search backend, e.g. "http://localhost:9200".
    pub url: String,
    /// Index holding the periodic usage snapshots.
    pub index: String,
    pub backend: SearchBackend,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct InsightsConfig {
    /// How often the background worker refreshes the cached series.
    pub refresh_interval_secs: u64,
    /// Trailing window, in days, fetched on each refresh and used as the
    /// default query range.
    pub refresh_range_days: u32,
    /// Optional cron expression for the usage report log (e.g. "0 8 * * *" =
    /// 08:00 daily). Uses local time.
    #[serde(default)]
    pub report_schedule: Option<String>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.search.url.is_empty(), "search.url must be non-empty");
        anyhow::ensure!(
            !self.search.index.is_empty(),
            "search.index must be non-empty"
        );
        anyhow::ensure!(
            self.search.request_timeout_ms > 0,
            "search.request_timeout_ms must be > 0, got {}",
            self.search.request_timeout_ms
        );
        anyhow::ensure!(
            self.insights.refresh_interval_secs > 0,
            "insights.refresh_interval_secs must be > 0, got {}",
            self.insights.refresh_interval_secs
        );
        anyhow::ensure!(
            self.insights.refresh_range_days > 0,
            "insights.refresh_range_days must be > 0, got {}",
            self.insights.refresh_range_days
        );
        Ok(())
    }
}
