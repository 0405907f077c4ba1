// Normalize a raw search response JSON file and dump the records as JSON.
//
// Usage: cargo run --example dump_insights -- RESPONSE_FILE [KIND] [BACKEND]
//   KIND     default: used-vs-unused-assets
//   BACKEND  "elasticsearch" (default) or "opensearch"

use std::env;

use usage_insights::config::SearchBackend;
use usage_insights::insight::{AggregatorRegistry, normalize_response};
use usage_insights::models::MetricKind;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let Some(path) = args.get(1) else {
        anyhow::bail!("usage: dump_insights RESPONSE_FILE [KIND] [BACKEND]");
    };
    let kind: MetricKind = args
        .get(2)
        .map(String::as_str)
        .unwrap_or("used-vs-unused-assets")
        .parse()?;
    let backend = match args.get(3).map(String::as_str) {
        Some("opensearch") => SearchBackend::OpenSearch,
        _ => SearchBackend::Elasticsearch,
    };

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    let registry = AggregatorRegistry::with_defaults();
    let records = normalize_response(&registry, backend, kind, &raw)?;

    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
