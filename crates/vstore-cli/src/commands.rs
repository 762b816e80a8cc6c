//! Command implementations.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use vstore_index::{
    Document, EvictionPolicy, FilterCriteria, FilterOptions, QueryParams, SnapshotStatus,
    StoreStats, VectorStorage, VectorStorageBuilder,
};
use vstore_storage::{RocksSnapshotStore, SnapshotStore};
use vstore_types::Settings;

/// Fallback variable for the API key when settings carry none
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Global flags applied on top of the loaded settings.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub db_path: Option<String>,
    pub log_level: Option<String>,
    pub max_size_mb: Option<f64>,
}

/// Load settings (defaults -> file -> env) and apply CLI flags last.
pub fn load_settings(config_path: Option<&str>, overrides: &Overrides) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;

    if let Some(db_path) = &overrides.db_path {
        settings.db_path = db_path.clone();
    }
    if let Some(log_level) = &overrides.log_level {
        settings.log_level = log_level.clone();
    }
    if let Some(max_size_mb) = overrides.max_size_mb {
        settings.max_size_in_mb = max_size_mb;
    }
    if settings.embedding.api_key.is_none() {
        settings.embedding.api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
    }

    settings
        .validate()
        .context("Invalid configuration after CLI overrides")?;
    Ok(settings)
}

/// Install the fmt subscriber; `RUST_LOG` wins over the configured level.
pub fn init_logging(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

fn open_snapshots(settings: &Settings) -> Result<RocksSnapshotStore> {
    let path = settings.expanded_db_path();
    std::fs::create_dir_all(&path)
        .with_context(|| format!("Failed to create database directory {:?}", path))?;
    RocksSnapshotStore::open(&path)
        .with_context(|| format!("Failed to open database at {:?}", path))
}

/// Open a RocksDB-backed store configured from `settings`.
pub fn open_storage(settings: &Settings) -> Result<VectorStorage<Value>> {
    let snapshots = open_snapshots(settings)?;
    VectorStorageBuilder::from_settings(settings)
        .snapshot_store(snapshots)
        .build()
        .with_context(|| {
            format!(
                "Failed to open vector storage (set embedding.api_key or {})",
                API_KEY_ENV
            )
        })
}

/// Parse a JSON filter criteria argument.
pub fn parse_criteria(raw: &str) -> Result<FilterCriteria> {
    serde_json::from_str(raw).with_context(|| format!("Invalid filter criteria: {}", raw))
}

/// Build filter options from optional include/exclude arguments.
pub fn parse_filter(include: Option<&str>, exclude: Option<&str>) -> Result<FilterOptions> {
    let mut options = FilterOptions::new();
    if let Some(raw) = include {
        options = options.include(parse_criteria(raw)?);
    }
    if let Some(raw) = exclude {
        options = options.exclude(parse_criteria(raw)?);
    }
    Ok(options)
}

fn print_json<S: Serialize>(value: &S) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to render output")?
    );
    Ok(())
}

fn report_snapshot(status: &SnapshotStatus) {
    if let SnapshotStatus::Failed(reason) = status {
        warn!(reason = %reason, "Changes were applied in memory but not persisted");
    }
}

#[derive(Serialize)]
struct AddReport<'a> {
    added: Vec<&'a str>,
    skipped: usize,
    evicted: &'a [String],
}

/// Embed and store `texts`, each with the same metadata.
pub async fn handle_add(settings: &Settings, texts: Vec<String>, metadata: &str) -> Result<()> {
    let metadata: Value = serde_json::from_str(metadata)
        .with_context(|| format!("Invalid metadata: {}", metadata))?;
    if texts.iter().any(|t| t.is_empty()) {
        bail!("Texts must not be empty");
    }

    let mut storage = open_storage(settings)?;
    let metadatas = vec![metadata; texts.len()];
    let outcome = storage
        .add_texts(texts, metadatas)
        .await
        .context("Insert failed")?;
    report_snapshot(&outcome.snapshot);

    info!(
        added = outcome.added.len(),
        skipped = outcome.skipped,
        "Add complete"
    );
    print_json(&AddReport {
        added: outcome.added.iter().map(|d| d.text.as_str()).collect(),
        skipped: outcome.skipped,
        evicted: &outcome.evicted,
    })
}

/// Arguments of the query command.
#[derive(Debug, Clone)]
pub struct QueryArgs {
    pub text: String,
    pub k: usize,
    pub include: Option<String>,
    pub exclude: Option<String>,
    pub vectors: bool,
}

/// Rank stored texts against a query and print the results.
pub async fn handle_query(settings: &Settings, args: QueryArgs) -> Result<()> {
    let filter = parse_filter(args.include.as_deref(), args.exclude.as_deref())?;
    let mut storage = open_storage(settings)?;

    let params = QueryParams::new(args.text)
        .with_k(args.k)
        .with_filter(filter)
        .include_vectors(args.vectors);
    let outcome = storage
        .similarity_search(params)
        .await
        .context("Query failed")?;
    report_snapshot(&outcome.snapshot);

    print_json(&outcome.results)
}

/// Statistics computed straight from the snapshot; no embedding is needed.
pub fn collect_stats(
    settings: &Settings,
    snapshots: &dyn SnapshotStore<Document<Value>>,
) -> Result<StoreStats> {
    let documents = snapshots.load_all().context("Failed to load snapshot")?;
    let policy = EvictionPolicy::<Value>::new(settings.max_size_in_mb);

    Ok(StoreStats {
        document_count: documents.len(),
        dimension: documents.iter().find_map(|d| d.dimension()),
        estimated_size_mb: policy.estimate_mb(&documents),
        max_size_in_mb: policy.max_size_in_mb(),
        total_hits: documents.iter().map(|d| d.hits).sum(),
    })
}

/// Print collection statistics.
pub fn show_stats(settings: &Settings) -> Result<()> {
    let snapshots = open_snapshots(settings)?;
    let stats = collect_stats(settings, &snapshots)?;
    print_json(&stats)
}

/// Print the effective configuration with the API key masked.
pub fn show_config(settings: &Settings) -> Result<()> {
    let mut shown = settings.clone();
    if shown.embedding.api_key.is_some() {
        shown.embedding.api_key = Some("***".to_string());
    }
    print_json(&shown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use vstore_types::TextFilter;

    #[test]
    fn test_parse_filter() {
        let options = parse_filter(
            Some(r#"{"text":["a","b"]}"#),
            Some(r#"{"metadata":{"flag":true}}"#),
        )
        .unwrap();

        assert_eq!(
            options.include.unwrap().text,
            Some(TextFilter::from(vec!["a", "b"]))
        );
        let exclude = options.exclude.unwrap();
        assert_eq!(exclude.metadata.unwrap().get("flag"), Some(&json!(true)));
    }

    #[test]
    fn test_parse_filter_empty() {
        assert!(parse_filter(None, None).unwrap().is_empty());
    }

    #[test]
    fn test_parse_filter_rejects_bad_json() {
        assert!(parse_filter(Some("{not json"), None).is_err());
    }

    #[test]
    fn test_collect_stats() {
        let temp = TempDir::new().unwrap();
        let settings = Settings {
            db_path: temp.path().to_string_lossy().to_string(),
            max_size_in_mb: 4.0,
            ..Default::default()
        };
        let snapshots = open_snapshots(&settings).unwrap();
        snapshots
            .replace_all(&[
                Document::with_embedding("a", json!({}), vec![1.0, 0.0, 0.0], 1).with_hits(2),
                Document::with_embedding("b", json!({}), vec![0.0, 1.0, 0.0], 2).with_hits(3),
            ])
            .unwrap();

        let stats = collect_stats(&settings, &snapshots).unwrap();
        assert_eq!(stats.document_count, 2);
        assert_eq!(stats.dimension, Some(3));
        assert_eq!(stats.total_hits, 5);
        assert_eq!(stats.max_size_in_mb, 4.0);
        assert!(stats.estimated_size_mb > 0.0);
    }

    #[test]
    fn test_open_storage_without_key_fails() {
        let temp = TempDir::new().unwrap();
        let settings = Settings {
            db_path: temp.path().to_string_lossy().to_string(),
            ..Default::default()
        };
        assert!(open_storage(&settings).is_err());
    }
}
