//! Command implementations for the catalog daemon.
//!
//! Handles:
//! - start: Load config, open both adapters, reindex, serve HTTP
//! - reindex: Run the reindex job offline
//! - query: Offline reads against the index and the record store
//! - admin: Store statistics and compaction

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use pubcat_indexing::{LoggingProgressCallback, ReindexJob, SyncConfig, SyncReport};
use pubcat_search::{SearchIndexConfig, TantivyBackend};
use pubcat_service::{run_server_with_shutdown, AppState, CatalogService};
use pubcat_storage::Storage;
use pubcat_types::{
    average_rank, by_author, sample_publication, since, Publication, RecordStore, ReindexPolicy,
    SearchBackend, Settings,
};

use crate::cli::{AdminCommands, QueryCommands, StartOverrides};

/// Install the global fmt subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

fn load_settings(config_path: Option<&str>, log_level: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(level) = log_level {
        settings.log_level = level.to_string();
    }
    Ok(settings)
}

fn open_storage(settings: &Settings) -> Result<Arc<Storage>> {
    let db_path = settings.expanded_db_path();
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("Failed to create database directory")?;
    }
    let storage = Storage::open(&db_path).context("Failed to open storage")?;
    Ok(Arc::new(storage))
}

fn open_search(settings: &Settings) -> Result<Arc<TantivyBackend>> {
    let root = settings.expanded_search_index_path();
    fs::create_dir_all(&root).context("Failed to create search index directory")?;
    let config = SearchIndexConfig::new(root)
        .with_index_name(settings.index_name.as_str())
        .with_memory_mb(settings.writer_memory_mb);
    Ok(Arc::new(TantivyBackend::new(config)))
}

/// Startup work that runs before the listener accepts requests.
///
/// Seeds the sample publication when enabled, logs the stored record count
/// and runs the reindex job. Every failure is logged; none aborts startup.
pub async fn prepare_catalog(
    settings: &Settings,
    store: Arc<dyn RecordStore>,
    search: Arc<dyn SearchBackend>,
    skip_reindex: bool,
) -> Option<SyncReport> {
    if settings.seed_sample {
        match sample_publication().into_publication() {
            Ok(sample) => match store.put(&sample) {
                Ok(()) => info!(id = %sample.id, "Stored sample publication"),
                Err(e) => warn!(error = %e, "Failed to store sample publication"),
            },
            Err(e) => warn!(error = %e, "Invalid sample publication"),
        }
    }

    match store.get_all() {
        Ok(all) => info!(count = all.len(), "All stored publications"),
        Err(e) => warn!(error = %e, "Failed to list stored publications"),
    }

    if skip_reindex {
        info!("Startup reindex skipped by flag");
        return None;
    }

    let job = ReindexJob::new(store, search, SyncConfig::from_settings(settings));
    match job.run_blocking(LoggingProgressCallback).await {
        Ok(report) => Some(report),
        Err(e) => {
            warn!(error = %e, "Startup reindex failed");
            None
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}

/// Start the catalog server.
///
/// 1. Load configuration (defaults -> file -> env -> CLI)
/// 2. Open the record store and the search backend
/// 3. Seed, then run the startup reindex
/// 4. Serve HTTP until SIGINT/SIGTERM, then flush the store
pub async fn start_daemon(
    config_path: Option<&str>,
    overrides: &StartOverrides,
    log_level_override: Option<&str>,
) -> Result<()> {
    let mut settings = load_settings(config_path, log_level_override)?;
    overrides.apply(&mut settings);
    settings.validate().context("Invalid configuration")?;

    init_logging(&settings.log_level)?;

    info!("Catalog daemon starting...");
    info!("Configuration:");
    info!("  Database path: {}", settings.db_path);
    info!("  Search index: {}/{}", settings.search_index_path, settings.index_name);
    info!("  Static dir: {}", settings.static_dir);
    info!("  HTTP address: {}", settings.http_addr());
    info!("  Reindex policy: {:?}", settings.reindex_policy);

    let storage = open_storage(&settings)?;
    let search = open_search(&settings)?;

    prepare_catalog(
        &settings,
        storage.clone(),
        search.clone(),
        overrides.skip_reindex,
    )
    .await;

    let catalog = CatalogService::new(storage.clone(), search.clone(), settings.search_limit);
    let state = AppState::new(catalog, &settings.static_dir);

    let listener = TcpListener::bind(settings.http_addr())
        .await
        .with_context(|| format!("Failed to bind {}", settings.http_addr()))?;

    let result = run_server_with_shutdown(listener, state, shutdown_signal()).await;

    if let Err(e) = storage.flush() {
        warn!(error = %e, "Failed to flush storage on shutdown");
    }
    drop(search);
    drop(storage);
    info!("Catalog daemon stopped");

    result.context("Server error")
}

/// Run the reindex job once and print its report.
pub async fn handle_reindex(
    config_path: Option<&str>,
    force: bool,
    log_level_override: Option<&str>,
) -> Result<()> {
    let mut settings = load_settings(config_path, log_level_override)?;
    if force {
        settings.reindex_policy = ReindexPolicy::Always;
    }
    init_logging(&settings.log_level)?;

    let storage = open_storage(&settings)?;
    let search = open_search(&settings)?;

    let job = ReindexJob::new(storage.clone(), search, SyncConfig::from_settings(&settings));
    let report = job
        .run_blocking(LoggingProgressCallback)
        .await
        .context("Reindex failed")?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Execute a query command against the configured catalog.
pub fn run_query(settings: &Settings, command: QueryCommands) -> Result<Vec<Publication>> {
    match command {
        QueryCommands::Search { text, limit } => {
            let search = open_search(settings)?;
            let hits = search
                .search(&text, limit)
                .context("Search failed")?;
            Ok(hits)
        }
        QueryCommands::Author { name } => {
            let all = open_storage(settings)?
                .get_all_publications()
                .context("Failed to read publications")?;
            Ok(by_author(&all, &name).into_iter().cloned().collect())
        }
        QueryCommands::Since { date } => {
            let cutoff = DateTime::parse_from_rfc3339(&date)
                .with_context(|| format!("Invalid RFC 3339 timestamp: {}", date))?
                .with_timezone(&Utc);
            let all = open_storage(settings)?
                .get_all_publications()
                .context("Failed to read publications")?;
            Ok(since(&all, cutoff).into_iter().cloned().collect())
        }
    }
}

/// Handle query commands.
pub fn handle_query(config_path: Option<&str>, command: QueryCommands) -> Result<()> {
    let settings = load_settings(config_path, None)?;
    let results = run_query(&settings, command)?;

    if results.is_empty() {
        println!("No publications found");
        return Ok(());
    }
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

/// Combined view over the record store and the search index.
#[derive(Debug)]
pub struct CatalogStats {
    pub record_count: u64,
    pub index_doc_count: u64,
    pub average_rank: Option<f64>,
    pub disk_usage_bytes: u64,
}

/// Gather statistics for `admin stats`.
pub fn collect_stats(settings: &Settings) -> Result<CatalogStats> {
    let storage = open_storage(settings)?;
    let stats = storage.get_stats().context("Failed to read storage stats")?;
    let all = storage
        .get_all_publications()
        .context("Failed to read publications")?;

    let search = open_search(settings)?;
    let index_doc_count = search.count().context("Failed to count index documents")?;

    Ok(CatalogStats {
        record_count: stats.publication_count,
        index_doc_count,
        average_rank: average_rank(&all),
        disk_usage_bytes: stats.disk_usage_bytes,
    })
}

/// Handle admin commands.
pub fn handle_admin(
    config_path: Option<&str>,
    db_path: Option<String>,
    command: AdminCommands,
) -> Result<()> {
    let mut settings = load_settings(config_path, None)?;
    if let Some(path) = db_path {
        settings.db_path = path;
    }

    match command {
        AdminCommands::Stats => {
            let stats = collect_stats(&settings)?;
            println!("Catalog Statistics");
            println!("==================");
            println!("Database:          {}", settings.db_path);
            println!("Stored records:    {}", stats.record_count);
            println!("Index documents:   {}", stats.index_doc_count);
            match stats.average_rank {
                Some(rank) => println!("Average rank:      {:.2}", rank),
                None => println!("Average rank:      n/a"),
            }
            println!("Disk usage:        {}", format_bytes(stats.disk_usage_bytes));
            if stats.index_doc_count < stats.record_count {
                println!();
                println!("Index is behind the store; run `pubcat reindex --force`.");
            }
        }
        AdminCommands::Compact => {
            let storage = open_storage(&settings)?;
            println!("Compacting {}...", settings.db_path);
            storage.compact().context("Compaction failed")?;
            println!("Compaction complete.");
        }
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pubcat_indexing::SyncPhase;
    use pubcat_types::NewPublication;
    use tempfile::TempDir;

    fn test_settings(dir: &TempDir) -> Settings {
        Settings {
            db_path: dir.path().join("db").to_string_lossy().to_string(),
            search_index_path: dir.path().join("search").to_string_lossy().to_string(),
            ..Default::default()
        }
    }

    fn stored(id: &str, title: &str, author: &str, year: i32, rank: f64) -> Publication {
        NewPublication::titled(title)
            .with_text(format!("{} text", title))
            .with_author(author)
            .with_rank(rank)
            .into_publication_at(
                id.to_string(),
                Utc.with_ymd_and_hms(year, 6, 1, 0, 0, 0).unwrap(),
            )
            .unwrap()
    }

    fn seed_store(settings: &Settings, records: &[Publication]) {
        let storage = open_storage(settings).unwrap();
        for record in records {
            storage.put_publication(record).unwrap();
        }
        storage.flush().unwrap();
    }

    #[tokio::test]
    async fn test_prepare_catalog_seeds_and_indexes() {
        let dir = TempDir::new().unwrap();
        let mut settings = test_settings(&dir);
        settings.seed_sample = true;

        let storage = open_storage(&settings).unwrap();
        let search = open_search(&settings).unwrap();

        let report = prepare_catalog(&settings, storage.clone(), search.clone(), false)
            .await
            .unwrap();

        assert_eq!(report.phase, SyncPhase::Done);
        assert!(report.index_created);
        assert_eq!(report.records_loaded, 1);
        assert_eq!(search.count().unwrap(), 1);

        let hits = search.search("Sample", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Sample Publication");
    }

    #[tokio::test]
    async fn test_prepare_catalog_skip_flag() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(&dir);
        let storage = open_storage(&settings).unwrap();
        let search = open_search(&settings).unwrap();

        let report = prepare_catalog(&settings, storage, search.clone(), true).await;
        assert!(report.is_none());
        assert!(!search.exists().unwrap());
    }

    #[tokio::test]
    async fn test_prepare_catalog_skips_existing_index() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(&dir);
        let storage = open_storage(&settings).unwrap();
        let search = open_search(&settings).unwrap();
        search.create().unwrap();
        storage
            .put_publication(&stored("01A", "Unindexed", "Ada", 2020, 1.0))
            .unwrap();

        let report = prepare_catalog(&settings, storage, search.clone(), false)
            .await
            .unwrap();
        assert!(report.skipped);
        assert_eq!(search.count().unwrap(), 0);
    }

    #[test]
    fn test_query_author_and_since() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(&dir);
        seed_store(
            &settings,
            &[
                stored("01A", "Old", "Ada", 2019, 1.0),
                stored("01B", "New", "Ada", 2023, 2.0),
                stored("01C", "Other", "Grace", 2024, 3.0),
            ],
        );

        let by_ada = run_query(
            &settings,
            QueryCommands::Author {
                name: "Ada".to_string(),
            },
        )
        .unwrap();
        assert_eq!(by_ada.len(), 2);

        let recent = run_query(
            &settings,
            QueryCommands::Since {
                date: "2023-01-01T00:00:00Z".to_string(),
            },
        )
        .unwrap();
        let ids: Vec<&str> = recent.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["01B", "01C"]);
    }

    #[test]
    fn test_query_since_rejects_bad_date() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(&dir);
        let result = run_query(
            &settings,
            QueryCommands::Since {
                date: "last tuesday".to_string(),
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_query_search_missing_index_is_empty() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(&dir);
        let hits = run_query(
            &settings,
            QueryCommands::Search {
                text: "anything".to_string(),
                limit: 10,
            },
        )
        .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_collect_stats() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(&dir);
        seed_store(
            &settings,
            &[
                stored("01A", "One", "Ada", 2020, 1.0),
                stored("01B", "Two", "Ada", 2021, 3.0),
            ],
        );

        let stats = collect_stats(&settings).unwrap();
        assert_eq!(stats.record_count, 2);
        assert_eq!(stats.index_doc_count, 0);
        assert_eq!(stats.average_rank, Some(2.0));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MB");
    }
}
