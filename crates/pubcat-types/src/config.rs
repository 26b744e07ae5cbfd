//! Configuration loading for pubcat.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/pubcat/config.toml.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::CatalogError;

/// When the startup reindex runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReindexPolicy {
    /// Rebuild only when the search index does not exist yet (default)
    #[default]
    IfMissing,
    /// Rebuild on every start, overwriting documents by id
    Always,
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to RocksDB record store directory
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Root directory holding search indexes
    #[serde(default = "default_search_index_path")]
    pub search_index_path: String,

    /// Name of the search index under `search_index_path`
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// HTTP server host
    #[serde(default = "default_http_host")]
    pub http_host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Directory of static UI assets
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Records per bulk request during reindex
    #[serde(default = "default_reindex_batch_size")]
    pub reindex_batch_size: usize,

    #[serde(default)]
    pub reindex_policy: ReindexPolicy,

    /// Maximum hits returned by a search
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Tantivy writer heap in megabytes
    #[serde(default = "default_writer_memory_mb")]
    pub writer_memory_mb: usize,

    /// Store the sample publication on start
    #[serde(default)]
    pub seed_sample: bool,
}

fn default_db_path() -> String {
    ProjectDirs::from("", "", "pubcat")
        .map(|p| p.data_local_dir().join("db"))
        .unwrap_or_else(|| PathBuf::from("./data"))
        .to_string_lossy()
        .to_string()
}

fn default_search_index_path() -> String {
    ProjectDirs::from("", "", "pubcat")
        .map(|p| p.data_local_dir().join("search-index"))
        .unwrap_or_else(|| PathBuf::from("./search-index"))
        .to_string_lossy()
        .to_string()
}

fn default_index_name() -> String {
    "publications2".to_string()
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_reindex_batch_size() -> usize {
    100
}

fn default_search_limit() -> usize {
    1000
}

fn default_writer_memory_mb() -> usize {
    50
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            search_index_path: default_search_index_path(),
            index_name: default_index_name(),
            http_host: default_http_host(),
            http_port: default_http_port(),
            static_dir: default_static_dir(),
            log_level: default_log_level(),
            reindex_batch_size: default_reindex_batch_size(),
            reindex_policy: ReindexPolicy::default(),
            search_limit: default_search_limit(),
            writer_memory_mb: default_writer_memory_mb(),
            seed_sample: false,
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/pubcat/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (PUBCAT_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, CatalogError> {
        let config_dir = ProjectDirs::from("", "", "pubcat")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("db_path", default_db_path())
            .map_err(|e| CatalogError::Config(e.to_string()))?
            .set_default("search_index_path", default_search_index_path())
            .map_err(|e| CatalogError::Config(e.to_string()))?
            .set_default("index_name", default_index_name())
            .map_err(|e| CatalogError::Config(e.to_string()))?
            .set_default("http_host", default_http_host())
            .map_err(|e| CatalogError::Config(e.to_string()))?
            .set_default("http_port", default_http_port() as i64)
            .map_err(|e| CatalogError::Config(e.to_string()))?
            .set_default("static_dir", default_static_dir())
            .map_err(|e| CatalogError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| CatalogError::Config(e.to_string()))?
            .set_default("reindex_batch_size", default_reindex_batch_size() as i64)
            .map_err(|e| CatalogError::Config(e.to_string()))?
            .set_default("reindex_policy", "if_missing")
            .map_err(|e| CatalogError::Config(e.to_string()))?
            .set_default("search_limit", default_search_limit() as i64)
            .map_err(|e| CatalogError::Config(e.to_string()))?
            .set_default("writer_memory_mb", default_writer_memory_mb() as i64)
            .map_err(|e| CatalogError::Config(e.to_string()))?
            .set_default("seed_sample", false)
            .map_err(|e| CatalogError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Format: PUBCAT_DB_PATH, PUBCAT_HTTP_PORT, PUBCAT_REINDEX_POLICY, etc.
        // Keys are flat, so nested separators never apply.
        builder = builder.add_source(
            Environment::with_prefix("PUBCAT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| CatalogError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| CatalogError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the rest of the system cannot work with.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.reindex_batch_size == 0 {
            return Err(CatalogError::Config(
                "reindex_batch_size must be > 0".to_string(),
            ));
        }
        if self.search_limit == 0 {
            return Err(CatalogError::Config("search_limit must be > 0".to_string()));
        }
        if self.index_name.trim().is_empty() {
            return Err(CatalogError::Config("index_name must not be empty".to_string()));
        }
        // Tantivy refuses writer heaps below 15MB
        if self.writer_memory_mb < 15 {
            return Err(CatalogError::Config(format!(
                "writer_memory_mb must be >= 15, got {}",
                self.writer_memory_mb
            )));
        }
        Ok(())
    }

    /// Get the socket address for the HTTP server
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Expand ~ in db_path to actual home directory
    pub fn expanded_db_path(&self) -> PathBuf {
        expand_home(&self.db_path)
    }

    /// Expand ~ in search_index_path to actual home directory
    pub fn expanded_search_index_path(&self) -> PathBuf {
        expand_home(&self.search_index_path)
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}
