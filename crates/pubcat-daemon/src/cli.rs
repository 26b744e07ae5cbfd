//! CLI argument parsing for the catalog daemon.
//!
//! CLI flags override all other config sources.

use clap::{Args, Parser, Subcommand};

use pubcat_types::Settings;

/// Publication catalog
///
/// Stores publications, mirrors them into a full-text index and serves a
/// small web UI.
#[derive(Parser, Debug)]
#[command(name = "pubcat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/pubcat/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Daemon commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Start(StartOverrides),

    /// Rebuild the search index from the record store
    Reindex {
        /// Stream records even when the index already exists
        #[arg(long)]
        force: bool,
    },

    /// Read the catalog without starting the server
    Query {
        #[command(subcommand)]
        command: QueryCommands,
    },

    /// Administrative commands
    Admin {
        /// Database path (default from config)
        #[arg(long)]
        db_path: Option<String>,

        #[command(subcommand)]
        command: AdminCommands,
    },
}

/// Flags accepted by `start`.
#[derive(Args, Debug, Clone, Default)]
pub struct StartOverrides {
    /// Override HTTP port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override database path
    #[arg(long)]
    pub db_path: Option<String>,

    /// Override search index root
    #[arg(long)]
    pub search_index_path: Option<String>,

    /// Override static UI directory
    #[arg(long)]
    pub static_dir: Option<String>,

    /// Serve without running the startup reindex
    #[arg(long)]
    pub skip_reindex: bool,

    /// Store the sample publication before the reindex
    #[arg(long)]
    pub seed_sample: bool,
}

impl StartOverrides {
    /// Apply the flags on top of loaded settings.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(port) = self.port {
            settings.http_port = port;
        }
        if let Some(db_path) = &self.db_path {
            settings.db_path = db_path.clone();
        }
        if let Some(path) = &self.search_index_path {
            settings.search_index_path = path.clone();
        }
        if let Some(dir) = &self.static_dir {
            settings.static_dir = dir.clone();
        }
        if self.seed_sample {
            settings.seed_sample = true;
        }
    }
}

/// Query subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum QueryCommands {
    /// Full-text search over title and text
    Search {
        /// Query text (empty matches everything)
        #[arg(default_value = "")]
        text: String,

        /// Maximum results
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// Publications by an author (exact name)
    Author {
        name: String,
    },

    /// Publications dated on or after a timestamp
    Since {
        /// RFC 3339 timestamp, e.g. 2024-01-01T00:00:00Z
        date: String,
    },
}

/// Admin subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum AdminCommands {
    /// Show record store and index statistics
    Stats,

    /// Trigger RocksDB compaction
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_start_with_port() {
        let cli = Cli::parse_from(["pubcat", "start", "-p", "9999"]);
        match cli.command {
            Commands::Start(overrides) => assert_eq!(overrides.port, Some(9999)),
            _ => panic!("Expected Start command"),
        }
    }

    #[test]
    fn test_cli_start_flags() {
        let cli = Cli::parse_from([
            "pubcat",
            "start",
            "--db-path",
            "/custom/db",
            "--static-dir",
            "/srv/public",
            "--skip-reindex",
            "--seed-sample",
        ]);
        match cli.command {
            Commands::Start(overrides) => {
                assert_eq!(overrides.db_path, Some("/custom/db".to_string()));
                assert_eq!(overrides.static_dir, Some("/srv/public".to_string()));
                assert!(overrides.skip_reindex);
                assert!(overrides.seed_sample);
            }
            _ => panic!("Expected Start command"),
        }
    }

    #[test]
    fn test_overrides_apply() {
        let overrides = StartOverrides {
            port: Some(8080),
            search_index_path: Some("/tmp/idx".into()),
            seed_sample: true,
            ..Default::default()
        };
        let mut settings = Settings::default();
        overrides.apply(&mut settings);

        assert_eq!(settings.http_port, 8080);
        assert_eq!(settings.search_index_path, "/tmp/idx");
        assert!(settings.seed_sample);
        assert_eq!(settings.static_dir, "public");
    }

    #[test]
    fn test_cli_with_config() {
        let cli = Cli::parse_from(["pubcat", "--config", "/path/to/config.toml", "start"]);
        assert_eq!(cli.config, Some("/path/to/config.toml".to_string()));
    }

    #[test]
    fn test_cli_with_log_level() {
        let cli = Cli::parse_from(["pubcat", "--log-level", "debug", "reindex"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_reindex_force() {
        let cli = Cli::parse_from(["pubcat", "reindex", "--force"]);
        assert!(matches!(cli.command, Commands::Reindex { force: true }));
    }

    #[test]
    fn test_cli_query_search() {
        let cli = Cli::parse_from(["pubcat", "query", "search", "rust", "-n", "5"]);
        match cli.command {
            Commands::Query {
                command: QueryCommands::Search { text, limit },
            } => {
                assert_eq!(text, "rust");
                assert_eq!(limit, 5);
            }
            _ => panic!("Expected Query Search command"),
        }
    }

    #[test]
    fn test_cli_query_author() {
        let cli = Cli::parse_from(["pubcat", "query", "author", "John Doe"]);
        match cli.command {
            Commands::Query {
                command: QueryCommands::Author { name },
            } => assert_eq!(name, "John Doe"),
            _ => panic!("Expected Query Author command"),
        }
    }

    #[test]
    fn test_cli_admin_stats() {
        let cli = Cli::parse_from(["pubcat", "admin", "stats"]);
        match cli.command {
            Commands::Admin { command, db_path } => {
                assert!(matches!(command, AdminCommands::Stats));
                assert!(db_path.is_none());
            }
            _ => panic!("Expected Admin command"),
        }
    }
}
