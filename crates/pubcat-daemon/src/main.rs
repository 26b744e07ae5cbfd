//! Publication catalog daemon
//!
//! Serves the publication API and UI, backed by an embedded record store
//! and search index.
//!
//! # Usage
//!
//! ```bash
//! pubcat start [--port PORT] [--db-path PATH] [--skip-reindex] [--seed-sample]
//! pubcat reindex [--force]
//! pubcat query search <text>
//! pubcat admin stats
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/pubcat/config.toml)
//! 3. Environment variables (PUBCAT_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use pubcat_daemon::{handle_admin, handle_query, handle_reindex, start_daemon, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start(overrides) => {
            start_daemon(cli.config.as_deref(), &overrides, cli.log_level.as_deref()).await?;
        }
        Commands::Reindex { force } => {
            handle_reindex(cli.config.as_deref(), force, cli.log_level.as_deref()).await?;
        }
        Commands::Query { command } => {
            handle_query(cli.config.as_deref(), command)?;
        }
        Commands::Admin { db_path, command } => {
            handle_admin(cli.config.as_deref(), db_path, command)?;
        }
    }

    Ok(())
}
