//! Publication catalog daemon library exports.
//!
//! This crate provides the `pubcat` binary.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (start, reindex, query, admin)

pub mod cli;
pub mod commands;

pub use cli::{AdminCommands, Cli, Commands, QueryCommands, StartOverrides};
pub use commands::{handle_admin, handle_query, handle_reindex, prepare_catalog, start_daemon};
