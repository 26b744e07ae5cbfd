//! HTTP service for the publication catalog.
//!
//! Provides:
//! - `POST /api/publications`: create a publication (store, then index)
//! - `GET /api/publications?search=`: ranked full-text search
//! - `GET /app.js`: UI script read from disk on every request
//! - `GET /health`: liveness probe
//! - Every other path: static files from the UI directory

pub mod catalog;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use catalog::CatalogService;
pub use error::ApiError;
pub use server::{build_router, run_server_with_shutdown};
pub use state::AppState;
