//! Shared state handed to every request handler.

use std::path::PathBuf;
use std::sync::Arc;

use crate::catalog::CatalogService;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    /// Directory holding index.html, styles.css and app.js
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(catalog: CatalogService, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            static_dir: static_dir.into(),
        }
    }
}
