//! Request handlers.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::header::CONTENT_TYPE,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::{debug, info};

use pubcat_types::{NewPublication, Publication};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

/// `POST /api/publications`
pub async fn create_publication(
    State(state): State<AppState>,
    payload: Result<Json<NewPublication>, JsonRejection>,
) -> Result<Json<Publication>, ApiError> {
    let Json(draft) = payload.map_err(|e| ApiError::MalformedPayload(e.body_text()))?;
    info!(title = %draft.title, "Received publication");

    let catalog = state.catalog.clone();
    let publication = tokio::task::spawn_blocking(move || catalog.create(draft)).await??;
    Ok(Json(publication))
}

/// `GET /api/publications?search=`
pub async fn search_publications(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Publication>>, ApiError> {
    let catalog = state.catalog.clone();
    let results =
        tokio::task::spawn_blocking(move || catalog.search(params.search.as_deref())).await??;
    Ok(Json(results))
}

/// `GET /app.js`, read from disk on every request.
pub async fn app_js(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let path = state.static_dir.join("app.js");
    let body = tokio::fs::read(&path)
        .await
        .map_err(|e| ApiError::AssetNotFound(format!("{}: {}", path.display(), e)))?;
    debug!(bytes = body.len(), "Serving app.js");

    Ok(([(CONTENT_TYPE, "text/javascript")], body))
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}
