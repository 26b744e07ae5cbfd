//! HTTP server setup.

use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::info;

use crate::routes::{app_js, create_publication, health, search_publications};
use crate::state::AppState;

/// Build the router: API routes, the on-demand script, then static files.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        .route(
            "/api/publications",
            get(search_publications).post(create_publication),
        )
        .route("/app.js", get(app_js))
        .route("/health", get(health))
        .fallback_service(static_files)
        .layer(cors)
        .with_state(state)
}

/// Serve with graceful shutdown support.
///
/// Accepts a shutdown signal future that, when resolved, stops accepting
/// connections and lets in-flight requests finish.
pub async fn run_server_with_shutdown<F>(
    listener: TcpListener,
    state: AppState,
    shutdown_signal: F,
) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    let app = build_router(state);

    info!("HTTP server ready on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("HTTP server shutdown complete");
    Ok(())
}
