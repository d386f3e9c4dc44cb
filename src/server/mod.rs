//! # HTTP Server for Flyer Generation
//!
//! Exposes the flyer workflow as a JSON/binary API. Each uploaded
//! spreadsheet creates a workspace, addressed by id, that holds the
//! catalog, the selected template and the last rendered flyer.
//!
//! ## Usage
//!
//! ```bash
//! encarte serve --listen 0.0.0.0:8080
//!
//! curl -F file=@produtos.csv http://localhost:8080/api/workspaces
//! curl -X PUT -H 'content-type: application/json' \
//!      -d '{"template":"moderno"}' http://localhost:8080/api/workspaces/$ID/template
//! curl -H 'content-type: application/json' \
//!      -d '{"product_code":"1234","original_price":"14,90","promo_price":"9,99"}' \
//!      http://localhost:8080/api/workspaces/$ID/flyer
//! curl -OJ 'http://localhost:8080/api/workspaces/$ID/flyer?format=jpg'
//! ```

mod handlers;
mod state;

pub use state::{AppState, WorkspaceSession};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::error::{EncarteError, Result};

/// Build the API router around shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.server.max_upload_bytes;

    Router::new()
        .route("/api/templates", get(handlers::templates::list))
        .route("/api/csv-template", get(handlers::templates::csv_template))
        .route(
            "/api/workspaces",
            post(handlers::catalog::create).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/workspaces/:id/products", get(handlers::catalog::products))
        .route("/api/workspaces/:id/template", put(handlers::templates::select))
        .route(
            "/api/workspaces/:id/flyer",
            post(handlers::flyer::submit).get(handlers::flyer::download),
        )
        .route("/api/workspaces/:id/share", get(handlers::flyer::share))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use encarte::config::AppConfig;
///
/// # async fn example() -> Result<(), encarte::EncarteError> {
/// encarte::server::serve(AppConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: AppConfig) -> Result<()> {
    let listen_addr = config.server.listen_addr.clone();
    let state = Arc::new(AppState::new(config)?);

    tokio::spawn(cleanup_workspaces(state.clone()));

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .map_err(|e| EncarteError::Transport(format!("Failed to bind to {}: {}", listen_addr, e)))?;
    info!(addr = %listen_addr, "encarte HTTP server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| EncarteError::Transport(format!("Server error: {}", e)))?;

    Ok(())
}

/// Background task that drops idle workspaces and stale cached images.
async fn cleanup_workspaces(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(Duration::from_secs(60));

    loop {
        interval.tick().await;
        let now = Instant::now();
        let removed = state.remove_expired(now).await;
        if removed > 0 {
            let remaining = state.workspaces.read().await.len();
            info!(removed, remaining, "cleaned up expired workspaces");
        }
        let evicted = state.loader.remove_expired(now, state.workspace_ttl()).await;
        if evicted > 0 {
            info!(evicted, "evicted cached product images");
        }
    }
}
