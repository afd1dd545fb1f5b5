//! HTTP server implementation using Axum.

use crate::handler::{
    handle_documents, handle_health, handle_index, handle_search, handle_status,
};
use axum::{routing::get, Router};
use sora_fts::SearchApp;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Application state shared across handlers.
pub struct AppState {
    pub app: SearchApp,
}

/// Build the router for `app`.
pub fn router(app: SearchApp) -> Router {
    let state = Arc::new(AppState { app });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/api/status", get(handle_status))
        .route("/api/search", get(handle_search))
        .route("/api/documents", get(handle_documents))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server.
///
/// Returns the actual address the server is bound to (useful when port=0).
pub async fn start_server(app: SearchApp, host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    let router = router(app);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Server listening on {}", actual_addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!("Server error: {}", e);
        }
    });

    Ok(actual_addr)
}
