//! HTTP transport for the MCP server using rmcp's StreamableHttpService.
//!
//! Routes:
//! - `POST /mcp`: MCP streamable HTTP, stateless (every request independent)
//! - `GET /health`: liveness probe, never touches the backend
//!
//! Usage: `trademark-mcp serve --http 0.0.0.0:8080`

use axum::routing::get;
use axum::{Json, Router};
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use serde::Serialize;

use super::server::TrademarkServer;

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    /// RFC 3339 UTC.
    pub timestamp: String,
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Build the axum router for `server`.
pub fn router(server: TrademarkServer) -> Router {
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig {
            stateful_mode: false,
            ..Default::default()
        },
    );

    Router::new()
        .route("/health", get(health))
        .nest_service("/mcp", service)
}

/// Start the MCP server over HTTP on the given address.
///
/// Runs until ctrl-c.
pub async fn run_http_server(
    server: TrademarkServer,
    addr: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("trademark MCP server listening on http://{}/mcp", addr);

    axum::serve(listener, router(server))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down HTTP server");
        })
        .await?;

    Ok(())
}
