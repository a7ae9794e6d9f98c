//! HTTP transport: `POST /mcp` carries one JSON-RPC message, `GET /health` reports status

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::protocol;
use crate::server::McpServer;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    server: String,
    version: String,
    tools: usize,
}

pub fn router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/mcp", post(rpc_handler))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

async fn rpc_handler(State(server): State<Arc<McpServer>>, body: String) -> Response {
    let response = match protocol::decode(&body) {
        Ok(request) => server.handle(request).await,
        Err(rejected) => Some(rejected),
    };
    match response {
        Some(response) => Json(response).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn health_check(State(server): State<Arc<McpServer>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        server: server.info().name.clone(),
        version: server.info().version.clone(),
        tools: server.dispatcher().registry().len(),
    })
}

/// Serve until `shutdown` resolves
pub async fn serve_http<F>(server: Arc<McpServer>, addr: SocketAddr, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Serving MCP over HTTP on http://{addr}/mcp");

    axum::serve(listener, router(server))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")
}
