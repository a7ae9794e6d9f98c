//! spartacus-mcp — Spartacus scaffolding tools over MCP
//!
//! Serves the built-in tool catalogue on stdio (default) or HTTP.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use spartacus_tools::config::{self, Transport};
use spartacus_tools::protocol::Implementation;
use spartacus_tools::transport::{self, http, stdio};
use spartacus_tools::{build_registry, Dispatcher, FileWriter, LocalFileWriter, McpServer};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load_config()?;
    spartacus_tools::logging::init(&config.logging);

    info!(
        "{} v{} starting...",
        config.server.name, config.server.version
    );

    let files: Arc<dyn FileWriter> =
        Arc::new(LocalFileWriter::new(&config.generation.workspace_root));
    let registry = build_registry(Arc::clone(&files)).context("Failed to register tools")?;
    info!("Registered {} built-in tools", registry.len());

    let server = Arc::new(McpServer::new(
        Implementation {
            name: config.server.name.clone(),
            version: config.server.version.clone(),
        },
        Dispatcher::new(Arc::new(registry)),
        files,
    ));

    match config.server.transport {
        Transport::Stdio => stdio::serve_stdio(server, transport::shutdown_signal()).await?,
        Transport::Http => {
            let addr = config.server.socket_addr()?;
            http::serve_http(server, addr, transport::shutdown_signal()).await?
        }
    }

    info!("{} shut down cleanly", config.server.name);
    Ok(())
}
