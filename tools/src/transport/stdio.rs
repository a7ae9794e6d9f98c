//! Newline-delimited JSON-RPC over a byte stream pair
//!
//! Each request runs on its own task; a single writer owns the output
//! so frames never interleave.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::server::McpServer;

/// Serve stdin/stdout until EOF or `shutdown`
pub async fn serve_stdio<F>(server: Arc<McpServer>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    info!("Serving MCP over stdio");
    serve_lines(server, tokio::io::stdin(), tokio::io::stdout(), shutdown).await
}

/// Serve frames read from `reader`, answering on `writer`.
///
/// In-flight requests are drained before returning.
pub async fn serve_lines<R, W, F>(
    server: Arc<McpServer>,
    reader: R,
    writer: W,
    shutdown: F,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    F: Future<Output = ()>,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let write_frames = async move {
        let mut writer = writer;
        while let Some(frame) = rx.recv().await {
            writer
                .write_all(format!("{frame}\n").as_bytes())
                .await
                .context("Failed to write response stream")?;
            writer.flush().await.context("Failed to flush response stream")?;
        }
        Ok::<(), anyhow::Error>(())
    };

    let read_frames = async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        let mut inflight = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            while inflight.try_join_next().is_some() {}

            tokio::select! {
                () = &mut shutdown => {
                    info!("Shutdown requested, draining {} request(s)", inflight.len());
                    break;
                }
                read = reader.read_until(b'\n', &mut buf) => {
                    match read {
                        Ok(0) => {
                            info!("Input closed, draining {} request(s)", inflight.len());
                            break;
                        }
                        Ok(_) => {}
                        Err(e) => {
                            error!("Failed to read request stream: {e}");
                            break;
                        }
                    }
                    // Invalid UTF-8 degrades to a parse error for that frame only
                    let line = String::from_utf8_lossy(&buf).trim_end().to_string();
                    buf.clear();
                    if line.trim().is_empty() {
                        continue;
                    }
                    debug!("<- {line}");

                    let server = Arc::clone(&server);
                    let tx = tx.clone();
                    inflight.spawn(async move {
                        if let Some(frame) = server.handle_line(&line).await {
                            if tx.send(frame).is_err() {
                                warn!("Response dropped: writer closed");
                            }
                        }
                    });
                }
            }
        }

        while let Some(joined) = inflight.join_next().await {
            if let Err(e) = joined {
                warn!("Request task failed: {e}");
            }
        }
        // Closing the channel lets the writer finish
        drop(tx);
        Ok::<(), anyhow::Error>(())
    };

    tokio::try_join!(read_frames, write_frames)?;
    Ok(())
}
