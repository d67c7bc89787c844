//! MCP server runners for apkx-mcp.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use apkx_core::control::ApkxControlPlane;
use axum::Router;
use axum::routing::get;
use rmcp::serve_server;
use rmcp::transport::io::stdio;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig,
    StreamableHttpService,
    session::local::LocalSessionManager,
};
use tracing::info;

use crate::ApkxMcp;

pub const DEFAULT_MCP_HTTP_ADDR: &str = "127.0.0.1:4030";

/// Configuration for the MCP streamable HTTP server.
#[derive(Debug, Clone)]
pub struct McpHttpServerConfig {
    pub addr: SocketAddr,
    pub stateful_mode: bool,
    pub sse_keep_alive: Option<Duration>,
}

impl McpHttpServerConfig {
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            stateful_mode: true,
            sse_keep_alive: Some(Duration::from_secs(15)),
        }
    }
}

/// Serves the MCP server over stdio.
///
/// # Errors
/// Returns any transport or server error.
pub async fn serve_stdio(
    control: ApkxControlPlane,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let service = ApkxMcp::new(control);
    let (stdin, stdout) = stdio();
    info!("apkx-mcp serving on stdio");
    let running = serve_server(service, (stdin, stdout)).await?;
    let _ = running.waiting().await?;
    Ok(())
}

/// Serves the MCP server using streamable HTTP transport.
///
/// Every HTTP session gets its own service, but all of them share the control
/// plane's session slot.
///
/// # Errors
/// Returns any listener or server error.
pub async fn serve_streamable_http(
    control: ApkxControlPlane,
    config: McpHttpServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let service: StreamableHttpService<ApkxMcp, LocalSessionManager> =
        StreamableHttpService::new(
            move || Ok(ApkxMcp::new(control.clone())),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig {
                sse_keep_alive: config.sse_keep_alive,
                stateful_mode: config.stateful_mode,
                ..Default::default()
            },
        );

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest_service("/mcp", service);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("apkx-mcp listening on http://{}/mcp", config.addr);
    axum::serve(listener, app).await?;
    Ok(())
}
