//! Daemon entry point for the apkx MCP server.
//!
//! Loads configuration from the command line and environment, installs logging,
//! and serves the MCP protocol over stdio or streamable HTTP.

mod config;
mod logging;

use apkx_core::control::ApkxControlPlane;
use apkx_core::engine::EngineCommands;
use apkx_mcp::server::{McpHttpServerConfig, serve_stdio, serve_streamable_http};
use tracing::info;

use crate::config::ApkxConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = ApkxConfig::from_args()?;
    logging::init(&config.log_file, &config.log_level)?;
    info!(
        scratch_dir = %config.scratch_dir.display(),
        log_file = %config.log_file.display(),
        "starting apkx-mcpd"
    );

    let engines = EngineCommands::new(config.jadx_path.clone(), config.apktool_path.clone());
    let control = ApkxControlPlane::with_engines(engines, config.scratch_dir.clone());

    if config.http {
        serve_streamable_http(control, McpHttpServerConfig::new(config.http_addr)).await
    } else {
        serve_stdio(control).await
    }
}
