mod config;
mod error;
mod server;

use std::sync::Arc;

use rmcp::{ServiceExt, transport::stdio};
use tracing::info;
use tracing_subscriber::EnvFilter;

use stackit_ai::{AiService, GeminiClient};

use config::Config;
use server::StackItServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout is reserved for MCP JSON-RPC
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting stackit MCP server");

    let config = Config::from_env()?;
    info!(
        base_url = %config.gemini.base_url,
        model = %config.gemini.model,
        timeout_ms = config.gemini.default_timeout.as_millis(),
        fallback_delay_ms = config.service.fallback_delay.as_millis(),
        "configuration loaded"
    );
    if config.gemini.has_api_key() {
        info!("gemini api key present");
    } else {
        info!("GEMINI_API_KEY not set, serving synthetic results only");
    }

    let client = GeminiClient::new(config.gemini).map_err(error::AppError::from)?;
    let service = AiService::new(Arc::new(client), config.service);

    let server = StackItServer::new(service);

    info!("MCP server ready, serving on stdio");
    let running = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!(error = %e, "MCP server error");
    })?;

    running.waiting().await?;
    info!("MCP server shut down");
    Ok(())
}
