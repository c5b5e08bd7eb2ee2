//! websearch-mcp HTTP server entry point
//!
//! Serves the MCP Streamable HTTP endpoint on every path.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use websearch_mcp::core::config::{Config, LogFormat, SessionPolicy};
use websearch_mcp::http::{router, AppState};

/// MCP server exposing web search tools over Streamable HTTP
#[derive(Parser, Debug)]
#[command(name = "websearch-mcp")]
#[command(version)]
#[command(about = "Web search tools over MCP Streamable HTTP", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, env = "WEBSEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "WEBSEARCH_HOST")]
    host: Option<String>,

    /// Port to bind
    #[arg(long, env = "WEBSEARCH_PORT")]
    port: Option<u16>,

    /// Session routing policy: session-aware, session-aware-strict or stateless
    #[arg(long, env = "WEBSEARCH_SESSION_POLICY")]
    policy: Option<SessionPolicy>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(policy) = cli.policy {
        config.session.policy = policy;
    }
    config.validate()?;

    init_tracing(config.logging.format);

    tracing::info!("Starting websearch-mcp");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    config.log_config();

    if config.api_key().is_none() {
        tracing::warn!("SEARCH_API_KEY is not set; MCP requests will fail until it is configured");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Listening on {}", addr);
    tracing::info!("Service ready - Health check at http://{}/ping", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutting down");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "websearch_mcp=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
