//! MoneySaver server binary
//!
//! Starts the HTTP server that turns free-text money notes into stored
//! transactions.

use anyhow::Context;
use clap::Parser;
use moneysaver_llm::ProviderKind;
use moneysaver_server::{config::ServerConfig, start_server};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Reply served by `--mock` when the config sets none
const DEMO_MOCK_RESPONSE: &str =
    r#"{"transaction_type":"expense","amount":12,"item":{"name":"lunch","description":"demo reply","category":"food"}}"#;

/// MoneySaver - record transactions from free text with an LLM.
#[derive(Debug, Parser)]
#[command(name = "moneysaver")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "MONEYSAVER_CONFIG")]
    config: Option<PathBuf>,

    /// Use the mock LLM provider (no network, canned reply)
    #[arg(long)]
    mock: bool,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => {
            tracing::warn!("No config file specified, using defaults");
            ServerConfig::default()
        }
    };

    if cli.mock {
        config.llm.provider = ProviderKind::Mock;
    }
    if config.llm.provider == ProviderKind::Mock && config.llm.mock_response.is_none() {
        config.llm.mock_response = Some(DEMO_MOCK_RESPONSE.to_string());
    }
    if let Some(port) = cli.port {
        config.bind_port = port;
    }

    start_server(config).await.context("server failed")?;
    Ok(())
}
