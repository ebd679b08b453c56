//! MoneySaver Server
//!
//! HTTP front end for self-correcting transaction extraction. Wires the
//! configured completion provider, the extraction engine and the SQLite store
//! into one [`service::MoneySaverService`] and exposes it over axum.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod service;

use config::{ConfigError, ServerConfig};
use handlers::{create_router, AppState};
use moneysaver_extractor::{check_template, Extractor, ExtractorError, PROMPT_TEMPLATE};
use moneysaver_llm::{LlmError, Provider};
use moneysaver_store::{SqliteStore, StoreError};
use service::MoneySaverService;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The completion provider could not be built
    #[error("LLM provider error: {0}")]
    Llm(#[from] LlmError),

    /// The database could not be opened
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The prompt template is malformed
    #[error("Extractor error: {0}")]
    Extractor(#[from] ExtractorError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the application router from configuration
///
/// Checks the prompt template, builds the provider and opens the database.
pub fn build_app(config: &ServerConfig) -> Result<axum::Router, ServerError> {
    config.validate()?;
    check_template(PROMPT_TEMPLATE)?;

    let provider = Provider::from_config(&config.llm)?;
    let store = SqliteStore::new(&config.database_path)?;
    let extractor = Extractor::new(provider, config.extractor.clone());

    let state = AppState {
        service: Arc::new(MoneySaverService::new(extractor, store)),
    };

    Ok(create_router(state))
}

/// Start the MoneySaver HTTP server
///
/// Serves until Ctrl-C.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Starting MoneySaver server");
    info!("Bind address: {}", config.bind_addr());
    info!("Database: {}", config.database_path);
    info!(
        "LLM provider: {:?} ({}), max attempts {}, request timeout {}s",
        config.llm.provider,
        config.llm.model,
        config.extractor.max_attempts,
        config.extractor.request_timeout_secs
    );

    let app = build_app(&config)?;

    // Bind and serve
    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // Without a signal handler, run until the process is killed
        std::future::pending::<()>().await;
    }
}
