//! Configuration file parsing for the server.
//!
//! Loads settings from TOML: bind address, database path, the `[llm]`
//! provider section and the `[extractor]` retry section.

use moneysaver_extractor::{ExtractorConfig, ExtractorError};
use moneysaver_llm::{LlmConfig, ProviderKind};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// A section failed its own validation
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The `[extractor]` section is unusable
    #[error(transparent)]
    Extractor(#[from] ExtractorError),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    pub bind_port: u16,

    /// SQLite database file, or ":memory:"
    pub database_path: String,

    /// Completion provider
    pub llm: LlmConfig,

    /// Retry budget and timeouts
    pub extractor: ExtractorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            database_path: "moneysaver.db".to_string(),
            llm: LlmConfig::default(),
            extractor: ExtractorConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.is_empty() {
            return Err(ConfigError::MissingField("database_path".to_string()));
        }
        self.llm.validate().map_err(ConfigError::Invalid)?;
        self.extractor.validate()?;
        Ok(())
    }

    /// Create a default configuration for testing
    ///
    /// In-memory database and the mock provider; nothing touches the network.
    pub fn default_test_config() -> Self {
        ServerConfig {
            database_path: ":memory:".to_string(),
            llm: LlmConfig {
                provider: ProviderKind::Mock,
                ..LlmConfig::default()
            },
            ..ServerConfig::default()
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default_test_config();
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.bind_port, 8080);
        assert_eq!(config.llm.provider, ProviderKind::Mock);
        assert_eq!(config.extractor.max_attempts, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bind_addr() {
        let config = ServerConfig::default_test_config();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            bind_address = "0.0.0.0"
            bind_port = 9000
            database_path = "/var/lib/moneysaver/data.db"

            [llm]
            provider = "ollama"
            model = "llama3"

            [extractor]
            max_attempts = 3
            request_timeout_secs = 20
        "#;

        let config = ServerConfig::from_toml(toml).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.bind_port, 9000);
        assert_eq!(config.database_path, "/var/lib/moneysaver/data.db");
        assert_eq!(config.llm.provider, ProviderKind::Ollama);
        assert_eq!(config.extractor.max_attempts, 3);
        assert_eq!(config.extractor.call_timeout_secs, 15);
        assert_eq!(config.extractor.request_timeout_secs, 20);
    }

    #[test]
    fn test_invalid_section_rejected() {
        let result = ServerConfig::from_toml("[extractor]\nmax_attempts = 0\n");
        assert!(matches!(result, Err(ConfigError::Extractor(ExtractorError::Config(_)))));
    }

    #[test]
    fn test_empty_database_path_rejected() {
        let result = ServerConfig::from_toml("database_path = \"\"\n");
        assert!(matches!(result, Err(ConfigError::MissingField(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moneysaver.toml");
        std::fs::write(&path, "bind_port = 3000\n[llm]\nprovider = \"mock\"\n").unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.bind_port, 3000);
        assert_eq!(config.llm.provider, ProviderKind::Mock);
    }
}
