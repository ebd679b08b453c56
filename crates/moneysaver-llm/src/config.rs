//! Provider configuration

use crate::LlmError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which backend serves completions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI or any OpenAI-compatible endpoint
    #[default]
    OpenAi,
    /// Local Ollama instance
    Ollama,
    /// Fixed canned reply, no network
    Mock,
}

/// Configuration for the completion provider
///
/// Resolved once at startup and injected into the provider; nothing reads the
/// environment after that.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Backend to use
    pub provider: ProviderKind,

    /// Model identifier (e.g. "gpt-4o-mini", "llama3")
    pub model: String,

    /// Base URL; the provider default when unset
    pub endpoint: Option<String>,

    /// API key given inline (takes precedence over `api_key_env`)
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// HTTP client timeout (seconds)
    pub http_timeout_secs: u64,

    /// Reply served by the mock provider
    pub mock_response: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAi,
            model: "gpt-4o-mini".to_string(),
            endpoint: None,
            api_key: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            http_timeout_secs: 30,
            mock_response: None,
        }
    }
}

impl LlmConfig {
    /// HTTP client timeout as a Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Configured endpoint, or the chosen provider's default
    pub fn endpoint_or_default(&self) -> String {
        match (&self.endpoint, self.provider) {
            (Some(endpoint), _) => endpoint.clone(),
            (None, ProviderKind::Ollama) => crate::ollama::DEFAULT_ENDPOINT.to_string(),
            (None, _) => crate::openai::DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// The API key, inline first, then from the environment
    pub fn resolve_api_key(&self) -> Result<String, LlmError> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Ok(key.clone());
        }
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| LlmError::Config(format!("API key not set (expected ${})", self.api_key_env)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() && self.provider != ProviderKind::Mock {
            return Err("model must not be empty".to_string());
        }
        if self.http_timeout_secs == 0 {
            return Err("http_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(LlmConfig::default().validate().is_ok());
    }

    #[test]
    fn test_endpoint_defaults_per_provider() {
        let mut config = LlmConfig::default();
        assert_eq!(config.endpoint_or_default(), "https://api.openai.com/v1");

        config.provider = ProviderKind::Ollama;
        assert_eq!(config.endpoint_or_default(), "http://localhost:11434");

        config.endpoint = Some("http://gpu-box:8000/v1".to_string());
        assert_eq!(config.endpoint_or_default(), "http://gpu-box:8000/v1");
    }

    #[test]
    fn test_inline_api_key_wins() {
        let config = LlmConfig {
            api_key: Some("sk-inline".to_string()),
            api_key_env: "MONEYSAVER_TEST_UNSET_KEY".to_string(),
            ..LlmConfig::default()
        };
        assert_eq!(config.resolve_api_key().unwrap(), "sk-inline");
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let config = LlmConfig {
            api_key_env: "MONEYSAVER_TEST_DEFINITELY_UNSET".to_string(),
            ..LlmConfig::default()
        };
        assert!(matches!(config.resolve_api_key(), Err(LlmError::Config(_))));
    }

    #[test]
    fn test_parse_toml() {
        let config: LlmConfig = toml::from_str(
            r#"
            provider = "ollama"
            model = "llama3"
            http_timeout_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.provider, ProviderKind::Ollama);
        assert_eq!(config.model, "llama3");
        assert_eq!(config.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_zero_timeout_invalid() {
        let config = LlmConfig {
            http_timeout_secs: 0,
            ..LlmConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
