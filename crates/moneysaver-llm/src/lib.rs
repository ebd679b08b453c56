//! MoneySaver LLM Provider Layer
//!
//! Pluggable LLM provider implementations of the `CompletionProvider` trait
//! from `moneysaver-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic scripted mock for testing
//! - `OpenAiProvider`: OpenAI-compatible chat completions API
//! - `OllamaProvider`: Local Ollama API integration
//! - `Provider`: Runtime-selected wrapper over the three, built from `LlmConfig`
//!
//! Every provider is single-shot. Retrying belongs to the extraction engine.
//!
//! # Examples
//!
//! ```
//! use moneysaver_llm::MockProvider;
//! use moneysaver_domain::CompletionProvider;
//!
//! # let rt = tokio::runtime::Runtime::new().unwrap();
//! # rt.block_on(async {
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate_structured("test prompt").await.unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! # });
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use moneysaver_domain::CompletionProvider;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub use config::{LlmConfig, ProviderKind};
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider could not be configured
    #[error("Configuration error: {0}")]
    Config(String),

}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock LLM provider for deterministic testing
///
/// Replies are served from a script (first in, first out); once the script is
/// empty the default response is returned. Every prompt is recorded so tests
/// can inspect what the engine sent.
///
/// # Examples
///
/// ```
/// use moneysaver_llm::MockProvider;
/// use moneysaver_domain::CompletionProvider;
///
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// # rt.block_on(async {
/// let provider = MockProvider::new("fallback");
/// provider.push_response("first");
/// provider.push_error("provider unavailable");
///
/// assert_eq!(provider.generate_structured("a").await.unwrap(), "first");
/// assert!(provider.generate_structured("b").await.is_err());
/// assert_eq!(provider.generate_structured("c").await.unwrap(), "fallback");
/// assert_eq!(provider.call_count(), 3);
/// assert_eq!(provider.prompts(), vec!["a", "b", "c"]);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    script: Arc<Mutex<VecDeque<Result<String, String>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response once the script runs out
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Create a provider that plays the given replies in order
    pub fn scripted<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::default();
        for response in responses {
            provider.push_response(response);
        }
        provider
    }

    /// Sleep this long before every reply
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a successful reply
    pub fn push_response(&self, response: impl Into<String>) {
        lock(&self.script).push_back(Ok(response.into()));
    }

    /// Queue a transport failure
    pub fn push_error(&self, message: impl Into<String>) {
        lock(&self.script).push_back(Err(message.into()));
    }

    /// Get the number of times the provider was called
    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    /// Every prompt received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    /// Forget recorded prompts
    pub fn reset_call_count(&self) {
        lock(&self.prompts).clear();
    }

    async fn reply(&self, prompt: &str) -> Result<String, LlmError> {
        lock(&self.prompts).push(prompt.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = lock(&self.script).pop_front();
        debug!("mock provider call {}", self.call_count());
        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(LlmError::Communication(message)),
            None => Ok(self.default_response.clone()),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    type Error = LlmError;

    async fn generate_structured(&self, prompt: &str) -> Result<String, Self::Error> {
        self.reply(prompt).await
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

/// A provider chosen at runtime from configuration
#[derive(Debug, Clone)]
pub enum Provider {
    /// Scripted mock
    Mock(MockProvider),
    /// OpenAI-compatible endpoint
    OpenAi(OpenAiProvider),
    /// Local Ollama instance
    Ollama(OllamaProvider),
}

impl Provider {
    /// Build the configured provider
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Config`] if the API key is required but missing, or
    /// if the HTTP client cannot be built.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        match config.provider {
            ProviderKind::Mock => Ok(Provider::Mock(MockProvider::new(
                config.mock_response.clone().unwrap_or_default(),
            ))),
            ProviderKind::OpenAi => {
                let api_key = config.resolve_api_key()?;
                let provider = OpenAiProvider::with_timeout(
                    config.endpoint_or_default(),
                    &config.model,
                    api_key,
                    config.http_timeout(),
                )?;
                Ok(Provider::OpenAi(provider))
            }
            ProviderKind::Ollama => Ok(Provider::Ollama(OllamaProvider::with_timeout(
                config.endpoint_or_default(),
                &config.model,
                config.http_timeout(),
            )?)),
        }
    }
}

#[async_trait]
impl CompletionProvider for Provider {
    type Error = LlmError;

    async fn generate_structured(&self, prompt: &str) -> Result<String, Self::Error> {
        match self {
            Provider::Mock(p) => p.generate_structured(prompt).await,
            Provider::OpenAi(p) => p.generate_structured(prompt).await,
            Provider::Ollama(p) => p.generate_structured(prompt).await,
        }
    }

    fn model_name(&self) -> &str {
        match self {
            Provider::Mock(p) => p.model_name(),
            Provider::OpenAi(p) => p.model_name(),
            Provider::Ollama(p) => p.model_name(),
        }
    }
}
