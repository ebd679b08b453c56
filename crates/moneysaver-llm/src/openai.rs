//! OpenAI Provider Implementation
//!
//! Talks to the `/chat/completions` endpoint of OpenAI or any compatible
//! server. Structured generation requests the `json_object` response format.
//!
//! # Examples
//!
//! ```no_run
//! use moneysaver_llm::OpenAiProvider;
//!
//! let provider = OpenAiProvider::new("https://api.openai.com/v1", "gpt-4o-mini", "sk-...")
//!     .expect("client builds");
//! ```

use crate::LlmError;
use async_trait::async_trait;
use moneysaver_domain::CompletionProvider;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default OpenAI API base URL
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default timeout for LLM requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// OpenAI chat completions provider
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: API base URL (e.g., "https://api.openai.com/v1")
    /// - `model`: Model to use (e.g., "gpt-4o-mini")
    /// - `api_key`: Bearer token
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, LlmError> {
        Self::with_timeout(endpoint, model, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a provider with a custom HTTP timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            client,
        })
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }

    /// Send one user message and return the first choice's content
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The endpoint cannot be reached
    /// - The model is not available (HTTP 404)
    /// - The rate limit is hit (HTTP 429)
    /// - The response envelope is malformed or has no content
    async fn chat(&self, prompt: &str) -> Result<String, LlmError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            response_format: ResponseFormat { kind: "json_object" },
        };

        let response = self
            .client
            .post(self.url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }

        let body = response
            .text()
            .await
            .map_err(|e| LlmError::Communication(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(LlmError::Communication(format!("HTTP {}: {}", status, body)));
        }

        debug!("chat completion response: {} bytes", body.len());
        parse_completion(&body)
    }
}

/// Pull `choices[0].message.content` out of a chat completion body
fn parse_completion(body: &str) -> Result<String, LlmError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| LlmError::InvalidResponse("Response has no message content".to_string()))
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    type Error = LlmError;

    async fn generate_structured(&self, prompt: &str) -> Result<String, Self::Error> {
        self.chat(prompt).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_provider_creation() {
        let provider = OpenAiProvider::new("https://api.openai.com/v1/", "gpt-4o-mini", "sk-test").unwrap();
        assert_eq!(provider.url(), "https://api.openai.com/v1/chat/completions");
        assert_eq!(provider.model_name(), "gpt-4o-mini");
    }

    #[test]
    fn test_request_body_shape() {
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: "hello",
            }],
            response_format: ResponseFormat { kind: "json_object" },
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
        assert_eq!(json["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_parse_completion_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"amount\":12}"}},
                                   {"message":{"role":"assistant","content":"ignored"}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), r#"{"amount":12}"#);
    }

    #[test]
    fn test_parse_completion_without_choices() {
        let result = parse_completion(r#"{"choices":[]}"#);
        assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
    }

    #[test]
    fn test_parse_completion_garbage() {
        assert!(matches!(parse_completion("<html>"), Err(LlmError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_openai_unreachable_endpoint() {
        let provider = OpenAiProvider::with_timeout(
            "http://127.0.0.1:1",
            "gpt-4o-mini",
            "sk-test",
            Duration::from_secs(2),
        )
        .unwrap();

        let result = provider.generate_structured("test").await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }
}
