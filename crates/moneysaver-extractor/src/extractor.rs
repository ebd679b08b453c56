//! Core Extractor implementation

use crate::client::CompletionClient;
use crate::config::ExtractorConfig;
use crate::context::ExtractionContext;
use crate::error::{AttemptFailure, ExtractorError};
use crate::parser::decode_response;
use crate::prompt::PromptContext;
use crate::schema::describe;
use crate::types::ExtractionReport;
use moneysaver_domain::{CompletionProvider, ExtractionTarget};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Result of one pass through compose, complete, decode, validate
type AttemptOutcome<T> = Result<T, AttemptFailure>;

/// The Extractor fills a typed target from free text, retrying with feedback
///
/// Each failed attempt's reason is shown to the model in the next prompt.
/// The target is written only once a decoded value passes validation.
pub struct Extractor<P> {
    client: CompletionClient<P>,
    config: ExtractorConfig,
}

impl<P: CompletionProvider> Extractor<P> {
    /// Create a new Extractor
    pub fn new(provider: P, config: ExtractorConfig) -> Self {
        Self {
            client: CompletionClient::new(provider, config.call_timeout()),
            config,
        }
    }

    /// The underlying provider
    pub fn provider(&self) -> &P {
        self.client.provider()
    }

    /// The active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Fill `target` from `user_prompt` within the configured attempt budget
    pub async fn extract<T: ExtractionTarget>(
        &self,
        ctx: &ExtractionContext,
        target: &mut T,
        user_prompt: &str,
    ) -> Result<ExtractionReport, ExtractorError> {
        self.extract_with_attempts(ctx, target, user_prompt, self.config.max_attempts)
            .await
    }

    /// Fill `target` from `user_prompt`, making at most `max_attempts` calls
    ///
    /// # Errors
    ///
    /// - [`ExtractorError::Cancelled`] if `ctx` is done before an attempt starts,
    ///   or once the attempts run out
    /// - [`ExtractorError::BudgetExhausted`] if no attempt produced a valid value
    /// - [`ExtractorError::Schema`] / [`ExtractorError::Prompt`] for programming
    ///   errors in the target type or template
    pub async fn extract_with_attempts<T: ExtractionTarget>(
        &self,
        ctx: &ExtractionContext,
        target: &mut T,
        user_prompt: &str,
        max_attempts: u32,
    ) -> Result<ExtractionReport, ExtractorError> {
        let start = Instant::now();
        let schema = describe::<T>()?;
        let guidance = target.guidance().to_string();
        let mut last_error = String::new();

        for attempt in 0..max_attempts {
            if ctx.is_done() {
                warn!("Extraction cancelled before attempt {}", attempt + 1);
                return Err(ExtractorError::Cancelled);
            }

            info!("[{}/{}] Extraction attempt: {}", attempt + 1, max_attempts, user_prompt);

            let prompt = PromptContext::new(&schema, user_prompt)
                .with_guidance(&guidance)
                .with_error(&last_error)
                .build()?;

            match self.attempt::<T>(ctx, &prompt).await {
                Ok(value) => {
                    *target = value;
                    let report = ExtractionReport {
                        attempts: attempt + 1,
                        model_name: self.provider().model_name().to_string(),
                        processing_time_ms: start.elapsed().as_millis() as u64,
                    };
                    info!(
                        "Extraction succeeded after {} attempt(s) in {} ms",
                        report.attempts, report.processing_time_ms
                    );
                    return Ok(report);
                }
                Err(failure) => {
                    warn!("Attempt {} failed: {}", attempt + 1, failure);
                    last_error = failure.to_string();
                }
            }
        }

        // The last attempt may have been cut short by the caller
        if ctx.is_done() {
            warn!("Extraction cancelled during attempt {}", max_attempts);
            return Err(ExtractorError::Cancelled);
        }

        warn!("Extraction gave up after {} attempts", max_attempts);
        Err(ExtractorError::BudgetExhausted {
            attempts: max_attempts,
            last_error,
        })
    }

    async fn attempt<T: ExtractionTarget>(&self, ctx: &ExtractionContext, prompt: &str) -> AttemptOutcome<T> {
        let reply = self.client.complete(ctx, prompt).await?;
        debug!("LLM response length: {} chars", reply.len());

        let value: T = decode_response(&reply)?;

        let violations = value.validate();
        if !violations.is_empty() {
            return Err(AttemptFailure::Validation(violations));
        }
        Ok(value)
    }
}
