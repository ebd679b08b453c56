//! Single-shot completion calls bounded by context and timeout

use crate::context::ExtractionContext;
use crate::error::CompletionError;
use moneysaver_domain::CompletionProvider;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Wraps a provider with cancellation and a per-call timeout
///
/// Never retries; the engine owns the retry budget.
#[derive(Debug, Clone)]
pub struct CompletionClient<P> {
    provider: P,
    call_timeout: Duration,
}

impl<P: CompletionProvider> CompletionClient<P> {
    /// Create a client
    pub fn new(provider: P, call_timeout: Duration) -> Self {
        Self {
            provider,
            call_timeout,
        }
    }

    /// The wrapped provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Per-call timeout
    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Send one prompt in JSON mode and return the raw reply
    ///
    /// # Errors
    ///
    /// - [`CompletionError::Cancelled`] if `ctx` is already done, is cancelled
    ///   during the call, or its deadline elapses first
    /// - [`CompletionError::Timeout`] if the per-call timeout elapses first
    /// - [`CompletionError::Transport`] if the provider fails
    pub async fn complete(&self, ctx: &ExtractionContext, prompt: &str) -> Result<String, CompletionError> {
        if ctx.is_done() {
            return Err(CompletionError::Cancelled);
        }

        // Whichever of the context deadline and the call timeout comes first
        let (budget, bounded_by_ctx) = match ctx.remaining() {
            Some(left) if left < self.call_timeout => (left, true),
            _ => (self.call_timeout, false),
        };

        debug!("completion call, prompt {} chars, budget {:?}", prompt.len(), budget);

        tokio::select! {
            _ = ctx.cancelled() => Err(CompletionError::Cancelled),
            result = timeout(budget, self.provider.generate_structured(prompt)) => match result {
                Ok(Ok(text)) => Ok(text),
                Ok(Err(e)) => Err(CompletionError::Transport(e.to_string())),
                Err(_) if bounded_by_ctx => Err(CompletionError::Cancelled),
                Err(_) => Err(CompletionError::Timeout(budget)),
            },
        }
    }
}
