//! Error types for the Extractor

use moneysaver_domain::{join_violations, Violation};
use std::time::Duration;
use thiserror::Error;

/// Errors returned to callers of the extraction engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractorError {
    /// The caller's context was cancelled or its deadline passed
    #[error("Extraction cancelled")]
    Cancelled,

    /// Every attempt failed; carries the last attempt's failure text
    #[error("Max attempts reached after {attempts} attempts: {last_error}")]
    BudgetExhausted {
        /// Attempts consumed
        attempts: u32,
        /// Scratchpad text of the final failed attempt
        last_error: String,
    },

    /// The target type could not be described as JSON
    #[error("Schema error: {0}")]
    Schema(String),

    /// The prompt template is malformed
    #[error("Prompt template error: {0}")]
    Prompt(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure of a single completion call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// The caller's context was cancelled, or its deadline elapsed mid-call
    #[error("completion cancelled")]
    Cancelled,

    /// The per-call timeout elapsed
    #[error("completion timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The provider reported an error
    #[error("{0}")]
    Transport(String),
}

/// Why one attempt of the retry loop failed
///
/// The `Display` output is exactly what the next attempt sees in its
/// scratchpad.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum AttemptFailure {
    #[error("completion failed: {0}")]
    Transport(#[from] CompletionError),

    #[error("failed to decode model response: {0}")]
    Decode(String),

    #[error("model validation failed: {}", join_violations(.0))]
    Validation(Vec<Violation>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_failure_joins_every_violation() {
        let failure = AttemptFailure::Validation(vec![
            Violation::new("amount", "amount should be greater than 0, extract from the prompt"),
            Violation::new("item", "item can not be null"),
        ]);
        assert_eq!(
            failure.to_string(),
            "model validation failed: amount should be greater than 0, extract from the prompt; item can not be null"
        );
    }

    #[test]
    fn test_transport_failure_wraps_completion_error() {
        let failure = AttemptFailure::from(CompletionError::Timeout(Duration::from_secs(15)));
        assert_eq!(failure.to_string(), "completion failed: completion timed out after 15s");
    }

    #[test]
    fn test_budget_exhausted_message() {
        let err = ExtractorError::BudgetExhausted {
            attempts: 5,
            last_error: "failed to decode model response: expected value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Max attempts reached after 5 attempts: failed to decode model response: expected value"
        );
    }
}
