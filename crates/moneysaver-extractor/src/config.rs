//! Configuration for the Extractor

use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Attempts per extraction, counting transport and semantic failures alike
    pub max_attempts: u32,

    /// Maximum time for a single completion call (seconds)
    pub call_timeout_secs: u64,

    /// Deadline for a whole request, all attempts included (seconds)
    pub request_timeout_secs: u64,
}

impl ExtractorConfig {
    /// Get the per-call timeout as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Get the request deadline as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.max_attempts == 0 {
            return Err(ExtractorError::Config("max_attempts must be greater than 0".to_string()));
        }
        if self.call_timeout_secs == 0 {
            return Err(ExtractorError::Config("call_timeout_secs must be greater than 0".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ExtractorError::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            call_timeout_secs: 15,
            request_timeout_secs: 15,
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: fewer attempts, tighter timeouts
    pub fn aggressive() -> Self {
        Self {
            max_attempts: 3,
            call_timeout_secs: 10,
            request_timeout_secs: 10,
        }
    }

    /// Lenient preset: more attempts for slow or sloppy models
    pub fn lenient() -> Self {
        Self {
            max_attempts: 8,
            call_timeout_secs: 30,
            request_timeout_secs: 60,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        toml::from_str(toml_str).map_err(|e| ExtractorError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}
