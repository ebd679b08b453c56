//! Result metadata for extraction

use serde::{Deserialize, Serialize};

/// What a successful extraction cost
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Attempts used, the successful one included
    pub attempts: u32,

    /// Name of the LLM model used
    pub model_name: String,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}
