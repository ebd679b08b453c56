//! Domain error types

use crate::validation::{join_violations, Violation};
use thiserror::Error;

/// Errors raised by pure domain operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// A view was handed to the assembler without passing validation
    #[error("invalid view: {}", join_violations(.0))]
    InvalidView(Vec<Violation>),

    /// A stored or supplied string did not name a known enum value
    #[error("unknown {kind}: {value}")]
    UnknownVariant {
        /// Which enum was being parsed
        kind: &'static str,
        /// The offending input
        value: String,
    },

    /// Identifier could not be parsed
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}
