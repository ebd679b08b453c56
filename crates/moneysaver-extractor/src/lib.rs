//! MoneySaver Extractor
//!
//! Turns a free-text request into a validated, typed value using an LLM.
//!
//! # Overview
//!
//! LLM output is unreliable: it may miss fields, break the schema or pick
//! values outside an enum. The extractor runs a bounded retry loop. Each failed
//! attempt's reason goes into the "Error Scratch Pad" of the next prompt so the
//! model can correct itself.
//!
//! # Architecture
//!
//! ```text
//! prompt → compose → CompletionClient → decode → validate ─ ok ─→ target
//!             ↑                                     │
//!             └──────────── scratchpad ←── failure ─┘
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use moneysaver_domain::TransactionView;
//! use moneysaver_extractor::{ExtractionContext, Extractor, ExtractorConfig};
//! use moneysaver_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(
//!     r#"{"transaction_type":"expense","amount":12,"item":{"name":"lunch","description":"","category":"food"}}"#,
//! );
//! let config = ExtractorConfig::default();
//! let extractor = Extractor::new(llm, config.clone());
//!
//! let ctx = ExtractionContext::with_timeout(config.request_timeout());
//! let mut view = TransactionView::default();
//! let report = extractor.extract(&ctx, &mut view, "I spent $12 on lunch").await?;
//!
//! println!("amount {} after {} attempt(s)", view.amount, report.attempts);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod client;
mod config;
mod context;
mod error;
mod extractor;
mod parser;
mod prompt;
mod schema;
mod types;

#[cfg(test)]
mod tests;

pub use client::CompletionClient;
pub use config::ExtractorConfig;
pub use context::ExtractionContext;
pub use error::{CompletionError, ExtractorError};
pub use extractor::Extractor;
pub use prompt::{check_template, compose, PromptContext, PROMPT_TEMPLATE};
pub use schema::describe;
pub use types::ExtractionReport;
