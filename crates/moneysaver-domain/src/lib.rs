//! MoneySaver Domain Layer
//!
//! This crate contains the domain model shared by every other MoneySaver crate.
//! It keeps its dependencies minimal: identifiers, serde derives for the view
//! types, and the trait seams that infrastructure crates implement.
//!
//! ## Key Concepts
//!
//! - **Transaction**: A persisted expense or revenue record owned by a user
//! - **View**: The loosely-typed shape an LLM is asked to fill in
//! - **Violation**: One broken domain rule, phrased so a model can fix it
//! - **Extraction target**: Any view that can describe, guide and validate itself
//!
//! ## Architecture
//!
//! - Pure business logic only, no I/O
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod transaction;
pub mod user;
pub mod validation;
pub mod view;

// Re-exports for convenience
pub use error::DomainError;
pub use traits::{CompletionProvider, ExtractionTarget, TransactionStore};
pub use transaction::{ItemId, Transaction, TransactionId, TransactionItem, TransactionKind};
pub use user::{NewUser, Platform, Role, User, UserId};
pub use validation::{join_violations, Violation};
pub use view::{AssistantActionType, AssistantActionView, TransactionItemView, TransactionView};

/// Current wall-clock time as unix seconds
///
/// A clock set before the epoch yields `0` rather than an error.
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
