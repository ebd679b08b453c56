//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::transaction::{Transaction, TransactionId};
use crate::user::{NewUser, User, UserId};
use crate::validation::Violation;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A value shape the extraction engine can ask a model to fill in
///
/// Implemented per view type (see [`crate::view`]). `Default` provides the
/// empty skeleton that describes the shape; serde provides decoding.
pub trait ExtractionTarget: Default + Serialize + DeserializeOwned + Send {
    /// Check decoded values against domain rules
    ///
    /// Returns every violated rule, not just the first, so one corrective
    /// prompt can address all of them. An empty list means valid.
    fn validate(&self) -> Vec<Violation>;

    /// Type-specific hint embedded in the prompt next to the schema
    fn guidance(&self) -> &str;
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (moneysaver-llm). A provider is a
/// single-shot transport: it never retries.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Error type for LLM operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Generate a completion with the provider's JSON output mode enabled
    async fn generate_structured(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Model identifier used for requests
    fn model_name(&self) -> &str;
}

/// Trait for storing users and transactions
///
/// Implemented by the infrastructure layer (moneysaver-store)
pub trait TransactionStore {
    /// Error type for store operations
    type Error;

    /// Persist a new user and return it with its assigned identifier
    fn create_user(&mut self, user: NewUser) -> Result<User, Self::Error>;

    /// Look a user up by unique user name
    fn find_user_by_name(&self, user_name: &str) -> Result<Option<User>, Self::Error>;

    /// Delete a user together with every transaction they own
    ///
    /// Returns `false` if no such user existed.
    fn delete_user(&mut self, id: UserId) -> Result<bool, Self::Error>;

    /// Persist an assembled transaction and its item
    fn create_transaction(&mut self, transaction: &Transaction) -> Result<TransactionId, Self::Error>;

    /// List a user's transactions, oldest first
    fn list_transactions(&self, user_id: UserId) -> Result<Vec<Transaction>, Self::Error>;
}
