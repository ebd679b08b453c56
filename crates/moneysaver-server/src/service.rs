//! Request orchestration: user lookup, extraction, assembly, persistence.

use moneysaver_domain::{
    AssistantActionType, AssistantActionView, CompletionProvider, DomainError, NewUser, Transaction,
    TransactionStore, TransactionView, User,
};
use moneysaver_extractor::{ExtractionContext, Extractor, ExtractorError};
use moneysaver_store::StoreError;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Errors surfaced by the service layer
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request itself is unusable
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No user with this name
    #[error("Unknown user: {0}")]
    UnknownUser(String),

    /// The user exists but may not record transactions
    #[error("User may not record transactions: {0}")]
    Forbidden(String),

    /// A unique value is already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Extraction failed or was cancelled
    #[error(transparent)]
    Extraction(#[from] ExtractorError),

    /// A validated view could not be turned into a record
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Persistence failed
    #[error("Store error: {0}")]
    Store(String),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(what) => ServiceError::Conflict(what),
            StoreError::NotFound(what) => ServiceError::UnknownUser(what),
            other => ServiceError::Store(other.to_string()),
        }
    }
}

/// What a successful `add_transaction` produced
#[derive(Debug, Clone)]
pub struct RecordedTransaction {
    /// The persisted record
    pub transaction: Transaction,

    /// Attempts the extraction took
    pub attempts: u32,
}

/// The MoneySaver application service
///
/// Shared across requests behind an `Arc`. The store mutex is only held for
/// synchronous store calls, never across an `.await`.
pub struct MoneySaverService<P, S> {
    extractor: Extractor<P>,
    store: Mutex<S>,
    request_timeout: Duration,
}

impl<P, S> MoneySaverService<P, S>
where
    P: CompletionProvider,
    S: TransactionStore,
    ServiceError: From<S::Error>,
{
    /// Create a service; the request deadline comes from the extractor config
    pub fn new(extractor: Extractor<P>, store: S) -> Self {
        let request_timeout = extractor.config().request_timeout();
        Self {
            extractor,
            store: Mutex::new(store),
            request_timeout,
        }
    }

    fn store(&self) -> MutexGuard<'_, S> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn context(&self) -> ExtractionContext {
        ExtractionContext::with_timeout(self.request_timeout)
    }

    fn find_user(&self, user_name: &str) -> Result<User, ServiceError> {
        self.store()
            .find_user_by_name(user_name)?
            .ok_or_else(|| ServiceError::UnknownUser(user_name.to_string()))
    }

    /// Record a transaction described in free text
    ///
    /// Looks the user up, extracts a [`TransactionView`] within the request
    /// deadline, assembles the record and stores it.
    pub async fn add_transaction(&self, user_name: &str, prompt: &str) -> Result<RecordedTransaction, ServiceError> {
        if prompt.trim().is_empty() {
            return Err(ServiceError::InvalidRequest("prompt must not be empty".to_string()));
        }

        let user = self.find_user(user_name)?;
        if !user.can_record() {
            return Err(ServiceError::Forbidden(user_name.to_string()));
        }

        let ctx = self.context();
        let mut view = TransactionView::default();
        let report = match self.extractor.extract(&ctx, &mut view, prompt).await {
            Ok(report) => report,
            Err(e) => {
                warn!("Extraction for user '{}' failed: {}", user_name, e);
                return Err(e.into());
            }
        };

        let transaction = Transaction::assemble(user.id, &view)?;
        self.store().create_transaction(&transaction)?;

        info!(
            "Recorded {} of {} for user '{}' after {} attempt(s)",
            transaction.kind, transaction.amount, user_name, report.attempts
        );

        Ok(RecordedTransaction {
            transaction,
            attempts: report.attempts,
        })
    }

    /// Decide what a free-text request asks for
    pub async fn classify_action(&self, prompt: &str) -> Result<AssistantActionType, ServiceError> {
        if prompt.trim().is_empty() {
            return Err(ServiceError::InvalidRequest("prompt must not be empty".to_string()));
        }

        let ctx = self.context();
        let mut view = AssistantActionView::default();
        self.extractor.extract(&ctx, &mut view, prompt).await?;

        // The extractor only returns views that passed validation
        view.action().ok_or_else(|| {
            ServiceError::Domain(DomainError::UnknownVariant {
                kind: "action type",
                value: view.action_type.clone(),
            })
        })
    }

    /// Register a new user
    pub fn create_user(&self, user_name: &str, email: &str) -> Result<User, ServiceError> {
        if user_name.trim().is_empty() {
            return Err(ServiceError::InvalidRequest("userName must not be empty".to_string()));
        }
        if !email.contains('@') {
            return Err(ServiceError::InvalidRequest(format!("invalid email: '{}'", email)));
        }

        let user = self.store().create_user(NewUser::new(user_name, email))?;
        info!("Created user '{}'", user.user_name);
        Ok(user)
    }

    /// Every transaction a user owns, oldest first
    pub fn list_transactions(&self, user_name: &str) -> Result<Vec<Transaction>, ServiceError> {
        let user = self.find_user(user_name)?;
        Ok(self.store().list_transactions(user.id)?)
    }
}
