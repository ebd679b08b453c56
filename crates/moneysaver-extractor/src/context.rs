//! Per-request cancellation and deadline

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Cancellation scope for one extraction
///
/// Clones share the cancellation flag, so a handle kept by the caller can stop
/// an extraction running elsewhere. The deadline is fixed at construction.
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    deadline: Option<Instant>,
    cancel: Arc<watch::Sender<bool>>,
}

impl Default for ExtractionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionContext {
    /// A context with no deadline
    pub fn new() -> Self {
        Self {
            deadline: None,
            cancel: Arc::new(watch::channel(false).0),
        }
    }

    /// A context that expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A context that expires at `deadline`
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            ..Self::new()
        }
    }

    /// Cancel this context and every clone of it
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// Whether `cancel` was called
    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// The deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` when there is no deadline
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Cancelled, or past the deadline
    pub fn is_done(&self) -> bool {
        self.is_cancelled() || self.remaining().is_some_and(|left| left.is_zero())
    }

    /// Resolves once `cancel` is called
    ///
    /// Does not watch the deadline; callers bound their own waits with
    /// [`remaining`](Self::remaining).
    pub async fn cancelled(&self) {
        let mut rx = self.cancel.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}
