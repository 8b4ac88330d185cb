//! Deadline-bearing operation context.
//!
//! # Design
//! - A context carries an optional deadline, a cancellation signal and a small map of
//!   value-scoped data (trace id, command label).
//! - Attaching a timeout produces a replacement context: the deadline is the earlier of the
//!   existing one and `now + timeout`, while the values and the cancellation signal are
//!   carried over unchanged.
//! - Contexts are cheap to clone; clones share the cancellation signal.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Context threaded through a single command invocation.
#[derive(Clone)]
pub struct OperationContext {
    deadline: Option<Instant>,
    cancel: Arc<watch::Sender<bool>>,
    values: Arc<BTreeMap<String, String>>,
}

impl fmt::Debug for OperationContext {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("OperationContext")
            .field("deadline", &self.deadline)
            .field("cancelled", &self.is_cancelled())
            .field("values", &self.values)
            .finish()
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::background()
    }
}

impl OperationContext {
    /// Root context tied to the process lifetime: no deadline, not cancelled, no values.
    #[must_use]
    pub fn background() -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            deadline: None,
            cancel: Arc::new(cancel),
            values: Arc::new(BTreeMap::new()),
        }
    }

    /// Replacement context that also carries `key = value`.
    #[must_use]
    pub fn with_value(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut values = (*self.values).clone();
        values.insert(key.into(), value.into());
        Self {
            deadline: self.deadline,
            cancel: Arc::clone(&self.cancel),
            values: Arc::new(values),
        }
    }

    /// Replacement context whose deadline is at most `timeout` from now.
    ///
    /// A timeout too large to represent as an instant adds no deadline of its own.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now().checked_add(timeout);
        let deadline = match (self.deadline, candidate) {
            (Some(existing), Some(candidate)) => Some(existing.min(candidate)),
            (existing, None) => existing,
            (None, candidate) => candidate,
        };
        Self {
            deadline,
            cancel: Arc::clone(&self.cancel),
            values: Arc::clone(&self.values),
        }
    }

    /// Value stored under `key`.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Deadline, if one was attached.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline; `None` without a deadline.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Signal cancellation to this context and every clone or replacement of it.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// Whether cancellation has been signalled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Resolve once cancellation is signalled; pends forever otherwise.
    pub async fn cancelled(&self) {
        let mut receiver = self.cancel.subscribe();
        if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
