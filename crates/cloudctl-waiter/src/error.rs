//! Error types raised while waiting for remote operations.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Boxed error returned by status fetchers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Convenience alias for poller results.
pub type WaitResult<T> = Result<T, WaitError>;

/// Why a wait did not end in success.
#[derive(Debug, Error)]
pub enum WaitError {
    /// The status fetch itself failed; it is not retried.
    #[error("failed to fetch status of {target}: {source}")]
    Fetch {
        /// What was being waited on.
        target: String,
        /// Underlying fetch error.
        source: BoxError,
    },
    /// The remote reported a terminal failure state.
    #[error("{target} reached failure state {state}{}", remote_text(.message))]
    RemoteFailure {
        /// What was being waited on.
        target: String,
        /// Terminal state reported by the remote.
        state: String,
        /// Remote-supplied failure text, unmodified.
        message: Option<String>,
    },
    /// The deadline elapsed before a terminal state was observed.
    #[error(
        "timeout reached after {}s waiting for {target}{}; the operation may still complete",
        .limit.as_secs_f64(),
        last_seen(.last_state)
    )]
    Timeout {
        /// What was being waited on.
        target: String,
        /// Time allowed for the wait.
        limit: Duration,
        /// Number of fetches performed.
        attempts: u32,
        /// Last non-terminal state observed, if any fetch completed.
        last_state: Option<String>,
    },
    /// The operation context was cancelled.
    #[error("waiting for {target} was cancelled")]
    Cancelled {
        /// What was being waited on.
        target: String,
    },
    /// Writing a progress message to the output sink failed.
    #[error("failed to write progress output")]
    Progress {
        /// Underlying IO error.
        source: io::Error,
    },
}

fn remote_text(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|text| format!(": {text}"))
        .unwrap_or_default()
}

fn last_seen(state: &Option<String>) -> String {
    state
        .as_deref()
        .map(|state| format!(" (last state: {state})"))
        .unwrap_or_default()
}

impl WaitError {
    /// Whether this is a deadline expiry rather than a definite outcome.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
