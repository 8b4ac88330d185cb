//! Span helpers for one command invocation.
//!
//! # Design
//! - Every invocation runs inside a `command` span carrying the command label, the trace
//!   identifier sent as `x-request-id` and the build SHA.
//! - The trace identifier is also kept in task-local storage; the CLI reads it from there
//!   when building the operation context whose values feed the API client headers.

use std::future::Future;
use std::sync::Arc;

use tracing::{Instrument, Span};

use crate::init::build_sha;

/// Span covering one command invocation.
#[must_use]
pub fn command_span(command: &str, trace_id: &str) -> Span {
    tracing::info_span!(
        "command",
        command = %command,
        trace_id = %trace_id,
        build_sha = %build_sha()
    )
}

/// Run `fut` inside a [`command_span`] with `trace_id` available via [`current_trace_id`].
pub async fn with_command_context<Fut, T>(
    command: &str,
    trace_id: impl Into<String>,
    fut: Fut,
) -> T
where
    Fut: Future<Output = T>,
{
    let trace_id: Arc<str> = Arc::from(trace_id.into());
    let span = command_span(command, &trace_id);
    ACTIVE_TRACE_ID.scope(trace_id, fut.instrument(span)).await
}

/// Trace identifier of the running command, if inside [`with_command_context`].
#[must_use]
pub fn current_trace_id() -> Option<String> {
    ACTIVE_TRACE_ID.try_with(|id| id.to_string()).ok()
}

tokio::task_local! {
    static ACTIVE_TRACE_ID: Arc<str>;
}
