//! Wait-for-request and wait-for-state polling.
//!
//! # Design
//! - A disabled wait returns immediately without touching the network.
//! - The deadline is fixed once, before the first fetch, from the caller's timeout and the
//!   context's own deadline; it is never extended.
//! - Fetches run strictly one after another with a fixed sleep in between. Both the
//!   in-flight fetch and the sleep are raced against the deadline and cancellation.
//! - Fetch errors end the wait immediately; nothing is retried here.

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Instant, sleep, sleep_until};
use tracing::{debug, info};

use crate::context::OperationContext;
use crate::error::{BoxError, WaitError, WaitResult};
use crate::operation::OperationHandle;
use crate::terminal::{Observation, TerminalStates};

/// State string plus optional message, as reported by the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStatus {
    /// Reported state, e.g. `RUNNING` or `AVAILABLE`.
    pub state: String,
    /// Accompanying message, surfaced unmodified on failure.
    pub message: Option<String>,
}

impl RemoteStatus {
    /// Status without a message.
    #[must_use]
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            message: None,
        }
    }
}

/// Anything able to report the status of a request path.
#[async_trait]
pub trait RequestStatusSource: Send + Sync {
    /// Fetch the current status of the request at `path`.
    async fn request_status(&self, path: &str) -> Result<RemoteStatus, BoxError>;
}

/// How (and whether) to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSettings {
    /// Value of the command's wait flag.
    pub enabled: bool,
    /// Upper bound for the whole wait.
    pub timeout: Duration,
    /// Delay between two fetches.
    pub interval: Duration,
}

impl WaitSettings {
    /// Settings for an enabled or disabled wait.
    #[must_use]
    pub const fn new(enabled: bool, timeout: Duration, interval: Duration) -> Self {
        Self {
            enabled,
            timeout,
            interval,
        }
    }
}

/// How a successful wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The wait flag was not set; nothing was fetched.
    NotRequested,
    /// The operation carried no status path; nothing was fetched.
    NothingToTrack,
    /// A terminal success state was observed.
    Succeeded {
        /// Observed state.
        state: String,
    },
}

/// Summary of a successful wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport {
    /// How the wait ended.
    pub outcome: PollOutcome,
    /// Number of fetches performed.
    pub attempts: u32,
    /// Wall time spent waiting.
    pub elapsed: Duration,
}

impl PollReport {
    const fn skipped(outcome: PollOutcome) -> Self {
        Self {
            outcome,
            attempts: 0,
            elapsed: Duration::ZERO,
        }
    }
}

/// Poll `fetch` until it reports a terminal observation.
///
/// # Errors
///
/// Returns [`WaitError::Fetch`] when a fetch fails, [`WaitError::RemoteFailure`] for a
/// terminal failure, [`WaitError::Timeout`] when the deadline elapses first and
/// [`WaitError::Cancelled`] when the context is cancelled.
pub async fn poll_until<F, Fut, E>(
    ctx: &OperationContext,
    settings: &WaitSettings,
    target: &str,
    mut fetch: F,
) -> WaitResult<PollReport>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Observation, E>>,
    E: Into<BoxError>,
{
    if !settings.enabled {
        return Ok(PollReport::skipped(PollOutcome::NotRequested));
    }

    let started = Instant::now();
    let scoped = ctx.with_timeout(settings.timeout);
    let deadline = scoped.deadline();
    let limit = deadline.map_or(settings.timeout, |deadline| {
        deadline.saturating_duration_since(started)
    });
    let mut attempts: u32 = 0;
    let mut last_state: Option<String> = None;

    let timed_out = |attempts: u32, last_state: Option<String>| WaitError::Timeout {
        target: target.to_string(),
        limit,
        attempts,
        last_state,
    };
    let cancelled = || WaitError::Cancelled {
        target: target.to_string(),
    };

    loop {
        if scoped.is_cancelled() {
            return Err(cancelled());
        }
        let observation = tokio::select! {
            biased;
            () = scoped.cancelled() => return Err(cancelled()),
            () = deadline_reached(deadline) => return Err(timed_out(attempts, last_state)),
            result = fetch() => {
                attempts += 1;
                result.map_err(|source| WaitError::Fetch {
                    target: target.to_string(),
                    source: source.into(),
                })?
            }
        };

        match observation {
            Observation::Succeeded { state } => {
                let elapsed = started.elapsed();
                info!(target_label = target, attempts, ?elapsed, state = %state, "wait finished");
                return Ok(PollReport {
                    outcome: PollOutcome::Succeeded { state },
                    attempts,
                    elapsed,
                });
            }
            Observation::Failed { state, message } => {
                return Err(WaitError::RemoteFailure {
                    target: target.to_string(),
                    state,
                    message,
                });
            }
            Observation::Pending { state } => {
                debug!(target_label = target, attempt = attempts, state = %state, "still waiting");
                last_state = Some(state);
            }
        }

        tokio::select! {
            biased;
            () = scoped.cancelled() => return Err(cancelled()),
            () = deadline_reached(deadline) => return Err(timed_out(attempts, last_state)),
            () = sleep(settings.interval) => {}
        }
    }
}

/// Wait for the request behind `handle` to reach `DONE`.
///
/// Returns immediately when the wait is disabled or the handle has no status path.
///
/// # Errors
///
/// See [`poll_until`]; progress output failures are reported as [`WaitError::Progress`].
pub async fn wait_for_request<S>(
    ctx: &OperationContext,
    settings: &WaitSettings,
    handle: &OperationHandle,
    source: &S,
    progress: &mut (dyn Write + Send),
) -> WaitResult<PollReport>
where
    S: RequestStatusSource + ?Sized,
{
    if !settings.enabled {
        return Ok(PollReport::skipped(PollOutcome::NotRequested));
    }
    let Some(path) = handle.path() else {
        debug!("operation returned no request path; nothing to wait for");
        return Ok(PollReport::skipped(PollOutcome::NothingToTrack));
    };
    let id = handle.identifier().unwrap_or(path);
    let target = format!("request {id}");
    writeln!(progress, "Waiting for request: {id}").map_err(progress_error)?;

    let states = TerminalStates::request();
    let states = &states;
    let report = poll_until(ctx, settings, &target, move || async move {
        let status = source.request_status(path).await?;
        Ok::<_, BoxError>(states.classify(&status.state, status.message))
    })
    .await?;

    if let PollOutcome::Succeeded { state } = &report.outcome {
        writeln!(progress, "Request {id} finished: {state}").map_err(progress_error)?;
    }
    Ok(report)
}

/// Wait for a resource to reach one of the success states in `states`.
///
/// # Errors
///
/// See [`poll_until`]; progress output failures are reported as [`WaitError::Progress`].
pub async fn wait_for_state<F, Fut, E>(
    ctx: &OperationContext,
    settings: &WaitSettings,
    target: &str,
    states: &TerminalStates,
    mut fetch: F,
    progress: &mut (dyn Write + Send),
) -> WaitResult<PollReport>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<RemoteStatus, E>>,
    E: Into<BoxError>,
{
    if !settings.enabled {
        return Ok(PollReport::skipped(PollOutcome::NotRequested));
    }
    writeln!(progress, "Waiting for {target} to become ready").map_err(progress_error)?;

    let report = poll_until(ctx, settings, target, move || {
        let pending = fetch();
        async move {
            let status = pending.await.map_err(Into::<BoxError>::into)?;
            Ok::<_, BoxError>(states.classify(&status.state, status.message))
        }
    })
    .await?;

    if let PollOutcome::Succeeded { state } = &report.outcome {
        writeln!(progress, "{target} is {state}").map_err(progress_error)?;
    }
    Ok(report)
}

/// Wait for a resource to disappear. `fetch` yields `None` once the resource is gone;
/// a failure state from `states` ends the wait with an error.
///
/// # Errors
///
/// See [`poll_until`]; progress output failures are reported as [`WaitError::Progress`].
pub async fn wait_until_gone<F, Fut, E>(
    ctx: &OperationContext,
    settings: &WaitSettings,
    target: &str,
    states: &TerminalStates,
    mut fetch: F,
    progress: &mut (dyn Write + Send),
) -> WaitResult<PollReport>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<RemoteStatus>, E>>,
    E: Into<BoxError>,
{
    if !settings.enabled {
        return Ok(PollReport::skipped(PollOutcome::NotRequested));
    }
    writeln!(progress, "Waiting for {target} to be removed").map_err(progress_error)?;

    let report = poll_until(ctx, settings, target, move || {
        let pending = fetch();
        async move {
            let observation = match pending.await.map_err(Into::<BoxError>::into)? {
                None => Observation::Succeeded {
                    state: "DELETED".to_string(),
                },
                Some(status) => match states.classify(&status.state, status.message) {
                    failed @ Observation::Failed { .. } => failed,
                    Observation::Succeeded { state } | Observation::Pending { state } => {
                        Observation::Pending { state }
                    }
                },
            };
            Ok::<_, BoxError>(observation)
        }
    })
    .await?;

    writeln!(progress, "{target} removed").map_err(progress_error)?;
    Ok(report)
}

/// Completes at `deadline`; never completes without one.
async fn deadline_reached(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn progress_error(source: std::io::Error) -> WaitError {
    WaitError::Progress { source }
}
