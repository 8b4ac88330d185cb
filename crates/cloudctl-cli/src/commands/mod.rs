//! Command handlers grouped by resource, plus the wait helpers they share.

pub(crate) mod datacenter;
pub(crate) mod k8s;
pub(crate) mod natgateway;
pub(crate) mod request;

use cloudctl_waiter::{OperationContext, OperationHandle, WaitSettings, wait_for_request};

use crate::client::{CliError, CliResult};
use crate::context::CommandConfig;

/// Unwrap a flag that pre-run validation already checked.
pub(crate) fn require<T>(cfg: &CommandConfig, value: Option<T>, flag: &str) -> CliResult<T> {
    value.ok_or_else(|| {
        CliError::validation(format!(
            "{}: required flag not set: --{flag}",
            cfg.path().label()
        ))
    })
}

/// Attach the wait deadline to the command context and return the scoped context.
pub(crate) fn scoped_context(cfg: &mut CommandConfig, settings: &WaitSettings) -> OperationContext {
    if settings.enabled {
        let scoped = cfg.context().with_timeout(settings.timeout);
        cfg.replace_context(scoped);
    }
    cfg.context().clone()
}

/// Follow the request a mutating call returned, when `--wait-for-request` was given.
pub(crate) async fn follow_request(
    cfg: &mut CommandConfig,
    handle: &OperationHandle,
    enabled: bool,
    timeout_secs: u64,
) -> CliResult<()> {
    let settings = cfg.wait_settings(enabled, timeout_secs);
    if !settings.enabled {
        return Ok(());
    }
    let ctx = scoped_context(cfg, &settings);
    let requests = cfg.requests()?;
    let report = wait_for_request(&ctx, &settings, handle, &requests, cfg.out()).await?;
    tracing::debug!(outcome = ?report.outcome, attempts = report.attempts, "request wait done");
    Ok(())
}
