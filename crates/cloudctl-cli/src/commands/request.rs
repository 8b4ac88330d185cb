use cloudctl_waiter::OperationHandle;

use crate::cli::{RequestGetArgs, RequestWaitArgs};
use crate::client::CliResult;
use crate::commands::{follow_request, require};
use crate::context::CommandConfig;
use crate::output::{render_list, render_one};

pub(crate) async fn handle_request_list(cfg: &mut CommandConfig) -> CliResult<()> {
    let requests = cfg.requests()?.list().await?;
    let format = cfg.format();
    render_list(cfg.out(), &requests, format)
}

pub(crate) async fn handle_request_get(
    cfg: &mut CommandConfig,
    args: RequestGetArgs,
) -> CliResult<()> {
    let id = require(cfg, args.request_id, "request-id")?;
    let request = cfg.requests()?.get(&id).await?;
    let format = cfg.format();
    render_one(cfg.out(), &request, format)
}

/// Block on an existing request; waiting is implied by the command itself.
pub(crate) async fn handle_request_wait(
    cfg: &mut CommandConfig,
    args: RequestWaitArgs,
) -> CliResult<()> {
    let id = require(cfg, args.request_id, "request-id")?;
    let handle = OperationHandle::from_path(&format!("requests/{id}/status"));
    follow_request(cfg, &handle, true, args.timeout).await
}
