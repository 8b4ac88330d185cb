use cloudctl_api_models::DatacenterProperties;
use cloudctl_waiter::OperationHandle;

use crate::cli::{DatacenterCreateArgs, DatacenterDeleteArgs, DatacenterIdArgs, DatacenterUpdateArgs};
use crate::client::{CliError, CliResult};
use crate::commands::{follow_request, require};
use crate::context::CommandConfig;
use crate::output::{render_list, render_one};

pub(crate) async fn handle_datacenter_list(cfg: &mut CommandConfig) -> CliResult<()> {
    let datacenters = cfg.datacenters()?.list().await?;
    let format = cfg.format();
    render_list(cfg.out(), &datacenters, format)
}

pub(crate) async fn handle_datacenter_get(
    cfg: &mut CommandConfig,
    args: DatacenterIdArgs,
) -> CliResult<()> {
    let id = require(cfg, args.datacenter_id, "datacenter-id")?;
    let datacenter = cfg.datacenters()?.get(&id).await?;
    let format = cfg.format();
    render_one(cfg.out(), &datacenter, format)
}

pub(crate) async fn handle_datacenter_create(
    cfg: &mut CommandConfig,
    args: DatacenterCreateArgs,
) -> CliResult<()> {
    let properties = DatacenterProperties {
        name: Some(require(cfg, args.name, "name")?),
        location: Some(require(cfg, args.location, "location")?),
        description: args.description,
    };
    let (datacenter, envelope) = cfg.datacenters()?.create(properties).await?;
    let format = cfg.format();
    render_one(cfg.out(), &datacenter, format)?;

    let handle = OperationHandle::from_envelope(&envelope);
    follow_request(cfg, &handle, args.wait.wait_for_request, args.wait.timeout).await
}

pub(crate) async fn handle_datacenter_update(
    cfg: &mut CommandConfig,
    args: DatacenterUpdateArgs,
) -> CliResult<()> {
    let id = require(cfg, args.datacenter_id, "datacenter-id")?;
    if args.name.is_none() && args.description.is_none() {
        return Err(CliError::validation(
            "nothing to update; pass --name and/or --description",
        ));
    }
    let properties = DatacenterProperties {
        name: args.name,
        location: None,
        description: args.description,
    };
    let (datacenter, envelope) = cfg.datacenters()?.update(&id, properties).await?;
    let format = cfg.format();
    render_one(cfg.out(), &datacenter, format)?;

    let handle = OperationHandle::from_envelope(&envelope);
    follow_request(cfg, &handle, args.wait.wait_for_request, args.wait.timeout).await
}

pub(crate) async fn handle_datacenter_delete(
    cfg: &mut CommandConfig,
    args: DatacenterDeleteArgs,
) -> CliResult<()> {
    let id = require(cfg, args.datacenter_id, "datacenter-id")?;
    let envelope = cfg.datacenters()?.delete(&id).await?;
    writeln!(cfg.out(), "Datacenter {id} deletion requested")?;

    let handle = OperationHandle::from_envelope(&envelope);
    follow_request(cfg, &handle, args.wait.wait_for_request, args.wait.timeout).await
}
