use cloudctl_api_models::NatGatewayProperties;
use cloudctl_waiter::OperationHandle;

use crate::cli::{NatGatewayCreateArgs, NatGatewayDeleteArgs, NatGatewayIdArgs};
use crate::client::CliResult;
use crate::commands::{follow_request, require};
use crate::context::CommandConfig;
use crate::output::{render_list, render_one};

pub(crate) async fn handle_natgateway_list(
    cfg: &mut CommandConfig,
    datacenter_id: Option<String>,
) -> CliResult<()> {
    let datacenter_id = parent_datacenter(cfg, datacenter_id)?;
    let gateways = cfg.natgateways()?.list(&datacenter_id).await?;
    let format = cfg.format();
    render_list(cfg.out(), &gateways, format)
}

pub(crate) async fn handle_natgateway_get(
    cfg: &mut CommandConfig,
    datacenter_id: Option<String>,
    args: NatGatewayIdArgs,
) -> CliResult<()> {
    let datacenter_id = parent_datacenter(cfg, datacenter_id)?;
    let id = require(cfg, args.natgateway_id, "natgateway-id")?;
    let gateway = cfg.natgateways()?.get(&datacenter_id, &id).await?;
    let format = cfg.format();
    render_one(cfg.out(), &gateway, format)
}

pub(crate) async fn handle_natgateway_create(
    cfg: &mut CommandConfig,
    datacenter_id: Option<String>,
    args: NatGatewayCreateArgs,
) -> CliResult<()> {
    let datacenter_id = parent_datacenter(cfg, datacenter_id)?;
    let properties = NatGatewayProperties {
        name: Some(require(cfg, args.name, "name")?),
        public_ips: args.ips,
    };
    let (gateway, envelope) = cfg
        .natgateways()?
        .create(&datacenter_id, properties)
        .await?;
    let format = cfg.format();
    render_one(cfg.out(), &gateway, format)?;

    let handle = OperationHandle::from_envelope(&envelope);
    follow_request(cfg, &handle, args.wait.wait_for_request, args.wait.timeout).await
}

pub(crate) async fn handle_natgateway_delete(
    cfg: &mut CommandConfig,
    datacenter_id: Option<String>,
    args: NatGatewayDeleteArgs,
) -> CliResult<()> {
    let datacenter_id = parent_datacenter(cfg, datacenter_id)?;
    let id = require(cfg, args.natgateway_id, "natgateway-id")?;
    let envelope = cfg.natgateways()?.delete(&datacenter_id, &id).await?;
    writeln!(cfg.out(), "NAT gateway {id} deletion requested")?;

    let handle = OperationHandle::from_envelope(&envelope);
    follow_request(cfg, &handle, args.wait.wait_for_request, args.wait.timeout).await
}

fn parent_datacenter(cfg: &CommandConfig, parsed: Option<String>) -> CliResult<String> {
    let value =
        parsed.map_or_else(|| cfg.inherited_str("datacenter-id"), |value| Ok(Some(value)))?;
    require(cfg, value, "datacenter-id")
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use cloudctl_test_support::fixtures;
    use httpmock::prelude::*;
    use serde_json::json;

    use crate::testing::Harness;

    #[tokio::test]
    async fn create_sends_ip_list_and_waits() -> Result<()> {
        let harness = Harness::start().await;
        let status_url = harness.url("requests/r-5/status");
        let create = harness.server.mock(|when, then| {
            when.method(POST)
                .path(Harness::path("datacenters/dc-1/natgateways"))
                .json_body(json!({
                    "properties": {
                        "name": "egress",
                        "publicIps": ["203.0.113.10", "203.0.113.11"]
                    }
                }));
            then.status(202)
                .header("location", status_url.as_str())
                .json_body(fixtures::nat_gateway("dc-1", "ng-1", "egress", "BUSY"));
        });
        let status = harness.server.mock(|when, then| {
            when.method(GET).path(Harness::path("requests/r-5/status"));
            then.status(200)
                .json_body(fixtures::request_status("r-5", "DONE", None));
        });

        let code = harness
            .run(&[
                "natgateway",
                "--datacenter-id",
                "dc-1",
                "create",
                "--name",
                "egress",
                "--ips",
                "203.0.113.10,203.0.113.11",
                "-w",
            ])
            .await;

        assert_eq!(code, 0);
        create.assert();
        status.assert_calls(1);
        assert!(
            harness
                .out
                .lines()
                .contains(&"Request r-5 finished: DONE".to_string())
        );
        Ok(())
    }

    #[tokio::test]
    async fn list_requires_parent_datacenter() -> Result<()> {
        let harness = Harness::start().await;
        let mock = harness.server.mock(|when, then| {
            when.any_request();
            then.status(200);
        });

        assert_eq!(harness.run(&["natgateway", "list"]).await, 2);
        mock.assert_calls(0);
        Ok(())
    }

    #[tokio::test]
    async fn list_renders_json_output() -> Result<()> {
        let harness = Harness::start().await;
        let mock = harness.server.mock(|when, then| {
            when.method(GET).path(Harness::path("datacenters/dc-1/natgateways"));
            then.status(200).json_body(fixtures::collection(
                "collection",
                vec![fixtures::nat_gateway("dc-1", "ng-1", "egress", "AVAILABLE")],
            ));
        });

        let code = harness
            .run(&["natgateway", "list", "--datacenter-id", "dc-1", "-o", "json"])
            .await;

        assert_eq!(code, 0);
        mock.assert();
        let parsed: serde_json::Value = serde_json::from_str(&harness.out.contents())?;
        assert_eq!(parsed[0]["id"], "ng-1");
        assert_eq!(parsed[0]["properties"]["publicIps"][0], "203.0.113.10");
        Ok(())
    }

    #[tokio::test]
    async fn delete_and_wait_times_out() -> Result<()> {
        let harness = Harness::start().await;
        let status_url = harness.url("requests/r-6/status");
        harness.server.mock(|when, then| {
            when.method(DELETE)
                .path(Harness::path("datacenters/dc-1/natgateways/ng-1"));
            then.status(202).header("location", status_url.as_str());
        });
        harness.server.mock(|when, then| {
            when.method(GET).path(Harness::path("requests/r-6/status"));
            then.status(200)
                .json_body(fixtures::request_status("r-6", "QUEUED", None));
        });

        let code = harness
            .run(&[
                "natgateway",
                "delete",
                "--datacenter-id",
                "dc-1",
                "--natgateway-id",
                "ng-1",
                "--wait-for-request",
                "--timeout",
                "1",
            ])
            .await;

        assert_eq!(code, 4);
        assert_eq!(
            harness.out.lines(),
            vec!["NAT gateway ng-1 deletion requested", "Waiting for request: r-6"]
        );
        Ok(())
    }
}
