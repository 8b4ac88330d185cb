//! Kubernetes cluster and node pool commands. These resources are tracked through their
//! own `metadata.state`, so waits poll the resource rather than a request status.

use cloudctl_api_models::{K8sClusterProperties, NodePoolProperties};
use cloudctl_waiter::{TerminalStates, wait_for_state, wait_until_gone};

use crate::cli::{
    ClusterCreateArgs, ClusterDeleteArgs, ClusterIdArgs, NodePoolCreateArgs, NodePoolDeleteArgs,
    NodePoolIdArgs,
};
use crate::client::CliResult;
use crate::commands::{require, scoped_context};
use crate::context::CommandConfig;
use crate::output::{render_list, render_one};

pub(crate) async fn handle_cluster_list(cfg: &mut CommandConfig) -> CliResult<()> {
    let clusters = cfg.k8s()?.list_clusters().await?;
    let format = cfg.format();
    render_list(cfg.out(), &clusters, format)
}

pub(crate) async fn handle_cluster_get(
    cfg: &mut CommandConfig,
    args: ClusterIdArgs,
) -> CliResult<()> {
    let id = require(cfg, args.cluster_id, "cluster-id")?;
    let cluster = cfg.k8s()?.get_cluster(&id).await?;
    let format = cfg.format();
    render_one(cfg.out(), &cluster, format)
}

pub(crate) async fn handle_cluster_create(
    cfg: &mut CommandConfig,
    args: ClusterCreateArgs,
) -> CliResult<()> {
    let properties = K8sClusterProperties {
        name: Some(require(cfg, args.name, "name")?),
        k8s_version: args.k8s_version,
    };
    let k8s = cfg.k8s()?;
    let (cluster, _) = k8s.create_cluster(properties).await?;
    let format = cfg.format();
    render_one(cfg.out(), &cluster, format)?;

    let settings = cfg.wait_settings(args.wait.wait_for_state, args.wait.timeout);
    let ctx = scoped_context(cfg, &settings);
    let target = format!("k8s cluster {}", cluster.id);
    let id = cluster.id.as_str();
    let k8s = &k8s;
    wait_for_state(
        &ctx,
        &settings,
        &target,
        &TerminalStates::active(),
        move || k8s.cluster_state(id),
        cfg.out(),
    )
    .await?;
    Ok(())
}

pub(crate) async fn handle_cluster_delete(
    cfg: &mut CommandConfig,
    args: ClusterDeleteArgs,
) -> CliResult<()> {
    let id = require(cfg, args.cluster_id, "cluster-id")?;
    let k8s = cfg.k8s()?;
    k8s.delete_cluster(&id).await?;
    writeln!(cfg.out(), "K8s cluster {id} deletion requested")?;

    let settings = cfg.wait_settings(args.wait.wait_for_state, args.wait.timeout);
    let ctx = scoped_context(cfg, &settings);
    let target = format!("k8s cluster {id}");
    let id = id.as_str();
    let k8s = &k8s;
    wait_until_gone(
        &ctx,
        &settings,
        &target,
        &TerminalStates::active(),
        move || k8s.find_cluster_state(id),
        cfg.out(),
    )
    .await?;
    Ok(())
}

pub(crate) async fn handle_nodepool_list(
    cfg: &mut CommandConfig,
    cluster_id: Option<String>,
) -> CliResult<()> {
    let cluster_id = parent_cluster(cfg, cluster_id)?;
    let nodepools = cfg.k8s()?.list_nodepools(&cluster_id).await?;
    let format = cfg.format();
    render_list(cfg.out(), &nodepools, format)
}

pub(crate) async fn handle_nodepool_get(
    cfg: &mut CommandConfig,
    cluster_id: Option<String>,
    args: NodePoolIdArgs,
) -> CliResult<()> {
    let cluster_id = parent_cluster(cfg, cluster_id)?;
    let id = require(cfg, args.nodepool_id, "nodepool-id")?;
    let nodepool = cfg.k8s()?.get_nodepool(&cluster_id, &id).await?;
    let format = cfg.format();
    render_one(cfg.out(), &nodepool, format)
}

pub(crate) async fn handle_nodepool_create(
    cfg: &mut CommandConfig,
    cluster_id: Option<String>,
    args: NodePoolCreateArgs,
) -> CliResult<()> {
    let cluster_id = parent_cluster(cfg, cluster_id)?;
    let properties = NodePoolProperties {
        name: Some(require(cfg, args.name, "name")?),
        datacenter_id: Some(require(cfg, args.datacenter_id, "datacenter-id")?),
        node_count: Some(require(cfg, args.node_count, "node-count")?),
        k8s_version: args.k8s_version,
    };
    let k8s = cfg.k8s()?;
    let (nodepool, _) = k8s.create_nodepool(&cluster_id, properties).await?;
    let format = cfg.format();
    render_one(cfg.out(), &nodepool, format)?;

    let settings = cfg.wait_settings(args.wait.wait_for_state, args.wait.timeout);
    let ctx = scoped_context(cfg, &settings);
    let target = format!("node pool {}", nodepool.id);
    let (cluster_id, id) = (cluster_id.as_str(), nodepool.id.as_str());
    let k8s = &k8s;
    wait_for_state(
        &ctx,
        &settings,
        &target,
        &TerminalStates::active(),
        move || k8s.nodepool_state(cluster_id, id),
        cfg.out(),
    )
    .await?;
    Ok(())
}

pub(crate) async fn handle_nodepool_delete(
    cfg: &mut CommandConfig,
    cluster_id: Option<String>,
    args: NodePoolDeleteArgs,
) -> CliResult<()> {
    let cluster_id = parent_cluster(cfg, cluster_id)?;
    let id = require(cfg, args.nodepool_id, "nodepool-id")?;
    let k8s = cfg.k8s()?;
    k8s.delete_nodepool(&cluster_id, &id).await?;
    writeln!(cfg.out(), "Node pool {id} deletion requested")?;

    let settings = cfg.wait_settings(args.wait.wait_for_state, args.wait.timeout);
    let ctx = scoped_context(cfg, &settings);
    let target = format!("node pool {id}");
    let (cluster_id, id) = (cluster_id.as_str(), id.as_str());
    let k8s = &k8s;
    wait_until_gone(
        &ctx,
        &settings,
        &target,
        &TerminalStates::active(),
        move || k8s.find_nodepool_state(cluster_id, id),
        cfg.out(),
    )
    .await?;
    Ok(())
}

/// `--cluster-id` is declared on `k8s nodepool` and inherited by its subcommands. The parsed
/// value is used when present; otherwise the flag store resolves it for the current command.
fn parent_cluster(cfg: &CommandConfig, parsed: Option<String>) -> CliResult<String> {
    let value =
        parsed.map_or_else(|| cfg.inherited_str("cluster-id"), |value| Ok(Some(value)))?;
    require(cfg, value, "cluster-id")
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use cloudctl_test_support::fixtures;
    use httpmock::prelude::*;
    use serde_json::json;

    use crate::testing::Harness;

    #[tokio::test]
    async fn cluster_create_waits_for_active_state() -> Result<()> {
        let harness = Harness::start().await;
        let create = harness.server.mock(|when, then| {
            when.method(POST)
                .path(Harness::path("k8s"))
                .json_body(json!({ "properties": { "name": "prod" } }));
            then.status(202)
                .json_body(fixtures::k8s_cluster("c-1", "prod", "DEPLOYING"));
        });
        let state = harness.server.mock(|when, then| {
            when.method(GET).path(Harness::path("k8s/c-1"));
            then.status(200)
                .json_body(fixtures::k8s_cluster("c-1", "prod", "ACTIVE"));
        });

        let code = harness
            .run(&["k8s", "cluster", "create", "--name", "prod", "-W", "-t", "5"])
            .await;

        assert_eq!(code, 0);
        create.assert();
        state.assert_calls(1);
        let lines = harness.out.lines();
        assert_eq!(lines[1], "c-1  prod  1.30.2   DEPLOYING");
        assert_eq!(lines[2], "Waiting for k8s cluster c-1 to become ready");
        assert_eq!(lines[3], "k8s cluster c-1 is ACTIVE");
        Ok(())
    }

    #[tokio::test]
    async fn cluster_delete_waits_until_not_found() -> Result<()> {
        let harness = Harness::start().await;
        let delete = harness.server.mock(|when, then| {
            when.method(DELETE).path(Harness::path("k8s/c-1"));
            then.status(202);
        });
        let gone = harness.server.mock(|when, then| {
            when.method(GET).path(Harness::path("k8s/c-1"));
            then.status(404)
                .json_body(fixtures::api_error(404, "309", "Resource does not exist"));
        });

        let code = harness
            .run(&["k8s", "cluster", "delete", "--cluster-id", "c-1", "--wait-for-state"])
            .await;

        assert_eq!(code, 0);
        delete.assert();
        gone.assert_calls(1);
        assert_eq!(
            harness.out.lines(),
            vec![
                "K8s cluster c-1 deletion requested",
                "Waiting for k8s cluster c-1 to be removed",
                "k8s cluster c-1 removed",
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn failed_cluster_state_is_a_failure() -> Result<()> {
        let harness = Harness::start().await;
        harness.server.mock(|when, then| {
            when.method(POST).path(Harness::path("k8s"));
            then.status(202)
                .json_body(fixtures::k8s_cluster("c-2", "prod", "DEPLOYING"));
        });
        let state = harness.server.mock(|when, then| {
            when.method(GET).path(Harness::path("k8s/c-2"));
            then.status(200)
                .json_body(fixtures::k8s_cluster("c-2", "prod", "FAILED"));
        });

        let code = harness
            .run(&["k8s", "cluster", "create", "--name", "prod", "-W"])
            .await;

        assert_eq!(code, 3);
        state.assert_calls(1);
        Ok(())
    }

    #[tokio::test]
    async fn nodepool_list_uses_parent_cluster_flag() -> Result<()> {
        let harness = Harness::start().await;
        let mock = harness.server.mock(|when, then| {
            when.method(GET).path(Harness::path("k8s/c-1/nodepools"));
            then.status(200).json_body(fixtures::collection(
                "collection",
                vec![fixtures::nodepool("c-1", "np-1", "workers", "ACTIVE")],
            ));
        });

        let code = harness
            .run(&["k8s", "nodepool", "--cluster-id", "c-1", "list"])
            .await;

        assert_eq!(code, 0);
        mock.assert();
        assert_eq!(harness.out.lines()[1].split_whitespace().next(), Some("np-1"));
        Ok(())
    }

    #[tokio::test]
    async fn nodepool_flag_after_subcommand_resolves_to_parent() -> Result<()> {
        let harness = Harness::start().await;
        let mock = harness.server.mock(|when, then| {
            when.method(GET).path(Harness::path("k8s/c-9/nodepools/np-1"));
            then.status(200)
                .json_body(fixtures::nodepool("c-9", "np-1", "workers", "ACTIVE"));
        });

        let code = harness
            .run(&[
                "k8s",
                "nodepool",
                "get",
                "--nodepool-id",
                "np-1",
                "--cluster-id",
                "c-9",
            ])
            .await;

        assert_eq!(code, 0);
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn nodepool_create_lists_every_missing_flag() -> Result<()> {
        let harness = Harness::start().await;
        let mock = harness.server.mock(|when, then| {
            when.any_request();
            then.status(200);
        });

        let code = harness
            .run(&["k8s", "nodepool", "create", "--name", "workers"])
            .await;

        assert_eq!(code, 2);
        mock.assert_calls(0);
        Ok(())
    }

    #[tokio::test]
    async fn nodepool_delete_waits_until_gone() -> Result<()> {
        let harness = Harness::start().await;
        let delete = harness.server.mock(|when, then| {
            when.method(DELETE).path(Harness::path("k8s/c-1/nodepools/np-1"));
            then.status(202);
        });
        let gone = harness.server.mock(|when, then| {
            when.method(GET).path(Harness::path("k8s/c-1/nodepools/np-1"));
            then.status(404);
        });

        let code = harness
            .run(&[
                "k8s",
                "nodepool",
                "delete",
                "--cluster-id",
                "c-1",
                "--nodepool-id",
                "np-1",
                "-W",
            ])
            .await;

        assert_eq!(code, 0);
        delete.assert();
        gone.assert_calls(1);
        Ok(())
    }
}
