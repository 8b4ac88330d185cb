//! Argument parsing, pre-run validation and command dispatch.

use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{ArgAction, Args, CommandFactory, FromArgMatches, Parser, Subcommand, ValueEnum};
use cloudctl_config::ProfileOverrides;
use cloudctl_config::defaults::{
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_K8S_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
use cloudctl_telemetry::{
    LogFormat, LoggingConfig, build_sha, current_trace_id, init_logging, level_for_verbosity,
    with_command_context,
};
use cloudctl_waiter::OperationContext;
use uuid::Uuid;

use crate::client::CliResult;
use crate::commands::datacenter::{
    handle_datacenter_create, handle_datacenter_delete, handle_datacenter_get,
    handle_datacenter_list, handle_datacenter_update,
};
use crate::commands::k8s::{
    handle_cluster_create, handle_cluster_delete, handle_cluster_get, handle_cluster_list,
    handle_nodepool_create, handle_nodepool_delete, handle_nodepool_get, handle_nodepool_list,
};
use crate::commands::natgateway::{
    handle_natgateway_create, handle_natgateway_delete, handle_natgateway_get,
    handle_natgateway_list,
};
use crate::commands::request::{handle_request_get, handle_request_list, handle_request_wait};
use crate::context::{COMMAND_KEY, ClientOptions, CommandConfig, TRACE_ID_KEY};
use crate::flags::{self, Invocation};

/// Parses CLI arguments and executes the requested command. Returns the process exit code.
pub async fn run() -> i32 {
    run_with(env::args_os(), Box::new(io::stdout())).await
}

/// Same as [`run`] with explicit argv and output sink.
pub(crate) async fn run_with<I, T>(args: I, out: Box<dyn Write + Send>) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut root = Cli::command();
    let matches = match root.try_get_matches_from_mut(args) {
        Ok(matches) => matches,
        Err(err) => {
            let _ = err.print();
            return err.exit_code();
        }
    };
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return err.exit_code();
        }
    };

    install_logging(&cli);
    let invocation = flags::collect(&root, &matches);
    let label = invocation.path.label();
    let trace_id = Uuid::new_v4().to_string();

    let result = with_command_context(&label, trace_id, execute(cli, invocation, out)).await;

    match result {
        Ok(()) => 0,
        Err(err) => {
            let message = err.display_message();
            tracing::debug!(command = %label, exit_code = err.exit_code(), "command failed");
            eprintln!("error: {message}");
            err.exit_code()
        }
    }
}

fn install_logging(cli: &Cli) {
    let config = LoggingConfig {
        level: level_for_verbosity(cli.verbose, cli.quiet),
        format: cli.log_format,
        build_sha: build_sha(),
    };
    if let Err(err) = init_logging(&config) {
        tracing::debug!(error = %err, "logging already initialised");
    }
}

/// Runs one parsed invocation. Calls carry the trace id of the surrounding command context.
async fn execute(cli: Cli, invocation: Invocation, out: Box<dyn Write + Send>) -> CliResult<()> {
    let Cli {
        api_url,
        token,
        username,
        password,
        config,
        output,
        http_timeout,
        poll_interval_ms,
        command,
        ..
    } = cli;

    let trace_id = current_trace_id().unwrap_or_else(|| Uuid::new_v4().to_string());
    let ctx = OperationContext::background()
        .with_value(TRACE_ID_KEY, trace_id)
        .with_value(COMMAND_KEY, invocation.path.label());
    let options = ClientOptions {
        overrides: ProfileOverrides {
            api_url,
            token,
            username,
            password,
        },
        config_path: config,
        home: env::var_os("HOME").map(PathBuf::from),
        http_timeout: Duration::from_secs(http_timeout),
    };
    let poll_interval = poll_interval_ms.map_or(DEFAULT_POLL_INTERVAL, Duration::from_millis);
    let mut cfg = CommandConfig::new(
        invocation.path,
        Arc::new(invocation.flags),
        ctx,
        out,
        output,
        poll_interval,
        options,
    );

    cfg.check_required(required_flags(&command))?;

    let cancel = cfg.context().clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; cancelling");
            cancel.cancel();
        }
    });
    let result = dispatch(command, &mut cfg).await;
    interrupt.abort();

    let flushed = cfg.out().flush();
    result?;
    flushed?;
    Ok(())
}

async fn dispatch(command: Command, cfg: &mut CommandConfig) -> CliResult<()> {
    match command {
        Command::Request(request) => match request {
            RequestCommand::List => handle_request_list(cfg).await,
            RequestCommand::Get(args) => handle_request_get(cfg, args).await,
            RequestCommand::Wait(args) => handle_request_wait(cfg, args).await,
        },
        Command::Datacenter(datacenter) => match datacenter {
            DatacenterCommand::List => handle_datacenter_list(cfg).await,
            DatacenterCommand::Get(args) => handle_datacenter_get(cfg, args).await,
            DatacenterCommand::Create(args) => handle_datacenter_create(cfg, args).await,
            DatacenterCommand::Update(args) => handle_datacenter_update(cfg, args).await,
            DatacenterCommand::Delete(args) => handle_datacenter_delete(cfg, args).await,
        },
        Command::K8s(K8sCommand::Cluster(cluster)) => match cluster {
            ClusterCommand::List => handle_cluster_list(cfg).await,
            ClusterCommand::Get(args) => handle_cluster_get(cfg, args).await,
            ClusterCommand::Create(args) => handle_cluster_create(cfg, args).await,
            ClusterCommand::Delete(args) => handle_cluster_delete(cfg, args).await,
        },
        Command::K8s(K8sCommand::Nodepool(NodePoolArgs {
            cluster_id,
            command,
        })) => match command {
            NodePoolCommand::List => handle_nodepool_list(cfg, cluster_id).await,
            NodePoolCommand::Get(args) => handle_nodepool_get(cfg, cluster_id, args).await,
            NodePoolCommand::Create(args) => handle_nodepool_create(cfg, cluster_id, args).await,
            NodePoolCommand::Delete(args) => handle_nodepool_delete(cfg, cluster_id, args).await,
        },
        Command::Natgateway(NatGatewayArgs {
            datacenter_id,
            command,
        }) => match command {
            NatGatewayCommand::List => handle_natgateway_list(cfg, datacenter_id).await,
            NatGatewayCommand::Get(args) => handle_natgateway_get(cfg, datacenter_id, args).await,
            NatGatewayCommand::Create(args) => {
                handle_natgateway_create(cfg, datacenter_id, args).await
            }
            NatGatewayCommand::Delete(args) => {
                handle_natgateway_delete(cfg, datacenter_id, args).await
            }
        },
    }
}

/// Flags each command needs before it may call the API, in reporting order.
pub(crate) fn required_flags(command: &Command) -> &'static [&'static str] {
    match command {
        Command::Request(RequestCommand::List)
        | Command::Datacenter(DatacenterCommand::List)
        | Command::K8s(K8sCommand::Cluster(ClusterCommand::List)) => &[],
        Command::Request(RequestCommand::Get(_) | RequestCommand::Wait(_)) => &["request-id"],
        Command::Datacenter(
            DatacenterCommand::Get(_) | DatacenterCommand::Update(_) | DatacenterCommand::Delete(_),
        ) => &["datacenter-id"],
        Command::Datacenter(DatacenterCommand::Create(_)) => &["name", "location"],
        Command::K8s(K8sCommand::Cluster(ClusterCommand::Get(_) | ClusterCommand::Delete(_))) => {
            &["cluster-id"]
        }
        Command::K8s(K8sCommand::Cluster(ClusterCommand::Create(_))) => &["name"],
        Command::K8s(K8sCommand::Nodepool(nodepool)) => match nodepool.command {
            NodePoolCommand::List => &["cluster-id"],
            NodePoolCommand::Get(_) | NodePoolCommand::Delete(_) => &["cluster-id", "nodepool-id"],
            NodePoolCommand::Create(_) => &["cluster-id", "name", "datacenter-id", "node-count"],
        },
        Command::Natgateway(natgateway) => match natgateway.command {
            NatGatewayCommand::List => &["datacenter-id"],
            NatGatewayCommand::Get(_) | NatGatewayCommand::Delete(_) => {
                &["datacenter-id", "natgateway-id"]
            }
            NatGatewayCommand::Create(_) => &["datacenter-id", "name", "ips"],
        },
    }
}

#[derive(Parser)]
#[command(
    name = "cloudctl",
    version,
    about = "Command-line client for the cloud infrastructure API"
)]
pub(crate) struct Cli {
    #[arg(long, global = true, env = "CLOUDCTL_API_URL", help = "API endpoint")]
    api_url: Option<String>,
    #[arg(long, global = true, env = "CLOUDCTL_TOKEN", hide_env_values = true)]
    token: Option<String>,
    #[arg(long, global = true, env = "CLOUDCTL_USERNAME")]
    username: Option<String>,
    #[arg(long, global = true, env = "CLOUDCTL_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    #[arg(
        long,
        global = true,
        env = "CLOUDCTL_CONFIG",
        help = "Path to the JSON credentials profile"
    )]
    config: Option<PathBuf>,
    #[arg(
        short = 'o',
        long = "output",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render resources"
    )]
    output: OutputFormat,
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_HTTP_TIMEOUT_SECS,
        help = "Per-call HTTP timeout in seconds"
    )]
    http_timeout: u64,
    #[arg(long, global = true, hide = true)]
    poll_interval_ms: Option<u64>,
    #[arg(
        long,
        global = true,
        env = "CLOUDCTL_LOG_FORMAT",
        hide = true,
        default_value = "compact",
        value_parser = parse_log_format
    )]
    log_format: LogFormat,
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

fn parse_log_format(input: &str) -> Result<LogFormat, String> {
    input.parse().map_err(|err| format!("{err}"))
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Inspect asynchronous requests.
    #[command(subcommand)]
    Request(RequestCommand),
    /// Manage virtual datacenters.
    #[command(subcommand)]
    Datacenter(DatacenterCommand),
    /// Manage Kubernetes clusters and node pools.
    #[command(subcommand)]
    K8s(K8sCommand),
    /// Manage NAT gateways of a datacenter.
    Natgateway(NatGatewayArgs),
}

#[derive(Subcommand)]
pub(crate) enum RequestCommand {
    List,
    Get(RequestGetArgs),
    /// Block until a request reaches DONE or FAILED.
    Wait(RequestWaitArgs),
}

#[derive(Args)]
pub(crate) struct RequestGetArgs {
    #[arg(long)]
    pub(crate) request_id: Option<String>,
}

#[derive(Args)]
pub(crate) struct RequestWaitArgs {
    #[arg(long)]
    pub(crate) request_id: Option<String>,
    #[arg(short = 't', long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub(crate) timeout: u64,
}

/// Wait flags of commands tracked through request status documents.
#[derive(Args)]
pub(crate) struct RequestWaitFlags {
    #[arg(
        short = 'w',
        long,
        help = "Wait for the request triggered by this command to finish"
    )]
    pub(crate) wait_for_request: bool,
    #[arg(
        short = 't',
        long,
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS,
        help = "Timeout in seconds for waiting"
    )]
    pub(crate) timeout: u64,
}

/// Wait flags of commands tracked through the resource's own state.
#[derive(Args)]
pub(crate) struct StateWaitFlags {
    #[arg(
        short = 'W',
        long,
        help = "Wait for the resource to reach its target state"
    )]
    pub(crate) wait_for_state: bool,
    #[arg(
        short = 't',
        long,
        default_value_t = DEFAULT_K8S_TIMEOUT_SECS,
        help = "Timeout in seconds for waiting"
    )]
    pub(crate) timeout: u64,
}

#[derive(Subcommand)]
pub(crate) enum DatacenterCommand {
    List,
    Get(DatacenterIdArgs),
    Create(DatacenterCreateArgs),
    Update(DatacenterUpdateArgs),
    Delete(DatacenterDeleteArgs),
}

#[derive(Args)]
pub(crate) struct DatacenterIdArgs {
    #[arg(long)]
    pub(crate) datacenter_id: Option<String>,
}

#[derive(Args)]
pub(crate) struct DatacenterCreateArgs {
    #[arg(long)]
    pub(crate) name: Option<String>,
    #[arg(long, help = "Location, e.g. de/fra")]
    pub(crate) location: Option<String>,
    #[arg(long)]
    pub(crate) description: Option<String>,
    #[command(flatten)]
    pub(crate) wait: RequestWaitFlags,
}

#[derive(Args)]
pub(crate) struct DatacenterUpdateArgs {
    #[arg(long)]
    pub(crate) datacenter_id: Option<String>,
    #[arg(long)]
    pub(crate) name: Option<String>,
    #[arg(long)]
    pub(crate) description: Option<String>,
    #[command(flatten)]
    pub(crate) wait: RequestWaitFlags,
}

#[derive(Args)]
pub(crate) struct DatacenterDeleteArgs {
    #[arg(long)]
    pub(crate) datacenter_id: Option<String>,
    #[command(flatten)]
    pub(crate) wait: RequestWaitFlags,
}

#[derive(Subcommand)]
pub(crate) enum K8sCommand {
    #[command(subcommand)]
    Cluster(ClusterCommand),
    Nodepool(NodePoolArgs),
}

#[derive(Subcommand)]
pub(crate) enum ClusterCommand {
    List,
    Get(ClusterIdArgs),
    Create(ClusterCreateArgs),
    Delete(ClusterDeleteArgs),
}

#[derive(Args)]
pub(crate) struct ClusterIdArgs {
    #[arg(long)]
    pub(crate) cluster_id: Option<String>,
}

#[derive(Args)]
pub(crate) struct ClusterCreateArgs {
    #[arg(long)]
    pub(crate) name: Option<String>,
    #[arg(long)]
    pub(crate) k8s_version: Option<String>,
    #[command(flatten)]
    pub(crate) wait: StateWaitFlags,
}

#[derive(Args)]
pub(crate) struct ClusterDeleteArgs {
    #[arg(long)]
    pub(crate) cluster_id: Option<String>,
    #[command(flatten)]
    pub(crate) wait: StateWaitFlags,
}

/// Node pool commands share the parent cluster id.
#[derive(Args)]
pub(crate) struct NodePoolArgs {
    #[arg(long, global = true, help = "Cluster owning the node pools")]
    pub(crate) cluster_id: Option<String>,
    #[command(subcommand)]
    pub(crate) command: NodePoolCommand,
}

#[derive(Subcommand)]
pub(crate) enum NodePoolCommand {
    List,
    Get(NodePoolIdArgs),
    Create(NodePoolCreateArgs),
    Delete(NodePoolDeleteArgs),
}

#[derive(Args)]
pub(crate) struct NodePoolIdArgs {
    #[arg(long)]
    pub(crate) nodepool_id: Option<String>,
}

#[derive(Args)]
pub(crate) struct NodePoolCreateArgs {
    #[arg(long)]
    pub(crate) name: Option<String>,
    #[arg(long)]
    pub(crate) datacenter_id: Option<String>,
    #[arg(long)]
    pub(crate) node_count: Option<u32>,
    #[arg(long)]
    pub(crate) k8s_version: Option<String>,
    #[command(flatten)]
    pub(crate) wait: StateWaitFlags,
}

#[derive(Args)]
pub(crate) struct NodePoolDeleteArgs {
    #[arg(long)]
    pub(crate) nodepool_id: Option<String>,
    #[command(flatten)]
    pub(crate) wait: StateWaitFlags,
}

/// NAT gateway commands share the parent datacenter id.
#[derive(Args)]
pub(crate) struct NatGatewayArgs {
    #[arg(long, global = true, help = "Datacenter owning the NAT gateways")]
    pub(crate) datacenter_id: Option<String>,
    #[command(subcommand)]
    pub(crate) command: NatGatewayCommand,
}

#[derive(Subcommand)]
pub(crate) enum NatGatewayCommand {
    List,
    Get(NatGatewayIdArgs),
    Create(NatGatewayCreateArgs),
    Delete(NatGatewayDeleteArgs),
}

#[derive(Args)]
pub(crate) struct NatGatewayIdArgs {
    #[arg(long)]
    pub(crate) natgateway_id: Option<String>,
}

#[derive(Args)]
pub(crate) struct NatGatewayCreateArgs {
    #[arg(long)]
    pub(crate) name: Option<String>,
    #[arg(long, value_delimiter = ',', help = "Reserved public IPs, comma separated")]
    pub(crate) ips: Vec<String>,
    #[command(flatten)]
    pub(crate) wait: RequestWaitFlags,
}

#[derive(Args)]
pub(crate) struct NatGatewayDeleteArgs {
    #[arg(long)]
    pub(crate) natgateway_id: Option<String>,
    #[command(flatten)]
    pub(crate) wait: RequestWaitFlags,
}
