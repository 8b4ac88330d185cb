//! Per-invocation command configuration.
//!
//! # Design
//! - One `CommandConfig` per process invocation, owned by the running command task.
//! - The flag store is shared read-only; the operation context is replaced (never merged)
//!   when a deadline is attached.
//! - The API client and the resource services are built on first use and memoized, so
//!   commands that fail validation never read the profile or open a connection.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cloudctl_config::{
    ClientProfile, CommandPath, ConfigError, FlagStore, FlagValue, ProfileOverrides,
    ResolvedProfile, check_required,
};
use cloudctl_waiter::{OperationContext, WaitSettings};
use once_cell::sync::OnceCell;

use crate::cli::OutputFormat;
use crate::client::{ApiClient, CliError, CliResult};
use crate::services::{DatacenterService, K8sService, NatGatewayService, RequestService};

/// Context key holding the trace identifier sent as `x-request-id`.
pub(crate) const TRACE_ID_KEY: &str = "trace_id";
/// Context key holding the invoked command label.
pub(crate) const COMMAND_KEY: &str = "command";

const NO_CREDENTIALS: &str = "no credentials configured; pass --token or --username with \
     --password (or set them in the config file)";

/// Inputs needed to build the API client lazily.
#[derive(Clone, Default)]
pub(crate) struct ClientOptions {
    pub(crate) overrides: ProfileOverrides,
    pub(crate) config_path: Option<PathBuf>,
    pub(crate) home: Option<PathBuf>,
    pub(crate) http_timeout: Duration,
}

pub(crate) struct CommandConfig {
    path: CommandPath,
    flags: Arc<FlagStore>,
    ctx: OperationContext,
    out: Box<dyn Write + Send>,
    format: OutputFormat,
    poll_interval: Duration,
    options: ClientOptions,
    client: OnceCell<Arc<ApiClient>>,
    datacenters: OnceCell<DatacenterService>,
    requests: OnceCell<RequestService>,
    k8s: OnceCell<K8sService>,
    natgateways: OnceCell<NatGatewayService>,
}

impl CommandConfig {
    pub(crate) fn new(
        path: CommandPath,
        flags: Arc<FlagStore>,
        ctx: OperationContext,
        out: Box<dyn Write + Send>,
        format: OutputFormat,
        poll_interval: Duration,
        options: ClientOptions,
    ) -> Self {
        Self {
            path,
            flags,
            ctx,
            out,
            format,
            poll_interval,
            options,
            client: OnceCell::new(),
            datacenters: OnceCell::new(),
            requests: OnceCell::new(),
            k8s: OnceCell::new(),
            natgateways: OnceCell::new(),
        }
    }

    pub(crate) const fn path(&self) -> &CommandPath {
        &self.path
    }

    pub(crate) fn flags(&self) -> &FlagStore {
        &self.flags
    }

    pub(crate) const fn context(&self) -> &OperationContext {
        &self.ctx
    }

    /// Swap in a derived context (e.g. one carrying a deadline).
    pub(crate) fn replace_context(&mut self, ctx: OperationContext) {
        self.ctx = ctx;
    }

    pub(crate) fn out(&mut self) -> &mut (dyn Write + Send) {
        &mut *self.out
    }

    pub(crate) const fn format(&self) -> OutputFormat {
        self.format
    }

    /// Pre-run hook: every flag in `required` must have been supplied.
    pub(crate) fn check_required(&self, required: &[&str]) -> CliResult<()> {
        check_required(self.flags(), &self.path, required)?;
        Ok(())
    }

    pub(crate) const fn wait_settings(&self, enabled: bool, timeout_secs: u64) -> WaitSettings {
        WaitSettings::new(enabled, Duration::from_secs(timeout_secs), self.poll_interval)
    }

    /// String value of a global flag declared on an ancestor command.
    pub(crate) fn inherited_str(&self, flag: &str) -> CliResult<Option<String>> {
        let entry = self
            .path
            .lineage()
            .iter()
            .skip(1)
            .find_map(|ancestor| self.flags.global(ancestor, flag).cloned());
        match entry.map(|entry| entry.value) {
            None => Ok(None),
            Some(FlagValue::String(value)) => Ok(Some(value)),
            Some(other) => Err(ConfigError::FlagType {
                flag: flag.to_string(),
                expected: "string",
                actual: other.kind(),
            }
            .into()),
        }
    }

    pub(crate) fn client(&self) -> CliResult<Arc<ApiClient>> {
        self.client
            .get_or_try_init(|| self.build_client())
            .map(Arc::clone)
    }

    pub(crate) fn datacenters(&self) -> CliResult<DatacenterService> {
        self.datacenters
            .get_or_try_init(|| self.client().map(DatacenterService::new))
            .cloned()
    }

    pub(crate) fn requests(&self) -> CliResult<RequestService> {
        self.requests
            .get_or_try_init(|| self.client().map(RequestService::new))
            .cloned()
    }

    pub(crate) fn k8s(&self) -> CliResult<K8sService> {
        self.k8s
            .get_or_try_init(|| self.client().map(K8sService::new))
            .cloned()
    }

    pub(crate) fn natgateways(&self) -> CliResult<NatGatewayService> {
        self.natgateways
            .get_or_try_init(|| self.client().map(NatGatewayService::new))
            .cloned()
    }

    fn build_client(&self) -> CliResult<Arc<ApiClient>> {
        let profile = ClientProfile::discover(
            self.options.config_path.as_deref(),
            self.options.home.as_deref(),
        )?;
        let resolved = ResolvedProfile::resolve(self.options.overrides.clone(), profile)?;
        let credentials = resolved
            .credentials
            .ok_or_else(|| CliError::validation(NO_CREDENTIALS))?;
        tracing::debug!(api_url = %resolved.api_url, "building API client");
        let client = ApiClient::new(
            resolved.api_url,
            credentials,
            self.options.http_timeout,
            self.ctx.value(TRACE_ID_KEY),
        )?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudctl_config::{FlagSource, Namespace};
    use cloudctl_test_support::sink::SharedBuffer;

    fn config_with(flags: FlagStore, options: ClientOptions) -> CommandConfig {
        CommandConfig::new(
            CommandPath::from_segments(["cloudctl", "k8s", "nodepool", "create"]),
            Arc::new(flags),
            OperationContext::background().with_value(TRACE_ID_KEY, "trace-1"),
            Box::new(SharedBuffer::new()),
            OutputFormat::Table,
            Duration::from_millis(5),
            options,
        )
    }

    fn token_options() -> ClientOptions {
        ClientOptions {
            overrides: ProfileOverrides {
                api_url: Some("http://127.0.0.1:1/cloudapi/v6".into()),
                token: Some("token".into()),
                ..ProfileOverrides::default()
            },
            config_path: None,
            home: None,
            http_timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn client_is_built_once() {
        let cfg = config_with(FlagStore::default(), token_options());
        let first = cfg.client().expect("client");
        let second = cfg.client().expect("client");
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cfg.datacenters().is_ok());
        assert!(cfg.requests().is_ok());
    }

    #[test]
    fn missing_credentials_fail_validation() {
        let cfg = config_with(FlagStore::default(), ClientOptions::default());
        let err = cfg.k8s().expect_err("no credentials");
        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().contains("--token"));
    }

    #[test]
    fn inherited_flags_come_from_parent_globals() {
        let parent = CommandPath::from_segments(["cloudctl", "k8s", "nodepool"]);
        let mut builder = FlagStore::builder();
        builder.insert(
            Namespace::global(&parent, "cluster-id"),
            FlagValue::String("c-1".into()),
            FlagSource::CommandLine,
        );
        let cfg = config_with(builder.build(), token_options());

        assert_eq!(
            cfg.inherited_str("cluster-id").expect("lookup").as_deref(),
            Some("c-1")
        );
        assert!(cfg.inherited_str("datacenter-id").expect("lookup").is_none());
        assert!(cfg.check_required(&["cluster-id"]).is_ok());
        let err = cfg
            .check_required(&["cluster-id", "name"])
            .expect_err("name missing");
        assert!(err.display_message().ends_with("--name"));
    }

    #[test]
    fn replacing_context_keeps_values() {
        let mut cfg = config_with(FlagStore::default(), token_options());
        let scoped = cfg.context().with_timeout(Duration::from_secs(5));
        cfg.replace_context(scoped);
        assert!(cfg.context().deadline().is_some());
        assert_eq!(cfg.context().value(TRACE_ID_KEY), Some("trace-1"));
        let settings = cfg.wait_settings(true, 7);
        assert_eq!(settings.timeout, Duration::from_secs(7));
        assert_eq!(settings.interval, Duration::from_millis(5));
    }
}
