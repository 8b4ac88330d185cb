//! Built-in defaults for client configuration.
//!
//! # Design
//! - Keep every fallback value in one place so commands and tests agree on them.
//! - Per-command timeouts are chosen by each command; these are the conventional values.

use std::time::Duration;

/// Name of the root command; the first segment of every command path.
pub const ROOT_COMMAND: &str = "cloudctl";
/// API endpoint used when neither flags, environment nor profile provide one.
pub const DEFAULT_API_URL: &str = "https://api.cloud.example.com/cloudapi/v6";
/// HTTP client timeout for a single API call, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
/// Default `--timeout` for commands that wait for a request.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
/// Default `--timeout` for k8s commands that wait for a resource state.
pub const DEFAULT_K8S_TIMEOUT_SECS: u64 = 600;
/// Delay between two consecutive status fetches while waiting.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Profile location relative to the user's home directory.
pub const PROFILE_RELATIVE_PATH: &str = ".config/cloudctl/config.json";
