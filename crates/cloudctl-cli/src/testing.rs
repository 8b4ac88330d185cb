//! Test harness running full invocations against a mock API.

use std::ffi::OsString;
use std::fs;

use cloudctl_test_support::sink::SharedBuffer;
use httpmock::MockServer;
use tempfile::TempDir;

use crate::cli::run_with;

pub(crate) const API_PREFIX: &str = "/cloudapi/v6";

pub(crate) struct Harness {
    pub(crate) server: MockServer,
    pub(crate) out: SharedBuffer,
    profile_dir: TempDir,
}

impl Harness {
    pub(crate) async fn start() -> Self {
        let server = MockServer::start_async().await;
        let profile_dir = tempfile::tempdir().expect("temp dir");
        fs::write(profile_dir.path().join("config.json"), "{}").expect("write profile");
        Self {
            server,
            out: SharedBuffer::new(),
            profile_dir,
        }
    }

    /// Request path as the mock server sees it.
    pub(crate) fn path(endpoint: &str) -> String {
        format!("{API_PREFIX}/{endpoint}")
    }

    /// Absolute URL on the mock server, as returned in `Location` headers.
    pub(crate) fn url(&self, endpoint: &str) -> String {
        self.server.url(Self::path(endpoint))
    }

    pub(crate) fn profile_path(&self) -> String {
        self.profile_dir
            .path()
            .join("config.json")
            .to_string_lossy()
            .into_owned()
    }

    /// Run `cloudctl` with credentials pointing at the mock server and a fast poll interval.
    pub(crate) async fn run(&self, args: &[&str]) -> i32 {
        let mut argv: Vec<OsString> = vec![
            "cloudctl".into(),
            "--api-url".into(),
            format!("{}{API_PREFIX}", self.server.base_url()).into(),
            "--token".into(),
            "test-token".into(),
            "--config".into(),
            self.profile_path().into(),
            "--poll-interval-ms".into(),
            "10".into(),
        ];
        argv.extend(args.iter().map(OsString::from));
        run_with(argv, Box::new(self.out.clone())).await
    }
}
