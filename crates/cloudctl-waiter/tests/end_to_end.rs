//! Validate flags, start an operation, then wait for its request to finish.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cloudctl_config::{CommandPath, FlagSource, FlagStore, FlagValue, Namespace, check_required};
use cloudctl_test_support::sink::SharedBuffer;
use cloudctl_waiter::{
    BoxError, OperationContext, OperationHandle, PollOutcome, RemoteStatus, RequestStatusSource,
    ResponseEnvelope, WaitError, WaitSettings, wait_for_request,
};

struct DoneOnSecond {
    calls: AtomicU32,
}

#[async_trait]
impl RequestStatusSource for DoneOnSecond {
    async fn request_status(&self, _path: &str) -> Result<RemoteStatus, BoxError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(RemoteStatus::new(if call >= 2 { "DONE" } else { "RUNNING" }))
    }
}

struct AlwaysRunning;

#[async_trait]
impl RequestStatusSource for AlwaysRunning {
    async fn request_status(&self, _path: &str) -> Result<RemoteStatus, BoxError> {
        Ok(RemoteStatus::new("RUNNING"))
    }
}

fn create_path() -> CommandPath {
    CommandPath::from_segments(["cloudctl", "datacenter", "create"])
}

fn flags(wait: bool, timeout: i64) -> FlagStore {
    let path = create_path();
    let mut builder = FlagStore::builder();
    builder
        .insert(
            Namespace::local(&path, "name"),
            FlagValue::String("edge".into()),
            FlagSource::CommandLine,
        )
        .insert(
            Namespace::local(&path, "location"),
            FlagValue::String("de/fra".into()),
            FlagSource::CommandLine,
        )
        .insert(
            Namespace::local(&path, "wait-for-request"),
            FlagValue::Bool(wait),
            FlagSource::CommandLine,
        )
        .insert(
            Namespace::local(&path, "timeout"),
            FlagValue::Int(timeout),
            FlagSource::CommandLine,
        );
    builder.build()
}

fn settings_from(store: &FlagStore) -> anyhow::Result<WaitSettings> {
    let path = create_path();
    let enabled = store.get_bool(&path, "wait-for-request")?.unwrap_or(false);
    let timeout = store.get_int(&path, "timeout")?.unwrap_or(60);
    Ok(WaitSettings::new(
        enabled,
        Duration::from_secs(u64::try_from(timeout)?),
        Duration::from_millis(20),
    ))
}

fn accepted() -> OperationHandle {
    OperationHandle::from_envelope(&ResponseEnvelope {
        status: 202,
        location: Some("http://127.0.0.1:1/cloudapi/v6/requests/42/status".into()),
        request_id: Some("42".into()),
    })
}

#[tokio::test]
async fn create_with_wait_completes_on_second_fetch() -> anyhow::Result<()> {
    let store = flags(true, 5);
    check_required(&store, &create_path(), &["name", "location"])?;

    let source = DoneOnSecond {
        calls: AtomicU32::new(0),
    };
    let mut out = SharedBuffer::new();
    let report = wait_for_request(
        &OperationContext::background(),
        &settings_from(&store)?,
        &accepted(),
        &source,
        &mut out,
    )
    .await?;

    assert_eq!(
        report.outcome,
        PollOutcome::Succeeded {
            state: "DONE".into()
        }
    );
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        out.lines(),
        vec!["Waiting for request: 42", "Request 42 finished: DONE"]
    );
    Ok(())
}

#[tokio::test]
async fn create_with_short_timeout_reports_timeout() -> anyhow::Result<()> {
    let store = flags(true, 1);
    check_required(&store, &create_path(), &["name", "location"])?;

    let mut out = SharedBuffer::new();
    let started = std::time::Instant::now();
    let err = wait_for_request(
        &OperationContext::background(),
        &settings_from(&store)?,
        &accepted(),
        &AlwaysRunning,
        &mut out,
    )
    .await
    .expect_err("request never finishes");

    assert!(matches!(err, WaitError::Timeout { .. }));
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(err.to_string().contains("request 42"));
    Ok(())
}

#[tokio::test]
async fn missing_flags_stop_before_any_fetch() {
    let path = create_path();
    let store = FlagStore::builder().build();
    let err = check_required(&store, &path, &["name", "location"]).expect_err("both missing");
    assert_eq!(err.flag_names(), vec!["name", "location"]);
    assert_eq!(
        err.to_string(),
        "cloudctl datacenter create: 2 required flags not set: --name, --location"
    );
}
