#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Completion tracking for long-running remote operations.
//!
//! Layout: `context.rs` (deadline, cancellation and value-scoped data), `operation.rs`
//! (response envelopes and operation handles), `terminal.rs` (resource-supplied terminal
//! states), `poller.rs` (wait-for-request / wait-for-state loops), `error.rs`.

pub mod context;
pub mod error;
pub mod operation;
pub mod poller;
pub mod terminal;

pub use context::OperationContext;
pub use error::{BoxError, WaitError, WaitResult};
pub use operation::{OperationHandle, ResponseEnvelope};
pub use poller::{
    PollOutcome, PollReport, RemoteStatus, RequestStatusSource, WaitSettings, poll_until,
    wait_for_request, wait_for_state, wait_until_gone,
};
pub use terminal::{Observation, TerminalStates};
