#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Logging and span helpers for the cloudctl workspace.
//!
//! Layout: init.rs (subscriber setup, verbosity mapping), context.rs (per-command span and
//! trace id), error.rs.

pub mod context;
pub mod error;
pub mod init;

pub use context::{command_span, current_trace_id, with_command_context};
pub use error::{Result, TelemetryError};
pub use init::{
    DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging, level_for_verbosity,
};
