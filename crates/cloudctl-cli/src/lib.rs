#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::redundant_pub_crate)]

//! Command-line client for the cloud infrastructure API.
//!
//! Layout:
//! - `cli.rs`: argument parsing, pre-run validation and command dispatch
//! - `flags.rs`: bridges parsed arguments into the namespaced flag store
//! - `context.rs`: per-invocation command configuration
//! - `commands/`: command handlers grouped by resource
//! - `services/`: typed resource clients over the shared HTTP client
//! - `client.rs`: HTTP client, API errors and exit-code mapping
//! - `output.rs`: table and JSON renderers
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod context;
pub(crate) mod flags;
pub(crate) mod output;
pub(crate) mod services;
#[cfg(test)]
mod testing;

pub use cli::run;
