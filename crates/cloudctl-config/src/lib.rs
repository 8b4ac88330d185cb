#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Namespaced flag configuration shared by every `cloudctl` command.
//!
//! Layout: `namespace.rs` (collision-free flag keys), `store.rs` (the parsed,
//! read-only flag snapshot), `validate.rs` (required-flag aggregation),
//! `profile.rs` (credentials file), `defaults.rs` (built-in constants).

pub mod defaults;
pub mod error;
pub mod namespace;
pub mod profile;
pub mod store;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use namespace::{CommandPath, Namespace, Scope};
pub use profile::{ClientProfile, Credentials, ProfileOverrides, ResolvedProfile};
pub use store::{FlagEntry, FlagSource, FlagStore, FlagStoreBuilder, FlagValue};
pub use validate::{MissingFlag, ValidationErrors, check_required};
