//! Required-flag validation with aggregated failures.
//!
//! # Design
//! - Every required flag is checked; failures are collected instead of returned on the
//!   first miss, so one invocation reports all of them.
//! - Presence means "supplied by the user" (command line or environment), not truthiness.

use std::fmt::{self, Display, Formatter};

use thiserror::Error;

use crate::namespace::{CommandPath, Namespace};
use crate::store::FlagStore;

/// One required flag that was not supplied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("required flag '--{flag}' is not set")]
pub struct MissingFlag {
    /// Flag name without leading dashes.
    pub flag: String,
    /// Key the flag was resolved to for the checked command.
    pub namespace: Namespace,
}

/// All missing flags for one command, reported together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    command: CommandPath,
    missing: Vec<MissingFlag>,
}

impl ValidationErrors {
    /// Command the validation ran for.
    #[must_use]
    pub const fn command(&self) -> &CommandPath {
        &self.command
    }

    /// Structured list of failures, in the order the flags were declared.
    #[must_use]
    pub fn missing(&self) -> &[MissingFlag] {
        &self.missing
    }

    /// Names of the missing flags.
    #[must_use]
    pub fn flag_names(&self) -> Vec<&str> {
        self.missing.iter().map(|item| item.flag.as_str()).collect()
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        let flags = self
            .missing
            .iter()
            .map(|item| format!("--{}", item.flag))
            .collect::<Vec<_>>()
            .join(", ");
        let noun = if self.missing.len() == 1 { "flag" } else { "flags" };
        write!(
            formatter,
            "{}: {} required {noun} not set: {flags}",
            self.command,
            self.missing.len()
        )
    }
}

impl std::error::Error for ValidationErrors {}

/// Check that every flag in `required` was supplied for the command at `path`.
///
/// # Errors
///
/// Returns [`ValidationErrors`] listing every missing flag when at least one is absent.
pub fn check_required(
    store: &FlagStore,
    path: &CommandPath,
    required: &[&str],
) -> Result<(), ValidationErrors> {
    let missing: Vec<MissingFlag> = required
        .iter()
        .filter(|flag| !store.is_set(path, flag))
        .map(|flag| MissingFlag {
            flag: (*flag).to_string(),
            namespace: Namespace::local(path, flag),
        })
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    tracing::debug!(
        command = %path,
        missing = missing.len(),
        "required flag validation failed"
    );
    Err(ValidationErrors {
        command: path.clone(),
        missing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FlagSource, FlagValue};

    fn leaf() -> CommandPath {
        CommandPath::from_segments(["cloudctl", "natgateway", "create"])
    }

    fn store_with(flags: &[(&str, FlagSource)]) -> FlagStore {
        let mut builder = FlagStore::builder();
        for (flag, source) in flags {
            builder.insert(
                Namespace::local(&leaf(), flag),
                FlagValue::String("value".into()),
                *source,
            );
        }
        builder.build()
    }

    #[test]
    fn passes_when_all_flags_present() {
        let store = store_with(&[
            ("datacenter-id", FlagSource::CommandLine),
            ("name", FlagSource::Environment),
        ]);
        assert!(check_required(&store, &leaf(), &["datacenter-id", "name"]).is_ok());
    }

    #[test]
    fn passes_with_no_required_flags() {
        assert!(check_required(&FlagStore::default(), &leaf(), &[]).is_ok());
    }

    #[test]
    fn reports_every_missing_flag_at_once() {
        let store = store_with(&[("name", FlagSource::CommandLine)]);
        let err = check_required(&store, &leaf(), &["datacenter-id", "name", "ips"])
            .expect_err("two flags are missing");

        assert_eq!(err.flag_names(), vec!["datacenter-id", "ips"]);
        let message = err.to_string();
        assert!(message.contains("--datacenter-id"));
        assert!(message.contains("--ips"));
        assert!(message.contains("2 required flags"));
        assert_eq!(err.command(), &leaf());
    }

    #[test]
    fn default_values_do_not_satisfy_requirement() {
        let store = store_with(&[("name", FlagSource::Default)]);
        let err = check_required(&store, &leaf(), &["name"]).expect_err("default is not set");
        assert_eq!(err.missing().len(), 1);
        assert_eq!(err.to_string(), "cloudctl natgateway create: 1 required flag not set: --name");
    }
}
