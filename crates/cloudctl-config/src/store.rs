//! Read-only snapshot of every flag value seen while parsing the command line.
//!
//! # Design
//! - Values are written only through [`FlagStoreBuilder`]; once built the store is immutable
//!   and shared behind an `Arc`, so no locking is needed while a command runs.
//! - Each entry remembers where its value came from. Defaults are kept so callers can read
//!   them, but they never count as "set".
//! - Lookups prefer explicitly provided values; within the same tier the command's local
//!   value wins over a global one, and nearer ancestors win over farther ones.

use std::collections::HashMap;

use crate::error::{ConfigError, ConfigResult};
use crate::namespace::{CommandPath, Namespace};

/// Typed flag value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    /// Single string value (also used for numbers that were not parsed as counts).
    String(String),
    /// Boolean switch.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Repeated or delimited values.
    StringList(Vec<String>),
}

impl FlagValue {
    /// Human-readable name of the variant, used in type mismatch errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::StringList(_) => "string-list",
        }
    }
}

/// Origin of a stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagSource {
    /// Typed by the user on the command line.
    CommandLine,
    /// Read from an environment variable bound to the flag.
    Environment,
    /// Filled in from the flag's declared default.
    Default,
}

/// Stored value plus its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagEntry {
    /// The value itself.
    pub value: FlagValue,
    /// Where the value came from.
    pub source: FlagSource,
}

impl FlagEntry {
    /// Whether the user supplied the value (command line or environment).
    #[must_use]
    pub fn is_set(&self) -> bool {
        !matches!(self.source, FlagSource::Default)
    }
}

/// Mutable half of the store, used only while argv is being parsed.
#[derive(Debug, Default)]
pub struct FlagStoreBuilder {
    entries: HashMap<Namespace, FlagEntry>,
}

impl FlagStoreBuilder {
    /// Empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value. A later insert under the same key replaces the earlier one.
    pub fn insert(&mut self, namespace: Namespace, value: FlagValue, source: FlagSource) -> &mut Self {
        self.entries.insert(namespace, FlagEntry { value, source });
        self
    }

    /// Freeze the collected values.
    #[must_use]
    pub fn build(self) -> FlagStore {
        FlagStore {
            entries: self.entries,
        }
    }
}

/// Immutable flag snapshot for one invocation.
#[derive(Debug, Default, Clone)]
pub struct FlagStore {
    entries: HashMap<Namespace, FlagEntry>,
}

impl FlagStore {
    /// Start collecting values.
    #[must_use]
    pub fn builder() -> FlagStoreBuilder {
        FlagStoreBuilder::new()
    }

    /// Number of stored entries (defaults included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact-key access.
    #[must_use]
    pub fn entry(&self, namespace: &Namespace) -> Option<&FlagEntry> {
        self.entries.get(namespace)
    }

    /// Value of a flag declared globally by `declared_at`, as seen by any descendant.
    #[must_use]
    pub fn global(&self, declared_at: &CommandPath, flag: &str) -> Option<&FlagEntry> {
        self.entry(&Namespace::global(declared_at, flag))
    }

    /// Resolve `flag` as seen by the command at `path`.
    ///
    /// A local entry always wins, whatever its source. Without one, the global keys of the
    /// command and each ancestor are tried, nearest first.
    #[must_use]
    pub fn lookup(&self, path: &CommandPath, flag: &str) -> Option<&FlagEntry> {
        self.entries
            .get(&Namespace::local(path, flag))
            .or_else(|| {
                path.lineage()
                    .iter()
                    .find_map(|ancestor| self.entries.get(&Namespace::global(ancestor, flag)))
            })
    }

    /// Whether the user supplied `flag` for the command at `path`.
    #[must_use]
    pub fn is_set(&self, path: &CommandPath, flag: &str) -> bool {
        self.lookup(path, flag).is_some_and(FlagEntry::is_set)
    }

    /// String value of `flag`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FlagType`] when the stored value is not a string.
    pub fn get_str(&self, path: &CommandPath, flag: &str) -> ConfigResult<Option<&str>> {
        match self.lookup(path, flag).map(|entry| &entry.value) {
            None => Ok(None),
            Some(FlagValue::String(value)) => Ok(Some(value.as_str())),
            Some(other) => Err(type_error(flag, "string", other)),
        }
    }

    /// Boolean value of `flag`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FlagType`] when the stored value is not a bool.
    pub fn get_bool(&self, path: &CommandPath, flag: &str) -> ConfigResult<Option<bool>> {
        match self.lookup(path, flag).map(|entry| &entry.value) {
            None => Ok(None),
            Some(FlagValue::Bool(value)) => Ok(Some(*value)),
            Some(other) => Err(type_error(flag, "bool", other)),
        }
    }

    /// Integer value of `flag`; string values are parsed.
    ///
    /// # Errors
    ///
    /// Returns an error when the value is neither an integer nor a parseable string.
    pub fn get_int(&self, path: &CommandPath, flag: &str) -> ConfigResult<Option<i64>> {
        match self.lookup(path, flag).map(|entry| &entry.value) {
            None => Ok(None),
            Some(FlagValue::Int(value)) => Ok(Some(*value)),
            Some(FlagValue::String(raw)) => {
                raw.trim()
                    .parse::<i64>()
                    .map(Some)
                    .map_err(|_| ConfigError::InvalidInteger {
                        flag: flag.to_string(),
                        value: raw.clone(),
                    })
            }
            Some(other) => Err(type_error(flag, "int", other)),
        }
    }

    /// List value of `flag`; a single string becomes a one-element list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FlagType`] for bool or integer values.
    pub fn get_string_list(
        &self,
        path: &CommandPath,
        flag: &str,
    ) -> ConfigResult<Option<Vec<String>>> {
        match self.lookup(path, flag).map(|entry| &entry.value) {
            None => Ok(None),
            Some(FlagValue::StringList(values)) => Ok(Some(values.clone())),
            Some(FlagValue::String(value)) => Ok(Some(vec![value.clone()])),
            Some(other) => Err(type_error(flag, "string-list", other)),
        }
    }
}

fn type_error(flag: &str, expected: &'static str, actual: &FlagValue) -> ConfigError {
    ConfigError::FlagType {
        flag: flag.to_string(),
        expected,
        actual: actual.kind(),
    }
}
