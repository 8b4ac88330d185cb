//! Collision-free keys for flag values.
//!
//! # Design
//! - A [`Namespace`] is a pure function of its scope, command path and flag name; nothing
//!   is cached, so equal inputs always produce equal keys for the life of the process.
//! - Local keys use the full command path; global keys use the path of the command that
//!   declared the flag, so every descendant observes the same value.
//! - Equality and hashing are structural. [`Namespace::key`] renders a length-prefixed
//!   string so the textual form is just as unambiguous as the structured one.

use std::fmt::{self, Display, Formatter};

/// Ordered list of command names from the root command down to the invoked leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandPath {
    segments: Vec<String>,
}

impl CommandPath {
    /// Path consisting only of the root command.
    #[must_use]
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    /// Build a path from already-ordered segments.
    #[must_use]
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Path of a direct subcommand.
    #[must_use]
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    /// Path of the parent command, `None` for the root (or an empty path).
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() <= 1 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// This path followed by each ancestor, nearest first.
    #[must_use]
    pub fn lineage(&self) -> Vec<Self> {
        (1..=self.segments.len())
            .rev()
            .map(|len| Self {
                segments: self.segments[..len].to_vec(),
            })
            .collect()
    }

    /// Command names, root first.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Name of the invoked (leaf) command.
    #[must_use]
    pub fn leaf(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Space separated label as typed by the user, e.g. `cloudctl k8s cluster create`.
    #[must_use]
    pub fn label(&self) -> String {
        self.segments.join(" ")
    }
}

impl Display for CommandPath {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.label())
    }
}

/// Whether a key is shared with descendants or private to one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// Declared on a parent and visible to every descendant.
    Global,
    /// Visible only to the command that declared it.
    Local,
}

impl Scope {
    const fn tag(self) -> &'static str {
        match self {
            Self::Global => "g",
            Self::Local => "l",
        }
    }
}

/// Key identifying one (scope, command path, flag) triple in a [`crate::FlagStore`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace {
    scope: Scope,
    path: CommandPath,
    flag: String,
}

impl Namespace {
    /// Resolve a key for the given scope.
    #[must_use]
    pub fn resolve(scope: Scope, path: &CommandPath, flag: &str) -> Self {
        Self {
            scope,
            path: path.clone(),
            flag: flag.to_string(),
        }
    }

    /// Key for a flag declared by `declared_at` and shared with its descendants.
    #[must_use]
    pub fn global(declared_at: &CommandPath, flag: &str) -> Self {
        Self::resolve(Scope::Global, declared_at, flag)
    }

    /// Key for a flag private to the command at `path`.
    #[must_use]
    pub fn local(path: &CommandPath, flag: &str) -> Self {
        Self::resolve(Scope::Local, path, flag)
    }

    /// Scope the key was resolved in.
    #[must_use]
    pub const fn scope(&self) -> Scope {
        self.scope
    }

    /// Command path the key is bound to.
    #[must_use]
    pub const fn path(&self) -> &CommandPath {
        &self.path
    }

    /// Flag name the key was resolved for.
    #[must_use]
    pub fn flag(&self) -> &str {
        &self.flag
    }

    /// Opaque string form. Every component is length-prefixed, so distinct keys never
    /// render to the same string regardless of the characters used in names.
    #[must_use]
    pub fn key(&self) -> String {
        let mut key = String::from(self.scope.tag());
        for segment in self.path.segments() {
            key.push(':');
            key.push_str(&segment.len().to_string());
            key.push('.');
            key.push_str(segment);
        }
        key.push('/');
        key.push_str(&self.flag.len().to_string());
        key.push('.');
        key.push_str(&self.flag);
        key
    }
}

impl Display for Namespace {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{}:{}/{}",
            self.scope.tag(),
            self.path.segments().join("."),
            self.flag
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[&str]) -> CommandPath {
        CommandPath::from_segments(segments.iter().copied())
    }

    #[test]
    fn sibling_commands_do_not_collide() {
        let get = path(&["cloudctl", "datacenter", "get"]);
        let delete = path(&["cloudctl", "datacenter", "delete"]);
        assert_ne!(Namespace::local(&get, "id"), Namespace::local(&delete, "id"));
        assert_ne!(
            Namespace::local(&get, "id").key(),
            Namespace::local(&delete, "id").key()
        );
    }

    #[test]
    fn global_and_local_keys_differ_for_same_input() {
        let parent = path(&["cloudctl", "natgateway"]);
        assert_ne!(
            Namespace::global(&parent, "datacenter-id"),
            Namespace::local(&parent, "datacenter-id")
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        let leaf = path(&["cloudctl", "k8s", "nodepool", "create"]);
        let first = Namespace::local(&leaf, "name");
        let second = Namespace::local(&leaf.clone(), "name");
        assert_eq!(first, second);
        assert_eq!(first.key(), second.key());
    }

    #[test]
    fn key_is_unambiguous_when_names_contain_separators() {
        let dotted = path(&["a.b", "c"]);
        let split = path(&["a", "b.c"]);
        assert_ne!(
            Namespace::local(&dotted, "x").key(),
            Namespace::local(&split, "x").key()
        );
    }

    #[test]
    fn lineage_walks_from_leaf_to_root() {
        let leaf = path(&["cloudctl", "k8s", "nodepool", "get"]);
        let lineage = leaf.lineage();
        assert_eq!(lineage.len(), 4);
        assert_eq!(lineage[0], leaf);
        assert_eq!(lineage[1], path(&["cloudctl", "k8s", "nodepool"]));
        assert_eq!(lineage[3], CommandPath::root("cloudctl"));
        assert_eq!(leaf.parent(), Some(lineage[1].clone()));
        assert!(CommandPath::root("cloudctl").parent().is_none());
    }

    #[test]
    fn label_joins_segments() {
        let leaf = path(&["cloudctl", "request", "wait"]);
        assert_eq!(leaf.label(), "cloudctl request wait");
        assert_eq!(leaf.leaf(), Some("wait"));
        assert_eq!(
            Namespace::local(&leaf, "request-id").to_string(),
            "l:cloudctl.request.wait/request-id"
        );
    }
}
