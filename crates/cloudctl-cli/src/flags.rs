//! Populate the [`FlagStore`] from parsed `clap` matches.
//!
//! # Design
//! - Walks the invoked subcommand chain once. Non-global arguments are keyed locally to
//!   the command that declares them; global arguments are keyed to the first (outermost)
//!   command that declares them, so every descendant resolves the same key.
//! - Each value keeps its origin (`clap`'s value source), which is what required-flag
//!   validation looks at.
//! - Only the `try_*` accessors are used; an argument whose type does not match is skipped
//!   rather than panicking.

use std::collections::HashSet;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use cloudctl_config::{CommandPath, FlagSource, FlagStore, FlagValue, Namespace};

/// Invoked command path plus the flag snapshot for it.
#[derive(Debug)]
pub(crate) struct Invocation {
    pub(crate) path: CommandPath,
    pub(crate) flags: FlagStore,
}

/// Build the flag snapshot for the subcommand chain selected in `matches`.
pub(crate) fn collect(root: &Command, matches: &ArgMatches) -> Invocation {
    let mut levels: Vec<(CommandPath, &Command, &ArgMatches)> = Vec::new();
    let mut path = CommandPath::root(root.get_name());
    let mut command = root;
    let mut current = matches;
    loop {
        levels.push((path.clone(), command, current));
        let Some((name, sub_matches)) = current.subcommand() else {
            break;
        };
        let Some(sub_command) = command.find_subcommand(name) else {
            break;
        };
        path = path.child(name);
        command = sub_command;
        current = sub_matches;
    }

    let mut builder = FlagStore::builder();
    let mut globals_seen: HashSet<String> = HashSet::new();
    for (depth, (level_path, level_command, level_matches)) in levels.iter().enumerate() {
        for arg in level_command.get_arguments() {
            let id = arg.get_id().as_str();
            if arg.is_global_set() {
                if !globals_seen.insert(id.to_string()) {
                    continue;
                }
                // Deeper matches see the value the user typed after the subcommand.
                let found = levels[depth..]
                    .iter()
                    .rev()
                    .find_map(|(_, _, candidate)| read_value(arg, candidate));
                if let Some((value, source)) = found {
                    builder.insert(Namespace::global(level_path, flag_name(arg)), value, source);
                }
            } else if let Some((value, source)) = read_value(arg, level_matches) {
                builder.insert(Namespace::local(level_path, flag_name(arg)), value, source);
            }
        }
    }

    let path = levels
        .last()
        .map_or_else(|| CommandPath::root(root.get_name()), |(path, _, _)| path.clone());
    Invocation {
        path,
        flags: builder.build(),
    }
}

fn flag_name(arg: &Arg) -> &str {
    arg.get_long().unwrap_or_else(|| arg.get_id().as_str())
}

fn read_value(arg: &Arg, matches: &ArgMatches) -> Option<(FlagValue, FlagSource)> {
    let id = arg.get_id().as_str();
    if !matches.try_contains_id(id).unwrap_or(false) {
        return None;
    }
    let value = match arg.get_action() {
        ArgAction::SetTrue | ArgAction::SetFalse => matches
            .try_get_one::<bool>(id)
            .ok()
            .flatten()
            .map(|value| FlagValue::Bool(*value)),
        ArgAction::Count => matches
            .try_get_one::<u8>(id)
            .ok()
            .flatten()
            .map(|value| FlagValue::Int(i64::from(*value))),
        ArgAction::Set | ArgAction::Append => {
            let raw: Vec<String> = matches
                .try_get_raw(id)
                .ok()
                .flatten()?
                .map(|value| value.to_string_lossy().into_owned())
                .collect();
            let is_list = matches!(arg.get_action(), ArgAction::Append)
                || arg.get_value_delimiter().is_some()
                || raw.len() > 1;
            if is_list {
                Some(FlagValue::StringList(raw))
            } else {
                raw.into_iter().next().map(FlagValue::String)
            }
        }
        _ => None,
    }?;
    let source = match matches.value_source(id) {
        Some(ValueSource::DefaultValue) => FlagSource::Default,
        Some(ValueSource::EnvVariable) => FlagSource::Environment,
        _ => FlagSource::CommandLine,
    };
    Some((value, source))
}
