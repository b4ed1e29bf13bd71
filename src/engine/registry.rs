use std::path::PathBuf;

use crate::builtins::registry::{find_command, CommandInfo};

use super::path::find_executable;

/// Where a stage's program comes from. Resolved in the shell before forking.
pub enum Resolution {
    BuiltIn(&'static CommandInfo),
    External(PathBuf),
    NotFound,
}

/// Built-ins shadow executables of the same name.
pub fn resolve(name: &str) -> Resolution {
    if let Some(info) = find_command(name) {
        return Resolution::BuiltIn(info);
    }
    match find_executable(name) {
        Some(path) => Resolution::External(path),
        None => Resolution::NotFound,
    }
}
