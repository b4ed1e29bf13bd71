use std::ffi::{OsStr, OsString};
use std::os::unix::fs::PermissionsExt;
use std::path::{Component, Path, PathBuf};

/// Used when `PATH` is unset.
pub const DEFAULT_SEARCH_PATH: &str = "/usr/local/bin:/usr/bin:/bin";

/// Normalize a path logically (resolving . and ..) without hitting the disk.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                // At root, .. does nothing
                Some(Component::RootDir) => {}
                _ => normalized.push(Component::ParentDir),
            },
            _ => normalized.push(component),
        }
    }

    if normalized.as_os_str().is_empty() {
        normalized.push(Component::CurDir);
    }

    normalized
}

/// Expand `~` to the home directory and normalize the resulting path.
pub fn expand_home(path_str: &str) -> PathBuf {
    if path_str == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path_str.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return normalize_path(&home.join(rest));
        }
    }
    normalize_path(Path::new(path_str))
}

/// Locate the executable for `cmd`.
///
/// Names containing a `/` are taken as a path; anything else is looked up in
/// each directory of `search_path` in order.
pub fn find_executable_in(cmd: &str, search_path: &OsStr) -> Option<PathBuf> {
    if cmd.is_empty() {
        return None;
    }
    if cmd.contains('/') {
        return check_path(expand_home(cmd));
    }
    std::env::split_paths(search_path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .find_map(|dir| check_path(dir.join(cmd)))
}

/// The process `PATH`, or the default search path when it is unset.
pub fn search_path() -> OsString {
    std::env::var_os("PATH").unwrap_or_else(|| DEFAULT_SEARCH_PATH.into())
}

/// [`find_executable_in`] against the process `PATH`.
pub fn find_executable(cmd: &str) -> Option<PathBuf> {
    find_executable_in(cmd, &search_path())
}

/// A regular file with at least one execute bit set.
pub fn is_executable(p: &Path) -> bool {
    p.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

fn check_path(p: PathBuf) -> Option<PathBuf> {
    is_executable(&p).then_some(p)
}
