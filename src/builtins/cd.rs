use std::env;
use std::path::PathBuf;

use crate::builtins::registry::{CommandInfo, Streams};
use crate::engine::{expand_home, ShellState};
use crate::error::ShellError;

pub const COMMAND_INFO_PWD: CommandInfo = CommandInfo {
    name: "pwd",
    description: "Print the name of the current working directory.",
    usage: "pwd\n\nPrint the absolute pathname of the current working directory.",
    run: pwd_runner,
};

pub fn pwd_runner(_argv: &[String], io: &mut Streams<'_>) -> i32 {
    match env::current_dir() {
        Ok(path) => match writeln!(io.stdout, "{}", path.display()) {
            Ok(()) => 0,
            Err(_) => 1,
        },
        Err(e) => {
            let _ = writeln!(io.stderr, "shellax: pwd: {}", e);
            1
        }
    }
}

/// The `cd` intrinsic. Runs in the shell process so the new directory sticks.
///
/// With no argument goes to the home directory; `-` returns to the previous
/// directory. Returns the directory to announce (only for `cd -`).
pub fn run(args: &[String], state: &mut ShellState) -> Result<Option<PathBuf>, ShellError> {
    let current = env::current_dir()?;

    let (target, announce) = match args.first().map(String::as_str) {
        None => (
            dirs::home_dir().ok_or_else(|| ShellError::DirectoryChangeFailed {
                path: PathBuf::from("~"),
                source: std::io::Error::other("could not find home directory"),
            })?,
            false,
        ),
        Some("-") => (
            state.previous_dir.clone().ok_or_else(|| ShellError::DirectoryChangeFailed {
                path: PathBuf::from("-"),
                source: std::io::Error::other("OLDPWD not set"),
            })?,
            true,
        ),
        Some(dir) => (expand_home(dir), false),
    };

    env::set_current_dir(&target).map_err(|source| ShellError::DirectoryChangeFailed {
        path: target.clone(),
        source,
    })?;

    state.previous_dir = Some(current);
    Ok(announce.then_some(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::registry::testing::run_with;

    #[test]
    fn test_pwd_prints_current_dir() {
        let (code, out, _) = run_with(pwd_runner, &["pwd"], "");
        assert_eq!(code, 0);
        assert_eq!(out.trim_end(), env::current_dir().unwrap().display().to_string());
    }

    #[test]
    fn test_cd_to_missing_dir_keeps_cwd() {
        let mut state = ShellState::new();
        let before = env::current_dir().unwrap();
        let err = run(&["/definitely/not/a/dir".to_string()], &mut state).unwrap_err();
        assert!(matches!(err, ShellError::DirectoryChangeFailed { .. }));
        assert_eq!(env::current_dir().unwrap(), before);
        assert!(state.previous_dir.is_none());
    }

    #[test]
    fn test_cd_dash_without_previous_dir() {
        let mut state = ShellState::new();
        assert!(run(&["-".to_string()], &mut state).is_err());
    }
}
