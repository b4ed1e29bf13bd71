use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;

use crate::error::ShellError;
use crate::parser::{RedirectRole, Redirections};

use super::path::expand_home;

/// Permission bits for files created by `>` and `>>`.
const CREATE_MODE: u32 = 0o644;

fn target(role: RedirectRole, path: &str) -> Result<std::path::PathBuf, ShellError> {
    if path.is_empty() {
        return Err(ShellError::MissingRedirectTarget(role));
    }
    Ok(expand_home(path))
}

fn open_failed(path: &str) -> impl FnOnce(std::io::Error) -> ShellError + '_ {
    move |source| ShellError::RedirectionOpenFailed { path: path.to_string(), source }
}

/// Open the file for a `<` redirect (stdin).
pub fn open_stdin_redirect(path: &str) -> Result<File, ShellError> {
    let resolved = target(RedirectRole::Input, path)?;
    File::open(resolved).map_err(open_failed(path))
}

/// Open the file for a `>` (truncate) or `>>` (append) redirect.
pub fn open_stdout_redirect(role: RedirectRole, path: &str) -> Result<File, ShellError> {
    let resolved = target(role, path)?;
    let mut options = OpenOptions::new();
    options.create(true).mode(CREATE_MODE);
    match role {
        RedirectRole::AppendOutput => options.append(true),
        _ => options.write(true).truncate(true),
    };
    options.open(resolved).map_err(open_failed(path))
}

/// Pick the stdout redirect that applies: `>` wins over `>>` when a stage
/// names both.
pub fn resolve_stdout(redirects: &Redirections) -> Option<(RedirectRole, &str)> {
    [RedirectRole::Output, RedirectRole::AppendOutput]
        .into_iter()
        .find_map(|role| redirects.get(role).map(|path| (role, path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    #[test]
    fn test_truncate_then_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let path = path.to_str().unwrap();

        open_stdout_redirect(RedirectRole::Output, path).unwrap().write_all(b"one\n").unwrap();
        open_stdout_redirect(RedirectRole::AppendOutput, path).unwrap().write_all(b"two\n").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "one\ntwo\n");

        open_stdout_redirect(RedirectRole::Output, path).unwrap().write_all(b"three\n").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "three\n");
    }

    #[test]
    fn test_created_file_mode() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh");
        open_stdout_redirect(RedirectRole::Output, path.to_str().unwrap()).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        // The process umask can only clear bits.
        assert_eq!(mode & !0o644, 0);
    }

    #[test]
    fn test_stdin_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.txt");
        std::fs::write(&path, "data").unwrap();
        let mut text = String::new();
        open_stdin_redirect(path.to_str().unwrap()).unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "data");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            open_stdin_redirect(""),
            Err(ShellError::MissingRedirectTarget(RedirectRole::Input))
        ));
        assert!(matches!(
            open_stdin_redirect("/definitely/not/here"),
            Err(ShellError::RedirectionOpenFailed { .. })
        ));
    }

    #[test]
    fn test_resolve_stdout_prefers_truncate() {
        let mut redirects = Redirections::default();
        assert_eq!(resolve_stdout(&redirects), None);
        redirects.set(RedirectRole::AppendOutput, "log");
        assert_eq!(resolve_stdout(&redirects), Some((RedirectRole::AppendOutput, "log")));
        redirects.set(RedirectRole::Output, "out");
        assert_eq!(resolve_stdout(&redirects), Some((RedirectRole::Output, "out")));
    }
}
