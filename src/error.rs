use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::parser::RedirectRole;

/// Generic failure, also used when a redirect target cannot be opened.
pub const EXIT_FAILURE: i32 = 1;
/// Bad usage of a built-in or a malformed line.
pub const EXIT_USAGE: i32 = 2;
/// The stage could not be started at all.
pub const EXIT_CANNOT_LAUNCH: i32 = 126;
pub const EXIT_NOT_FOUND: i32 = 127;
/// Added to the signal number for stages killed by a signal.
pub const EXIT_SIGNAL_BASE: i32 = 128;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("syntax error: {0}")]
    ParseAmbiguity(String),

    #[error("cannot create {what}: {source}")]
    ResourceExhausted {
        what: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{path}: {source}")]
    RedirectionOpenFailed {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("missing file name for {0} redirection")]
    MissingRedirectTarget(RedirectRole),

    #[error("{reason}")]
    ExecutableNotFound { reason: String },

    #[error("{}: {source}", .path.display())]
    DirectoryChangeFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ShellError {
    pub fn not_found() -> Self {
        ShellError::ExecutableNotFound { reason: "command not found".to_string() }
    }

    /// Exit status a stage reports when it dies of this error.
    pub fn exit_status(&self) -> i32 {
        match self {
            ShellError::ParseAmbiguity(_) | ShellError::MissingRedirectTarget(_) => EXIT_USAGE,
            ShellError::ResourceExhausted { .. } => EXIT_CANNOT_LAUNCH,
            ShellError::ExecutableNotFound { .. } => EXIT_NOT_FOUND,
            ShellError::RedirectionOpenFailed { .. }
            | ShellError::DirectoryChangeFailed { .. }
            | ShellError::Io(_) => EXIT_FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_statuses() {
        assert_eq!(ShellError::not_found().exit_status(), 127);
        assert_eq!(ShellError::MissingRedirectTarget(RedirectRole::Output).exit_status(), 2);
        let open = ShellError::RedirectionOpenFailed {
            path: "nope".to_string(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(open.exit_status(), 1);
    }

    #[test]
    fn test_messages_name_the_cause() {
        let err = ShellError::MissingRedirectTarget(RedirectRole::AppendOutput);
        assert_eq!(err.to_string(), "missing file name for append redirection");

        let err = ShellError::DirectoryChangeFailed {
            path: PathBuf::from("/no/such"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(err.to_string().starts_with("/no/such: "));
    }
}
