use std::io::{BufRead, Write};

use crate::builtins;

/// The standard streams a built-in handler reads from and writes to.
///
/// Inside a pipeline these are the stage's wired descriptors; in tests they
/// are in-memory buffers.
pub struct Streams<'a> {
    pub stdin: &'a mut dyn BufRead,
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
}

/// A built-in receives the full argument vector (element 0 is its own name)
/// and returns the stage's exit status.
pub type BuiltinHandler = fn(&[String], &mut Streams<'_>) -> i32;

pub struct CommandInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub run: BuiltinHandler,
}

pub const BUILTINS: &[CommandInfo] = &[
    builtins::chatroom::COMMAND_INFO,
    builtins::echo::COMMAND_INFO,
    builtins::help::COMMAND_INFO,
    builtins::mycp::COMMAND_INFO,
    builtins::palindrome::COMMAND_INFO,
    builtins::cd::COMMAND_INFO_PWD,
    builtins::uniq::COMMAND_INFO,
];

/// Commands the supervisor runs inside the shell process itself.
pub const INTRINSICS: &[(&str, &str)] = &[
    ("cd", "Change the shell working directory."),
    ("exit", "Exit the shell."),
];

pub fn find_command(name: &str) -> Option<&'static CommandInfo> {
    BUILTINS.iter().find(|cmd| cmd.name == name)
}

/// Skip the command name in an argument vector.
pub fn operands(argv: &[String]) -> &[String] {
    argv.get(1..).unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Run `handler` against in-memory streams; returns (status, stdout, stderr).
    pub fn run_with(handler: BuiltinHandler, argv: &[&str], input: &str) -> (i32, String, String) {
        let argv: Vec<String> = argv.iter().map(|s| s.to_string()).collect();
        let mut stdin = input.as_bytes();
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = handler(
            &argv,
            &mut Streams { stdin: &mut stdin, stdout: &mut stdout, stderr: &mut stderr },
        );
        (
            code,
            String::from_utf8(stdout).unwrap(),
            String::from_utf8(stderr).unwrap(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_command() {
        assert!(find_command("uniq").is_some());
        assert!(find_command("palindrome").is_some());
        assert!(find_command("cd").is_none());
        assert!(find_command("ls").is_none());
    }

    #[test]
    fn test_names_are_unique() {
        for (i, a) in BUILTINS.iter().enumerate() {
            assert!(BUILTINS[i + 1..].iter().all(|b| b.name != a.name), "{}", a.name);
        }
    }

    #[test]
    fn test_operands() {
        let argv = vec!["echo".to_string(), "x".to_string()];
        assert_eq!(operands(&argv), ["x".to_string()]);
        assert!(operands(&[]).is_empty());
    }
}
