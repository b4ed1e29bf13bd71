use std::io::Write;

use crate::builtins::registry::{operands, CommandInfo, Streams};
use crate::error::{EXIT_FAILURE, EXIT_USAGE};

pub const COMMAND_INFO: CommandInfo = CommandInfo {
    name: "palindrome",
    description: "List the arguments that read the same backwards.",
    usage: "palindrome word ...\n\nPrint each palindromic WORD, numbered from 1.",
    run,
};

pub fn is_palindrome(word: &str) -> bool {
    let chars: Vec<char> = word.chars().collect();
    chars.iter().eq(chars.iter().rev())
}

pub fn run(argv: &[String], io: &mut Streams<'_>) -> i32 {
    let words = operands(argv);
    if words.is_empty() {
        let _ = writeln!(io.stderr, "shellax: palindrome: at least one word is required");
        return EXIT_USAGE;
    }
    match report(words, io.stdout) {
        Ok(()) => 0,
        Err(_) => EXIT_FAILURE,
    }
}

fn report(words: &[String], out: &mut dyn Write) -> std::io::Result<()> {
    let mut count = 0;
    for word in words.iter().filter(|w| is_palindrome(w)) {
        count += 1;
        writeln!(out, "{}. {}", count, word)?;
    }
    if count == 0 {
        writeln!(out, "There is no palindrome words in the arguments.")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::registry::testing::run_with;

    #[test]
    fn test_is_palindrome() {
        assert!(is_palindrome("level"));
        assert!(is_palindrome("abba"));
        assert!(is_palindrome("x"));
        assert!(is_palindrome("kayak"));
        assert!(!is_palindrome("shell"));
        assert!(!is_palindrome("ab"));
    }

    #[test]
    fn test_numbered_output() {
        let (code, out, _) = run_with(run, &["palindrome", "noon", "shell", "radar"], "");
        assert_eq!(code, 0);
        assert_eq!(out, "1. noon\n2. radar\n");
    }

    #[test]
    fn test_no_palindromes() {
        let (_, out, _) = run_with(run, &["palindrome", "pipe", "fork"], "");
        assert_eq!(out, "There is no palindrome words in the arguments.\n");
    }

    #[test]
    fn test_requires_arguments() {
        let (code, _, err) = run_with(run, &["palindrome"], "");
        assert_eq!(code, 2);
        assert!(err.contains("palindrome"));
    }
}
