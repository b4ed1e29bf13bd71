use std::fs;

use crate::builtins::registry::{operands, CommandInfo, Streams};
use crate::engine::expand_home;
use crate::error::{EXIT_FAILURE, EXIT_USAGE};

pub const COMMAND_INFO: CommandInfo = CommandInfo {
    name: "mycp",
    description: "Copy a file.",
    usage: "mycp source destination\n\nCopy SOURCE to DESTINATION, replacing it if it exists.",
    run,
};

pub fn run(argv: &[String], io: &mut Streams<'_>) -> i32 {
    let [src, dst] = operands(argv) else {
        let _ = writeln!(io.stderr, "shellax: mycp: two file names must be given");
        return EXIT_USAGE;
    };
    if src == dst {
        let _ = writeln!(io.stderr, "shellax: mycp: file names must be different");
        return EXIT_USAGE;
    }
    match fs::copy(expand_home(src), expand_home(dst)) {
        Ok(_) => 0,
        Err(e) => {
            let _ = writeln!(io.stderr, "shellax: mycp: {}: {}", src, e);
            EXIT_FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::registry::testing::run_with;

    #[test]
    fn test_copies_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.txt");
        let dst = dir.path().join("b.txt");
        fs::write(&src, "payload\n").unwrap();

        let (code, _, _) = run_with(run, &["mycp", src.to_str().unwrap(), dst.to_str().unwrap()], "");
        assert_eq!(code, 0);
        assert_eq!(fs::read_to_string(dst).unwrap(), "payload\n");
    }

    #[test]
    fn test_usage_errors() {
        assert_eq!(run_with(run, &["mycp", "only-one"], "").0, 2);
        assert_eq!(run_with(run, &["mycp", "same", "same"], "").0, 2);
    }

    #[test]
    fn test_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("b.txt");
        let (code, _, err) = run_with(run, &["mycp", "/no/such/file", dst.to_str().unwrap()], "");
        assert_eq!(code, 1);
        assert!(err.contains("/no/such/file"));
    }
}
