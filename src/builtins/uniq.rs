use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};

use crate::builtins::registry::{operands, CommandInfo, Streams};
use crate::engine::expand_home;
use crate::error::{EXIT_FAILURE, EXIT_USAGE};

pub const COMMAND_INFO: CommandInfo = CommandInfo {
    name: "uniq",
    description: "Print each distinct input line once.",
    usage: "uniq [-c|--count] [file]\n\nRead FILE (or standard input) and print every distinct line once, in the\norder it first appeared. With -c or --count, prefix each line with the\nnumber of times it occurred.",
    run,
};

/// Distinct lines in first-seen order, each with its number of occurrences.
pub fn tally<I>(lines: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = String>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for line in lines {
        let count = counts.entry(line).or_insert_with_key(|key| {
            order.push(key.clone());
            0
        });
        *count += 1;
    }
    order
        .into_iter()
        .map(|line| {
            let count = counts[&line];
            (line, count)
        })
        .collect()
}

pub fn run(argv: &[String], io: &mut Streams<'_>) -> i32 {
    let mut show_count = false;
    let mut file: Option<&str> = None;
    for arg in operands(argv) {
        match arg.as_str() {
            "-c" | "--count" => show_count = true,
            opt if opt.starts_with('-') && opt.len() > 1 => {
                let _ = writeln!(io.stderr, "shellax: uniq: unknown option `{}`", opt);
                return EXIT_USAGE;
            }
            path if file.is_none() => file = Some(path),
            extra => {
                let _ = writeln!(io.stderr, "shellax: uniq: extra operand `{}`", extra);
                return EXIT_USAGE;
            }
        }
    }

    let lines: io::Result<Vec<String>> = match file {
        Some(path) => match File::open(expand_home(path)) {
            Ok(f) => BufReader::new(f).lines().collect(),
            Err(e) => {
                let _ = writeln!(io.stderr, "shellax: uniq: {}: {}", path, e);
                return EXIT_FAILURE;
            }
        },
        None => (&mut *io.stdin).lines().collect(),
    };
    let lines = match lines {
        Ok(lines) => lines,
        Err(e) => {
            let _ = writeln!(io.stderr, "shellax: uniq: {}", e);
            return EXIT_FAILURE;
        }
    };

    for (line, count) in tally(lines) {
        let written = if show_count {
            writeln!(io.stdout, "{}  {}", count, line)
        } else {
            writeln!(io.stdout, "{}", line)
        };
        if written.is_err() {
            return EXIT_FAILURE;
        }
    }
    0
}
