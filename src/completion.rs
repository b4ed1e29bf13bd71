use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use rustyline::completion::Completer;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::builtins::registry::{BUILTINS, INTRINSICS};
use crate::engine::path::{expand_home, is_executable, search_path};

/// Redirect operators that may be glued to the front of a file name.
const OPERATORS: [&str; 3] = [">>", ">", "<"];

/// Complete the last word of `line`.
///
/// Returns the byte offset where that word starts together with the sorted
/// candidates. The first word of a pipeline segment completes against
/// built-ins and executables on `PATH`; any other word against file names.
pub fn candidates(line: &str) -> (usize, Vec<String>) {
    let start = line.rfind([' ', '\t', '|']).map_or(0, |i| i + 1);
    let word = &line[start..];
    let segment_start = line[..start].rfind('|').map_or(0, |i| i + 1);
    let in_command_position = line[segment_start..start].trim().is_empty()
        && !word.starts_with(['<', '>'])
        && !word.contains('/');

    let found = if in_command_position {
        command_names(word)
    } else {
        file_names(word)
    };
    (start, found.into_iter().collect())
}

fn command_names(prefix: &str) -> BTreeSet<String> {
    let mut names: BTreeSet<String> = BUILTINS
        .iter()
        .map(|cmd| cmd.name)
        .chain(INTRINSICS.iter().map(|(name, _)| *name))
        .filter(|name| name.starts_with(prefix))
        .map(String::from)
        .collect();

    for dir in std::env::split_paths(&search_path()) {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with(prefix) && is_executable(&entry.path()) {
                names.insert(name);
            }
        }
    }
    names
}

fn file_names(word: &str) -> BTreeSet<String> {
    let op = OPERATORS.iter().find(|op| word.starts_with(**op)).copied().unwrap_or("");
    let path = &word[op.len()..];
    let (dir, prefix) = match path.rfind('/') {
        Some(i) => path.split_at(i + 1),
        None => ("", path),
    };
    let search = if dir.is_empty() { PathBuf::from(".") } else { expand_home(dir) };

    let Ok(entries) = fs::read_dir(search) else {
        return BTreeSet::new();
    };
    entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            // Dotfiles only when asked for.
            if !name.starts_with(prefix) || (name.starts_with('.') && !prefix.starts_with('.')) {
                return None;
            }
            let slash = if entry.path().is_dir() { "/" } else { "" };
            Some(format!("{}{}{}{}", op, dir, name, slash))
        })
        .collect()
}

/// Handle a line that ended in `?`.
///
/// Several candidates are listed on `out`. Returns the text to pre-fill the
/// next prompt with: the line completed when the match is unique, otherwise
/// the line as typed without its `?`.
pub fn suggest(line: &str, out: &mut impl Write) -> io::Result<String> {
    let text = line.trim_end_matches([' ', '\t']);
    let text = text.strip_suffix('?').unwrap_or(text);
    let (start, found) = candidates(text);

    match found.as_slice() {
        [only] => {
            let space = if only.ends_with('/') { "" } else { " " };
            Ok(format!("{}{}{}", &text[..start], only, space))
        }
        [] => Ok(text.to_string()),
        many => {
            writeln!(out, "{}", many.join("  "))?;
            Ok(text.to_string())
        }
    }
}

/// Rustyline helper offering the same completion on Tab.
#[derive(Default)]
pub struct ShellHelper;

impl Completer for ShellHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        Ok(candidates(&line[..pos]))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}
