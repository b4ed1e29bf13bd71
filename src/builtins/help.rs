use std::io::Write;

use crate::builtins::registry::{find_command, operands, CommandInfo, Streams, BUILTINS, INTRINSICS};
use crate::error::EXIT_FAILURE;

pub const COMMAND_INFO: CommandInfo = CommandInfo {
    name: "help",
    description: "Display information about builtin commands.",
    usage: "help [name ...]\n\nWithout NAME, list the builtins and their descriptions.\nWith NAME, print the usage of that builtin.",
    run: help_runner,
};

pub fn help_runner(argv: &[String], io: &mut Streams<'_>) -> i32 {
    let names = operands(argv);
    if names.is_empty() {
        return match write_overview(io.stdout) {
            Ok(()) => 0,
            Err(_) => EXIT_FAILURE,
        };
    }

    let mut exit_code = 0;
    for name in names {
        let written = if let Some(cmd) = find_command(name) {
            writeln!(io.stdout, "{}: {}\n{}", cmd.name, cmd.description, cmd.usage)
        } else if let Some((intrinsic, description)) = INTRINSICS.iter().find(|(n, _)| n == name) {
            writeln!(io.stdout, "{}: {}", intrinsic, description)
        } else {
            let _ = writeln!(io.stderr, "shellax: help: no help topics match `{}`", name);
            exit_code = EXIT_FAILURE;
            Ok(())
        };
        if written.is_err() {
            return EXIT_FAILURE;
        }
    }
    exit_code
}

fn write_overview(out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "shellax, version {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "These commands are built into the shell. Type `help name` for details.")?;
    writeln!(out)?;

    let entries = INTRINSICS
        .iter()
        .copied()
        .chain(BUILTINS.iter().map(|b| (b.name, b.description)));
    let width = entries.clone().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, description) in entries {
        writeln!(out, " {:<width$}  {}", name, description, width = width)?;
    }
    Ok(())
}
