use crate::builtins::registry::{operands, CommandInfo, Streams};

pub const COMMAND_INFO: CommandInfo = CommandInfo {
    name: "echo",
    description: "Write arguments to the standard output.",
    usage: "echo [arg ...]",
    run,
};

pub fn run(argv: &[String], io: &mut Streams<'_>) -> i32 {
    match writeln!(io.stdout, "{}", operands(argv).join(" ")) {
        Ok(()) => 0,
        Err(_) => 1,
    }
}
