use std::ffi::CString;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::mem::ManuallyDrop;
use std::os::fd::{AsRawFd, FromRawFd, RawFd};
use std::os::unix::ffi::OsStrExt;

use nix::errno::Errno;
use nix::libc::{self, STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO};
use nix::unistd::{execv, fork, ForkResult, Pid};

use crate::builtins::registry::{CommandInfo, Streams};
use crate::error::{ShellError, EXIT_NOT_FOUND};
use crate::parser::{RedirectRole, Stage};
use crate::signals;

use super::pipes::PipeTable;
use super::redirect::{open_stdin_redirect, open_stdout_redirect, resolve_stdout};
use super::registry::{resolve, Resolution};

/// What the child will run, prepared in the shell so the forked child does
/// not allocate before `execv`.
enum Program {
    BuiltIn(&'static CommandInfo),
    Exec { path: CString, argv: Vec<CString> },
    NotFound,
}

fn prepare(stage: &Stage) -> Result<Program, ShellError> {
    Ok(match resolve(&stage.name) {
        Resolution::BuiltIn(info) => Program::BuiltIn(info),
        Resolution::External(path) => Program::Exec {
            path: CString::new(path.as_os_str().as_bytes()).map_err(io::Error::from)?,
            argv: stage
                .args
                .iter()
                .map(|arg| CString::new(arg.as_bytes()))
                .collect::<Result<_, _>>()
                .map_err(io::Error::from)?,
        },
        Resolution::NotFound => Program::NotFound,
    })
}

/// Fork one process for stage `index` of the chain and return its pid.
///
/// The child wires its standard streams from `pipes` and the stage's
/// redirects, closes every other pipe descriptor, then either runs the
/// built-in handler or execs the program. It never returns into the shell.
pub fn launch(
    stage: &Stage,
    index: usize,
    pipes: &PipeTable,
    background: bool,
) -> Result<Pid, ShellError> {
    let program = prepare(stage)?;

    // Anything still buffered would be written twice.
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();

    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => Ok(child),
        Ok(ForkResult::Child) => {
            let code = run_child(stage, index, pipes, background, &program);
            unsafe { libc::_exit(code) }
        }
        Err(errno) => Err(ShellError::ResourceExhausted { what: "process", source: errno.into() }),
    }
}

fn run_child(
    stage: &Stage,
    index: usize,
    pipes: &PipeTable,
    background: bool,
    program: &Program,
) -> i32 {
    signals::restore_default();

    let wired = wire(stage, index, pipes, background);
    pipes.close_inherited();
    if let Err(e) = wired {
        report(format_args!("shellax: {}: {}", stage.name, e));
        return e.exit_status();
    }

    match program {
        Program::BuiltIn(info) => run_builtin(info, &stage.args),
        Program::Exec { path, argv } => {
            let Err(errno) = execv(path, argv.as_slice());
            report(format_args!("shellax: {}: {}", stage.name, errno.desc()));
            EXIT_NOT_FOUND
        }
        Program::NotFound => {
            report(format_args!("shellax: {}: {}", stage.name, ShellError::not_found()));
            EXIT_NOT_FOUND
        }
    }
}

/// Point stdin and stdout at the stage's pipe ends, then let explicit
/// redirects override them.
fn wire(stage: &Stage, index: usize, pipes: &PipeTable, background: bool) -> Result<(), ShellError> {
    if let Some(read) = pipes.stdin_for(index) {
        dup_onto(read.as_raw_fd(), STDIN_FILENO)?;
    } else if background && stage.redirects.get(RedirectRole::Input).is_none() {
        // A background job must not compete with the prompt for the terminal.
        let null = File::open("/dev/null")?;
        dup_onto(null.as_raw_fd(), STDIN_FILENO)?;
    }
    if let Some(write) = pipes.stdout_for(index) {
        dup_onto(write.as_raw_fd(), STDOUT_FILENO)?;
    }

    if let Some(path) = stage.redirects.get(RedirectRole::Input) {
        let file = open_stdin_redirect(path)?;
        dup_onto(file.as_raw_fd(), STDIN_FILENO)?;
    }
    if let Some((role, path)) = resolve_stdout(&stage.redirects) {
        let file = open_stdout_redirect(role, path)?;
        dup_onto(file.as_raw_fd(), STDOUT_FILENO)?;
    }
    Ok(())
}

fn dup_onto(from: RawFd, to: RawFd) -> Result<(), ShellError> {
    Errno::result(unsafe { libc::dup2(from, to) })
        .map(drop)
        .map_err(|errno| ShellError::Io(errno.into()))
}

/// Borrow a standard descriptor as a `File` without taking ownership.
/// The child avoids `std::io::stdout()` because its lock may have been held
/// by another thread at fork time.
fn raw_stream(fd: RawFd) -> ManuallyDrop<File> {
    ManuallyDrop::new(unsafe { File::from_raw_fd(fd) })
}

fn report(message: std::fmt::Arguments<'_>) {
    let stderr = raw_stream(STDERR_FILENO);
    let _ = writeln!(&*stderr, "{}", message);
}

fn run_builtin(info: &CommandInfo, argv: &[String]) -> i32 {
    let stdin = raw_stream(STDIN_FILENO);
    let stdout = raw_stream(STDOUT_FILENO);
    let stderr = raw_stream(STDERR_FILENO);

    let mut input = BufReader::new(&*stdin);
    let mut output = BufWriter::new(&*stdout);
    let mut errors = &*stderr;

    let code = (info.run)(
        argv,
        &mut Streams { stdin: &mut input, stdout: &mut output, stderr: &mut errors },
    );
    let _ = output.flush();
    code
}
