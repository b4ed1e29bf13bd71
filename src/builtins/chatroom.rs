use std::fs::{self, DirBuilder, OpenOptions};
use std::io::{self, BufRead, Read, Write};
use std::os::unix::fs::{DirBuilderExt, FileTypeExt, OpenOptionsExt};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use nix::sys::signal::{kill, Signal};
use nix::sys::stat::Mode;
use nix::sys::wait::waitpid;
use nix::unistd::{fork, mkfifo, ForkResult};

use crate::builtins::registry::{operands, CommandInfo, Streams};
use crate::error::{ShellError, EXIT_FAILURE, EXIT_USAGE};

pub const COMMAND_INFO: CommandInfo = CommandInfo {
    name: "chatroom",
    description: "Chat with other local users through named pipes.",
    usage: "chatroom room user\n\nJoin ROOM as USER. Every line typed is sent to the other members;\ntype `exit` (or Ctrl-D) to leave.",
    run,
};

/// Directory holding one FIFO per member of `room`.
pub fn room_dir(room: &str) -> PathBuf {
    PathBuf::from(format!("/tmp/chatroom-{}", room))
}

pub fn format_message(room: &str, user: &str, text: &str, at: DateTime<Local>) -> String {
    format!("[{}] [{}] {}: {}", at.format("%H:%M:%S"), room, user, text)
}

pub fn run(argv: &[String], io: &mut Streams<'_>) -> i32 {
    let [room, user] = operands(argv) else {
        let _ = writeln!(io.stderr, "shellax: chatroom: usage: chatroom room user");
        return EXIT_USAGE;
    };
    if [room, user].iter().any(|s| s.is_empty() || s.contains('/')) {
        let _ = writeln!(io.stderr, "shellax: chatroom: room and user names may not contain `/`");
        return EXIT_USAGE;
    }
    match join(room, user, io) {
        Ok(()) => 0,
        Err(e) => {
            let _ = writeln!(io.stderr, "shellax: chatroom: {}", e);
            EXIT_FAILURE
        }
    }
}

fn join(room: &str, user: &str, io: &mut Streams<'_>) -> Result<(), ShellError> {
    let dir = room_dir(room);
    DirBuilder::new().recursive(true).mode(0o700).create(&dir)?;

    let inbox = dir.join(user);
    if !inbox.exists() {
        mkfifo(&inbox, Mode::S_IRUSR | Mode::S_IWUSR).map_err(io::Error::from)?;
    }

    writeln!(io.stdout, "Welcome to {}!", room)?;
    io.stdout.flush()?;

    // SAFETY: the child only relays bytes and then `_exit`s.
    let reader = match unsafe { fork() } {
        Ok(ForkResult::Child) => {
            let _ = relay(&inbox, io.stdout);
            unsafe { nix::libc::_exit(0) }
        }
        Ok(ForkResult::Parent { child }) => child,
        Err(errno) => {
            return Err(ShellError::ResourceExhausted { what: "process", source: errno.into() });
        }
    };

    let result = send_loop(room, user, &dir, io);

    let _ = kill(reader, Signal::SIGTERM);
    let _ = waitpid(reader, None);
    let _ = fs::remove_file(&inbox);
    result
}

/// Copy everything arriving on `inbox` to `out`. The FIFO is opened
/// read-write so it never reports EOF when the last sender leaves.
fn relay(inbox: &Path, out: &mut dyn Write) -> io::Result<()> {
    let mut fifo = OpenOptions::new().read(true).write(true).open(inbox)?;
    let mut buf = [0u8; 1024];
    loop {
        let n = fifo.read(&mut buf)?;
        if n == 0 {
            return Ok(());
        }
        out.write_all(&buf[..n])?;
        out.flush()?;
    }
}

fn send_loop(room: &str, user: &str, dir: &Path, io: &mut Streams<'_>) -> Result<(), ShellError> {
    for line in (&mut *io.stdin).lines() {
        let line = line?;
        if line.trim() == "exit" {
            break;
        }
        let message = format_message(room, user, &line, Local::now());
        writeln!(io.stdout, "{}", message)?;
        io.stdout.flush()?;
        broadcast(dir, user, &message)?;
    }
    Ok(())
}

/// Deliver `message` to every other member's FIFO. Members whose FIFO has no
/// reader attached are skipped.
fn broadcast(dir: &Path, sender: &str, message: &str) -> io::Result<usize> {
    let mut delivered = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name() == sender || !entry.file_type()?.is_fifo() {
            continue;
        }
        let opened = OpenOptions::new()
            .write(true)
            .custom_flags(nix::libc::O_NONBLOCK)
            .open(entry.path());
        if let Ok(mut fifo) = opened {
            if writeln!(fifo, "{}", message).is_ok() {
                delivered += 1;
            }
        }
    }
    Ok(delivered)
}
