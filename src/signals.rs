use nix::sys::signal::{signal, SigHandler, Signal};

/// Job-control signals the interactive shell itself must survive.
const SHELL_IGNORED: [Signal; 5] = [
    Signal::SIGINT,
    Signal::SIGQUIT,
    Signal::SIGTSTP,
    Signal::SIGTTIN,
    Signal::SIGTTOU,
];

/// Ignore the job-control signals so Ctrl+C or Ctrl+\ only reach the
/// foreground stages. Rustyline takes over SIGINT while reading a line.
pub fn init() -> nix::Result<()> {
    for sig in SHELL_IGNORED {
        unsafe { signal(sig, SigHandler::SigIgn) }?;
    }
    Ok(())
}

/// Give a forked stage the default dispositions back. SIGPIPE is included
/// so a writer whose reader exited dies instead of looping on EPIPE.
pub fn restore_default() {
    for sig in SHELL_IGNORED.into_iter().chain([Signal::SIGPIPE]) {
        let _ = unsafe { signal(sig, SigHandler::SigDfl) };
    }
}
