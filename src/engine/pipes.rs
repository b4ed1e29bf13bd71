use std::os::fd::{AsRawFd, OwnedFd};

use nix::unistd::pipe;

use crate::error::ShellError;

/// One unidirectional pipe between two adjacent stages.
#[derive(Debug)]
pub struct Pipe {
    pub read: OwnedFd,
    pub write: OwnedFd,
}

/// All inter-stage pipes of one pipeline run. Pipe `i` carries the output of
/// stage `i` into stage `i + 1`.
///
/// Dropping the table closes every descriptor it still owns.
#[derive(Debug, Default)]
pub struct PipeTable {
    pipes: Vec<Pipe>,
}

impl PipeTable {
    /// Allocate the `stages - 1` pipes a chain of `stages` commands needs.
    /// On failure the pipes created so far are closed again.
    pub fn build(stages: usize) -> Result<Self, ShellError> {
        let mut pipes = Vec::with_capacity(stages.saturating_sub(1));
        for _ in 1..stages {
            let (read, write) = pipe().map_err(|errno| ShellError::ResourceExhausted {
                what: "pipe",
                source: errno.into(),
            })?;
            pipes.push(Pipe { read, write });
        }
        Ok(PipeTable { pipes })
    }

    /// Read end that feeds stage `index`, if it is not the first stage.
    pub fn stdin_for(&self, index: usize) -> Option<&OwnedFd> {
        index.checked_sub(1).and_then(|i| self.pipes.get(i)).map(|p| &p.read)
    }

    /// Write end stage `index` writes into, if it is not the last stage.
    pub fn stdout_for(&self, index: usize) -> Option<&OwnedFd> {
        self.pipes.get(index).map(|p| &p.write)
    }

    /// Close every descriptor in the table without giving up ownership.
    ///
    /// Only for a forked child that is about to exec or `_exit`: the
    /// `OwnedFd`s must never be dropped afterwards.
    pub fn close_inherited(&self) {
        for p in &self.pipes {
            for fd in [&p.read, &p.write] {
                unsafe {
                    nix::libc::close(fd.as_raw_fd());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::{Read, Write};

    #[test]
    fn test_single_stage_needs_no_pipes() {
        let table = PipeTable::build(1).unwrap();
        assert!(table.pipes.is_empty());
        assert!(table.stdin_for(0).is_none());
        assert!(table.stdout_for(0).is_none());
    }

    #[test]
    fn test_boundaries() {
        let table = PipeTable::build(3).unwrap();
        assert_eq!(table.pipes.len(), 2);

        assert!(table.stdin_for(0).is_none());
        assert!(table.stdout_for(0).is_some());
        assert!(table.stdin_for(1).is_some());
        assert!(table.stdout_for(1).is_some());
        assert!(table.stdin_for(2).is_some());
        assert!(table.stdout_for(2).is_none());

        assert_eq!(
            table.stdout_for(0).unwrap().as_raw_fd(),
            table.pipes[0].write.as_raw_fd()
        );
        assert_eq!(
            table.stdin_for(1).unwrap().as_raw_fd(),
            table.pipes[0].read.as_raw_fd()
        );
    }

    #[test]
    fn test_data_flows_and_eof_after_drop() {
        let table = PipeTable::build(2).unwrap();
        let Pipe { read, write } = table.pipes.into_iter().next().unwrap();

        let mut writer = File::from(write);
        writer.write_all(b"through the pipe").unwrap();
        drop(writer);

        let mut text = String::new();
        File::from(read).read_to_string(&mut text).unwrap();
        assert_eq!(text, "through the pipe");
    }

    /// Descriptors below `upto` that are currently open.
    fn open_fds(upto: i32) -> Vec<i32> {
        (0..upto)
            .filter(|&fd| unsafe { nix::libc::fcntl(fd, nix::libc::F_GETFD) } != -1)
            .collect()
    }

    /// Run in a forked child so the lowered descriptor limit stays there.
    /// Exit status 0 means the partial table was closed again.
    fn build_under_tight_limit() -> i32 {
        use nix::libc::{getrlimit, rlim_t, rlimit, setrlimit, RLIMIT_NOFILE};

        let before = open_fds(4096);
        let highest = before.last().copied().unwrap_or(2);
        let mut limit = rlimit { rlim_cur: 0, rlim_max: 0 };
        if unsafe { getrlimit(RLIMIT_NOFILE, &mut limit) } != 0 {
            return 3;
        }
        // Room for a few pipes, not for a hundred.
        limit.rlim_cur = (highest + 1 + 6) as rlim_t;
        if unsafe { setrlimit(RLIMIT_NOFILE, &limit) } != 0 {
            return 3;
        }

        match PipeTable::build(100) {
            Ok(_) => 1,
            Err(ShellError::ResourceExhausted { what: "pipe", .. }) => {
                if open_fds(4096) == before { 0 } else { 2 }
            }
            Err(_) => 4,
        }
    }

    #[test]
    fn test_failed_build_releases_created_pipes() {
        use nix::sys::wait::{waitpid, WaitStatus};
        use nix::unistd::{fork, ForkResult};

        match unsafe { fork() }.unwrap() {
            ForkResult::Child => {
                let code = build_under_tight_limit();
                unsafe { nix::libc::_exit(code) }
            }
            ForkResult::Parent { child } => {
                assert_eq!(waitpid(child, None).unwrap(), WaitStatus::Exited(child, 0));
            }
        }
    }
}
