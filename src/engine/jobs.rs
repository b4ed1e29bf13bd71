use std::collections::BTreeMap;

use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use crate::error::{EXIT_FAILURE, EXIT_SIGNAL_BASE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running,
    Done(i32),
}

#[derive(Debug, Clone)]
pub struct ProcessInfo {
    pub pid: Pid,
    pub state: JobState,
}

/// A backgrounded pipeline whose processes have not all been reaped yet.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: usize,
    pub command: String,
    pub processes: Vec<ProcessInfo>,
}

impl Job {
    pub fn is_done(&self) -> bool {
        self.processes.iter().all(|p| matches!(p.state, JobState::Done(_)))
    }

    /// Status of the first process that failed, or 0.
    pub fn exit_code(&self) -> i32 {
        self.processes
            .iter()
            .find_map(|p| match p.state {
                JobState::Done(code) if code != 0 => Some(code),
                _ => None,
            })
            .unwrap_or(0)
    }

    fn poll(&mut self, flags: Option<WaitPidFlag>) {
        for process in &mut self.processes {
            if process.state == JobState::Running {
                if let Some(code) = collect(process.pid, flags) {
                    process.state = JobState::Done(code);
                }
            }
        }
    }
}

/// Translate a wait status into a shell exit code.
pub fn status_code(status: WaitStatus) -> Option<i32> {
    match status {
        WaitStatus::Exited(_, code) => Some(code),
        WaitStatus::Signaled(_, sig, _) => Some(EXIT_SIGNAL_BASE + sig as i32),
        _ => None,
    }
}

/// Wait on one pid. Returns `None` only for `WNOHANG` polls of a process
/// that is still alive.
fn collect(pid: Pid, flags: Option<WaitPidFlag>) -> Option<i32> {
    loop {
        match waitpid(pid, flags) {
            Ok(WaitStatus::StillAlive) => return None,
            Ok(status) => {
                if let Some(code) = status_code(status) {
                    return Some(code);
                }
            }
            Err(Errno::EINTR) => {}
            // The status is lost (typically ECHILD), so it cannot count as success.
            Err(errno) => {
                eprintln!("shellax: wait {}: {}", pid, errno.desc());
                return Some(EXIT_FAILURE);
            }
        }
    }
}

/// Block until `pid` terminates and return its exit code.
pub fn wait_for(pid: Pid) -> i32 {
    collect(pid, None).unwrap_or(0)
}

/// Background pipelines awaiting reaping, keyed by job id.
#[derive(Debug)]
pub struct JobTable {
    jobs: BTreeMap<usize, Job>,
    next_id: usize,
}

impl Default for JobTable {
    fn default() -> Self {
        JobTable { jobs: BTreeMap::new(), next_id: 1 }
    }
}

impl JobTable {
    pub fn register(&mut self, pids: Vec<Pid>, command: String) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        let processes = pids
            .into_iter()
            .map(|pid| ProcessInfo { pid, state: JobState::Running })
            .collect();
        self.jobs.insert(id, Job { id, command, processes });
        id
    }

    /// Collect every finished background process without blocking and hand
    /// back the jobs that completed.
    pub fn reap(&mut self) -> Vec<Job> {
        self.sweep(Some(WaitPidFlag::WNOHANG))
    }

    /// Wait for every registered job to finish.
    pub fn reap_blocking(&mut self) -> Vec<Job> {
        self.sweep(None)
    }

    fn sweep(&mut self, flags: Option<WaitPidFlag>) -> Vec<Job> {
        for job in self.jobs.values_mut() {
            job.poll(flags);
        }
        let done: Vec<usize> = self
            .jobs
            .iter()
            .filter(|(_, job)| job.is_done())
            .map(|(&id, _)| id)
            .collect();
        done.into_iter().filter_map(|id| self.jobs.remove(&id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    fn spawn(program: &str, args: &[&str]) -> Pid {
        let child = Command::new(program).args(args).spawn().unwrap();
        Pid::from_raw(child.id() as i32)
    }

    #[test]
    fn test_wait_for_exit_code() {
        assert_eq!(wait_for(spawn("true", &[])), 0);
        assert_eq!(wait_for(spawn("false", &[])), 1);
        assert_eq!(wait_for(spawn("sh", &["-c", "exit 7"])), 7);
    }

    #[test]
    fn test_lost_status_is_a_failure() {
        let pid = spawn("true", &[]);
        assert_eq!(wait_for(pid), 0);
        // Already reaped: waitpid reports ECHILD.
        assert_eq!(wait_for(pid), 1);
    }

    #[test]
    fn test_signal_exit_code() {
        assert_eq!(wait_for(spawn("sh", &["-c", "kill -TERM $$"])), 128 + 15);
    }

    #[test]
    fn test_register_and_reap() {
        let mut table = JobTable::default();
        let first = table.register(vec![spawn("true", &[])], "true".to_string());
        let second = table.register(
            vec![spawn("sleep", &["0.2"]), spawn("false", &[])],
            "sleep 0.2 | false".to_string(),
        );
        assert_eq!((first, second), (1, 2));
        assert_eq!(table.jobs.len(), 2);
        assert_eq!(table.jobs.get(&second).unwrap().command, "sleep 0.2 | false");

        let mut finished = table.reap_blocking();
        finished.sort_by_key(|job| job.id);
        assert_eq!(finished.len(), 2);
        assert_eq!(finished[0].exit_code(), 0);
        assert_eq!(finished[1].exit_code(), 1);
        assert!(table.jobs.is_empty());
        assert!(table.reap().is_empty());
    }

    #[test]
    fn test_reap_leaves_running_jobs() {
        let mut table = JobTable::default();
        let id = table.register(vec![spawn("sleep", &["1"])], "sleep 1".to_string());
        assert!(table.reap().is_empty());
        assert!(table.jobs.get(&id).is_some());
        let finished = table.reap_blocking();
        assert_eq!(finished[0].id, id);
    }
}
