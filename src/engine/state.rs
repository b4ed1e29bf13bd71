use std::path::PathBuf;

use super::jobs::JobTable;
use super::path::DEFAULT_SEARCH_PATH;

/// Environment variable that turns on the parsed-chain dump.
pub const DEBUG_VAR: &str = "SHELLAX_DEBUG";

/// Outcome of running one parsed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
    Success,
    /// Exit status of the first stage (by position) that failed.
    Failure(i32),
    /// `exit` was requested; the interactive loop should stop.
    Exit,
}

impl PipelineResult {
    /// Status word for `$?`-style reporting.
    pub fn code(self) -> i32 {
        match self {
            PipelineResult::Success => 0,
            PipelineResult::Failure(code) => code,
            PipelineResult::Exit => 0,
        }
    }
}

pub struct ShellState {
    pub previous_dir: Option<PathBuf>,
    /// Background pipelines awaiting reaping.
    pub jobs: JobTable,
    /// Dump every parsed chain to stderr before running it.
    pub debug: bool,
    /// History file (`~/.shellax_history`).
    pub history_path: Option<PathBuf>,
}

impl ShellState {
    pub fn new() -> Self {
        init_env_vars();
        ShellState {
            previous_dir: None,
            jobs: JobTable::default(),
            debug: std::env::var_os(DEBUG_VAR).is_some(),
            history_path: dirs::home_dir().map(|h| h.join(".shellax_history")),
        }
    }
}

impl Default for ShellState {
    fn default() -> Self {
        Self::new()
    }
}

/// Make sure the variables spawned stages rely on are present.
fn init_env_vars() {
    if std::env::var_os("PATH").is_none() {
        unsafe { std::env::set_var("PATH", DEFAULT_SEARCH_PATH) };
    }
    if std::env::var_os("HOME").is_none() {
        if let Some(home) = dirs::home_dir() {
            unsafe { std::env::set_var("HOME", home) };
        }
    }
}
