use nix::unistd::Pid;

use crate::builtins;
use crate::error::ShellError;
use crate::parser::Stage;

use super::jobs::wait_for;
use super::launcher::launch;
use super::pipes::PipeTable;
use super::state::{PipelineResult, ShellState};

/// Run one parsed line to completion (or into the background).
pub fn run(chain: &Stage, state: &mut ShellState) -> PipelineResult {
    // An empty stage anywhere ends processing of the line.
    if let Some(position) = chain.iter().position(Stage::is_noop) {
        if position > 0 && state.debug {
            let e = ShellError::ParseAmbiguity(format!("empty command at stage {}", position + 1));
            eprintln!("shellax: {}", e);
        }
        return PipelineResult::Success;
    }

    if chain.next.is_none() {
        match chain.name.as_str() {
            "exit" => return PipelineResult::Exit,
            "cd" => {
                match builtins::cd::run(&chain.args[1..], state) {
                    Ok(Some(dir)) => println!("{}", dir.display()),
                    Ok(None) => {}
                    Err(e) => eprintln!("shellax: cd: {}", e),
                }
                return PipelineResult::Success;
            }
            _ => {}
        }
    }

    let stages = chain.len();
    let pipes = match PipeTable::build(stages) {
        Ok(pipes) => pipes,
        Err(e) => {
            eprintln!("shellax: {}", e);
            return PipelineResult::Failure(e.exit_status());
        }
    };

    let background = chain.background;
    // `Err(code)` marks a stage that never started.
    let launched: Vec<Result<Pid, i32>> = chain
        .iter()
        .enumerate()
        .map(|(index, stage)| {
            launch(stage, index, &pipes, background).map_err(|e| {
                eprintln!("shellax: {}: {}", stage.name, e);
                e.exit_status()
            })
        })
        .collect();

    // The shell's copies of the write ends must go, or the last reader never
    // sees EOF.
    drop(pipes);

    if background {
        let pids: Vec<Pid> = launched.iter().filter_map(|r| r.as_ref().ok().copied()).collect();
        if let Some(&leader) = pids.first() {
            let id = state.jobs.register(pids, chain.to_string());
            println!("[{}] {}", id, leader);
        }
        return PipelineResult::Success;
    }

    let codes: Vec<i32> = launched
        .into_iter()
        .map(|r| match r {
            Ok(pid) => wait_for(pid),
            Err(code) => code,
        })
        .collect();
    aggregate(&codes)
}

/// `Success` only if every stage exited 0; otherwise the status of the first
/// failing stage by position.
pub fn aggregate(codes: &[i32]) -> PipelineResult {
    match codes.iter().find(|&&code| code != 0) {
        Some(&code) => PipelineResult::Failure(code),
        None => PipelineResult::Success,
    }
}
