mod builtins;
mod completion;
mod engine;
mod error;
mod parser;
mod prompt;
mod signals;

use std::io;

use completion::ShellHelper;
use engine::{PipelineResult, ShellState};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

/// Report background jobs that finished since the last prompt.
fn reap_background(state: &mut ShellState, blocking: bool) {
    let finished = if blocking {
        state.jobs.reap_blocking()
    } else {
        state.jobs.reap()
    };
    for job in finished {
        match job.exit_code() {
            0 => println!("[{}] Done  {}", job.id, job.command),
            code => println!("[{}] Exit {}  {}", job.id, code, job.command),
        }
    }
}

fn main() -> rustyline::Result<()> {
    if let Err(e) = signals::init() {
        eprintln!("shellax: cannot set up signal handling: {}", e);
    }
    let mut rl: Editor<ShellHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(ShellHelper));
    let mut state = ShellState::new();

    if let Some(path) = &state.history_path {
        // A missing history file just means a first run.
        let _ = rl.load_history(path);
    }

    // Text carried over from a `?` completion request.
    let mut pending = String::new();

    loop {
        reap_background(&mut state, false);

        let prompt = prompt::render();
        let initial = std::mem::take(&mut pending);
        let readline = if initial.is_empty() {
            rl.readline(&prompt)
        } else {
            rl.readline_with_initial(&prompt, (initial.as_str(), ""))
        };
        match readline {
            Ok(line) => {
                let chain = parser::parse(&line);
                if state.debug {
                    eprint!("{}", chain.dump());
                }

                if chain.auto_complete {
                    pending = completion::suggest(&line, &mut io::stdout())?;
                    continue;
                }

                let input = line.trim();
                if !input.is_empty() {
                    let _ = rl.add_history_entry(input);
                }

                let result = engine::run(&chain, &mut state);
                if result == PipelineResult::Exit {
                    break;
                }
                if state.debug {
                    eprintln!("shellax: status {}", result.code());
                }
            }
            Err(ReadlineError::Interrupted) => {
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("exit");
                break;
            }
            Err(err) => {
                eprintln!("shellax: {}", err);
                break;
            }
        }
    }

    reap_background(&mut state, true);
    if let Some(path) = &state.history_path {
        if let Err(e) = rl.save_history(path) {
            eprintln!("shellax: cannot save history: {}", e);
        }
    }
    Ok(())
}
