mod state;
mod redirect;
mod launcher;
mod pipes;
mod registry;
mod supervisor;
pub mod jobs;
pub mod path;

// Re-export the public API so that `main.rs` and `builtins/` can use
// `engine::ShellState`, `engine::run`, etc.
pub use state::{ShellState, PipelineResult};
pub use supervisor::run;
pub use path::expand_home;
