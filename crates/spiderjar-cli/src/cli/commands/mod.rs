//! CLI command handlers, one per file.

mod candidates;
mod completions;
mod diagnose;
mod fetch;
mod serve;
mod verify;

pub use candidates::run_candidates;
pub use completions::run_completions;
pub use diagnose::run_diagnose;
pub use fetch::run_fetch;
pub use serve::run_serve;
pub use verify::run_verify;
