//! CLI/config/report/validator glue around the five core crates. The
//! core components stay free of CLI, YAML, or reporting concerns;
//! everything here is orchestration.

pub mod args;
pub mod config;
pub mod report;
pub mod run;
pub mod validate;

pub use args::Args;
pub use run::{run, ExitCode};
