pub mod commands;
mod context;
pub mod format;
pub mod output;
mod shell;

pub use context::{CliError, CliMode, CommandError, ShellContext};
pub use shell::run_cli;
