//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the fanout binary.

mod commands;
mod health;
mod run;

pub use commands::{Cli, Commands, ConnectionArgs, OutputFormat, RunArgs};
pub use health::handle_health_command;
pub use run::handle_run_command;
