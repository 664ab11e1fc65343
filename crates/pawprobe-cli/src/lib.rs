//! Pawprobe CLI library
//!
//! Command parsing, configuration layering, progress output and the
//! scenario runner behind the `pawprobe` binary.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{Cli, ColorArg, Commands, RunArgs};
pub use config::{CliConfig, ColorChoice, ProbeOverrides, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{ProgressReporter, RunSummary};
pub use runner::ScenarioRunner;
