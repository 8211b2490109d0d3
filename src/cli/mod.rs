//! CLI module for dynaquery
//!
//! Provides command-line interface for:
//! - query: run one queryset pipeline against a fixture table
//! - describe: show how a fixture's model registers under a configuration

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, OutputMode, QueryArgs};
pub use commands::{describe, query, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_filter, parse_value, write_error, write_response, Fixture};
