//! CLI argument definitions using clap
//!
//! Commands:
//! - dynaquery query --fixture <path> --hash-key <json> [options]
//! - dynaquery describe --fixture <path> [--config <path>]

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// dynaquery - lazy querysets over hash/range tables
#[derive(Parser, Debug)]
#[command(name = "dynaquery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one query against a fixture table and print the result
    Query(QueryArgs),

    /// Register a fixture's model and print its resolved table settings
    Describe {
        /// Path to the fixture file
        #[arg(long)]
        fixture: PathBuf,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Path to the fixture file
    #[arg(long)]
    pub fixture: PathBuf,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Partition to read, as JSON (bare words are taken as strings)
    #[arg(long)]
    pub hash_key: String,

    /// Secondary index to query instead of the table
    #[arg(long)]
    pub index: Option<String>,

    /// Field lookup, LOOKUP=JSON (e.g. number__gte=4)
    #[arg(long)]
    pub filter: Vec<String>,

    /// Maximum number of items
    #[arg(long)]
    pub limit: Option<usize>,

    /// Resume token from a previous page
    #[arg(long)]
    pub cursor: Option<String>,

    /// Scan in descending range-key order
    #[arg(long)]
    pub reverse: bool,

    /// What to print
    #[arg(long, value_enum, default_value_t = OutputMode::List)]
    pub mode: OutputMode,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    List,
    Count,
    First,
    Last,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
