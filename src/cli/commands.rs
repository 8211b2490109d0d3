//! CLI command implementations
//!
//! Each command loads the configuration (defaults when no file is given),
//! registers the fixture's model, fills an in-memory table with the
//! fixture items and prints one JSON response.

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::DatabaseConfig;
use crate::cursor::Cursor;
use crate::manager::ManagerMethods;
use crate::model::{Document, ModelRegistry};
use crate::store::memory::MemoryTable;
use crate::store::Table;

use super::args::{Cli, Command, OutputMode, QueryArgs};
use super::errors::{CliError, CliResult};
use super::io::{parse_filter, parse_value, write_error, write_response, Fixture};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let result = match cmd {
        Command::Query(args) => query(&args),
        Command::Describe { fixture, config } => describe(&fixture, config.as_deref()),
    };
    match result {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Run one queryset pipeline and return its JSON result
pub fn query(args: &QueryArgs) -> CliResult<Value> {
    let config = load_config(args.config.as_deref())?;
    let (_, table) = load_table(&args.fixture, config)?;

    let manager = match &args.index {
        Some(name) => table
            .index_manager(name)
            .ok_or_else(|| CliError::invalid_argument(format!("Unknown index \"{}\"", name)))?,
        None => table.objects(),
    };

    let mut queryset = manager.set_hash_key(parse_value(&args.hash_key));
    if !args.filter.is_empty() {
        let pairs = args
            .filter
            .iter()
            .map(|raw| parse_filter(raw))
            .collect::<CliResult<Vec<_>>>()?;
        queryset = queryset.filter_args(pairs)?;
    }
    if let Some(limit) = args.limit {
        queryset = queryset.set_limit(limit);
    }
    if let Some(token) = &args.cursor {
        queryset = queryset.set_cursor(Cursor::from_token(token)?);
    }
    if args.reverse {
        queryset = queryset.set_scan_forward(false);
    }

    let data = match args.mode {
        OutputMode::List => {
            let execution = queryset.execute()?;
            json!({
                "items": execution.items(),
                "count": execution.len(),
                "next_cursor": execution.next_cursor().map(Cursor::to_token),
            })
        }
        OutputMode::Count => json!({ "count": queryset.count()? }),
        OutputMode::First => json!({ "item": queryset.first()? }),
        OutputMode::Last => json!({ "item": queryset.last()? }),
    };
    Ok(data)
}

/// Register a fixture's model and return its resolved settings
pub fn describe(fixture: &Path, config: Option<&Path>) -> CliResult<Value> {
    let config = load_config(config)?;
    let (registry, table) = load_table(fixture, config)?;

    let schema = table.schema();
    let registered = match registry.get(&schema.table_name) {
        Ok(model) => json!({
            "physical_table": model.physical_table,
            "test_table": registry.config().test_table_name(&schema.table_name),
            "billing_mode": model.options.billing_mode.map(|m| m.as_str()),
            "point_in_time_recovery": registry.config().point_in_time_recovery,
            "tags": model.tags,
        }),
        Err(_) => Value::Null,
    };

    Ok(json!({
        "table": schema,
        "registered": registered,
        "secondary_indexes": schema.indexes.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
    }))
}

fn load_config(path: Option<&Path>) -> CliResult<DatabaseConfig> {
    let config = match path {
        Some(path) => DatabaseConfig::load(path)?,
        None => DatabaseConfig::default(),
    };
    config.apply_logging();
    Ok(config)
}

/// Register the fixture model and load its items
///
/// Abstract and proxy models are left unregistered but can still be queried.
fn load_table(path: &Path, config: DatabaseConfig) -> CliResult<(ModelRegistry, Table<Document>)> {
    let fixture = Fixture::load(path)?;

    let mut registry = ModelRegistry::new(config);
    registry.register(fixture.table.clone(), fixture.options.clone())?;

    let store = Arc::new(MemoryTable::<Document>::new(fixture.table));
    store.put_all(fixture.items)?;
    Ok((registry, store.table()))
}
