//! JSON I/O handling for CLI
//!
//! - Output: single JSON object per line via stdout
//! - Fixtures and config: JSON files, UTF-8 only

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{CliError, CliResult};
use crate::model::{Document, ModelOptions, ModelSchema};

/// A table description plus the items to load into it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub table: ModelSchema,
    #[serde(default)]
    pub options: ModelOptions,
    #[serde(default)]
    pub items: Vec<Document>,
}

impl Fixture {
    /// Load a fixture from a JSON file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::fixture_error(format!("Failed to read fixture: {}", e)))?;
        serde_json::from_str(&content)
            .map_err(|e| CliError::fixture_error(format!("Invalid fixture JSON: {}", e)))
    }
}

/// Parse a flag value as JSON, taking unparseable input as a string
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Split `LOOKUP=JSON` into its lookup and value
pub fn parse_filter(raw: &str) -> CliResult<(String, Value)> {
    let (lookup, value) = raw.split_once('=').ok_or_else(|| {
        CliError::invalid_argument(format!("Filter \"{}\" must be LOOKUP=VALUE", raw))
    })?;
    if lookup.is_empty() {
        return Err(CliError::invalid_argument(format!(
            "Filter \"{}\" has an empty lookup",
            raw
        )));
    }
    Ok((lookup.to_string(), parse_value(value)))
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });
    write_line(&response)
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });
    write_line(&response)
}

fn write_line(response: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}
