//! JSON I/O handling for CLI
//!
//! - Input: one gateway event as JSON, from an argument or stdin
//! - Output: one JSON document per line on stdout
//! - UTF-8 only

use std::io::{self, Read, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Parse event text; blank input is an empty event
pub fn parse_event(text: &str) -> CliResult<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text)
        .map_err(|e| CliError::InvalidInput(format!("event is not valid JSON: {}", e)))
}

/// The event passed on the command line, or all of stdin
pub fn read_event(inline: Option<&str>) -> CliResult<Value> {
    match inline {
        Some(text) => parse_event(text),
        None => {
            let mut text = String::new();
            io::stdin().lock().read_to_string(&mut text)?;
            parse_event(&text)
        }
    }
}

/// Write a JSON document to stdout
pub fn write_json(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
