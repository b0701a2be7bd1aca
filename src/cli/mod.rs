//! CLI module for recordlake
//!
//! Provides command-line access to:
//! - init-schema: register the record database and table with the query engine
//! - invoke: run one record operation on a gateway event, print the response envelope
//! - query: run SQL through the query executor, print the records

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{init_schema, invoke, query, run, run_command, Services};
pub use errors::{CliError, CliResult};
pub use io::{parse_event, read_event, write_json};
