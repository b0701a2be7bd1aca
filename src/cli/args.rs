//! CLI argument definitions using clap
//!
//! Commands:
//! - recordlake init-schema [--model user]
//! - recordlake invoke <get|post|put|delete|list|all> [--event <json>] [--model user]
//! - recordlake query --sql <text> [--database <name>]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::api::Operation;
use crate::observability::LogFormat;

/// recordlake - schema-validated records in an object store
#[derive(Parser, Debug)]
#[command(name = "recordlake")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// JSON configuration file; environment variables override its values
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log output format: json or compact
    #[arg(long, global = true, default_value = "json")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the record database and the model's table
    InitSchema {
        /// Built-in model: user or raw
        #[arg(long, default_value = "user")]
        model: String,
    },

    /// Handle one request event and print the response envelope
    Invoke {
        /// Operation to run
        operation: Operation,

        /// Gateway event JSON; read from stdin when omitted
        #[arg(long)]
        event: Option<String>,

        /// Built-in model: user or raw
        #[arg(long, default_value = "user")]
        model: String,
    },

    /// Execute SQL and print the resulting records
    Query {
        /// Statement text
        #[arg(long)]
        sql: String,

        /// Database to run against; defaults to the configured one
        #[arg(long)]
        database: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_invoke() {
        let cli = Cli::try_parse_from([
            "recordlake",
            "--log-format",
            "compact",
            "invoke",
            "put",
            "--event",
            "{}",
        ])
        .unwrap();

        assert_eq!(cli.log_format, LogFormat::Compact);
        match cli.command {
            Command::Invoke {
                operation,
                event,
                model,
            } => {
                assert_eq!(operation, Operation::Put);
                assert_eq!(event.as_deref(), Some("{}"));
                assert_eq!(model, "user");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_query_with_global_config() {
        let cli = Cli::try_parse_from([
            "recordlake",
            "query",
            "--sql",
            "SELECT * FROM users",
            "--config",
            "/etc/recordlake.json",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/etc/recordlake.json")));
        assert!(matches!(cli.command, Command::Query { database: None, .. }));
    }

    #[test]
    fn test_rejects_unknown_operation() {
        assert!(Cli::try_parse_from(["recordlake", "invoke", "patch"]).is_err());
    }
}
