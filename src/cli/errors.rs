//! CLI-specific error types
//!
//! Any CLI error ends the process with a non-zero exit code. Request
//! failures inside `invoke` are not CLI errors; they are reported in the
//! printed response envelope.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::query::QueryError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown model '{0}' (expected user or raw)")]
    UnknownModel(String),

    #[error("{0}")]
    Query(#[from] QueryError),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl CliError {
    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        match self {
            CliError::Config(_) => "CLI_CONFIG_ERROR",
            CliError::Io(_) => "CLI_IO_ERROR",
            CliError::InvalidInput(_) => "CLI_INVALID_INPUT",
            CliError::UnknownModel(_) => "CLI_UNKNOWN_MODEL",
            CliError::Query(_) => "CLI_QUERY_FAILED",
            CliError::Logging(_) => "CLI_LOGGING_ERROR",
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::InvalidInput(format!("JSON error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(CliError::UnknownModel("x".into()).code_str(), "CLI_UNKNOWN_MODEL");
        let err: CliError = io::Error::new(io::ErrorKind::Other, "closed").into();
        assert_eq!(err.code_str(), "CLI_IO_ERROR");
        assert_eq!(err.to_string(), "I/O error: closed");
    }
}
