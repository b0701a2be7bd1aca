//! Service configuration
//!
//! Loaded from environment variables, optionally layered over a JSON file.
//!
//! | variable            | field               | default    |
//! |---------------------|---------------------|------------|
//! | `BUCKET`            | `bucket`            | `bucket`   |
//! | `ATHENA_BUCKET`     | `results_bucket`    | `bucket`   |
//! | `DATABASE`          | `database`          | derived    |
//! | `DATA_DIR`          | `data_dir`          | `./data`   |
//! | `POLL_INTERVAL_MS`  | `poll_interval_ms`  | `1000`     |
//! | `POLL_MAX_ATTEMPTS` | `poll_max_attempts` | unbounded  |
//! | `POLL_DEADLINE_MS`  | `poll_deadline_ms`  | unbounded  |

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::PollPolicy;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Invalid config JSON: {0}")]
    Parse(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

/// Configuration of the record service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Bucket holding the records
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Bucket receiving query engine output
    #[serde(default = "default_bucket")]
    pub results_bucket: String,

    /// Logical database name; derived from `bucket` when absent
    #[serde(default)]
    pub database: Option<String>,

    /// Root directory of the filesystem object store
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Delay between status polls
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Maximum number of status polls per query
    #[serde(default)]
    pub poll_max_attempts: Option<u32>,

    /// Maximum wall time spent waiting for a query
    #[serde(default)]
    pub poll_deadline_ms: Option<u64>,
}

fn default_bucket() -> String {
    "bucket".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_poll_interval_ms() -> u64 {
    1000
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            results_bucket: default_bucket(),
            database: None,
            data_dir: default_data_dir(),
            poll_interval_ms: default_poll_interval_ms(),
            poll_max_attempts: None,
            poll_deadline_ms: None,
        }
    }
}

impl ServiceConfig {
    /// Build configuration from defaults plus process environment
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::default();
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file, then apply environment overrides
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut config: ServiceConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from a variable lookup (the environment in production)
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bucket) = lookup("BUCKET") {
            self.bucket = bucket;
        }
        if let Some(results_bucket) = lookup("ATHENA_BUCKET") {
            self.results_bucket = results_bucket;
        }
        if let Some(database) = lookup("DATABASE") {
            self.database = Some(database);
        }
        if let Some(data_dir) = lookup("DATA_DIR") {
            self.data_dir = PathBuf::from(data_dir);
        }
        if let Some(raw) = lookup("POLL_INTERVAL_MS") {
            self.poll_interval_ms = parse_number("POLL_INTERVAL_MS", &raw)?;
        }
        if let Some(raw) = lookup("POLL_MAX_ATTEMPTS") {
            self.poll_max_attempts = Some(parse_number("POLL_MAX_ATTEMPTS", &raw)?);
        }
        if let Some(raw) = lookup("POLL_DEADLINE_MS") {
            self.poll_deadline_ms = Some(parse_number("POLL_DEADLINE_MS", &raw)?);
        }
        Ok(())
    }

    /// Validate field values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.bucket.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "bucket",
                reason: "must not be empty".into(),
            });
        }
        if self.results_bucket.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "results_bucket",
                reason: "must not be empty".into(),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                name: "poll_interval_ms",
                reason: "must be > 0".into(),
            });
        }
        if self.poll_max_attempts == Some(0) {
            return Err(ConfigError::InvalidValue {
                name: "poll_max_attempts",
                reason: "must be > 0 when set".into(),
            });
        }
        let database = self.database_name();
        if database.is_empty() || !database.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ConfigError::InvalidValue {
                name: "database",
                reason: format!(
                    "{:?} must be non-empty and use only ASCII letters, digits and '_'",
                    database
                ),
            });
        }
        Ok(())
    }

    /// Logical database name: the explicit override, or the bucket name
    /// with separator characters normalized to `_`
    pub fn database_name(&self) -> String {
        match &self.database {
            Some(database) => database.clone(),
            None => normalize_database_name(&self.bucket),
        }
    }

    /// Poll policy for the query executor
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_attempts: self.poll_max_attempts,
            deadline: self.poll_deadline_ms.map(Duration::from_millis),
        }
    }
}

/// Normalize a bucket name into a catalog-safe database name
pub fn normalize_database_name(bucket: &str) -> String {
    bucket.replace(['-', '.'], "_")
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> ConfigResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        name,
        reason: format!("'{}': {}", raw, e),
    })
}
