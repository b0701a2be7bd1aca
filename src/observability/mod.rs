//! Observability for recordlake
//!
//! - Structured logging through `tracing`, JSON or compact output
//! - Typed lifecycle events naming every log line
//! - Scope-based BEGIN/COMPLETE/FAILED logging with elapsed time
//!
//! # Usage
//!
//! ```ignore
//! use recordlake::observability::{init_logging, Event, LogFormat, ObservationScope};
//!
//! init_logging(LogFormat::Json)?;
//! tracing::info!(event = %Event::RecordSaved, key = "user/42");
//!
//! let scope = ObservationScope::with_context("QUERY", "handle=abc");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod scope;

pub use events::Event;
pub use scope::ObservationScope;

use std::str::FromStr;

use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Human-readable single-line output
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "compact" | "text" => Ok(LogFormat::Compact),
            other => Err(format!("unknown log format '{}' (expected json or compact)", other)),
        }
    }
}

/// Install the global log subscriber.
///
/// Logs go to stderr so stdout stays reserved for command output.
/// Fails if a global subscriber is already installed.
pub fn init_logging(format: LogFormat) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = match format {
        LogFormat::Json => builder.json().with_current_span(false).try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    result.map_err(|e| format!("failed to install log subscriber: {}", e))
}
