//! Observable events
//!
//! Every log line carries one of these as its `event` field.

use std::fmt;

/// Observable events in recordlake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Query execution
    /// Query handed to the engine
    QuerySubmitted,
    /// Execution status polled
    QueryPolled,
    /// Execution finished successfully
    QuerySucceeded,
    /// Engine reported failure
    QueryFailed,
    /// Execution cancelled (engine-side or locally)
    QueryCancelled,
    /// Poll budget exhausted
    QueryTimedOut,
    /// Result rows materialized
    ResultsFetched,

    // Catalog
    /// Database/table bootstrap issued
    CatalogInitialized,

    // Records
    /// Record written
    RecordSaved,
    /// Record loaded
    RecordLoaded,
    /// Record deleted
    RecordDeleted,
    /// Record failed schema validation
    RecordRejected,

    // Request boundary
    /// Request answered
    RequestHandled,
    /// Request failed
    RequestFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::QuerySubmitted => "QUERY_SUBMITTED",
            Event::QueryPolled => "QUERY_POLLED",
            Event::QuerySucceeded => "QUERY_SUCCEEDED",
            Event::QueryFailed => "QUERY_FAILED",
            Event::QueryCancelled => "QUERY_CANCELLED",
            Event::QueryTimedOut => "QUERY_TIMED_OUT",
            Event::ResultsFetched => "RESULTS_FETCHED",

            Event::CatalogInitialized => "CATALOG_INITIALIZED",

            Event::RecordSaved => "RECORD_SAVED",
            Event::RecordLoaded => "RECORD_LOADED",
            Event::RecordDeleted => "RECORD_DELETED",
            Event::RecordRejected => "RECORD_REJECTED",

            Event::RequestHandled => "REQUEST_HANDLED",
            Event::RequestFailed => "REQUEST_FAILED",
        }
    }

    /// Returns true if this event reports a failed operation
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Event::QueryFailed
                | Event::QueryCancelled
                | Event::QueryTimedOut
                | Event::RecordRejected
                | Event::RequestFailed
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::QuerySubmitted,
            Event::QueryPolled,
            Event::QuerySucceeded,
            Event::QueryFailed,
            Event::QueryCancelled,
            Event::QueryTimedOut,
            Event::ResultsFetched,
            Event::CatalogInitialized,
            Event::RecordSaved,
            Event::RecordLoaded,
            Event::RecordDeleted,
            Event::RecordRejected,
            Event::RequestHandled,
            Event::RequestFailed,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_failure_events() {
        assert!(Event::QueryFailed.is_failure());
        assert!(Event::RecordRejected.is_failure());
        assert!(!Event::QuerySucceeded.is_failure());
        assert!(!Event::RecordSaved.is_failure());
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::QuerySubmitted), "QUERY_SUBMITTED");
    }
}
