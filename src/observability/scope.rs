//! ObservationScope for automatic begin/complete logging
//!
//! - Logs `{name}_BEGIN` on creation
//! - Logs `{name}_COMPLETE` with elapsed time on `complete()`
//! - Logs `{name}_FAILED` on `fail()`
//! - Logs `{name}_INCOMPLETE` if dropped without either

use std::time::Instant;

use tracing::{error, info, warn};

/// A scope that logs start and end of an operation
///
/// # Usage
///
/// ```ignore
/// let scope = ObservationScope::new("INIT_SCHEMA");
/// // ... do work ...
/// scope.complete(); // logs INIT_SCHEMA_COMPLETE
/// ```
pub struct ObservationScope {
    name: &'static str,
    context: String,
    started: Instant,
    completed: bool,
}

impl ObservationScope {
    /// Create a new observation scope, logging `{name}_BEGIN`
    pub fn new(name: &'static str) -> Self {
        Self::with_context(name, "")
    }

    /// Create a scope with a context string carried on every line it logs
    pub fn with_context(name: &'static str, context: impl Into<String>) -> Self {
        let context = context.into();
        info!(event = %format!("{}_BEGIN", name), context = %context);

        Self {
            name,
            context,
            started: Instant::now(),
            completed: false,
        }
    }

    /// Milliseconds since the scope was opened
    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }

    /// Mark the scope as successfully completed
    pub fn complete(mut self) {
        self.completed = true;
        info!(
            event = %format!("{}_COMPLETE", self.name),
            context = %self.context,
            elapsed_ms = self.elapsed_ms() as u64,
        );
    }

    /// Mark the scope as failed with a reason
    pub fn fail(mut self, reason: &str) {
        self.completed = true;
        error!(
            event = %format!("{}_FAILED", self.name),
            context = %self.context,
            elapsed_ms = self.elapsed_ms() as u64,
            reason = %reason,
        );
    }

    /// Check if the scope has been completed
    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.completed {
            warn!(
                event = %format!("{}_INCOMPLETE", self.name),
                context = %self.context,
                reason = "scope dropped without completion",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_starts_incomplete() {
        let scope = ObservationScope::new("TEST");
        assert!(!scope.is_completed());
        scope.complete();
    }

    #[test]
    fn test_scope_with_context() {
        let scope = ObservationScope::with_context("TEST", "handle=abc");
        assert_eq!(scope.context, "handle=abc");
        scope.complete();
    }

    #[test]
    fn test_scope_fail() {
        let scope = ObservationScope::new("TEST");
        scope.fail("something went wrong");
    }

    #[test]
    fn test_scope_drop_without_complete() {
        let scope = ObservationScope::new("TEST");
        drop(scope);
    }

    #[test]
    fn test_elapsed_is_monotonic() {
        let scope = ObservationScope::new("TEST");
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(scope.elapsed_ms() >= 5);
        scope.complete();
    }
}
