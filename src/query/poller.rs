//! Execution polling
//!
//! Blocks the caller until an execution reaches a terminal state, checking
//! status once per interval. Time is read through [`Clock`] so the loop can
//! run against virtual time in tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::observability::Event;

use super::engine::QueryEngine;
use super::errors::{QueryError, QueryResult};
use super::types::{ExecutionState, ExecutionStatus, QueryHandle};

/// Default delay between status checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How long and how often to poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Fixed delay between status checks, no backoff
    pub interval: Duration,
    /// Maximum number of status checks; `None` polls forever
    pub max_attempts: Option<u32>,
    /// Maximum time spent waiting; `None` waits forever
    pub deadline: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
            deadline: None,
        }
    }
}

impl PollPolicy {
    /// Policy with the given interval and no bounds
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Source of time for the poll loop
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> Instant;

    fn sleep(&self, duration: Duration);
}

/// Wall clock; `sleep` blocks the thread
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Virtual clock: `sleep` returns immediately, advancing time and
/// recording the requested duration.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Move time forward without recording a sleep
    pub fn advance(&self, duration: Duration) {
        if let Ok(mut elapsed) = self.elapsed.lock() {
            *elapsed += duration;
        }
    }

    /// Every sleep requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn sleep_count(&self) -> usize {
        self.sleeps.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let elapsed = self.elapsed.lock().map(|e| *e).unwrap_or_default();
        self.origin + elapsed
    }

    fn sleep(&self, duration: Duration) {
        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.push(duration);
        }
        self.advance(duration);
    }
}

/// Shared flag a caller sets to abandon a wait
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Poll `handle` until it is terminal.
///
/// Returns the SUCCEEDED status. FAILED and CANCELLED end the wait with an
/// error at the poll that reports them. Cancellation is checked before every
/// status check. The attempt budget is checked before each sleep, and a
/// sleep never runs past the deadline. When the wait is abandoned locally
/// the engine is asked to stop the execution.
pub fn await_terminal(
    engine: &dyn QueryEngine,
    handle: &QueryHandle,
    policy: &PollPolicy,
    clock: &dyn Clock,
    cancel: &CancellationToken,
) -> QueryResult<ExecutionStatus> {
    let started = clock.now();
    let mut attempts: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            info!(event = %Event::QueryCancelled, handle = %handle, attempts, reason = "cancelled by caller");
            stop_quietly(engine, handle);
            return Err(QueryError::Cancelled(handle.clone()));
        }

        if attempts > 0 {
            let past_deadline = policy
                .deadline
                .is_some_and(|deadline| clock.now().duration_since(started) >= deadline);
            if past_deadline {
                return Err(timed_out(engine, handle, attempts));
            }
        }

        attempts += 1;
        let status = engine.status(handle)?;
        debug!(event = %Event::QueryPolled, handle = %handle, attempt = attempts, state = %status.state);

        match status.state {
            ExecutionState::Succeeded => {
                info!(event = %Event::QuerySucceeded, handle = %handle, attempts);
                return Ok(status);
            }
            ExecutionState::Failed => {
                let reason = status
                    .state_change_reason
                    .unwrap_or_else(|| "no reason given".to_string());
                warn!(event = %Event::QueryFailed, handle = %handle, reason = %reason);
                return Err(QueryError::ExecutionFailed {
                    handle: handle.clone(),
                    reason,
                });
            }
            ExecutionState::Cancelled => {
                info!(event = %Event::QueryCancelled, handle = %handle, attempts, reason = "cancelled by engine");
                return Err(QueryError::Cancelled(handle.clone()));
            }
            ExecutionState::Queued | ExecutionState::Running => {
                if policy.max_attempts.is_some_and(|max| attempts >= max) {
                    return Err(timed_out(engine, handle, attempts));
                }

                let mut interval = policy.interval;
                if let Some(deadline) = policy.deadline {
                    let elapsed = clock.now().duration_since(started);
                    if elapsed >= deadline {
                        return Err(timed_out(engine, handle, attempts));
                    }
                    interval = interval.min(deadline - elapsed);
                }
                clock.sleep(interval);
            }
        }
    }
}

fn timed_out(engine: &dyn QueryEngine, handle: &QueryHandle, attempts: u32) -> QueryError {
    warn!(event = %Event::QueryTimedOut, handle = %handle, attempts);
    stop_quietly(engine, handle);
    QueryError::TimedOut {
        handle: handle.clone(),
        attempts,
    }
}

fn stop_quietly(engine: &dyn QueryEngine, handle: &QueryHandle) {
    if let Err(e) = engine.stop(handle) {
        warn!(handle = %handle, error = %e, "failed to stop abandoned execution");
    }
}
