//! Poll policy and cancellation for long-running generation operations.
//!
//! The service gives no completion callback, so an operation is re-fetched
//! at a fixed interval. The policy caps the number of status checks and the
//! total wait; a `CancelToken` lets the user abandon the wait.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::error::VeoError;

/// Fixed delay between status checks (1 second).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Shortest delay a configured policy may use between status checks.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default cap on status checks for one operation.
pub const DEFAULT_MAX_POLLS: u32 = 600;

/// Default cap on total time spent waiting for one operation (10 minutes).
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(600);

/// How often and for how long an operation is polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Maximum number of status checks, `None` for no cap.
    pub max_polls: Option<u32>,
    /// Maximum elapsed time since submission, `None` for no cap.
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_polls: Some(DEFAULT_MAX_POLLS),
            timeout: Some(DEFAULT_POLL_TIMEOUT),
        }
    }
}

impl PollPolicy {
    /// Poll at `interval` until the service reports completion.
    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            max_polls: None,
            timeout: None,
        }
    }

    pub fn with_max_polls(mut self, max_polls: Option<u32>) -> Self {
        self.max_polls = max_polls;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check whether another status check is allowed.
    ///
    /// `polls` is the number of checks already made, `elapsed` the time since
    /// submission. Returns `TimedOut` once either cap is reached.
    pub fn ensure_can_poll(&self, polls: u32, elapsed: Duration) -> Result<(), VeoError> {
        let polls_exhausted = self.max_polls.is_some_and(|max| polls >= max);
        let time_exhausted = self.timeout.is_some_and(|timeout| elapsed >= timeout);
        if polls_exhausted || time_exhausted {
            return Err(VeoError::TimedOut { polls, elapsed });
        }
        Ok(())
    }
}

/// Cooperative cancellation flag shared between a generation and its owner.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail with `Cancelled` if the token has been triggered.
    pub fn check(&self) -> Result<(), VeoError> {
        if self.is_cancelled() {
            return Err(VeoError::Cancelled);
        }
        Ok(())
    }
}
