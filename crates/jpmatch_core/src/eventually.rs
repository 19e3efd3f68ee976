//! Polling a freshly fetched subject until a matcher passes.
//!
//! The matchers themselves never wait. [`Eventually`] owns every timing
//! decision: it fetches, matches, sleeps through a [`Clock`], and gives up
//! after a timeout.

use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::EventuallyConfig;
use crate::error::{MatchError, Result};
use crate::matcher::Matcher;
use crate::value::to_subject;

/// Time source for polling.
///
/// Allows injecting controlled time so timeouts can be tested without
/// sleeping.
pub trait Clock: Send + Sync {
    /// Time elapsed since an arbitrary, fixed origin.
    fn now(&self) -> Duration;

    /// Blocks (or pretends to) for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Wall-clock time based on [`Instant`].
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Summary of a successful poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport {
    /// Attempts made, including the passing one.
    pub attempts: u32,
    /// Time from the first attempt until the match passed.
    pub elapsed: Duration,
    /// Explanation attached to the passing verdict.
    pub message: String,
}

/// Polls `fetch` until a matcher passes or the timeout elapses.
///
/// # Examples
///
/// ```
/// use jpmatch_core::{be_equivalent_to, have_json_path, Eventually};
/// use serde_json::json;
/// use std::time::Duration;
///
/// let mut replicas = 0;
/// let report = Eventually::new(|| {
///         replicas += 1;
///         Ok::<_, std::io::Error>(json!({"status": {"replicas": replicas}}))
///     })
///     .within(Duration::from_secs(1))
///     .polling_every(Duration::from_millis(1))
///     .should(&have_json_path("{.status.replicas}", be_equivalent_to(3)))
///     .unwrap();
/// assert_eq!(report.attempts, 3);
/// ```
pub struct Eventually<F> {
    fetch: F,
    timeout: Duration,
    interval: Duration,
    clock: Arc<dyn Clock>,
}

impl<F, T, E> Eventually<F>
where
    F: FnMut() -> std::result::Result<T, E>,
    T: Serialize,
    E: Display,
{
    /// Creates a poller with the default timeout (60s) and interval (10ms).
    pub fn new(fetch: F) -> Self {
        let defaults = EventuallyConfig::default();
        Self {
            fetch,
            timeout: defaults.timeout(),
            interval: defaults.polling_interval(),
            clock: Arc::new(SystemClock::new()),
        }
    }

    /// Gives up after `timeout`.
    pub fn within(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Waits `interval` between attempts.
    pub fn polling_every(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Takes timeout and interval from configuration.
    pub fn with_config(mut self, config: &EventuallyConfig) -> Self {
        self.timeout = config.timeout();
        self.interval = config.polling_interval();
        self
    }

    /// Uses `clock` for time and sleeping.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Polls until `matcher` passes.
    ///
    /// At least one attempt is always made. Fetch failures, failing verdicts
    /// and transient errors (a path that does not resolve yet) are retried;
    /// any other error is returned immediately.
    ///
    /// # Errors
    ///
    /// - `MatchError::Timeout` when the deadline passes, carrying the last failure
    /// - `MatchError::PathSyntax` or `MatchError::Serialization` from the first attempt
    pub fn should<M: Matcher + ?Sized>(mut self, matcher: &M) -> Result<PollReport> {
        let start = self.clock.now();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let last_failure = match self.attempt(matcher) {
                Ok(Outcome::Passed(message)) => {
                    let elapsed = self.clock.now().saturating_sub(start);
                    debug!(
                        attempts,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Matcher passed"
                    );
                    return Ok(PollReport {
                        attempts,
                        elapsed,
                        message,
                    });
                }
                Ok(Outcome::Failed(message)) => message,
                Err(e) if e.is_transient() => e.to_string(),
                Err(e) => {
                    debug!(attempts, error = %e, "Giving up on non-transient error");
                    return Err(e);
                }
            };

            let elapsed = self.clock.now().saturating_sub(start);
            if elapsed >= self.timeout {
                warn!(
                    attempts,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Timed out waiting for matcher"
                );
                return Err(MatchError::Timeout {
                    attempts,
                    elapsed_ms: elapsed.as_millis() as u64,
                    last_failure,
                });
            }

            debug!(attempts, "Attempt failed, retrying");
            let remaining = self.timeout - elapsed;
            self.clock.sleep(self.interval.min(remaining));
        }
    }

    fn attempt<M: Matcher + ?Sized>(&mut self, matcher: &M) -> Result<Outcome> {
        let subject = match (self.fetch)() {
            Ok(subject) => subject,
            Err(e) => return Ok(Outcome::Failed(format!("fetch failed: {}", e))),
        };
        let value = to_subject(&subject)?;
        let verdict = matcher.match_value(&value)?;
        Ok(if verdict.success {
            Outcome::Passed(verdict.message)
        } else {
            Outcome::Failed(verdict.message)
        })
    }
}

enum Outcome {
    Passed(String),
    Failed(String),
}
