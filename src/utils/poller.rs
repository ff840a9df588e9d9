//! Bounded fixed-interval polling.
//!
//! Every confirmation in the runner (tx status, address listing, subnet and
//! blockchain visibility, bootstrap flags) is a [`Poller`] wrapped around a
//! single RPC query.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tokio::time::sleep_until;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::warn;

use crate::PollError;
use crate::Result;

/// Result of a bounded wait.
#[derive(Debug, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The check matched; carries the value it produced
    Ready(T),
    /// The deadline elapsed before any attempt matched
    TimedOut { attempts: u32, waited: Duration },
    /// The stop token fired
    Cancelled,
}

impl<T> PollOutcome<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, PollOutcome::Ready(_))
    }

    pub fn into_result(
        self,
        what: &str,
    ) -> Result<T> {
        match self {
            PollOutcome::Ready(value) => Ok(value),
            PollOutcome::TimedOut { attempts, waited } => Err(PollError::Timeout {
                what: what.to_string(),
                waited,
                attempts,
            }
            .into()),
            PollOutcome::Cancelled => Err(PollError::Cancelled { what: what.to_string() }.into()),
        }
    }
}

/// Runs a check every `interval` until it matches, `timeout` elapses, or the
/// token is cancelled. The interval is constant.
#[derive(Debug, Clone)]
pub struct Poller {
    interval: Duration,
    timeout: Duration,
    cancel: CancellationToken,
}

impl Poller {
    pub fn new(
        interval: Duration,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            interval,
            timeout,
            cancel,
        }
    }

    /// Same interval and token, different deadline.
    pub fn with_timeout(
        &self,
        timeout: Duration,
    ) -> Self {
        Self {
            interval: self.interval,
            timeout,
            cancel: self.cancel.clone(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Waits one interval before each attempt.
    ///
    /// The check returns `Ok(Some(v))` when matched, `Ok(None)` when not yet
    /// matched and `Err(_)` for transient failures, which are logged and
    /// retried. An in-flight check is abandoned when the token fires or the
    /// deadline passes.
    pub async fn poll<T, F, Fut>(
        &self,
        what: &str,
        mut check: F,
    ) -> PollOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        let started = Instant::now();
        let deadline = started + self.timeout;
        let mut attempts: u32 = 0;

        loop {
            if self.cancel.is_cancelled() {
                return PollOutcome::Cancelled;
            }
            if Instant::now() >= deadline {
                return self.timed_out(what, attempts, started);
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return PollOutcome::Cancelled,
                _ = sleep(self.interval) => {}
            }

            attempts += 1;
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return PollOutcome::Cancelled,
                result = check() => match result {
                    Ok(Some(value)) => {
                        debug!(what, attempts, "poll matched");
                        return PollOutcome::Ready(value);
                    }
                    Ok(None) => {
                        debug!(what, attempts, "not matched yet");
                    }
                    Err(e) => {
                        warn!(what, attempts, "poll attempt failed: {}", e);
                    }
                },
                _ = sleep_until(deadline) => {
                    if self.cancel.is_cancelled() {
                        return PollOutcome::Cancelled;
                    }
                    return self.timed_out(what, attempts, started);
                }
            }
        }
    }

    /// [`Poller::poll`] mapped onto the crate error type.
    pub async fn poll_until<T, F, Fut>(
        &self,
        what: &str,
        check: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        self.poll(what, check).await.into_result(what)
    }

    fn timed_out<T>(
        &self,
        what: &str,
        attempts: u32,
        started: Instant,
    ) -> PollOutcome<T> {
        let waited = started.elapsed();
        warn!(what, attempts, ?waited, "gave up waiting");
        PollOutcome::TimedOut { attempts, waited }
    }
}
