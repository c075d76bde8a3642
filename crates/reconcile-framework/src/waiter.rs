//! # Async Waiter
//!
//! Polls a remote object until it reaches one of a family's target statuses, the object
//! disappears (when absence is the goal), or the timeout passes.
//!
//! ```text
//!            ┌──────────── pending ────────────┐
//!            ▼                                 │
//!   delay ─▶ refresh ─┬─ target (N in a row) ──┼─▶ Ok(Some(object))
//!                     ├─ absent, no target ────┼─▶ Ok(None)
//!                     ├─ absent ×(checks+1) ───┼─▶ NotFound
//!                     ├─ transient error ──────┘
//!                     ├─ permanent error ─────────▶ Remote
//!                     └─ any other status ────────▶ UnexpectedState
//! ```
//!
//! Between polls the waiter sleeps with exponential backoff (100 ms doubling up to 10 s),
//! never less than the minimum poll interval, or a fixed interval when one is set.
//! Cancellation is checked before every sleep.

use crate::remote::RemoteError;
use crate::retry::RetryClassifier;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const INITIAL_BACKOFF: Duration = Duration::from_millis(100);
const MAX_BACKOFF: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaitError {
    #[error("timeout after {timeout:?} (last status: {last_status})")]
    Timeout {
        timeout: Duration,
        last_status: String,
    },

    #[error("object not found after {checks} consecutive checks")]
    NotFound { checks: u32 },

    #[error("unexpected status {status}, wanted one of {expected:?}")]
    UnexpectedState {
        status: String,
        expected: Vec<String>,
    },

    #[error("cancelled")]
    Cancelled,

    #[error(transparent)]
    Remote(RemoteError),
}

/// The status sets and polling parameters for one asynchronous phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitSpec {
    pub pending: &'static [&'static str],
    /// Empty means the phase succeeds once the object is gone.
    pub target: &'static [&'static str],
    /// Sleep before the first poll.
    pub delay: Duration,
    pub min_poll_interval: Duration,
    /// Fixed interval between polls, replacing the exponential backoff.
    pub poll_interval: Option<Duration>,
    /// Consecutive absences tolerated while a target status is expected.
    pub not_found_checks: u32,
    /// Consecutive target observations required for success.
    pub continuous_target_occurrence: u32,
}

impl WaitSpec {
    pub const fn new(pending: &'static [&'static str], target: &'static [&'static str]) -> Self {
        Self {
            pending,
            target,
            delay: Duration::ZERO,
            min_poll_interval: Duration::ZERO,
            poll_interval: None,
            not_found_checks: 20,
            continuous_target_occurrence: 1,
        }
    }

    /// Waits for the object to disappear.
    pub const fn until_absent(pending: &'static [&'static str]) -> Self {
        Self::new(pending, &[])
    }

    pub const fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub const fn min_poll_interval(mut self, interval: Duration) -> Self {
        self.min_poll_interval = interval;
        self
    }

    pub const fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub const fn not_found_checks(mut self, checks: u32) -> Self {
        self.not_found_checks = checks;
        self
    }

    pub const fn continuous_target_occurrence(mut self, occurrences: u32) -> Self {
        self.continuous_target_occurrence = occurrences;
        self
    }

    fn expects_absence(&self) -> bool {
        self.target.is_empty()
    }
}

/// One polling loop. Construct with [`AsyncWaiter::new`], then [`AsyncWaiter::wait`].
pub struct AsyncWaiter<'a> {
    spec: &'a WaitSpec,
    timeout: Duration,
    classifier: &'a RetryClassifier,
    cancel: CancellationToken,
    poll_floor: Duration,
}

impl<'a> AsyncWaiter<'a> {
    pub fn new(spec: &'a WaitSpec, timeout: Duration, classifier: &'a RetryClassifier) -> Self {
        Self {
            spec,
            timeout,
            classifier,
            cancel: CancellationToken::new(),
            poll_floor: Duration::ZERO,
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Raises the [`WaitSpec::min_poll_interval`] floor, e.g. from configuration.
    pub fn with_poll_floor(mut self, floor: Duration) -> Self {
        self.poll_floor = floor;
        self
    }

    /// Polls `refresh` until a terminal outcome.
    ///
    /// `refresh` returns `None` when the object does not exist, otherwise the object and its
    /// status string. Returns `Ok(None)` when absence was the goal.
    pub async fn wait<T, F, Fut>(&self, mut refresh: F) -> Result<Option<T>, WaitError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<(T, String)>, RemoteError>>,
    {
        let spec = self.spec;
        let deadline = Instant::now() + self.timeout;
        let floor = spec.min_poll_interval.max(self.poll_floor);
        let mut backoff = INITIAL_BACKOFF;
        let mut not_found = 0u32;
        let mut target_seen = 0u32;
        let mut last_status = String::new();

        self.sleep(spec.delay).await?;

        loop {
            match refresh().await {
                Ok(Some((object, status))) => {
                    not_found = 0;
                    if spec.target.contains(&status.as_str()) {
                        target_seen += 1;
                        if target_seen >= spec.continuous_target_occurrence.max(1) {
                            debug!(%status, "Target status reached");
                            return Ok(Some(object));
                        }
                    } else if spec.pending.contains(&status.as_str()) {
                        target_seen = 0;
                    } else {
                        return Err(WaitError::UnexpectedState {
                            status,
                            expected: spec.target.iter().map(|s| s.to_string()).collect(),
                        });
                    }
                    debug!(%status, target_seen, "Still waiting");
                    last_status = status;
                }
                Ok(None) if spec.expects_absence() => {
                    debug!("Object is gone");
                    return Ok(None);
                }
                Ok(None) => {
                    target_seen = 0;
                    not_found += 1;
                    if not_found > spec.not_found_checks {
                        return Err(WaitError::NotFound {
                            checks: spec.not_found_checks,
                        });
                    }
                    debug!(not_found, "Object not visible yet");
                }
                Err(error) if self.classifier.is_transient(&error) => {
                    debug!(%error, "Transient error while polling");
                }
                Err(error) => return Err(WaitError::Remote(error)),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(WaitError::Timeout {
                    timeout: self.timeout,
                    last_status,
                });
            }

            let interval = spec.poll_interval.unwrap_or(backoff).max(floor);
            backoff = (backoff * 2).min(MAX_BACKOFF);
            self.sleep(interval.min(deadline - now)).await?;

            if Instant::now() >= deadline {
                return Err(WaitError::Timeout {
                    timeout: self.timeout,
                    last_status,
                });
            }
        }
    }

    async fn sleep(&self, duration: Duration) -> Result<(), WaitError> {
        if self.cancel.is_cancelled() {
            return Err(WaitError::Cancelled);
        }
        if duration.is_zero() {
            return Ok(());
        }
        tokio::select! {
            _ = self.cancel.cancelled() => Err(WaitError::Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::ErrorKind;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    const CREATE: WaitSpec = WaitSpec::new(&["CREATING"], &["CREATED"]);
    const DELETE: WaitSpec = WaitSpec::until_absent(&["DELETING"]);

    type Poll = Result<Option<(u32, String)>, RemoteError>;

    /// Replays `polls` in order, then repeats the last one forever.
    fn script(polls: Vec<Poll>) -> (Arc<Mutex<u32>>, impl FnMut() -> std::future::Ready<Poll>) {
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        let mut queue: VecDeque<Poll> = polls.into();
        let refresh = move || {
            *counter.lock().unwrap() += 1;
            let next = if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            };
            std::future::ready(next.unwrap_or(Ok(None)))
        };
        (calls, refresh)
    }

    fn status(s: &str) -> Poll {
        Ok(Some((7, s.to_string())))
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_then_target_succeeds_on_third_poll() {
        let classifier = RetryClassifier::default();
        let (calls, refresh) = script(vec![status("CREATING"), status("CREATING"), status("CREATED")]);
        let result = AsyncWaiter::new(&CREATE, Duration::from_secs(60), &classifier)
            .wait(refresh)
            .await;
        assert_eq!(result, Ok(Some(7)));
        assert_eq!(*calls.lock().unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_forever_times_out() {
        let classifier = RetryClassifier::default();
        let (_, refresh) = script(vec![status("CREATING")]);
        let started = Instant::now();
        let result = AsyncWaiter::new(&CREATE, Duration::from_secs(30), &classifier)
            .wait(refresh)
            .await;
        assert_eq!(
            result,
            Err(WaitError::Timeout {
                timeout: Duration::from_secs(30),
                last_status: "CREATING".to_string()
            })
        );
        assert!(started.elapsed() >= Duration::from_secs(30));
        assert!(started.elapsed() < Duration::from_secs(31));
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_stops_immediately() {
        let classifier = RetryClassifier::default();
        let (calls, refresh) = script(vec![
            status("CREATING"),
            Err(RemoteError::new(ErrorKind::AccessDenied, "Denied")),
        ]);
        let started = Instant::now();
        let result = AsyncWaiter::new(&CREATE, Duration::from_secs(600), &classifier)
            .wait(refresh)
            .await;
        assert!(matches!(result, Err(WaitError::Remote(_))));
        assert_eq!(*calls.lock().unwrap(), 2);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_keep_polling() {
        let classifier = RetryClassifier::default();
        let (calls, refresh) = script(vec![
            Err(RemoteError::new(ErrorKind::Throttling, "Rate exceeded")),
            status("CREATING"),
            Err(RemoteError::new(ErrorKind::InternalFailure, "oops")),
            status("CREATED"),
        ]);
        let result = AsyncWaiter::new(&CREATE, Duration::from_secs(60), &classifier)
            .wait(refresh)
            .await;
        assert_eq!(result, Ok(Some(7)));
        assert_eq!(*calls.lock().unwrap(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unexpected_status_is_fatal() {
        let classifier = RetryClassifier::default();
        let (_, refresh) = script(vec![status("CREATING"), status("CREATION_FAILED")]);
        let result = AsyncWaiter::new(&CREATE, Duration::from_secs(60), &classifier)
            .wait(refresh)
            .await;
        assert!(matches!(
            result,
            Err(WaitError::UnexpectedState { status, .. }) if status == "CREATION_FAILED"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_absence_is_success_when_waiting_for_delete() {
        let classifier = RetryClassifier::default();
        let (_, refresh) = script(vec![status("DELETING"), Ok(None)]);
        let result = AsyncWaiter::new(&DELETE, Duration::from_secs(60), &classifier)
            .wait(refresh)
            .await;
        assert_eq!(result, Ok(None));
    }

    #[tokio::test(start_paused = true)]
    async fn test_absence_tolerated_up_to_not_found_checks() {
        let classifier = RetryClassifier::default();
        let spec = CREATE.not_found_checks(2);
        let (_, refresh) = script(vec![Ok(None), Ok(None), status("CREATED")]);
        let result = AsyncWaiter::new(&spec, Duration::from_secs(60), &classifier)
            .wait(refresh)
            .await;
        assert_eq!(result, Ok(Some(7)));

        let (calls, refresh) = script(vec![Ok(None)]);
        let result = AsyncWaiter::new(&spec, Duration::from_secs(60), &classifier)
            .wait(refresh)
            .await;
        assert_eq!(result, Err(WaitError::NotFound { checks: 2 }));
        assert_eq!(*calls.lock().unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_continuous_target_occurrence() {
        let classifier = RetryClassifier::default();
        let spec = WaitSpec::new(&["UPDATING"], &["ACTIVE"]).continuous_target_occurrence(2);
        let (calls, refresh) = script(vec![
            status("ACTIVE"),
            status("UPDATING"),
            status("ACTIVE"),
            status("ACTIVE"),
        ]);
        let result = AsyncWaiter::new(&spec, Duration::from_secs(60), &classifier)
            .wait(refresh)
            .await;
        assert_eq!(result, Ok(Some(7)));
        assert_eq!(*calls.lock().unwrap(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_and_poll_floor() {
        let classifier = RetryClassifier::default();
        let spec = CREATE.delay(Duration::from_secs(5));
        let (_, refresh) = script(vec![status("CREATING"), status("CREATED")]);
        let started = Instant::now();
        AsyncWaiter::new(&spec, Duration::from_secs(60), &classifier)
            .with_poll_floor(Duration::from_secs(3))
            .wait(refresh)
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_secs(8));
        assert!(started.elapsed() < Duration::from_secs(9));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_is_distinct_from_timeout() {
        let classifier = RetryClassifier::default();
        let token = CancellationToken::new();
        let (_, refresh) = script(vec![status("CREATING")]);
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            canceller.cancel();
        });
        let result = AsyncWaiter::new(&CREATE, Duration::from_secs(600), &classifier)
            .with_cancellation(token)
            .wait(refresh)
            .await;
        assert_eq!(result, Err(WaitError::Cancelled));
    }
}
