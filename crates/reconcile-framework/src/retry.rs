//! # Retry Classification
//!
//! A remote failure is either *transient* (throttling, propagation delay, internal failure)
//! and worth retrying, or *permanent* and surfaced immediately. The classifier is a table of
//! `(kind, optional message substring)` rules evaluated in order; the first match wins and no
//! match means permanent.
//!
//! [`retry_transient`] wraps one whole mutating call in a bounded retry driven by the
//! classifier.

use crate::config::RetryPolicy;
use crate::error::ReconcileError;
use crate::remote::{ErrorKind, RemoteError};
use std::future::Future;
use tokio::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Transient,
    Permanent,
}

/// Marks remote errors of `kind` whose message contains `message` (if given) as transient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryRule {
    pub kind: ErrorKind,
    pub message: Option<&'static str>,
}

impl RetryRule {
    pub const fn kind(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    pub const fn message(kind: ErrorKind, message: &'static str) -> Self {
        Self {
            kind,
            message: Some(message),
        }
    }

    pub fn matches(&self, err: &RemoteError) -> bool {
        err.matches(&self.kind, self.message)
    }
}

/// Rules every family starts from.
pub fn default_rules() -> Vec<RetryRule> {
    vec![
        RetryRule::kind(ErrorKind::Throttling),
        RetryRule::kind(ErrorKind::InternalFailure),
        RetryRule::kind(ErrorKind::ConcurrentUpdating),
        RetryRule::kind(ErrorKind::ResourceUnavailable),
        RetryRule::message(ErrorKind::InvalidParameterValue, "not authorized to perform"),
        RetryRule::message(ErrorKind::InvalidParameterValue, "cannot be assumed"),
        RetryRule::message(
            ErrorKind::AccessDenied,
            "is not authorized to access requested permissions",
        ),
    ]
}

#[derive(Debug, Clone)]
pub struct RetryClassifier {
    rules: Vec<RetryRule>,
}

impl Default for RetryClassifier {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

impl RetryClassifier {
    /// A classifier with exactly `rules`, in order.
    pub fn new(rules: Vec<RetryRule>) -> Self {
        Self { rules }
    }

    /// The default rules followed by `extra`.
    pub fn with_rules(extra: impl IntoIterator<Item = RetryRule>) -> Self {
        let mut rules = default_rules();
        rules.extend(extra);
        Self { rules }
    }

    pub fn classify(&self, err: &RemoteError) -> ErrorClass {
        if self.rules.iter().any(|rule| rule.matches(err)) {
            ErrorClass::Transient
        } else {
            ErrorClass::Permanent
        }
    }

    pub fn is_transient(&self, err: &RemoteError) -> bool {
        self.classify(err) == ErrorClass::Transient
    }
}

/// Runs `f` until it succeeds, a permanent error occurs, or the policy's budget runs out.
///
/// Backoff grows exponentially between attempts. Once the budget is exhausted one final
/// attempt is made; if that also fails transiently the result is
/// [`ReconcileError::RetryExhausted`].
pub async fn retry_transient<T, F, Fut>(
    policy: &RetryPolicy,
    classifier: &RetryClassifier,
    operation: &str,
    mut f: F,
) -> Result<T, ReconcileError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    let deadline = Instant::now() + policy.budget();
    let mut attempt: u32 = 0;
    loop {
        let error = match f().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(operation, attempt = attempt + 1, "Operation succeeded after retries");
                }
                return Ok(value);
            }
            Err(error) if classifier.is_transient(&error) => error,
            Err(error) => return Err(ReconcileError::remote(operation, error)),
        };

        let now = Instant::now();
        if now >= deadline {
            debug!(operation, %error, "Retry budget spent, making final attempt");
            return match f().await {
                Ok(value) => Ok(value),
                Err(error) if classifier.is_transient(&error) => {
                    warn!(operation, attempts = attempt + 2, %error, "Retry budget exhausted");
                    Err(ReconcileError::RetryExhausted {
                        operation: operation.to_string(),
                        attempts: attempt + 2,
                        source: error,
                    })
                }
                Err(error) => Err(ReconcileError::remote(operation, error)),
            };
        }

        let delay = policy.backoff(attempt).min(deadline - now);
        warn!(
            operation,
            attempt = attempt + 1,
            delay_ms = delay.as_millis() as u64,
            %error,
            "Retrying after transient error"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use yare::parameterized;

    #[parameterized(
        throttling = { "ThrottlingException", "Rate exceeded" },
        internal_failure = { "InternalFailureException", "An internal failure occurred" },
        concurrent_update = { "ConcurrentUpdatingException", "Another update is in progress" },
        unavailable = { "ResourceUnavailableException", "Try again later" },
        iam_not_authorized = { "InvalidParameterValueException", "Role is not authorized to perform ec2:CreateNetworkInterface" },
        iam_cannot_assume = { "InvalidParameterValueException", "The role cannot be assumed by QuickSight" },
        permissions_propagating = { "AccessDeniedException", "User is not authorized to access requested permissions" },
    )]
    fn test_default_rules_are_transient(code: &str, message: &str) {
        let err = RemoteError::from_code(code, message);
        assert_eq!(RetryClassifier::default().classify(&err), ErrorClass::Transient);
    }

    #[parameterized(
        not_found = { "ResourceNotFoundException", "Data set not found" },
        plain_invalid_parameter = { "InvalidParameterValueException", "Name too long" },
        plain_access_denied = { "AccessDeniedException", "Denied" },
        exists = { "ResourceExistsException", "Already exists" },
        unknown_code = { "UnsupportedUserEditionException", "Enterprise only" },
    )]
    fn test_unlisted_errors_are_permanent(code: &str, message: &str) {
        let err = RemoteError::from_code(code, message);
        assert_eq!(RetryClassifier::default().classify(&err), ErrorClass::Permanent);
    }

    #[test]
    fn test_family_rules_extend_defaults() {
        let classifier =
            RetryClassifier::with_rules([RetryRule::message(ErrorKind::Conflict, "is being created")]);
        let err = RemoteError::new(ErrorKind::Conflict, "The namespace is being created");
        assert!(classifier.is_transient(&err));
        assert!(classifier.is_transient(&RemoteError::new(ErrorKind::Throttling, "slow down")));
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            budget_secs: 5,
            initial_backoff_ms: 100,
            max_backoff_ms: 1000,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result = retry_transient(&fast_policy(), &RetryClassifier::default(), "create", || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(RemoteError::new(ErrorKind::Throttling, "Rate exceeded"))
                } else {
                    Ok("done")
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_stops_on_permanent_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: Result<(), _> =
            retry_transient(&fast_policy(), &RetryClassifier::default(), "create", || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(RemoteError::new(ErrorKind::AccessDenied, "Denied")) }
            })
            .await;
        assert!(matches!(result, Err(ReconcileError::Remote { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_makes_final_attempt_after_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let started = Instant::now();
        let result: Result<(), _> =
            retry_transient(&fast_policy(), &RetryClassifier::default(), "update", || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(RemoteError::new(ErrorKind::Throttling, "Rate exceeded")) }
            })
            .await;
        match result {
            Err(ReconcileError::RetryExhausted { attempts, .. }) => {
                assert_eq!(attempts, calls.load(Ordering::SeqCst));
            }
            other => panic!("expected RetryExhausted, got {other:?}"),
        }
        assert!(started.elapsed() >= std::time::Duration::from_secs(5));
        assert!(started.elapsed() < std::time::Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_final_attempt_can_succeed() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let policy = RetryPolicy {
            budget_secs: 0,
            ..fast_policy()
        };
        let result = retry_transient(&policy, &RetryClassifier::default(), "create", || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(RemoteError::new(ErrorKind::InternalFailure, "oops"))
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
