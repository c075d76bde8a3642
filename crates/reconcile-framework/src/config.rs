//! Reconciler configuration.
//!
//! Durations are stored as whole seconds or milliseconds so the configuration reads
//! naturally from JSON; accessors hand out [`Duration`]s.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Wait budgets for the asynchronous phases of one resource family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Timeouts {
    pub const fn uniform(timeout: Duration) -> Self {
        Self {
            create: timeout,
            update: timeout,
            delete: timeout,
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::uniform(Duration::from_secs(5 * 60))
    }
}

/// Per-operation overrides of a family's default timeouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutOverrides {
    pub create_secs: Option<u64>,
    pub update_secs: Option<u64>,
    pub delete_secs: Option<u64>,
}

impl TimeoutOverrides {
    pub fn apply(&self, defaults: Timeouts) -> Timeouts {
        let pick = |o: Option<u64>, d: Duration| o.map_or(d, Duration::from_secs);
        Timeouts {
            create: pick(self.create_secs, defaults.create),
            update: pick(self.update_secs, defaults.update),
            delete: pick(self.delete_secs, defaults.delete),
        }
    }
}

/// Bounded retry of a single mutating call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Overall time budget in seconds. One final attempt is made once it runs out.
    pub budget_secs: u64,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            budget_secs: 2 * 60,
            initial_backoff_ms: 500,
            max_backoff_ms: 10_000,
        }
    }
}

impl RetryPolicy {
    pub fn budget(&self) -> Duration {
        Duration::from_secs(self.budget_secs)
    }

    /// `min(initial * 2^attempt, max)`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let ms = self
            .initial_backoff_ms
            .saturating_mul(2u64.saturating_pow(attempt))
            .min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Account used when a declared identity leaves the account part unset.
    pub account_id: String,
    pub timeouts: TimeoutOverrides,
    pub retry: RetryPolicy,
    /// Floor applied to every waiter poll interval.
    pub min_poll_interval_ms: u64,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            account_id: String::new(),
            timeouts: TimeoutOverrides::default(),
            retry: RetryPolicy::default(),
            min_poll_interval_ms: 0,
        }
    }
}

impl ReconcilerConfig {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            ..Self::default()
        }
    }

    pub fn min_poll_interval(&self) -> Duration {
        Duration::from_millis(self.min_poll_interval_ms)
    }
}
