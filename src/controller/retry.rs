// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! Exponential backoff for re-delivering events that failed with a retryable error.

use rand::Rng;
use std::collections::HashMap;
use std::time::Duration;

/// Initial retry interval (100ms)
const INITIAL_INTERVAL_MILLIS: u64 = 100;

/// Maximum interval between retries (30 seconds)
const MAX_INTERVAL_SECS: u64 = 30;

/// Backoff multiplier (exponential growth factor)
const BACKOFF_MULTIPLIER: f64 = 2.0;

/// Randomization factor to prevent thundering herd (±10%)
const RANDOMIZATION_FACTOR: f64 = 0.1;

/// Simple exponential backoff implementation.
///
/// Provides exponential backoff with randomization (jitter) to prevent thundering herd.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    /// Current interval duration
    pub current_interval: Duration,
    /// Initial interval duration, restored by [`ExponentialBackoff::reset`]
    pub initial_interval: Duration,
    /// Maximum interval duration
    pub max_interval: Duration,
    /// Backoff multiplier (typically 2.0 for doubling)
    pub multiplier: f64,
    /// Randomization factor (e.g., 0.1 for ±10%)
    pub randomization_factor: f64,
}

impl ExponentialBackoff {
    /// Create a new exponential backoff with specified parameters.
    #[must_use]
    pub fn new(
        initial_interval: Duration,
        max_interval: Duration,
        multiplier: f64,
        randomization_factor: f64,
    ) -> Self {
        Self {
            current_interval: initial_interval,
            initial_interval,
            max_interval,
            multiplier,
            randomization_factor,
        }
    }

    /// Get the next backoff interval. Retries never give up.
    pub fn next_backoff(&mut self) -> Duration {
        let interval = self.current_interval;
        let jittered = self.apply_jitter(interval);

        let next = interval.as_secs_f64() * self.multiplier;
        self.current_interval = Duration::from_secs_f64(next).min(self.max_interval);

        jittered
    }

    /// Start over from the initial interval.
    pub fn reset(&mut self) {
        self.current_interval = self.initial_interval;
    }

    fn apply_jitter(&self, interval: Duration) -> Duration {
        if self.randomization_factor == 0.0 {
            return interval;
        }

        let secs = interval.as_secs_f64();
        let delta = secs * self.randomization_factor;
        let jittered = rand::rng().random_range((secs - delta)..=(secs + delta));

        Duration::from_secs_f64(jittered.max(0.0))
    }
}

/// Backoff for event re-delivery.
///
/// # Configuration
///
/// - **Initial interval**: 100ms
/// - **Max interval**: 30 seconds
/// - Events are retried until they succeed or fail fatally
/// - **Multiplier**: 2.0 (exponential growth)
/// - **Randomization**: ±10% (prevents thundering herd)
///
/// # Retry Schedule
///
/// 100ms, 200ms, 400ms, 800ms, 1.6s, 3.2s, 6.4s, 12.8s, 25.6s, then 30s intervals.
#[must_use]
pub fn default_backoff() -> ExponentialBackoff {
    ExponentialBackoff::new(
        Duration::from_millis(INITIAL_INTERVAL_MILLIS),
        Duration::from_secs(MAX_INTERVAL_SECS),
        BACKOFF_MULTIPLIER,
        RANDOMIZATION_FACTOR,
    )
}

/// Per-key backoff state of one controller.
///
/// A key's backoff grows with every retryable failure and is dropped when the key
/// is handled successfully.
#[derive(Debug, Default)]
pub struct KeyBackoffs {
    backoffs: HashMap<String, ExponentialBackoff>,
}

impl KeyBackoffs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay before the next re-delivery of `key`.
    pub fn next(&mut self, key: &str) -> Duration {
        self.backoffs
            .entry(key.to_string())
            .or_insert_with(default_backoff)
            .next_backoff()
    }

    /// Forget the backoff of `key`.
    pub fn reset(&mut self, key: &str) {
        self.backoffs.remove(key);
    }

    /// Number of keys currently backing off.
    #[must_use]
    pub fn len(&self) -> usize {
        self.backoffs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backoffs.is_empty()
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod retry_tests;
