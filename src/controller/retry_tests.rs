// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! Unit tests for `retry.rs`

#[cfg(test)]
mod tests {
    use super::super::{default_backoff, ExponentialBackoff, KeyBackoffs};
    use std::time::Duration;

    /// Test that backoff configuration has expected values
    #[test]
    fn test_backoff_configuration() {
        let backoff = default_backoff();

        assert_eq!(backoff.initial_interval, Duration::from_millis(100));
        assert_eq!(backoff.max_interval, Duration::from_secs(30));

        #[allow(clippy::float_cmp)]
        {
            assert_eq!(backoff.multiplier, 2.0);
            assert_eq!(backoff.randomization_factor, 0.1);
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps_without_jitter() {
        let mut backoff = ExponentialBackoff::new(
            Duration::from_secs(1),
            Duration::from_secs(5),
            2.0,
            0.0,
        );

        let intervals: Vec<Duration> = (0..5).map(|_| backoff.next_backoff()).collect();
        assert_eq!(
            intervals,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(5),
                Duration::from_secs(5),
            ]
        );
    }

    #[test]
    fn test_jitter_stays_within_ten_percent() {
        let mut backoff = default_backoff();
        for _ in 0..20 {
            let expected = backoff.current_interval.as_secs_f64();
            let actual = backoff.next_backoff().as_secs_f64();
            assert!(actual >= expected * 0.9 - 1e-9, "{actual} below {expected}");
            assert!(actual <= expected * 1.1 + 1e-9, "{actual} above {expected}");
        }
    }

    #[test]
    fn test_reset_restores_initial_interval() {
        let mut backoff = default_backoff();
        backoff.next_backoff();
        backoff.next_backoff();
        backoff.reset();
        assert_eq!(backoff.current_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_key_backoffs_are_independent() {
        let mut backoffs = KeyBackoffs::new();
        let first = backoffs.next("default/web");
        let second = backoffs.next("default/web");
        let other = backoffs.next("default/db");

        assert!(first <= Duration::from_millis(110));
        assert!(second >= Duration::from_millis(180));
        assert!(other <= Duration::from_millis(110));
        assert_eq!(backoffs.len(), 2);

        backoffs.reset("default/web");
        assert_eq!(backoffs.len(), 1);
        assert!(backoffs.next("default/web") <= Duration::from_millis(110));
    }
}
