// crates/tunebench-runner/src/poll.rs
// ============================================================================
// Module: Bounded Polling
// Description: Poll a check at a fixed interval until success or timeout.
// Purpose: Give readiness and shutdown waits one bounded loop.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! [`poll_until`] evaluates a check immediately, then once per interval, and
//! stops at the first success, the first error, or once the elapsed time
//! reaches the timeout. Elapsed time comes from the injected [`Clock`], so
//! the loop is bounded under both real and virtual time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use crate::interfaces::Clock;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Smallest interval slept between checks.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

// ============================================================================
// SECTION: Poll
// ============================================================================

/// Outcome of a bounded poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The check succeeded.
    Ready(T),
    /// The timeout elapsed first.
    TimedOut {
        /// Time elapsed when polling stopped.
        waited: Duration,
    },
}

/// Polls `check` every `interval` until it yields a value or `timeout`
/// elapses.
///
/// The check receives the zero-based attempt number.
///
/// # Errors
///
/// Returns the first error produced by `check`.
pub fn poll_until<C, T, E, F>(
    clock: &C,
    interval: Duration,
    timeout: Duration,
    mut check: F,
) -> Result<PollOutcome<T>, E>
where
    C: Clock + ?Sized,
    F: FnMut(u32) -> Result<Option<T>, E>,
{
    let interval = interval.max(MIN_POLL_INTERVAL);
    let start = clock.now();
    let mut attempt: u32 = 0;
    loop {
        if let Some(value) = check(attempt)? {
            return Ok(PollOutcome::Ready(value));
        }
        let waited = clock.now().saturating_sub(start);
        if waited >= timeout {
            return Ok(PollOutcome::TimedOut {
                waited,
            });
        }
        clock.sleep(interval.min(timeout - waited));
        attempt = attempt.saturating_add(1);
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn returns_first_success() {
        let clock = ManualClock::new();
        let outcome: Result<_, ()> =
            poll_until(&clock, Duration::from_secs(5), Duration::from_secs(60), |attempt| {
                Ok((attempt == 3).then_some(attempt))
            });
        assert_eq!(outcome.unwrap(), PollOutcome::Ready(3));
        assert_eq!(clock.now(), Duration::from_secs(15));
    }

    #[test]
    fn times_out_at_the_deadline() {
        let clock = ManualClock::new();
        let mut checks = 0;
        let outcome: Result<PollOutcome<()>, ()> =
            poll_until(&clock, Duration::from_secs(5), Duration::from_secs(60), |_| {
                checks += 1;
                Ok(None)
            });
        assert_eq!(
            outcome.unwrap(),
            PollOutcome::TimedOut {
                waited: Duration::from_secs(60),
            }
        );
        assert_eq!(checks, 13);
    }

    #[test]
    fn final_sleep_is_clamped_to_the_deadline() {
        let clock = ManualClock::new();
        let outcome: Result<PollOutcome<()>, ()> =
            poll_until(&clock, Duration::from_secs(7), Duration::from_secs(10), |_| Ok(None));
        assert_eq!(
            outcome.unwrap(),
            PollOutcome::TimedOut {
                waited: Duration::from_secs(10),
            }
        );
    }

    #[test]
    fn stops_on_first_error() {
        let clock = ManualClock::new();
        let outcome: Result<PollOutcome<()>, &str> =
            poll_until(&clock, Duration::from_secs(1), Duration::from_secs(60), |attempt| {
                if attempt == 2 { Err("exited") } else { Ok(None) }
            });
        assert_eq!(outcome.unwrap_err(), "exited");
        assert_eq!(clock.now(), Duration::from_secs(2));
    }

    #[test]
    fn zero_interval_still_terminates() {
        let clock = ManualClock::new();
        let outcome: Result<PollOutcome<()>, ()> =
            poll_until(&clock, Duration::ZERO, Duration::from_millis(5), |_| Ok(None));
        assert!(matches!(outcome.unwrap(), PollOutcome::TimedOut { .. }));
    }
}
