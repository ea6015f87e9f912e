// crates/tunebench-runner/src/clock.rs
// ============================================================================
// Module: Clocks
// Description: Wall and virtual clock implementations.
// Purpose: Let polling loops run against real time or simulated time.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! [`SystemClock`] measures from its creation instant and sleeps the thread.
//! [`ManualClock`] never blocks: sleeping advances virtual time, so bounded
//! polling loops finish instantly in tests and simulations.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use crate::interfaces::Clock;

// ============================================================================
// SECTION: System Clock
// ============================================================================

/// Monotonic wall clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    /// Instant the clock was created.
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock anchored at the current instant.
    #[must_use]
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

// ============================================================================
// SECTION: Manual Clock
// ============================================================================

/// Virtual clock advanced by sleeping.
///
/// Clones share the same timeline.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    /// Current virtual time.
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    /// Creates a clock at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances virtual time.
    pub fn advance(&self, duration: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now = now.saturating_add(duration);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.lock().map(|now| *now).unwrap_or_default()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
