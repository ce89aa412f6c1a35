//! # Flash Promoter Testing
//!
//! Testing utilities and helpers for Flash Promoter reducers and stores.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - The Given-When-Then [`ReducerTest`] harness
//! - Assertion helpers for effects, including cancellation keys
//!
//! ## Example
//!
//! ```ignore
//! use flash_promoter_testing::{mocks::SequentialIds, test_clock, ReducerTest};
//!
//! #[test]
//! fn closing_a_ticket_cancels_the_countdown() {
//!     ReducerTest::new(PromoterReducer)
//!         .with_env(test_environment())
//!         .given_state(state_with_active_ticket())
//!         .when_action(AppAction::CloseTicket)
//!         .then_effects(|effects| assertions::assert_cancels(effects, &COUNTDOWN))
//!         .run();
//! }
//! ```

use chrono::{DateTime, Utc};
use flash_promoter_core::environment::{Clock, IdGenerator};

/// Ergonomic reducer testing
pub mod reducer_test;

pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use flash_promoter_testing::mocks::FixedClock;
    /// use flash_promoter_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Predictable ids: `"{prefix}-1"`, `"{prefix}-2"`, ...
    ///
    /// The counter is shared across prefixes.
    ///
    /// ```
    /// use flash_promoter_testing::mocks::SequentialIds;
    /// use flash_promoter_core::environment::IdGenerator;
    ///
    /// let ids = SequentialIds::new();
    /// assert_eq!(ids.next_id("venue"), "venue-1");
    /// assert_eq!(ids.next_id("ticket"), "ticket-2");
    /// ```
    #[derive(Debug, Default)]
    pub struct SequentialIds {
        last: AtomicU64,
    }

    impl SequentialIds {
        /// Start counting from 1
        #[must_use]
        pub const fn new() -> Self {
            Self {
                last: AtomicU64::new(0),
            }
        }
    }

    impl IdGenerator for SequentialIds {
        fn next_id(&self, prefix: &str) -> String {
            let n = self.last.fetch_add(1, Ordering::Relaxed) + 1;
            format!("{prefix}-{n}")
        }
    }
}

/// Test helpers and utilities
pub mod helpers {
    /// Install a `tracing` subscriber that writes to the test harness
    ///
    /// Honors `RUST_LOG`; safe to call from every test.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock, SequentialIds};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[test]
    fn test_sequential_ids_never_repeat() {
        let ids = SequentialIds::new();
        let first = ids.next_id("ticket");
        let second = ids.next_id("ticket");
        assert_eq!(first, "ticket-1");
        assert_eq!(second, "ticket-2");
    }

    #[test]
    fn test_tracing_init_is_idempotent() {
        helpers::init_test_tracing();
        helpers::init_test_tracing();
    }
}
