//! Monotonic time sources.
//!
//! The cache never reads wall-clock time directly. Every timestamp comes from
//! an injected [`Clock`], which lets tests drive time by hand with
//! [`ManualClock`] while production code uses [`SystemClock`].
//!
//! Timestamps are plain tick counts ([`Timestamp`]). The unit is whatever the
//! clock decides: `SystemClock` counts microseconds since it was created,
//! `ManualClock` counts whatever the test advances it by. Hyperbolic
//! priorities and the minimum age are expressed in the same ticks.
//!
//! ## Example
//!
//! ```
//! use hypercache::clock::{Clock, ManualClock};
//!
//! let clock = ManualClock::new();
//! let observer = clock.clone();
//!
//! clock.advance(5);
//! assert_eq!(observer.now(), 5);
//!
//! clock.set(42);
//! assert_eq!(observer.now(), 42);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Clock reading in ticks.
pub type Timestamp = u64;

/// Source of monotonically non-decreasing timestamps.
pub trait Clock {
    /// Current time in ticks.
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    #[inline]
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Real monotonic clock counting microseconds since construction.
///
/// Backed by [`Instant`], so it never goes backwards.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock whose zero is the current instant.
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
    #[inline]
    fn now(&self) -> Timestamp {
        // u64 microseconds covers ~584k years.
        self.origin.elapsed().as_micros() as Timestamp
    }
}

/// Hand-driven clock for deterministic tests.
///
/// Clones share the same underlying counter, so a test can keep one handle
/// and give another to the cache.
///
/// `set` accepts any value, including one below the current reading, so a
/// test can drive a clock backwards and observe negative ages being clamped.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    ticks: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock reading 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock reading `start`.
    pub fn starting_at(start: Timestamp) -> Self {
        Self {
            ticks: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Moves the clock forward by `ticks`, saturating at `u64::MAX`.
    pub fn advance(&self, ticks: u64) {
        let _ = self
            .ticks
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |t| {
                Some(t.saturating_add(ticks))
            });
    }

    /// Sets the clock to an absolute reading.
    pub fn set(&self, ticks: Timestamp) {
        self.ticks.store(ticks, Ordering::Release);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> Timestamp {
        self.ticks.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_starts_at_zero() {
        assert_eq!(ManualClock::new().now(), 0);
        assert_eq!(ManualClock::starting_at(7).now(), 7);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let a = ManualClock::new();
        let b = a.clone();
        a.advance(3);
        b.advance(4);
        assert_eq!(a.now(), 7);
        assert_eq!(b.now(), 7);
    }

    #[test]
    fn manual_clock_advance_saturates() {
        let clock = ManualClock::starting_at(u64::MAX - 1);
        clock.advance(10);
        assert_eq!(clock.now(), u64::MAX);
    }

    #[test]
    fn manual_clock_can_move_backwards() {
        let clock = ManualClock::starting_at(100);
        clock.set(10);
        assert_eq!(clock.now(), 10);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let mut last = clock.now();
        for _ in 0..1_000 {
            let now = clock.now();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn clock_through_reference_and_arc() {
        let clock = ManualClock::starting_at(9);
        let by_ref = &clock;
        let by_arc = Arc::new(clock.clone());
        assert_eq!(Clock::now(&by_ref), 9);
        assert_eq!(by_arc.now(), 9);
    }
}
