//! Injected time source.
//!
//! The recency suppression rule compares "now" against a stored timestamp.
//! Reading the wall clock inside the engine would make that race window
//! untestable, so time flows in through this seam instead.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A hand-driven clock for deterministic tests.
///
/// Clones share the same underlying instant, so a test can hold one handle
/// while the engine owns another.
///
/// # Example
///
/// ```rust
/// use relink::ManualClock;
/// use std::time::Duration;
///
/// let clock = ManualClock::epoch();
/// let before = clock.now_value();
/// clock.advance(Duration::from_secs(6));
/// assert!(clock.now_value() > before);
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    micros: Arc<AtomicI64>,
}

impl ManualClock {
    /// Creates a clock frozen at the given instant.
    #[must_use]
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            micros: Arc::new(AtomicI64::new(instant.timestamp_micros())),
        }
    }

    /// Creates a clock frozen at the Unix epoch.
    #[must_use]
    pub fn epoch() -> Self {
        Self {
            micros: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let delta = i64::try_from(by.as_micros()).unwrap_or(i64::MAX);
        self.micros.fetch_add(delta, Ordering::SeqCst);
    }

    /// Sets the clock to a specific instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        self.micros.store(instant.timestamp_micros(), Ordering::SeqCst);
    }

    /// Returns the current value without going through the trait.
    #[must_use]
    pub fn now_value(&self) -> DateTime<Utc> {
        self.now()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_micros(self.micros.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::epoch();
        let start = clock.now();
        clock.advance(Duration::from_secs(5));
        assert_eq!(clock.now() - start, chrono::Duration::seconds(5));
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::epoch();
        let handle = clock.clone();
        clock.advance(Duration::from_millis(1500));
        assert_eq!(handle.now(), clock.now());
    }

    #[test]
    fn test_system_clock_is_monotonic_enough() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
