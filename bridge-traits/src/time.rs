//! Time Abstractions
//!
//! Provides an injectable monotonic time source so the frame scheduler can be
//! tested deterministically without real timers.

use std::time::Instant;

/// Monotonic timestamp in milliseconds.
///
/// The epoch is arbitrary (typically clock construction); only differences
/// and orderings are meaningful. Absent timestamps are expressed as
/// `Option<TimeMs>` rather than a sentinel value.
pub type TimeMs = u64;

/// Monotonic time source trait.
///
/// Abstracts "now" to enable deterministic scheduler tests. Production code
/// uses [`SystemClock`]; tests drive a manual fake.
///
/// # Example
///
/// ```
/// use bridge_traits::time::{Clock, SystemClock};
///
/// fn elapsed_since(clock: &dyn Clock, start: u64) -> u64 {
///     clock.now().saturating_sub(start)
/// }
///
/// let clock = SystemClock::new();
/// assert!(elapsed_since(&clock, clock.now()) <= 1);
/// ```
pub trait Clock: Send + Sync {
    /// Current monotonic time in milliseconds.
    fn now(&self) -> TimeMs;
}

/// System clock anchored at its own construction time.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
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
    fn now(&self) -> TimeMs {
        self.origin.elapsed().as_millis() as TimeMs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
