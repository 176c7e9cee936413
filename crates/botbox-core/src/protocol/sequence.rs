//! Local turn counter.
//!
//! The server's turn message carries a `turn` field, but older servers omit
//! it and nothing guarantees it is unique per notification.  Every dispatched
//! notification therefore also gets a local number from a [`TurnCounter`] so
//! log lines from concurrently running turns can be told apart.

use std::sync::atomic::{AtomicU64, Ordering};

/// A thread-safe, monotonically increasing counter.
///
/// Numbers start at 0 and wrap from `u64::MAX` back to 0 without panicking.
///
/// ```rust
/// use botbox_core::protocol::TurnCounter;
///
/// let counter = TurnCounter::new();
/// assert_eq!(counter.next(), 0);
/// assert_eq!(counter.next(), 1);
/// ```
#[derive(Debug)]
pub struct TurnCounter {
    inner: AtomicU64,
}

impl TurnCounter {
    pub fn new() -> Self {
        Self {
            inner: AtomicU64::new(0),
        }
    }

    /// Returns the next number and advances the counter.
    pub fn next(&self) -> u64 {
        self.inner.fetch_add(1, Ordering::Relaxed)
    }

    /// Number of turns handed out so far.
    pub fn current(&self) -> u64 {
        self.inner.load(Ordering::Relaxed)
    }
}

impl Default for TurnCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_turn_counter_starts_at_zero() {
        let counter = TurnCounter::new();
        assert_eq!(counter.next(), 0);
    }

    #[test]
    fn test_turn_counter_wraps_at_u64_max() {
        // Arrange – one step before overflow
        let counter = TurnCounter {
            inner: AtomicU64::new(u64::MAX),
        };

        // Act / Assert
        assert_eq!(counter.next(), u64::MAX);
        assert_eq!(counter.next(), 0, "counter must wrap to 0 after u64::MAX");
    }

    #[test]
    fn test_turn_counter_values_are_unique_across_threads() {
        // Arrange
        let counter = Arc::new(TurnCounter::new());

        // Act – many handling tasks may number their turns at once
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let c = Arc::clone(&counter);
                thread::spawn(move || (0..500).map(|_| c.next()).collect::<Vec<_>>())
            })
            .collect();
        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().expect("thread panicked"))
            .collect();

        // Assert
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 8 * 500);
        assert_eq!(counter.current(), 8 * 500);
    }
}
