//! Time sources for tick timestamps
//!
//! The engine never reads a clock directly. It asks a [`TimeSource`] once per
//! committed tick, which keeps ticks deterministic under test:
//! - [`FixedTime`] for unit tests that don't care about time
//! - [`SteppedTime`] to emulate a scheduler cadence without sleeping
//! - [`SystemTime`] for wall-clock timestamps (requires std)

use core::cell::Cell;

/// Timestamp in milliseconds since epoch (or since start for simulated clocks)
pub type Timestamp = u64;

/// Source of time for the engine
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Check if this source provides wall clock time
    fn is_wall_clock(&self) -> bool {
        false
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn is_wall_clock(&self) -> bool {
        (**self).is_wall_clock()
    }
}

/// System time source (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

#[cfg(feature = "std")]
impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime as StdSystemTime, UNIX_EPOCH};

        StdSystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        true
    }
}

/// Fixed time source for testing
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Clock pinned at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Move the clock to `timestamp`
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Move the clock forward by `ms`
    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }
}

/// Clock that advances by a fixed step every time it is read
///
/// The first read returns `start`, the next `start + step`, and so on. With
/// the step set to the tick cadence, timestamps match what a real scheduler
/// would produce.
#[derive(Debug, Clone)]
pub struct SteppedTime {
    next: Cell<Timestamp>,
    step_ms: u64,
}

impl SteppedTime {
    /// Clock whose first read returns `start`
    pub fn new(start: Timestamp, step_ms: u64) -> Self {
        Self {
            next: Cell::new(start),
            step_ms,
        }
    }

    /// Timestamp the next read will return
    pub fn peek(&self) -> Timestamp {
        self.next.get()
    }
}

impl TimeSource for SteppedTime {
    fn now(&self) -> Timestamp {
        let current = self.next.get();
        self.next.set(current.saturating_add(self.step_ms));
        current
    }
}
