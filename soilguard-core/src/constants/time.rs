//! Time-Related Constants

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Reference tick cadence (milliseconds).
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 2000;
