//! Buffer Sizes
//!
//! Capacities of the bounded in-memory windows kept by the engine. Nothing
//! outlives a run; these windows are the only history there is.

/// Number of sensor readings retained in the history window.
///
/// At the reference 2 s cadence this is 50 seconds of data, enough for a
/// trend sparkline without holding the whole run in memory.
pub const HISTORY_CAPACITY: usize = 25;

/// Number of alerts retained, newest first.
pub const ALERT_CAPACITY: usize = 8;

/// Number of soil parameters tracked per tick (moisture + 5 auxiliary).
pub const PARAMETER_COUNT: usize = 6;
