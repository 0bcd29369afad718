//! Replay of recorded moisture readings
//!
//! Field logs are the best test data there is. [`ReplaySource`] feeds a
//! recorded moisture series through the engine one value per tick; the
//! auxiliary channels, which the recording usually lacks, read back at their
//! baselines.
//!
//! ```rust
//! use soilguard_core::events::Parameter;
//! use soilguard_core::source::ReplaySource;
//! use soilguard_core::traits::MeasurementSource;
//!
//! let mut replay = ReplaySource::new([44.0, 47.5]);
//! assert_eq!(replay.next_reading(Parameter::Moisture, 45.0, 2.0, false), 44.0);
//! assert_eq!(replay.next_reading(Parameter::Ph, 6.8, 0.2, false), 6.8);
//! assert_eq!(replay.next_reading(Parameter::Moisture, 45.0, 2.0, false), 47.5);
//! // Exhausted: falls back to the baseline
//! assert_eq!(replay.next_reading(Parameter::Moisture, 45.0, 2.0, false), 45.0);
//! ```

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::{events::Parameter, traits::MeasurementSource};

/// Replays a fixed moisture series
#[derive(Debug, Clone)]
pub struct ReplaySource {
    moisture: Vec<f64>,
    cursor: usize,
    looping: bool,
    /// Offset added to a moisture sample when an anomaly is injected
    injection_offset: f64,
}

impl ReplaySource {
    /// Replay `moisture` once, then return baselines
    pub fn new<I>(moisture: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        Self {
            moisture: moisture.into_iter().collect(),
            cursor: 0,
            looping: false,
            injection_offset: 0.0,
        }
    }

    /// Restart from the first value once the series is exhausted
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    /// Add `offset` to a moisture sample whenever injection is requested
    pub fn with_injection_offset(mut self, offset: f64) -> Self {
        self.injection_offset = offset;
        self
    }

    /// Moisture values not yet replayed (0 for a looping source that has data)
    pub fn remaining(&self) -> usize {
        if self.looping && !self.moisture.is_empty() {
            return 0;
        }
        self.moisture.len().saturating_sub(self.cursor)
    }

    fn next_moisture(&mut self) -> Option<f64> {
        if self.moisture.is_empty() {
            return None;
        }
        if self.cursor >= self.moisture.len() {
            if !self.looping {
                return None;
            }
            self.cursor = 0;
        }

        let value = self.moisture[self.cursor];
        self.cursor += 1;
        Some(value)
    }
}

impl MeasurementSource for ReplaySource {
    fn next_reading(
        &mut self,
        parameter: Parameter,
        baseline: f64,
        _variance: f64,
        inject_anomaly: bool,
    ) -> f64 {
        if parameter != Parameter::Moisture {
            return baseline;
        }

        let value = self.next_moisture().unwrap_or(baseline);
        if inject_anomaly {
            (value + self.injection_offset).max(0.0)
        } else {
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looping_replay_wraps() {
        let mut replay = ReplaySource::new([1.0, 2.0]).looping();
        let values: Vec<f64> = (0..5)
            .map(|_| replay.next_reading(Parameter::Moisture, 45.0, 0.0, false))
            .collect();
        assert_eq!(values, vec![1.0, 2.0, 1.0, 2.0, 1.0]);
    }

    #[test]
    fn injection_offset_is_clamped() {
        let mut replay = ReplaySource::new([10.0, 10.0]).with_injection_offset(-30.0);
        assert_eq!(replay.next_reading(Parameter::Moisture, 45.0, 0.0, true), 0.0);
        assert_eq!(replay.next_reading(Parameter::Moisture, 45.0, 0.0, false), 10.0);
    }

    #[test]
    fn remaining_counts_down() {
        let mut replay = ReplaySource::new([1.0, 2.0, 3.0]);
        assert_eq!(replay.remaining(), 3);
        replay.next_reading(Parameter::Moisture, 0.0, 0.0, false);
        replay.next_reading(Parameter::Nitrogen, 35.0, 0.0, false);
        assert_eq!(replay.remaining(), 2);
    }

    #[test]
    fn empty_replay_reads_baseline() {
        let mut replay = ReplaySource::new(core::iter::empty()).looping();
        assert_eq!(replay.next_reading(Parameter::Moisture, 45.0, 2.0, false), 45.0);
    }
}
