//! Two-Sided CUSUM on the Kalman Innovation Sequence
//!
//! Page's cumulative-sum test, run on the filter's innovations rather than on
//! raw or filtered values. Under normal operation the innovations are
//! zero-mean, so the detector reacts to *unexpected* deviations; slow
//! legitimate drift already absorbed into the estimate does not accumulate.
//!
//! ```text
//! S⁺ = max(0, S⁺ + y - k)
//! S⁻ = min(0, S⁻ + y + k)
//!
//! S⁺ >  h  →  High
//! S⁻ < -h  →  Low
//! ```
//!
//! `k` is the slack (0.5) and `h` the threshold (5). The statistics are not
//! zeroed after an alarm; only an engine reset clears them. O(1) per tick.

use crate::{
    constants::filter::{CUSUM_SLACK, CUSUM_THRESHOLD},
    errors::{ConfigError, ConfigResult},
    events::Direction,
};

/// CUSUM configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CusumConfig {
    /// Per-tick tolerance subtracted from each increment (k)
    pub slack: f64,
    /// Decision threshold (h)
    pub threshold: f64,
}

impl Default for CusumConfig {
    fn default() -> Self {
        Self {
            slack: CUSUM_SLACK,
            threshold: CUSUM_THRESHOLD,
        }
    }
}

impl CusumConfig {
    /// Set the slack `k`
    pub fn with_slack(mut self, slack: f64) -> Self {
        self.slack = slack;
        self
    }

    /// Set the alarm threshold `h`
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Reject non-finite or non-positive values
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, value) in [("cusum_slack", self.slack), ("cusum_threshold", self.threshold)] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { name });
            }
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        Ok(())
    }
}

/// Accumulated statistics; `positive ≥ 0` and `negative ≤ 0` after every step
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CumSumState {
    /// Upper statistic `S+`
    pub positive: f64,
    /// Lower statistic `S-`
    pub negative: f64,
}

/// Result of one detector step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CusumVerdict {
    /// Statistics after the step
    pub state: CumSumState,
    /// Whether either statistic crossed the threshold
    pub is_anomaly: bool,
    /// `High`, `Low` or `Normal`
    pub direction: Direction,
}

impl CumSumState {
    /// Pure transition on one innovation
    pub fn advance(&self, innovation: f64, config: &CusumConfig) -> CusumVerdict {
        let positive = (self.positive + innovation - config.slack).max(0.0);
        let negative = (self.negative + innovation + config.slack).min(0.0);

        let direction = if positive > config.threshold {
            Direction::High
        } else if negative < -config.threshold {
            Direction::Low
        } else {
            Direction::Normal
        };

        CusumVerdict {
            state: CumSumState { positive, negative },
            is_anomaly: direction != Direction::Normal,
            direction,
        }
    }

    /// Whether both statistics are finite
    pub fn is_finite(&self) -> bool {
        self.positive.is_finite() && self.negative.is_finite()
    }
}

/// Stateful two-sided CUSUM
#[derive(Debug, Clone)]
pub struct CumSumDetector {
    config: CusumConfig,
    state: CumSumState,
}

impl CumSumDetector {
    /// Detector with zeroed statistics
    pub fn new(config: CusumConfig) -> Self {
        Self {
            config,
            state: CumSumState::default(),
        }
    }

    /// Compute the verdict for an innovation without storing it
    pub fn preview(&self, innovation: f64) -> CusumVerdict {
        self.state.advance(innovation, &self.config)
    }

    /// Consume one innovation and store the new statistics
    pub fn step(&mut self, innovation: f64) -> CusumVerdict {
        let verdict = self.preview(innovation);
        self.state = verdict.state;
        verdict
    }

    pub(crate) fn commit(&mut self, state: CumSumState) {
        self.state = state;
    }

    /// Current statistics
    pub fn state(&self) -> &CumSumState {
        &self.state
    }

    /// Detector settings
    pub fn config(&self) -> &CusumConfig {
        &self.config
    }

    /// Zero both statistics
    pub fn reset(&mut self) {
        self.state = CumSumState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_large_innovation_fires_high() {
        let mut detector = CumSumDetector::new(CusumConfig::default());
        let verdict = detector.step(25.0);

        assert_eq!(verdict.state.positive, 24.5);
        assert_eq!(verdict.state.negative, 0.0);
        assert!(verdict.is_anomaly);
        assert_eq!(verdict.direction, Direction::High);
    }

    #[test]
    fn positive_grows_by_excess_over_slack() {
        let mut detector = CumSumDetector::new(CusumConfig::default());
        let v = 2.0;

        // 1.5 per tick: 1.5, 3.0, 4.5, 6.0 -> fires on the fourth tick
        for tick in 1..=3 {
            let verdict = detector.step(v);
            assert_eq!(verdict.state.positive, 1.5 * tick as f64);
            assert!(!verdict.is_anomaly);
        }

        let verdict = detector.step(v);
        assert_eq!(verdict.state.positive, 6.0);
        assert_eq!(verdict.direction, Direction::High);
    }

    #[test]
    fn negative_mirror_fires_low() {
        let mut detector = CumSumDetector::new(CusumConfig::default());

        for _ in 0..3 {
            assert!(!detector.step(-2.0).is_anomaly);
        }

        let verdict = detector.step(-2.0);
        assert_eq!(verdict.state.negative, -6.0);
        assert_eq!(verdict.state.positive, 0.0);
        assert_eq!(verdict.direction, Direction::Low);
    }

    #[test]
    fn small_innovations_never_accumulate() {
        let mut detector = CumSumDetector::new(CusumConfig::default());

        for i in 0..100 {
            let y = if i % 2 == 0 { 0.4 } else { -0.4 };
            let verdict = detector.step(y);
            assert_eq!(verdict.state, CumSumState::default());
            assert_eq!(verdict.direction, Direction::Normal);
        }
    }

    #[test]
    fn alarm_does_not_reset_statistic() {
        let mut detector = CumSumDetector::new(CusumConfig::default());
        detector.step(10.0);
        let verdict = detector.step(0.5);
        assert_eq!(verdict.state.positive, 9.5);
        assert!(verdict.is_anomaly);
    }

    #[test]
    fn reset_zeroes_state() {
        let mut detector = CumSumDetector::new(CusumConfig::default());
        detector.step(3.0);
        detector.step(-9.0);
        detector.reset();
        assert_eq!(*detector.state(), CumSumState { positive: 0.0, negative: 0.0 });
    }

    #[test]
    fn validation() {
        assert!(CusumConfig::default().validate().is_ok());
        assert_eq!(
            CusumConfig::default().with_threshold(-1.0).validate(),
            Err(ConfigError::NonPositive { name: "cusum_threshold", value: -1.0 })
        );
    }
}
