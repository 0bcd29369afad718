//! Engine Configuration
//!
//! Every overridable constant of the engine in one value. Defaults come from
//! [`crate::constants`]; overrides use the `with_*` builder methods. The
//! engine validates the whole configuration before it is built, so a running
//! engine never sees malformed settings.
//!
//! ```rust
//! use soilguard_core::{EngineConfig, ConfigError};
//! use soilguard_core::detection::KalmanConfig;
//!
//! let config = EngineConfig::default()
//!     .with_kalman(KalmanConfig::default().with_measurement_noise(0.8))
//!     .with_history_capacity(50);
//! assert!(config.validate().is_ok());
//!
//! let broken = EngineConfig::default().with_alert_capacity(0);
//! assert_eq!(broken.validate(), Err(ConfigError::ZeroCapacity { name: "alert_capacity" }));
//! ```

use crate::{
    classify::BandTable,
    constants::{
        agronomy::{
            EC_PROBE, MOISTURE_PROBE, NITROGEN_PROBE, PHOSPHORUS_PROBE, PH_PROBE, POTASSIUM_PROBE,
        },
        buffers::{ALERT_CAPACITY, HISTORY_CAPACITY},
        filter::ACCURACY_GAIN,
    },
    detection::{CusumConfig, KalmanConfig},
    errors::{ConfigError, ConfigResult},
    events::Parameter,
};

/// Where a probe channel idles and how far it wanders
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelProfile {
    /// Value the channel idles at
    pub baseline: f64,
    /// Half-width of the uniform jitter
    pub variance: f64,
}

impl ChannelProfile {
    /// Profile from a `(baseline, variance)` pair
    pub const fn new((baseline, variance): (f64, f64)) -> Self {
        Self { baseline, variance }
    }
}

/// Per-parameter probe profiles, indexed by [`Parameter::index`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProbeTable {
    profiles: [ChannelProfile; 6],
}

impl Default for ProbeTable {
    fn default() -> Self {
        Self {
            profiles: [
                ChannelProfile::new(MOISTURE_PROBE),
                ChannelProfile::new(PH_PROBE),
                ChannelProfile::new(EC_PROBE),
                ChannelProfile::new(NITROGEN_PROBE),
                ChannelProfile::new(PHOSPHORUS_PROBE),
                ChannelProfile::new(POTASSIUM_PROBE),
            ],
        }
    }
}

impl ProbeTable {
    /// Profile of one channel
    pub fn get(&self, parameter: Parameter) -> &ChannelProfile {
        &self.profiles[parameter.index()]
    }

    /// Replace the profile of one channel
    pub fn with_profile(mut self, parameter: Parameter, profile: ChannelProfile) -> Self {
        self.profiles[parameter.index()] = profile;
        self
    }

    /// Reject non-finite or negative profiles
    pub fn validate(&self) -> ConfigResult<()> {
        for profile in self.profiles.iter() {
            if !profile.baseline.is_finite() {
                return Err(ConfigError::NonFinite { name: "probe_baseline" });
            }
            if !profile.variance.is_finite() {
                return Err(ConfigError::NonFinite { name: "probe_variance" });
            }
            if profile.baseline < 0.0 {
                return Err(ConfigError::Negative { name: "probe_baseline", value: profile.baseline });
            }
            if profile.variance < 0.0 {
                return Err(ConfigError::Negative { name: "probe_variance", value: profile.variance });
            }
        }
        Ok(())
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Moisture filter settings
    pub kalman: KalmanConfig,
    /// Change detector settings
    pub cusum: CusumConfig,
    /// Reference bands for classification
    pub bands: BandTable,
    /// Baseline and jitter requested from the source per channel
    pub probes: ProbeTable,
    /// Readings kept in the history window
    pub history_capacity: usize,
    /// Alerts kept in the alert log
    pub alert_capacity: usize,
    /// Fraction of the gap to 100% closed by each committed tick
    pub accuracy_gain: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kalman: KalmanConfig::default(),
            cusum: CusumConfig::default(),
            bands: BandTable::default(),
            probes: ProbeTable::default(),
            history_capacity: HISTORY_CAPACITY,
            alert_capacity: ALERT_CAPACITY,
            accuracy_gain: ACCURACY_GAIN,
        }
    }
}

impl EngineConfig {
    /// Replace the filter settings
    pub fn with_kalman(mut self, kalman: KalmanConfig) -> Self {
        self.kalman = kalman;
        self
    }

    /// Replace the detector settings
    pub fn with_cusum(mut self, cusum: CusumConfig) -> Self {
        self.cusum = cusum;
        self
    }

    /// Replace the reference bands
    pub fn with_bands(mut self, bands: BandTable) -> Self {
        self.bands = bands;
        self
    }

    /// Replace the probe profiles
    pub fn with_probes(mut self, probes: ProbeTable) -> Self {
        self.probes = probes;
        self
    }

    /// Set the history window size
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Set the alert log size
    pub fn with_alert_capacity(mut self, capacity: usize) -> Self {
        self.alert_capacity = capacity;
        self
    }

    /// Set the per-tick accuracy gain
    pub fn with_accuracy_gain(mut self, gain: f64) -> Self {
        self.accuracy_gain = gain;
        self
    }

    /// Validate every section
    pub fn validate(&self) -> ConfigResult<()> {
        self.kalman.validate()?;
        self.cusum.validate()?;
        self.bands.validate()?;
        self.probes.validate()?;

        if self.history_capacity == 0 {
            return Err(ConfigError::ZeroCapacity { name: "history_capacity" });
        }
        if self.alert_capacity == 0 {
            return Err(ConfigError::ZeroCapacity { name: "alert_capacity" });
        }

        if !self.accuracy_gain.is_finite() {
            return Err(ConfigError::NonFinite { name: "accuracy_gain" });
        }
        if self.accuracy_gain <= 0.0 || self.accuracy_gain > 1.0 {
            return Err(ConfigError::NotAFraction { name: "accuracy_gain", value: self.accuracy_gain });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ReferenceBand;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.history_capacity, 25);
        assert_eq!(config.alert_capacity, 8);
        assert_eq!(config.probes.get(Parameter::Moisture).baseline, 45.0);
    }

    #[test]
    fn zero_history_rejected() {
        let config = EngineConfig::default().with_history_capacity(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity { name: "history_capacity" }));
    }

    #[test]
    fn kalman_errors_surface() {
        let config = EngineConfig::default()
            .with_kalman(KalmanConfig::default().with_measurement_noise(-0.5));
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositive { name: "measurement_noise", value: -0.5 })
        );
    }

    #[test]
    fn band_errors_surface() {
        let bands = BandTable::default()
            .with_band(Parameter::Potassium, ReferenceBand::new((20.0, 30.0), (40.0, 15.0)));
        let config = EngineConfig::default().with_bands(bands);
        assert!(matches!(config.validate(), Err(ConfigError::InvertedBand { .. })));
    }

    #[test]
    fn negative_probe_variance_rejected() {
        let probes = ProbeTable::default()
            .with_profile(Parameter::Ec, ChannelProfile { baseline: 1.2, variance: -0.1 });
        let config = EngineConfig::default().with_probes(probes);
        assert_eq!(
            config.validate(),
            Err(ConfigError::Negative { name: "probe_variance", value: -0.1 })
        );
    }

    #[test]
    fn accuracy_gain_bounds() {
        assert!(EngineConfig::default().with_accuracy_gain(1.0).validate().is_ok());
        assert!(EngineConfig::default().with_accuracy_gain(0.0).validate().is_err());
        assert!(EngineConfig::default().with_accuracy_gain(1.5).validate().is_err());
    }
}
