//! Agronomic Range Classification
//!
//! ## Overview
//!
//! Each soil parameter has two nested reference bands:
//!
//! ```text
//!   critical │   warning   │    optimal    │   warning   │ critical
//! ───────────┼─────────────┼───────────────┼─────────────┼──────────
//!        warning.0     optimal.0       optimal.1     warning.1
//! ```
//!
//! A value inside the optimal band (bounds inclusive) is `Optimal`, inside the
//! warning band `Warning`, anywhere else `Critical`. NaN falls in no band and
//! is therefore `Critical`.
//!
//! Classification is a pure lookup with no state. Keys that don't name a
//! parameter yield [`Classification::Unknown`] instead of an error, so a
//! consumer can render an "unknown" tag without special handling.
//!
//! ## Usage Example
//!
//! ```rust
//! use soilguard_core::classify::{Classification, RangeClassifier};
//!
//! let classifier = RangeClassifier::default();
//!
//! assert_eq!(classifier.classify(40.0, "moisture"), Classification::Optimal);
//! assert_eq!(classifier.classify(36.0, "moisture"), Classification::Warning);
//! assert_eq!(classifier.classify(10.0, "moisture"), Classification::Critical);
//! assert_eq!(classifier.classify(40.0, "salinity"), Classification::Unknown);
//! ```

use crate::{
    constants::agronomy::*,
    errors::{BandKind, ConfigError, ConfigResult},
    events::Parameter,
};

/// Outcome of classifying a value against its reference bands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Classification {
    /// Inside the optimal band
    Optimal,
    /// Outside optimal, inside warning
    Warning,
    /// Outside the warning band
    Critical,
    /// Parameter key was not recognised
    Unknown,
}

impl Classification {
    /// Lowercase tag for display
    pub const fn as_str(&self) -> &'static str {
        match self {
            Classification::Optimal => "optimal",
            Classification::Warning => "warning",
            Classification::Critical => "critical",
            Classification::Unknown => "unknown",
        }
    }
}

/// Optimal and warning bands of one parameter, both `(low, high)` inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceBand {
    /// Optimal `(low, high)`
    pub optimal: (f64, f64),
    /// Warning `(low, high)`, containing the optimal band
    pub warning: (f64, f64),
}

impl ReferenceBand {
    /// Band from its optimal and warning ranges
    pub const fn new(optimal: (f64, f64), warning: (f64, f64)) -> Self {
        Self { optimal, warning }
    }

    /// Classify a value against this band pair
    pub fn classify(&self, value: f64) -> Classification {
        if within(value, self.optimal) {
            Classification::Optimal
        } else if within(value, self.warning) {
            Classification::Warning
        } else {
            Classification::Critical
        }
    }

    /// Check bounds are finite, ordered, and strictly nested
    pub fn validate(&self, parameter: Parameter) -> ConfigResult<()> {
        let (opt_lo, opt_hi) = self.optimal;
        let (warn_lo, warn_hi) = self.warning;

        for bound in [opt_lo, opt_hi, warn_lo, warn_hi] {
            if !bound.is_finite() {
                return Err(ConfigError::NonFinite { name: "reference band bound" });
            }
        }

        if opt_lo > opt_hi {
            return Err(ConfigError::InvertedBand { parameter, band: BandKind::Optimal });
        }
        if warn_lo > warn_hi {
            return Err(ConfigError::InvertedBand { parameter, band: BandKind::Warning });
        }
        if !(warn_lo < opt_lo && opt_hi < warn_hi) {
            return Err(ConfigError::BandNotNested { parameter });
        }

        Ok(())
    }
}

#[inline]
fn within(value: f64, (low, high): (f64, f64)) -> bool {
    value >= low && value <= high
}

/// Reference bands for every parameter, indexed by [`Parameter::index`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BandTable {
    bands: [ReferenceBand; 6],
}

impl Default for BandTable {
    fn default() -> Self {
        Self {
            bands: [
                ReferenceBand::new(MOISTURE_OPTIMAL, MOISTURE_WARNING),
                ReferenceBand::new(PH_OPTIMAL, PH_WARNING),
                ReferenceBand::new(EC_OPTIMAL, EC_WARNING),
                ReferenceBand::new(NITROGEN_OPTIMAL, NITROGEN_WARNING),
                ReferenceBand::new(PHOSPHORUS_OPTIMAL, PHOSPHORUS_WARNING),
                ReferenceBand::new(POTASSIUM_OPTIMAL, POTASSIUM_WARNING),
            ],
        }
    }
}

impl BandTable {
    /// Bands of one parameter
    pub fn get(&self, parameter: Parameter) -> &ReferenceBand {
        &self.bands[parameter.index()]
    }

    /// Replace the bands of one parameter
    pub fn with_band(mut self, parameter: Parameter, band: ReferenceBand) -> Self {
        self.bands[parameter.index()] = band;
        self
    }

    /// Validate every band in the table
    pub fn validate(&self) -> ConfigResult<()> {
        Parameter::ALL
            .iter()
            .try_for_each(|&p| self.get(p).validate(p))
    }
}

/// Stateless classifier over a validated [`BandTable`]
#[derive(Debug, Clone, Default)]
pub struct RangeClassifier {
    table: BandTable,
}

impl RangeClassifier {
    /// Build a classifier, rejecting malformed bands
    pub fn new(table: BandTable) -> ConfigResult<Self> {
        table.validate()?;
        Ok(Self { table })
    }

    /// Classify by parameter key; unrecognised keys yield `Unknown`
    pub fn classify(&self, value: f64, key: &str) -> Classification {
        match key.parse::<Parameter>() {
            Ok(parameter) => self.classify_parameter(value, parameter),
            Err(_) => Classification::Unknown,
        }
    }

    /// Classify a known parameter; never yields `Unknown`
    pub fn classify_parameter(&self, value: f64, parameter: Parameter) -> Classification {
        self.table.get(parameter).classify(value)
    }

    /// The bands in use
    pub fn table(&self) -> &BandTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moisture_boundaries() {
        let c = RangeClassifier::default();

        assert_eq!(c.classify(40.0, "moisture"), Classification::Optimal);
        assert_eq!(c.classify(50.0, "moisture"), Classification::Optimal);
        assert_eq!(c.classify(36.0, "moisture"), Classification::Warning);
        assert_eq!(c.classify(55.0, "moisture"), Classification::Warning);
        assert_eq!(c.classify(55.01, "moisture"), Classification::Critical);
        assert_eq!(c.classify(10.0, "moisture"), Classification::Critical);
    }

    #[test]
    fn unknown_key_for_any_value() {
        let c = RangeClassifier::default();

        for value in [f64::NEG_INFINITY, -1.0, 0.0, 45.0, 1e9, f64::NAN] {
            assert_eq!(c.classify(value, "unknown_param"), Classification::Unknown);
        }
    }

    #[test]
    fn auxiliary_defaults() {
        let c = RangeClassifier::default();

        assert_eq!(c.classify_parameter(6.8, Parameter::Ph), Classification::Optimal);
        assert_eq!(c.classify_parameter(7.3, Parameter::Ph), Classification::Warning);
        assert_eq!(c.classify_parameter(1.9, Parameter::Ec), Classification::Critical);
        assert_eq!(c.classify_parameter(27.0, Parameter::Nitrogen), Classification::Warning);
        assert_eq!(c.classify_parameter(20.0, Parameter::Phosphorus), Classification::Optimal);
        assert_eq!(c.classify_parameter(14.9, Parameter::Potassium), Classification::Critical);
    }

    #[test]
    fn nan_is_critical() {
        let c = RangeClassifier::default();
        assert_eq!(c.classify_parameter(f64::NAN, Parameter::Moisture), Classification::Critical);
    }

    #[test]
    fn default_table_is_valid() {
        assert!(BandTable::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_band() {
        let table = BandTable::default()
            .with_band(Parameter::Ph, ReferenceBand::new((7.0, 6.5), (6.0, 7.5)));

        assert_eq!(
            RangeClassifier::new(table).unwrap_err(),
            ConfigError::InvertedBand { parameter: Parameter::Ph, band: BandKind::Optimal }
        );
    }

    #[test]
    fn rejects_touching_bands() {
        // Warning band must be strictly wider on both sides
        let table = BandTable::default()
            .with_band(Parameter::Ec, ReferenceBand::new((1.0, 1.5), (1.0, 1.8)));

        assert_eq!(
            table.validate(),
            Err(ConfigError::BandNotNested { parameter: Parameter::Ec })
        );
    }

    #[test]
    fn rejects_non_finite_bound() {
        let table = BandTable::default()
            .with_band(Parameter::Nitrogen, ReferenceBand::new((30.0, f64::INFINITY), (25.0, 45.0)));

        assert!(matches!(table.validate(), Err(ConfigError::NonFinite { .. })));
    }
}
