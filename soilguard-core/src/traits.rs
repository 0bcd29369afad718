//! Core traits for measurement sources
//!
//! The engine knows nothing about how a probe produces its numbers. It asks
//! a [`MeasurementSource`] for one value per channel per tick and checks the
//! answer is a finite, non-negative real.

use crate::events::Parameter;

/// Produces one raw measurement per call
///
/// Contract: return a finite value `>= 0`. The engine rejects anything else
/// with [`TickError::InvalidMeasurement`](crate::TickError::InvalidMeasurement)
/// and commits nothing for that tick.
///
/// Closures with the matching signature implement this trait, which is handy
/// in tests:
///
/// ```rust
/// use soilguard_core::traits::MeasurementSource;
/// use soilguard_core::events::Parameter;
///
/// let mut flat = |_p: Parameter, baseline: f64, _variance: f64, _inject: bool| baseline;
/// assert_eq!(flat.next_reading(Parameter::Moisture, 45.0, 2.0, false), 45.0);
/// ```
pub trait MeasurementSource {
    /// Sample a channel around `baseline`, jittered by up to `variance`
    ///
    /// `inject_anomaly` asks the source to perturb this sample well outside
    /// its normal spread. Sources are free to ignore it.
    fn next_reading(
        &mut self,
        parameter: Parameter,
        baseline: f64,
        variance: f64,
        inject_anomaly: bool,
    ) -> f64;
}

impl<F> MeasurementSource for F
where
    F: FnMut(Parameter, f64, f64, bool) -> f64,
{
    fn next_reading(
        &mut self,
        parameter: Parameter,
        baseline: f64,
        variance: f64,
        inject_anomaly: bool,
    ) -> f64 {
        self(parameter, baseline, variance, inject_anomaly)
    }
}

/// Trait for values that can be fed to the filter
pub trait Measurable {
    /// Finite and non-negative
    fn is_valid_measurement(&self) -> bool;
}

impl Measurable for f64 {
    fn is_valid_measurement(&self) -> bool {
        self.is_finite() && *self >= 0.0
    }
}
