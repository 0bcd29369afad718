//! Adaptive Scalar Kalman Filter
//!
//! ## Overview
//!
//! Soil moisture is tracked as a single random-walk state: no control input,
//! identity transition, identity measurement. The general Kalman equations
//! collapse to scalars:
//!
//! ### 1. Prediction Step
//! ```text
//! State prediction:       x̂⁻ = x̂
//! Covariance prediction:  P⁻ = P + Q
//! ```
//!
//! ### 2. Update Step
//! ```text
//! Innovation:      y = z - x̂⁻
//! Innovation cov:  S = P⁻ + R
//! Kalman gain:     K = P⁻ / S
//! State update:    x̂ = x̂⁻ + K·y
//! Covariance:      P = (1 - K)·P⁻
//! ```
//!
//! ## Adaptive Process Noise
//!
//! After the update the normalized innovation squared is tested against the
//! 95% chi-square critical value for one degree of freedom:
//!
//! ```text
//! λ = y² / S
//! λ > 3.84  →  Q_next = Q_base × 2.5   (inflated: trust new data more)
//! λ ≤ 3.84  →  Q_next = Q_base         (nominal)
//! ```
//!
//! There are exactly two regimes. Consecutive surprises do not compound the
//! inflation: the inflated level is always `Q_base × factor`, and the first
//! unsurprising tick drops straight back to `Q_base`.
//!
//! Because `R > 0` is enforced when the configuration is validated, `S` is
//! always strictly positive and the division never needs a guard.
//!
//! ## Usage Example
//!
//! ```rust
//! use soilguard_core::detection::{KalmanConfig, KalmanEstimator};
//!
//! let mut kf = KalmanEstimator::new(KalmanConfig::default());
//!
//! let step = kf.step(70.0);
//! assert!(step.inflated);
//! assert!((step.state.estimate - 61.72).abs() < 0.01);
//! assert!((kf.state().process_noise - 0.025).abs() < 1e-12);
//! ```

use crate::{
    constants::filter::{
        CHI_SQUARE_95_1DOF, INITIAL_ERROR_COVARIANCE, INITIAL_ESTIMATE, MEASUREMENT_NOISE,
        PROCESS_NOISE_BASE, PROCESS_NOISE_INFLATION,
    },
    errors::{ConfigError, ConfigResult},
};

/// Kalman filter configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KalmanConfig {
    /// Initial state estimate
    pub initial_estimate: f64,
    /// Initial estimation error covariance (P₀)
    pub initial_error_covariance: f64,
    /// Nominal process noise (Q)
    pub process_noise_base: f64,
    /// Multiplier giving the inflated process noise
    pub process_noise_inflation: f64,
    /// Measurement noise (R), fixed
    pub measurement_noise: f64,
    /// Critical value for the normalized innovation squared
    pub chi_square_threshold: f64,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            initial_estimate: INITIAL_ESTIMATE,
            initial_error_covariance: INITIAL_ERROR_COVARIANCE,
            process_noise_base: PROCESS_NOISE_BASE,
            process_noise_inflation: PROCESS_NOISE_INFLATION,
            measurement_noise: MEASUREMENT_NOISE,
            chi_square_threshold: CHI_SQUARE_95_1DOF,
        }
    }
}

impl KalmanConfig {
    /// Set the starting estimate
    pub fn with_initial_estimate(mut self, estimate: f64) -> Self {
        self.initial_estimate = estimate;
        self
    }

    /// Set nominal process noise (higher = less trust in model)
    pub fn with_process_noise(mut self, noise: f64) -> Self {
        self.process_noise_base = noise;
        self
    }

    /// Set the inflation multiplier applied after a surprise
    pub fn with_inflation(mut self, factor: f64) -> Self {
        self.process_noise_inflation = factor;
        self
    }

    /// Set measurement noise variance
    pub fn with_measurement_noise(mut self, noise: f64) -> Self {
        self.measurement_noise = noise;
        self
    }

    /// Set the chi-square critical value
    pub fn with_chi_square_threshold(mut self, threshold: f64) -> Self {
        self.chi_square_threshold = threshold;
        self
    }

    /// Process noise used for one tick after a surprise
    pub fn inflated_process_noise(&self) -> f64 {
        self.process_noise_base * self.process_noise_inflation
    }

    /// State the filter starts from and returns to on reset
    pub fn initial_state(&self) -> KalmanState {
        KalmanState {
            estimate: self.initial_estimate,
            error_covariance: self.initial_error_covariance,
            process_noise: self.process_noise_base,
            measurement_noise: self.measurement_noise,
            innovation: 0.0,
        }
    }

    /// Reject settings that would break the filter invariants
    pub fn validate(&self) -> ConfigResult<()> {
        let named = [
            ("initial_estimate", self.initial_estimate),
            ("initial_error_covariance", self.initial_error_covariance),
            ("process_noise_base", self.process_noise_base),
            ("process_noise_inflation", self.process_noise_inflation),
            ("measurement_noise", self.measurement_noise),
            ("chi_square_threshold", self.chi_square_threshold),
        ];
        if let Some(&(name, _)) = named.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::NonFinite { name });
        }

        if self.initial_error_covariance < 0.0 {
            return Err(ConfigError::Negative {
                name: "initial_error_covariance",
                value: self.initial_error_covariance,
            });
        }

        for (name, value) in [
            ("process_noise_base", self.process_noise_base),
            ("measurement_noise", self.measurement_noise),
            ("chi_square_threshold", self.chi_square_threshold),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { name, value });
            }
        }

        if self.process_noise_inflation <= 1.0 {
            return Err(ConfigError::InvalidInflation { value: self.process_noise_inflation });
        }

        Ok(())
    }
}

/// Filter state after a step
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KalmanState {
    /// Current moisture estimate
    pub estimate: f64,
    /// Estimation error covariance (P), never negative
    pub error_covariance: f64,
    /// Process noise (Q) to use on the next prediction
    pub process_noise: f64,
    /// Measurement noise (R), copied from configuration
    pub measurement_noise: f64,
    /// Innovation of the step that produced this state
    pub innovation: f64,
}

/// Everything computed during one filter step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KalmanStep {
    /// The state after the update
    pub state: KalmanState,
    /// Predicted covariance P⁻
    pub predicted_error_covariance: f64,
    /// Innovation covariance S
    pub innovation_covariance: f64,
    /// Normalized innovation squared λ
    pub normalized_innovation: f64,
    /// Kalman gain K
    pub gain: f64,
    /// Whether λ exceeded the chi-square threshold
    pub inflated: bool,
}

impl KalmanStep {
    /// Innovation size in standard deviations, `|y| / √S`
    pub fn innovation_sigma(&self) -> f64 {
        libm::sqrt(self.normalized_innovation)
    }
}

impl KalmanState {
    /// Pure transition: previous state plus one measurement
    ///
    /// Nothing is stored; [`KalmanEstimator::step`] wraps this and commits
    /// the result.
    pub fn advance(&self, measurement: f64, config: &KalmanConfig) -> KalmanStep {
        // Predict
        let predicted_estimate = self.estimate;
        let predicted_error_covariance = self.error_covariance + self.process_noise;

        // Innovation
        let innovation = measurement - predicted_estimate;
        let innovation_covariance = predicted_error_covariance + self.measurement_noise;

        // Adaptive Q
        let normalized_innovation = innovation * innovation / innovation_covariance;
        let inflated = normalized_innovation > config.chi_square_threshold;
        let process_noise = if inflated {
            config.inflated_process_noise()
        } else {
            config.process_noise_base
        };

        // Update
        let gain = predicted_error_covariance / innovation_covariance;
        let estimate = predicted_estimate + gain * innovation;
        let error_covariance = (1.0 - gain) * predicted_error_covariance;

        KalmanStep {
            state: KalmanState {
                estimate,
                error_covariance,
                process_noise,
                measurement_noise: self.measurement_noise,
                innovation,
            },
            predicted_error_covariance,
            innovation_covariance,
            normalized_innovation,
            gain,
            inflated,
        }
    }

    /// All fields are finite numbers
    pub fn is_finite(&self) -> bool {
        self.estimate.is_finite()
            && self.error_covariance.is_finite()
            && self.process_noise.is_finite()
            && self.innovation.is_finite()
    }
}

/// Stateful wrapper owning the current [`KalmanState`]
#[derive(Debug, Clone)]
pub struct KalmanEstimator {
    config: KalmanConfig,
    state: KalmanState,
}

impl KalmanEstimator {
    /// Create a filter at its initial state
    ///
    /// The configuration is assumed valid; the engine validates it before
    /// building the filter.
    pub fn new(config: KalmanConfig) -> Self {
        Self {
            state: config.initial_state(),
            config,
        }
    }

    /// Compute the next step without storing it
    pub fn preview(&self, measurement: f64) -> KalmanStep {
        self.state.advance(measurement, &self.config)
    }

    /// Consume one measurement and store the resulting state
    pub fn step(&mut self, measurement: f64) -> KalmanStep {
        let step = self.preview(measurement);
        self.state = step.state;
        step
    }

    pub(crate) fn commit(&mut self, state: KalmanState) {
        self.state = state;
    }

    /// Current state
    pub fn state(&self) -> &KalmanState {
        &self.state
    }

    /// Configuration in use
    pub fn config(&self) -> &KalmanConfig {
        &self.config
    }

    /// Return to the configured initial state
    pub fn reset(&mut self) {
        self.state = self.config.initial_state();
    }
}
