//! Kalman Filter and CUSUM Detector Parameters
//!
//! Numeric defaults for the scalar moisture filter and the two-sided CUSUM
//! that watches its innovation sequence. Every value here can be overridden
//! through [`EngineConfig`](crate::config::EngineConfig).

// ===== KALMAN FILTER =====

/// Initial moisture estimate (% volumetric water content).
///
/// Centre of the moisture optimal band, so a fresh filter starts
/// "in range" before the first measurement arrives.
pub const INITIAL_ESTIMATE: f64 = 45.0;

/// Initial estimation error covariance (P₀).
///
/// Deliberately loose: the first few measurements dominate the estimate.
pub const INITIAL_ERROR_COVARIANCE: f64 = 1.0;

/// Nominal process noise (Q).
///
/// Variance of true soil moisture drift between two ticks. Soil water
/// content changes slowly outside of irrigation or rain events.
pub const PROCESS_NOISE_BASE: f64 = 0.01;

/// Multiplier applied to [`PROCESS_NOISE_BASE`] after a surprising innovation.
pub const PROCESS_NOISE_INFLATION: f64 = 2.5;

/// Inflated process noise used for exactly one tick after a surprise.
///
/// The filter only ever runs in two regimes: nominal or inflated. The
/// inflated level never compounds across consecutive surprises.
pub const PROCESS_NOISE_INFLATED: f64 = PROCESS_NOISE_BASE * PROCESS_NOISE_INFLATION;

/// Measurement noise (R).
///
/// Variance of capacitive soil probe error. Fixed for the lifetime of the
/// filter; only Q adapts.
pub const MEASUREMENT_NOISE: f64 = 0.5;

/// Chi-square critical value for 1 degree of freedom at 95% confidence.
///
/// The normalized innovation squared `y² / S` is compared against this to
/// decide whether the last measurement was a statistically significant
/// surprise.
pub const CHI_SQUARE_95_1DOF: f64 = 3.84;

// ===== CUSUM DETECTOR =====

/// CUSUM slack (k, sometimes written δ/2).
///
/// Innovations smaller than this in magnitude never accumulate, which keeps
/// ordinary sensor noise from triggering alarms.
pub const CUSUM_SLACK: f64 = 0.5;

/// CUSUM decision threshold (h).
///
/// An alarm fires when either one-sided statistic exceeds this magnitude.
pub const CUSUM_THRESHOLD: f64 = 5.0;

// ===== DATA ACCURACY =====

/// Fraction of the remaining gap to 100% closed by each committed tick.
pub const ACCURACY_GAIN: f64 = 0.05;

/// Upper bound of the data accuracy score (percent).
pub const ACCURACY_CEILING: f64 = 100.0;
