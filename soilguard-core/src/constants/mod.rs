//! Constants for SoilGuard Core
//!
//! Every numeric default used by the engine lives here, grouped by domain:
//! - **Filter**: Kalman and CUSUM tuning
//! - **Agronomy**: reference bands and probe baselines
//! - **Buffers**: history and alert window sizes
//! - **Time**: tick cadence

/// Kalman filter, CUSUM and accuracy-score parameters.
pub mod filter;

/// Agronomic reference ranges and probe baselines.
pub mod agronomy;

/// History and alert window sizes.
pub mod buffers;

/// Tick cadence and unit conversions.
pub mod time;

pub use filter::{
    INITIAL_ESTIMATE, INITIAL_ERROR_COVARIANCE, PROCESS_NOISE_BASE,
    PROCESS_NOISE_INFLATED, MEASUREMENT_NOISE, CHI_SQUARE_95_1DOF,
    CUSUM_SLACK, CUSUM_THRESHOLD,
};

pub use buffers::{HISTORY_CAPACITY, ALERT_CAPACITY, PARAMETER_COUNT};

pub use time::DEFAULT_TICK_INTERVAL_MS;
