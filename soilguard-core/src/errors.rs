//! Error Types for Engine Construction and Tick Processing
//!
//! ## Design Philosophy
//!
//! Errors follow the same embedded-friendly rules as the rest of the crate:
//!
//! 1. **Small and Copy**: every variant carries only scalars and
//!    `&'static str` context, so errors can be returned from the hot path and
//!    stored without allocation.
//!
//! 2. **Two phases, two types**:
//!    - [`ConfigError`] is raised while building an engine. Malformed
//!      configuration never reaches a running engine.
//!    - [`TickError`] is raised by a single tick. A failed tick has committed
//!      nothing; the engine state is exactly what it was before the call.
//!
//! 3. **Nothing is retried internally**: a tick failure is handed to whoever
//!    drives the engine (usually a scheduler), which decides whether to skip
//!    the tick or stop.
//!
//! ## Handling Tick Failures
//!
//! ```rust
//! use soilguard_core::{AnomalyEngine, EngineConfig, TickError};
//! use soilguard_core::time::FixedTime;
//! use soilguard_core::source::ReplaySource;
//!
//! let source = ReplaySource::new([44.0, 45.5, 46.1]);
//! let mut engine = AnomalyEngine::new(EngineConfig::default(), source, FixedTime::new(0))?;
//!
//! match engine.tick() {
//!     Ok(_) => {}
//!     Err(TickError::NotRunning) => {
//!         // The scheduler fired before start() - nothing happened
//!     }
//!     Err(other) => {
//!         // Source or numerical fault - state untouched, skip or stop
//!         assert!(!other.is_retryable());
//!     }
//! }
//! # Ok::<(), soilguard_core::ConfigError>(())
//! ```

use thiserror_no_std::Error;

use crate::events::Parameter;

/// Result type for engine construction
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for tick processing
pub type TickResult<T> = Result<T, TickError>;

/// Which of the two bands of a parameter is malformed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BandKind {
    /// The optimal band
    Optimal,
    /// The surrounding warning band
    Warning,
}

impl core::fmt::Display for BandKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BandKind::Optimal => f.write_str("optimal"),
            BandKind::Warning => f.write_str("warning"),
        }
    }
}

/// Construction-time configuration failures
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// A noise term, slack or threshold must be strictly positive
    #[error("{name} must be positive, got {value}")]
    NonPositive {
        /// Name of the offending setting
        name: &'static str,
        /// The rejected value
        value: f64,
    },

    /// A variance or count must not be negative
    #[error("{name} must not be negative, got {value}")]
    Negative {
        /// Name of the offending setting
        name: &'static str,
        /// The rejected value
        value: f64,
    },

    /// A setting was NaN or infinite
    #[error("{name} must be a finite number")]
    NonFinite {
        /// Name of the offending setting
        name: &'static str,
    },

    /// Band lower bound exceeds its upper bound
    #[error("{band} band of {parameter} is inverted")]
    InvertedBand {
        /// Parameter owning the band
        parameter: Parameter,
        /// Which band is inverted
        band: BandKind,
    },

    /// Warning band does not strictly contain the optimal band
    #[error("warning band of {parameter} does not strictly contain its optimal band")]
    BandNotNested {
        /// Parameter owning the bands
        parameter: Parameter,
    },

    /// A bounded window was configured with zero capacity
    #[error("{name} must hold at least one entry")]
    ZeroCapacity {
        /// Name of the offending window
        name: &'static str,
    },

    /// A gain must lie in (0, 1]
    #[error("{name} must lie in (0, 1], got {value}")]
    NotAFraction {
        /// Name of the offending setting
        name: &'static str,
        /// The rejected value
        value: f64,
    },

    /// Process noise inflation factor must exceed 1
    #[error("process noise inflation factor must exceed 1, got {value}")]
    InvalidInflation {
        /// The rejected factor
        value: f64,
    },
}

/// Failures of a single tick
///
/// None of these are retryable: the same inputs would fail the same way.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum TickError {
    /// Tick requested while the engine is idle
    #[error("engine is not running")]
    NotRunning,

    /// Measurement source broke its contract (NaN, infinite or negative)
    #[error("invalid {parameter} measurement {value}")]
    InvalidMeasurement {
        /// Channel that produced the value
        parameter: Parameter,
        /// The rejected value
        value: f64,
    },

    /// Filter or detector produced a non-finite state
    #[error("numerical fault in {stage}")]
    NumericalFault {
        /// Stage that produced the fault
        stage: &'static str,
    },
}

impl TickError {
    /// Whether the scheduler may retry the same tick
    pub const fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::NonPositive { name, value } =>
                defmt::write!(fmt, "{} must be positive, got {}", name, value),
            Self::Negative { name, value } =>
                defmt::write!(fmt, "{} must not be negative, got {}", name, value),
            Self::NonFinite { name } =>
                defmt::write!(fmt, "{} must be finite", name),
            Self::InvertedBand { parameter, band } =>
                defmt::write!(fmt, "{} band of {} inverted", band.as_str(), parameter.key()),
            Self::BandNotNested { parameter } =>
                defmt::write!(fmt, "{} bands not nested", parameter.key()),
            Self::ZeroCapacity { name } =>
                defmt::write!(fmt, "{} has zero capacity", name),
            Self::NotAFraction { name, value } =>
                defmt::write!(fmt, "{} must lie in (0, 1], got {}", name, value),
            Self::InvalidInflation { value } =>
                defmt::write!(fmt, "Inflation factor {} <= 1", value),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TickError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::NotRunning =>
                defmt::write!(fmt, "Engine not running"),
            Self::InvalidMeasurement { parameter, value } =>
                defmt::write!(fmt, "Invalid {} measurement {}", parameter.key(), value),
            Self::NumericalFault { stage } =>
                defmt::write!(fmt, "Numerical fault in {}", stage),
        }
    }
}

#[cfg(feature = "defmt")]
impl BandKind {
    const fn as_str(&self) -> &'static str {
        match self {
            BandKind::Optimal => "optimal",
            BandKind::Warning => "warning",
        }
    }
}
