//! Core anomaly engine for SoilGuard
//!
//! Watches a soil-moisture probe through an adaptive Kalman filter and flags
//! sustained shifts with a two-sided CUSUM on the filter's innovations.
//! Auxiliary channels (pH, EC, N, P, K) ride along and are classified against
//! agronomic reference bands.
//!
//! Key constraints:
//! - `no_std` + `alloc` capable (history and alerts are heap-backed rings)
//! - O(1) filter and detector work per tick
//! - A failed tick commits nothing
//!
//! ```no_run
//! use soilguard_core::{AnomalyEngine, EngineConfig};
//! use soilguard_core::source::ReplaySource;
//! use soilguard_core::time::SystemTime;
//!
//! let mut engine = AnomalyEngine::new(
//!     EngineConfig::default(),
//!     ReplaySource::new([44.8, 45.3, 71.0]),
//!     SystemTime,
//! )?;
//! engine.start();
//!
//! while let Ok(outcome) = engine.tick() {
//!     if let Some(alert) = outcome.alert {
//!         println!("{}", alert.message);
//!     }
//! #   break;
//! }
//! # Ok::<(), soilguard_core::ConfigError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[macro_use]
mod macros;

pub mod buffer;
pub mod classify;
pub mod config;
pub mod constants;
pub mod detection;
pub mod engine;
pub mod errors;
pub mod events;
pub mod source;
pub mod time;
pub mod traits;

// Public API
pub use classify::{BandTable, Classification, RangeClassifier, ReferenceBand};
pub use config::{ChannelProfile, EngineConfig, ProbeTable};
pub use detection::{CumSumDetector, KalmanEstimator};
pub use engine::{
    AnomalyEngine, EngineSnapshot, FilterMetrics, ParameterStatus, RunState, SystemStats,
    TickOutcome,
};
pub use errors::{ConfigError, ConfigResult, TickError, TickResult};
pub use events::{Alert, Direction, Parameter, SensorReading, Severity};
pub use traits::MeasurementSource;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
