//! Records Produced by the Engine
//!
//! ## Overview
//!
//! Every committed tick produces one [`SensorReading`] and, when the CUSUM
//! detector fires, one [`Alert`]. Both are immutable once produced: the engine
//! appends them to its bounded windows and consumers only ever see copies.
//!
//! ```text
//! tick ──→ SensorReading ──→ history (≤25, oldest evicted)
//!   │
//!   └──(anomaly)──→ Alert ──→ alert log (≤8, newest first)
//! ```
//!
//! ## Parameters
//!
//! Soil probes report six channels. Only moisture runs through the
//! Kalman/CUSUM pipeline; the other five are sampled around fixed baselines
//! and classified as-is.
//!
//! | Parameter  | Key          | Unit  |
//! |------------|--------------|-------|
//! | Moisture   | `moisture`   | %     |
//! | pH         | `ph`         | pH    |
//! | EC         | `ec`         | mS/cm |
//! | Nitrogen   | `nitrogen`   | ppm   |
//! | Phosphorus | `phosphorus` | ppm   |
//! | Potassium  | `potassium`  | ppm   |

use core::fmt;
use core::str::FromStr;

use crate::time::Timestamp;

/// Soil parameter enumeration
///
/// Maps to a reference band and a probe baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum Parameter {
    Moisture = 0,
    Ph = 1,
    Ec = 2,
    Nitrogen = 3,
    Phosphorus = 4,
    Potassium = 5,
}

impl Parameter {
    /// All parameters in display order
    pub const ALL: [Parameter; 6] = [
        Parameter::Moisture,
        Parameter::Ph,
        Parameter::Ec,
        Parameter::Nitrogen,
        Parameter::Phosphorus,
        Parameter::Potassium,
    ];

    /// The five channels sampled outside the filter pipeline
    pub const AUXILIARY: [Parameter; 5] = [
        Parameter::Ph,
        Parameter::Ec,
        Parameter::Nitrogen,
        Parameter::Phosphorus,
        Parameter::Potassium,
    ];

    /// Canonical lowercase key
    pub const fn key(&self) -> &'static str {
        match self {
            Parameter::Moisture => "moisture",
            Parameter::Ph => "ph",
            Parameter::Ec => "ec",
            Parameter::Nitrogen => "nitrogen",
            Parameter::Phosphorus => "phosphorus",
            Parameter::Potassium => "potassium",
        }
    }

    /// Human-readable name
    pub const fn label(&self) -> &'static str {
        match self {
            Parameter::Moisture => "Soil Moisture",
            Parameter::Ph => "pH Level",
            Parameter::Ec => "Electrical Conductivity",
            Parameter::Nitrogen => "Nitrogen",
            Parameter::Phosphorus => "Phosphorus",
            Parameter::Potassium => "Potassium",
        }
    }

    /// Unit of measurement
    pub const fn unit(&self) -> &'static str {
        match self {
            Parameter::Moisture => "%",
            Parameter::Ph => "pH",
            Parameter::Ec => "mS/cm",
            Parameter::Nitrogen | Parameter::Phosphorus | Parameter::Potassium => "ppm",
        }
    }

    /// Position in [`Parameter::ALL`]
    pub const fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Returned when a parameter key is not recognised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownParameter;

impl fmt::Display for UnknownParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown soil parameter")
    }
}

impl FromStr for Parameter {
    type Err = UnknownParameter;

    /// Parses canonical keys, ignoring ASCII case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parameter::ALL
            .iter()
            .copied()
            .find(|p| p.key().eq_ignore_ascii_case(s.trim()))
            .ok_or(UnknownParameter)
    }
}

/// Direction of a CUSUM verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// Sustained upward shift
    High,
    /// Sustained downward shift
    Low,
    /// No shift detected
    #[default]
    Normal,
}

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    /// High moisture; irrigation should be checked
    Warning,
    /// Low moisture; irrigation needed
    Critical,
}

/// Auxiliary channel values for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuxiliaryReadings {
    /// Soil pH
    pub ph: f64,
    /// Electrical conductivity in mS/cm
    pub ec: f64,
    /// Nitrogen in ppm
    pub nitrogen: f64,
    /// Phosphorus in ppm
    pub phosphorus: f64,
    /// Potassium in ppm
    pub potassium: f64,
}

impl AuxiliaryReadings {
    /// Value of an auxiliary channel; `None` for moisture
    pub fn get(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::Moisture => None,
            Parameter::Ph => Some(self.ph),
            Parameter::Ec => Some(self.ec),
            Parameter::Nitrogen => Some(self.nitrogen),
            Parameter::Phosphorus => Some(self.phosphorus),
            Parameter::Potassium => Some(self.potassium),
        }
    }

    pub(crate) fn set(&mut self, parameter: Parameter, value: f64) {
        match parameter {
            Parameter::Moisture => {}
            Parameter::Ph => self.ph = value,
            Parameter::Ec => self.ec = value,
            Parameter::Nitrogen => self.nitrogen = value,
            Parameter::Phosphorus => self.phosphorus = value,
            Parameter::Potassium => self.potassium = value,
        }
    }

    pub(crate) const fn zeroed() -> Self {
        Self { ph: 0.0, ec: 0.0, nitrogen: 0.0, phosphorus: 0.0, potassium: 0.0 }
    }
}

/// One committed tick, as kept in the history window
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorReading {
    /// Tick time in milliseconds
    pub timestamp: Timestamp,
    /// Moisture as reported by the probe
    pub raw: f64,
    /// Moisture after the Kalman update
    pub filtered: f64,
    /// Filter innovation for this tick
    pub innovation: f64,
    /// CUSUM verdict for this tick
    pub direction: Direction,
    /// Auxiliary channel values
    pub auxiliary: AuxiliaryReadings,
}

/// Operator-facing notification raised on a CUSUM alarm
///
/// Serialize-only: messages are static strings owned by this crate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Alert {
    /// Unique per engine, strictly increasing
    pub id: u64,
    /// `Warning` for high drift, `Critical` for low
    pub severity: Severity,
    /// Operator message
    pub message: &'static str,
    /// Parameter that alarmed
    pub parameter: Parameter,
    /// Filtered value that triggered the alert
    pub value: f64,
    /// Tick time in milliseconds
    pub timestamp: Timestamp,
}

/// Message for an upward moisture shift
pub const HIGH_MOISTURE_MESSAGE: &str =
    "High moisture detected - check irrigation system for overwatering or leaks";

/// Message for a downward moisture shift
pub const LOW_MOISTURE_MESSAGE: &str =
    "Low moisture detected - irrigation needed";

impl Alert {
    /// Builds the alert for a CUSUM verdict; `None` for [`Direction::Normal`]
    ///
    /// Upward shifts are warnings (overwatering is rarely urgent); downward
    /// shifts are critical (crops wilt).
    pub fn for_direction(
        id: u64,
        direction: Direction,
        parameter: Parameter,
        value: f64,
        timestamp: Timestamp,
    ) -> Option<Self> {
        let (severity, message) = match direction {
            Direction::High => (Severity::Warning, HIGH_MOISTURE_MESSAGE),
            Direction::Low => (Severity::Critical, LOW_MOISTURE_MESSAGE),
            Direction::Normal => return None,
        };

        Some(Self { id, severity, message, parameter, value, timestamp })
    }
}
