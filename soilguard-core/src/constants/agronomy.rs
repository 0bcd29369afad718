//! Agronomic Reference Ranges and Probe Baselines
//!
//! Optimal and warning bands for each soil parameter, plus the baseline and
//! jitter used when sampling the auxiliary channels.
//!
//! Bands are `(low, high)` and inclusive on both ends. Every warning band
//! strictly contains its optimal band.
//!
//! Sources: general-purpose guidance for loam soils under mixed vegetable
//! cropping. Deployments on sand or clay should override these through
//! [`BandTable`](crate::classify::BandTable).

// ===== MOISTURE (% volumetric water content) =====

/// Optimal soil moisture band.
pub const MOISTURE_OPTIMAL: (f64, f64) = (40.0, 50.0);
/// Moisture warning band.
pub const MOISTURE_WARNING: (f64, f64) = (35.0, 55.0);

// ===== pH =====

/// Optimal pH band (slightly acidic to neutral).
pub const PH_OPTIMAL: (f64, f64) = (6.5, 7.0);
/// pH warning band.
pub const PH_WARNING: (f64, f64) = (6.0, 7.5);

// ===== ELECTRICAL CONDUCTIVITY (mS/cm) =====

/// Optimal EC band.
pub const EC_OPTIMAL: (f64, f64) = (1.0, 1.5);
/// EC warning band. Above 1.8 mS/cm salinity stress sets in.
pub const EC_WARNING: (f64, f64) = (0.8, 1.8);

// ===== MACRONUTRIENTS (ppm) =====

/// Optimal nitrogen band.
pub const NITROGEN_OPTIMAL: (f64, f64) = (30.0, 40.0);
/// Nitrogen warning band.
pub const NITROGEN_WARNING: (f64, f64) = (25.0, 45.0);

/// Optimal phosphorus band.
pub const PHOSPHORUS_OPTIMAL: (f64, f64) = (15.0, 25.0);
/// Phosphorus warning band.
pub const PHOSPHORUS_WARNING: (f64, f64) = (10.0, 30.0);

/// Optimal potassium band.
pub const POTASSIUM_OPTIMAL: (f64, f64) = (20.0, 30.0);
/// Potassium warning band.
pub const POTASSIUM_WARNING: (f64, f64) = (15.0, 35.0);

// ===== PROBE BASELINES (baseline, variance) =====

/// Moisture probe baseline and jitter half-width.
pub const MOISTURE_PROBE: (f64, f64) = (45.0, 2.0);
/// pH probe baseline and jitter half-width.
pub const PH_PROBE: (f64, f64) = (6.8, 0.2);
/// EC probe baseline and jitter half-width.
pub const EC_PROBE: (f64, f64) = (1.2, 0.15);
/// Nitrogen probe baseline and jitter half-width.
pub const NITROGEN_PROBE: (f64, f64) = (35.0, 3.0);
/// Phosphorus probe baseline and jitter half-width.
pub const PHOSPHORUS_PROBE: (f64, f64) = (20.0, 2.0);
/// Potassium probe baseline and jitter half-width.
pub const POTASSIUM_PROBE: (f64, f64) = (25.0, 2.0);
