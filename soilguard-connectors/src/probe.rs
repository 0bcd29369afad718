//! Simulated soil probe
//!
//! Each channel reads `baseline ± U(variance)`. Moisture can additionally
//! carry a spike of 15-25 units in a random direction, either because the
//! engine asked for one (`inject_anomaly`) or because the spontaneous
//! anomaly roll came up. Readings never go below zero.

use rand::{rngs::StdRng, Rng, SeedableRng};
use soilguard_core::{traits::MeasurementSource, Parameter};

/// Smallest injected spike, in moisture percent
pub const SPIKE_MIN: f64 = 15.0;

/// Largest injected spike, in moisture percent
pub const SPIKE_MAX: f64 = 25.0;

/// Random measurement source for demos and soak tests
#[derive(Debug, Clone)]
pub struct SimulatedProbe {
    rng: StdRng,
    spike_min: f64,
    spike_max: f64,
    spontaneous_probability: f64,
    spikes: u64,
}

impl SimulatedProbe {
    /// Reproducible probe
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Probe seeded from the OS
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            spike_min: SPIKE_MIN,
            spike_max: SPIKE_MAX,
            spontaneous_probability: 0.0,
            spikes: 0,
        }
    }

    /// Spike magnitude range; bounds are reordered if given backwards
    pub fn with_spike_range(mut self, min: f64, max: f64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        self.spike_min = min.max(0.0);
        self.spike_max = max.max(0.0);
        self
    }

    /// Chance per moisture sample of an unrequested spike, clamped to `[0, 1]`
    pub fn with_spontaneous_probability(mut self, probability: f64) -> Self {
        self.spontaneous_probability = if probability.is_finite() {
            probability.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }

    /// Spikes emitted so far, requested or spontaneous
    pub fn spikes(&self) -> u64 {
        self.spikes
    }

    fn jitter(&mut self, variance: f64) -> f64 {
        if variance > 0.0 {
            self.rng.gen_range(-variance..=variance)
        } else {
            0.0
        }
    }

    fn spike(&mut self) -> f64 {
        self.spikes += 1;
        let magnitude = if self.spike_max > self.spike_min {
            self.rng.gen_range(self.spike_min..=self.spike_max)
        } else {
            self.spike_min
        };
        if self.rng.gen_bool(0.5) {
            magnitude
        } else {
            -magnitude
        }
    }
}

impl MeasurementSource for SimulatedProbe {
    fn next_reading(
        &mut self,
        parameter: Parameter,
        baseline: f64,
        variance: f64,
        inject_anomaly: bool,
    ) -> f64 {
        let mut value = baseline + self.jitter(variance);

        if parameter == Parameter::Moisture {
            let spontaneous = self.spontaneous_probability > 0.0
                && self.rng.gen_bool(self.spontaneous_probability);
            if inject_anomaly || spontaneous {
                let spike = self.spike();
                log::debug!("simulated moisture spike of {:+.1}", spike);
                value += spike;
            }
        }

        value.max(0.0)
    }
}
