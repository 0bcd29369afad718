//! Common test utilities for integration tests
//!
//! This module provides:
//! - A deterministic noisy probe for repeatable runs
//! - Engine builders with the default configuration
//! - Tolerance assertions for filter outputs

#![allow(dead_code)]

use soilguard_core::{
    events::Parameter,
    source::ReplaySource,
    time::SteppedTime,
    traits::MeasurementSource,
    AnomalyEngine, EngineConfig,
};

/// Tick cadence used by every test clock
pub const TICK_MS: u64 = 2_000;

#[macro_export]
macro_rules! assert_within_tolerance {
    ($actual:expr, $expected:expr, $tolerance:expr) => {
        let diff = ($actual - $expected).abs();
        if diff > $tolerance {
            panic!(
                "Value {} not within tolerance {} of expected {} (diff: {})",
                $actual, $tolerance, $expected, diff
            );
        }
    };
}

/// Deterministic random number generator for tests
pub struct TestRng {
    state: u32,
}

impl TestRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_u32(&mut self) -> u32 {
        // Xorshift algorithm
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        self.state
    }

    pub fn next_f64(&mut self) -> f64 {
        (self.next_u32() >> 8) as f64 / 16_777_216.0
    }

    pub fn gen_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }
}

/// Probe that jitters every channel uniformly within its variance and adds a
/// fixed spike when injection is requested
pub struct NoisyProbe {
    rng: TestRng,
    spike: f64,
}

impl NoisyProbe {
    pub fn new(seed: u32) -> Self {
        Self { rng: TestRng::new(seed), spike: 20.0 }
    }

    pub fn with_spike(mut self, spike: f64) -> Self {
        self.spike = spike;
        self
    }
}

impl MeasurementSource for NoisyProbe {
    fn next_reading(
        &mut self,
        _parameter: Parameter,
        baseline: f64,
        variance: f64,
        inject_anomaly: bool,
    ) -> f64 {
        let jitter = self.rng.gen_range(-variance, variance);
        let spike = if inject_anomaly { self.spike } else { 0.0 };
        (baseline + jitter + spike).max(0.0)
    }
}

/// Running engine replaying `series`, ticking every [`TICK_MS`] from t=0
pub fn replay_engine(series: &[f64]) -> AnomalyEngine<ReplaySource, SteppedTime> {
    let source = ReplaySource::new(series.iter().copied());
    let mut engine = AnomalyEngine::new(EngineConfig::default(), source, SteppedTime::new(0, TICK_MS))
        .expect("default configuration is valid");
    engine.start();
    engine
}

/// Running engine on a seeded noisy probe
pub fn noisy_engine(seed: u32) -> AnomalyEngine<NoisyProbe, SteppedTime> {
    let mut engine =
        AnomalyEngine::new(EngineConfig::default(), NoisyProbe::new(seed), SteppedTime::new(0, TICK_MS))
            .expect("default configuration is valid");
    engine.start();
    engine
}
