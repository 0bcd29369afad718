//! Anomaly Engine
//!
//! Owns one [`KalmanEstimator`], one [`CumSumDetector`], the classifier, the
//! history window and the alert log, and drives them once per tick.
//!
//! ## Tick order
//!
//! ```text
//! sample moisture + auxiliaries
//!   → validate samples
//!   → Kalman (preview) → CUSUM (preview) → check numerics
//!   → commit filter/detector state
//!   → append history → raise alert → update stats
//! ```
//!
//! Everything up to the commit is pure. A tick that fails validation leaves
//! the engine exactly as it was, so a caller can log the error and carry on.
//!
//! ## Lifecycle
//!
//! ```text
//!        start()            stop()
//!  Idle ────────→ Running ────────→ Idle
//! ```
//!
//! `reset()` works in either state and does not change it.
//!
//! ```rust
//! use soilguard_core::{AnomalyEngine, EngineConfig, Direction};
//! use soilguard_core::source::ReplaySource;
//! use soilguard_core::time::SteppedTime;
//!
//! let source = ReplaySource::new([45.0, 45.2, 44.9, 70.0]);
//! let mut engine = AnomalyEngine::new(EngineConfig::default(), source, SteppedTime::new(0, 2000))?;
//! engine.start();
//!
//! for _ in 0..3 {
//!     assert_eq!(engine.tick()?.reading.direction, Direction::Normal);
//! }
//! let outcome = engine.tick()?;
//! assert_eq!(outcome.reading.direction, Direction::High);
//! assert!(outcome.alert.is_some());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::{
    buffer::CircularBuffer,
    classify::{Classification, RangeClassifier},
    config::EngineConfig,
    constants::{buffers::PARAMETER_COUNT, filter::ACCURACY_CEILING},
    detection::{CumSumDetector, CumSumState, KalmanEstimator, KalmanState},
    errors::{ConfigResult, TickError, TickResult},
    events::{Alert, AuxiliaryReadings, Direction, Parameter, SensorReading},
    time::TimeSource,
    traits::{Measurable, MeasurementSource},
};

/// Whether the engine accepts ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RunState {
    /// Ticks are rejected
    #[default]
    Idle,
    /// Ticks are accepted
    Running,
}

impl RunState {
    /// Lowercase tag for display
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
        }
    }
}

/// Running counters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SystemStats {
    /// Committed ticks since the last reset
    pub total_readings: u64,
    /// CUSUM alarms since the last reset
    pub anomalies_detected: u64,
    /// Data-quality score in `[0, 100]`, non-decreasing between resets
    pub data_accuracy: f64,
}

impl SystemStats {
    fn record_tick(&mut self, gain: f64) {
        self.total_readings += 1;
        let accuracy = self.data_accuracy + (ACCURACY_CEILING - self.data_accuracy) * gain;
        self.data_accuracy = accuracy.min(ACCURACY_CEILING);
    }
}

/// Filter and detector internals, for dashboards
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FilterMetrics {
    /// Filtered moisture estimate
    pub estimate: f64,
    /// Error covariance `P`
    pub error_covariance: f64,
    /// Process noise `Q` used by the last step
    pub process_noise: f64,
    /// Innovation of the last step
    pub innovation: f64,
    /// Upper CUSUM statistic
    pub cusum_positive: f64,
    /// Lower CUSUM statistic
    pub cusum_negative: f64,
    /// Alarm threshold `h`
    pub cusum_threshold: f64,
}

/// Current value and classification of one parameter
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParameterStatus {
    /// Which parameter
    pub parameter: Parameter,
    /// Filtered estimate for moisture, raw sample otherwise
    pub value: f64,
    /// Band the value falls in
    pub classification: Classification,
}

/// Read-only copy of everything an operator view needs
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EngineSnapshot {
    /// Idle or Running
    pub run_state: RunState,
    /// One entry per [`Parameter::ALL`], in that order
    pub parameters: heapless::Vec<ParameterStatus, PARAMETER_COUNT>,
    /// Oldest first
    pub history: Vec<SensorReading>,
    /// Newest first
    pub alerts: Vec<Alert>,
    /// Filter and detector internals
    pub metrics: FilterMetrics,
    /// Running counters
    pub stats: SystemStats,
}

impl EngineSnapshot {
    /// Status of a single parameter
    pub fn parameter(&self, parameter: Parameter) -> Option<&ParameterStatus> {
        self.parameters.iter().find(|s| s.parameter == parameter)
    }
}

/// What one successful tick produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// The reading appended to history
    pub reading: SensorReading,
    /// Classification of the filtered moisture
    pub classification: Classification,
    /// Whether λ exceeded the chi-square threshold this tick
    pub process_noise_inflated: bool,
    /// Alert raised this tick, if the CUSUM fired
    pub alert: Option<Alert>,
}

/// Soil-moisture anomaly engine
///
/// Generic over where measurements come from and how time is read, so the
/// same engine runs against a simulated probe, a replayed field log or real
/// hardware.
pub struct AnomalyEngine<S, C> {
    config: EngineConfig,
    source: S,
    clock: C,
    kalman: KalmanEstimator,
    cusum: CumSumDetector,
    classifier: RangeClassifier,
    history: CircularBuffer<SensorReading>,
    alerts: CircularBuffer<Alert>,
    stats: SystemStats,
    run_state: RunState,
    inject_pending: bool,
    next_alert_id: u64,
}

impl<S, C> AnomalyEngine<S, C>
where
    S: MeasurementSource,
    C: TimeSource,
{
    /// Validate `config` and build an idle engine at its initial state
    pub fn new(config: EngineConfig, source: S, clock: C) -> ConfigResult<Self> {
        config.validate()?;

        let classifier = RangeClassifier::new(config.bands)?;
        let engine = Self {
            kalman: KalmanEstimator::new(config.kalman),
            cusum: CumSumDetector::new(config.cusum),
            classifier,
            history: CircularBuffer::with_capacity(config.history_capacity),
            alerts: CircularBuffer::with_capacity(config.alert_capacity),
            stats: SystemStats::default(),
            run_state: RunState::Idle,
            inject_pending: false,
            next_alert_id: 1,
            config,
            source,
            clock,
        };

        log_debug!(
            "engine created: history={}, alerts={}, wall_clock={}",
            engine.config.history_capacity,
            engine.config.alert_capacity,
            engine.clock.is_wall_clock()
        );

        Ok(engine)
    }

    /// Begin accepting ticks; no-op if already running
    pub fn start(&mut self) {
        if self.run_state == RunState::Idle {
            self.run_state = RunState::Running;
            log_info!("engine started");
        }
    }

    /// Stop accepting ticks; no-op if already idle
    pub fn stop(&mut self) {
        if self.run_state == RunState::Running {
            self.run_state = RunState::Idle;
            log_info!("engine stopped after {} readings", self.stats.total_readings);
        }
    }

    /// Return filter, detector, history, alerts and stats to their initial
    /// values
    ///
    /// Run state is left alone. Alert ids keep counting so an id is never
    /// reused by the same engine.
    pub fn reset(&mut self) {
        self.kalman.reset();
        self.cusum.reset();
        self.history.clear();
        self.alerts.clear();
        self.stats = SystemStats::default();
        self.inject_pending = false;
        log_info!("engine reset");
    }

    /// Perturb the next moisture sample; consumed by the next committed tick
    pub fn inject_anomaly(&mut self) {
        self.inject_pending = true;
        log_debug!("anomaly injection armed");
    }

    /// Empty the alert log; nothing else changes
    pub fn clear_alerts(&mut self) {
        self.alerts.clear();
    }

    /// Sample, filter, detect and record one reading
    ///
    /// Fails with [`TickError::NotRunning`] while idle. On any error nothing
    /// is committed.
    pub fn tick(&mut self) -> TickResult<TickOutcome> {
        if self.run_state != RunState::Running {
            return Err(TickError::NotRunning);
        }

        let inject = self.inject_pending;
        let raw = self.sample(Parameter::Moisture, inject)?;

        let mut auxiliary = AuxiliaryReadings::zeroed();
        for parameter in Parameter::AUXILIARY {
            auxiliary.set(parameter, self.sample(parameter, false)?);
        }

        let step = self.kalman.preview(raw);
        if !step.state.is_finite() {
            return Err(TickError::NumericalFault { stage: "kalman" });
        }
        let verdict = self.cusum.preview(step.state.innovation);
        if !verdict.state.is_finite() {
            return Err(TickError::NumericalFault { stage: "cusum" });
        }

        // Commit
        let timestamp = self.clock.now();
        self.inject_pending = false;
        self.kalman.commit(step.state);
        self.cusum.commit(verdict.state);

        if step.inflated {
            log_debug!(
                "process noise inflated: innovation={:.2} ({:.1} sigma)",
                step.state.innovation,
                step.innovation_sigma()
            );
        }

        let reading = SensorReading {
            timestamp,
            raw,
            filtered: step.state.estimate,
            innovation: step.state.innovation,
            direction: verdict.direction,
            auxiliary,
        };
        self.history.push(reading);

        let alert = Alert::for_direction(
            self.next_alert_id,
            verdict.direction,
            Parameter::Moisture,
            step.state.estimate,
            timestamp,
        );
        if let Some(alert) = alert {
            self.next_alert_id += 1;
            self.alerts.push(alert);
            self.stats.anomalies_detected += 1;
            log_warn!(
                "moisture anomaly #{}: {:?} at {:.2}% (S+={:.2}, S-={:.2})",
                alert.id,
                verdict.direction,
                step.state.estimate,
                verdict.state.positive,
                verdict.state.negative
            );
        }

        self.stats.record_tick(self.config.accuracy_gain);

        Ok(TickOutcome {
            reading,
            classification: self
                .classifier
                .classify_parameter(step.state.estimate, Parameter::Moisture),
            process_noise_inflated: step.inflated,
            alert,
        })
    }

    fn sample(&mut self, parameter: Parameter, inject: bool) -> TickResult<f64> {
        let profile = self.config.probes.get(parameter);
        let value = self
            .source
            .next_reading(parameter, profile.baseline, profile.variance, inject);

        if !value.is_valid_measurement() {
            log_warn!("rejected {} sample: {}", parameter, value);
            return Err(TickError::InvalidMeasurement { parameter, value });
        }
        Ok(value)
    }

    /// Copy out the current state for display or serialization
    ///
    /// Before the first tick moisture shows the filter's initial estimate and
    /// the auxiliaries show their probe baselines.
    pub fn snapshot(&self) -> EngineSnapshot {
        let latest = self.history.last();
        let parameters = Parameter::ALL
            .iter()
            .map(|&parameter| {
                let value = match (parameter, latest) {
                    (Parameter::Moisture, _) => self.kalman.state().estimate,
                    (_, Some(reading)) => reading
                        .auxiliary
                        .get(parameter)
                        .unwrap_or(self.config.probes.get(parameter).baseline),
                    (_, None) => self.config.probes.get(parameter).baseline,
                };
                ParameterStatus {
                    parameter,
                    value,
                    classification: self.classifier.classify_parameter(value, parameter),
                }
            })
            .collect();

        let kalman = self.kalman.state();
        let cusum = self.cusum.state();

        EngineSnapshot {
            run_state: self.run_state,
            parameters,
            history: self.history.to_vec(),
            alerts: self.alerts.to_vec_newest_first(),
            metrics: FilterMetrics {
                estimate: kalman.estimate,
                error_covariance: kalman.error_covariance,
                process_noise: kalman.process_noise,
                innovation: kalman.innovation,
                cusum_positive: cusum.positive,
                cusum_negative: cusum.negative,
                cusum_threshold: self.cusum.config().threshold,
            },
            stats: self.stats,
        }
    }

    /// Current run state
    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Whether ticks are accepted
    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    /// Whether an injected anomaly is waiting for the next tick
    pub fn injection_pending(&self) -> bool {
        self.inject_pending
    }

    /// Filter state after the last commit
    pub fn kalman_state(&self) -> &KalmanState {
        self.kalman.state()
    }

    /// Detector statistics after the last commit
    pub fn cusum_state(&self) -> &CumSumState {
        self.cusum.state()
    }

    /// History window, oldest first
    pub fn history(&self) -> impl DoubleEndedIterator<Item = &SensorReading> + '_ {
        self.history.iter()
    }

    /// Alert log, newest first
    pub fn alerts(&self) -> impl Iterator<Item = &Alert> + '_ {
        self.alerts.iter_newest_first()
    }

    /// Counters since the last reset
    pub fn stats(&self) -> &SystemStats {
        &self.stats
    }

    /// Configuration the engine was built with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Classifier built from the configured bands
    pub fn classifier(&self) -> &RangeClassifier {
        &self.classifier
    }

    /// Measurement source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Measurement source, mutably
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Clock used for timestamps
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Clock, mutably
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}

impl<S, C> core::fmt::Debug for AnomalyEngine<S, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AnomalyEngine")
            .field("run_state", &self.run_state)
            .field("kalman", self.kalman.state())
            .field("cusum", self.cusum.state())
            .field("history_len", &self.history.len())
            .field("alerts_len", &self.alerts.len())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        events::{Severity, HIGH_MOISTURE_MESSAGE, LOW_MOISTURE_MESSAGE},
        source::ReplaySource,
        time::{FixedTime, SteppedTime},
    };

    fn engine(series: &[f64]) -> AnomalyEngine<ReplaySource, SteppedTime> {
        let source = ReplaySource::new(series.iter().copied());
        let mut engine =
            AnomalyEngine::new(EngineConfig::default(), source, SteppedTime::new(1_000, 2_000))
                .unwrap();
        engine.start();
        engine
    }

    #[test]
    fn starts_idle_at_initial_state() {
        let engine = AnomalyEngine::new(
            EngineConfig::default(),
            ReplaySource::new([45.0]),
            FixedTime::new(0),
        )
        .unwrap();

        assert_eq!(engine.run_state(), RunState::Idle);
        assert_eq!(engine.kalman_state().estimate, 45.0);
        assert_eq!(*engine.cusum_state(), CumSumState::default());
        assert_eq!(engine.history().count(), 0);
        assert_eq!(*engine.stats(), SystemStats::default());
    }

    #[test]
    fn tick_while_idle_is_rejected() {
        let mut engine = engine(&[45.0]);
        engine.stop();
        assert_eq!(engine.tick(), Err(TickError::NotRunning));
        assert_eq!(engine.stats().total_readings, 0);
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut engine = engine(&[]);
        engine.start();
        assert!(engine.is_running());
        engine.stop();
        engine.stop();
        assert_eq!(engine.run_state(), RunState::Idle);
    }

    #[test]
    fn spike_raises_warning_alert() {
        let mut engine = engine(&[70.0]);
        let outcome = engine.tick().unwrap();

        assert!(libm::fabs(outcome.reading.filtered - 61.72) < 0.01);
        assert!(libm::fabs(outcome.reading.innovation - 25.0) < 1e-9);
        assert_eq!(outcome.reading.direction, Direction::High);
        assert!(outcome.process_noise_inflated);

        let alert = outcome.alert.unwrap();
        assert_eq!(alert.id, 1);
        assert_eq!(alert.severity, Severity::Warning);
        assert_eq!(alert.message, HIGH_MOISTURE_MESSAGE);
        assert_eq!(alert.timestamp, 1_000);
        assert_eq!(engine.stats().anomalies_detected, 1);
    }

    #[test]
    fn drop_raises_critical_alert() {
        let mut engine = engine(&[20.0]);
        let alert = engine.tick().unwrap().alert.unwrap();
        assert_eq!(alert.severity, Severity::Critical);
        assert_eq!(alert.message, LOW_MOISTURE_MESSAGE);
    }

    #[test]
    fn invalid_sample_commits_nothing() {
        let source = |p: Parameter, baseline: f64, _v: f64, _i: bool| {
            if p == Parameter::Nitrogen { -1.0 } else { baseline }
        };
        let mut engine =
            AnomalyEngine::new(EngineConfig::default(), source, FixedTime::new(0)).unwrap();
        engine.start();
        engine.inject_anomaly();

        let before = engine.snapshot();
        assert_eq!(
            engine.tick(),
            Err(TickError::InvalidMeasurement { parameter: Parameter::Nitrogen, value: -1.0 })
        );
        assert_eq!(engine.snapshot(), before);
        assert!(engine.injection_pending());
    }

    #[test]
    fn readings_and_alerts_take_clock_time() {
        let mut engine = AnomalyEngine::new(
            EngineConfig::default(),
            ReplaySource::new([45.0, 90.0]),
            FixedTime::new(0),
        )
        .unwrap();
        engine.start();
        assert_eq!(engine.run_state().as_str(), "running");

        engine.clock_mut().set(10_000);
        engine.tick().unwrap();
        engine.clock_mut().advance(2_000);
        let alert = engine.tick().unwrap().alert.unwrap();

        let stamps: Vec<u64> = engine.history().map(|r| r.timestamp).collect();
        assert_eq!(stamps, vec![10_000, 12_000]);
        assert_eq!(alert.timestamp, 12_000);

        engine.stop();
        assert_eq!(engine.run_state().as_str(), "idle");
    }

    #[test]
    fn injection_is_one_shot() {
        let mut flags = Vec::new();
        let source = |p: Parameter, baseline: f64, _v: f64, inject: bool| {
            if p == Parameter::Moisture {
                flags.push(inject);
            }
            baseline
        };
        let mut engine =
            AnomalyEngine::new(EngineConfig::default(), source, FixedTime::new(0)).unwrap();
        engine.start();
        engine.inject_anomaly();
        engine.tick().unwrap();
        engine.tick().unwrap();
        drop(engine);

        assert_eq!(flags, vec![true, false]);
    }

    #[test]
    fn alert_log_is_bounded_newest_first() {
        // Each 90 keeps S+ above threshold, so every tick alarms
        let mut engine = engine(&[90.0; 12]);
        for _ in 0..12 {
            engine.tick().unwrap();
        }

        let ids: Vec<u64> = engine.alerts().map(|a| a.id).collect();
        assert_eq!(ids, vec![12, 11, 10, 9, 8, 7, 6, 5]);
        assert_eq!(engine.stats().anomalies_detected, 12);
    }

    #[test]
    fn reset_keeps_run_state_and_alert_ids() {
        let mut engine = engine(&[70.0, 70.0]);
        engine.tick().unwrap();
        engine.reset();

        assert!(engine.is_running());
        assert_eq!(engine.alerts().count(), 0);
        assert_eq!(engine.stats().data_accuracy, 0.0);

        let alert = engine.tick().unwrap().alert.unwrap();
        assert_eq!(alert.id, 2);
    }

    #[test]
    fn clear_alerts_leaves_everything_else() {
        let mut engine = engine(&[70.0]);
        engine.tick().unwrap();
        engine.clear_alerts();

        assert_eq!(engine.alerts().count(), 0);
        assert_eq!(engine.history().count(), 1);
        assert_eq!(engine.stats().anomalies_detected, 1);
        assert!(engine.cusum_state().positive > 0.0);
    }

    #[test]
    fn accuracy_approaches_ceiling() {
        let mut engine = engine(&[45.0; 3]);
        engine.tick().unwrap();
        assert!(libm::fabs(engine.stats().data_accuracy - 5.0) < 1e-9);
        engine.tick().unwrap();
        assert!(libm::fabs(engine.stats().data_accuracy - 9.75) < 1e-9);
    }

    #[test]
    fn snapshot_before_first_tick_shows_baselines() {
        let engine = engine(&[]);
        let snapshot = engine.snapshot();

        assert_eq!(snapshot.parameters.len(), Parameter::ALL.len());
        let ph = snapshot.parameter(Parameter::Ph).unwrap();
        assert_eq!(ph.value, 6.8);
        assert_eq!(ph.classification, Classification::Optimal);
        assert_eq!(snapshot.parameter(Parameter::Moisture).unwrap().value, 45.0);
        assert_eq!(snapshot.metrics.cusum_threshold, 5.0);
    }
}
