//! Integration tests for the anomaly engine
//!
//! Drives the public API end to end:
//! - Filter convergence and the adaptive process-noise switch
//! - Bounded history and alert windows
//! - Reset, injection and rejected-tick behaviour
//! - The worked m=70 scenario

mod common;

use soilguard_core::{
    detection::{CumSumState, KalmanEstimator, KalmanConfig, KalmanState},
    events::{Parameter, Severity, HIGH_MOISTURE_MESSAGE, LOW_MOISTURE_MESSAGE},
    source::ReplaySource,
    time::{FixedTime, SteppedTime},
    AnomalyEngine, Classification, ConfigError, Direction, EngineConfig, RangeClassifier,
    RunState, TickError,
};

use common::{noisy_engine, replay_engine, NoisyProbe, TICK_MS};

#[test]
fn constant_stream_converges() {
    let mut engine = replay_engine(&[45.0; 60]);
    let mut previous = engine.kalman_state().error_covariance;

    for _ in 0..60 {
        engine.tick().unwrap();
        let state = engine.kalman_state();
        assert_eq!(state.estimate, 45.0);
        assert_eq!(state.process_noise, 0.01);
        assert!(state.error_covariance <= previous + 1e-12);
        previous = state.error_covariance;
    }

    assert!(previous < 0.1);
    assert_eq!(engine.alerts().count(), 0);
}

#[test]
fn process_noise_switches_regime() {
    let mut engine = replay_engine(&[70.0, 61.7]);

    let first = engine.tick().unwrap();
    assert!(first.process_noise_inflated);
    assert_eq!(engine.kalman_state().process_noise, 0.025);

    let second = engine.tick().unwrap();
    assert!(!second.process_noise_inflated);
    assert_eq!(engine.kalman_state().process_noise, 0.01);
}

#[test]
fn worked_example_from_defaults() {
    let estimator = KalmanEstimator::new(KalmanConfig::default());
    let step = estimator.preview(70.0);
    assert_within_tolerance!(step.predicted_error_covariance, 1.01, 1e-12);
    assert_within_tolerance!(step.innovation_covariance, 1.51, 1e-12);
    assert_within_tolerance!(step.normalized_innovation, 413.9, 0.05);
    assert_within_tolerance!(step.gain, 0.669, 0.001);

    let mut engine = replay_engine(&[70.0]);
    let outcome = engine.tick().unwrap();

    let state = engine.kalman_state();
    assert_within_tolerance!(state.innovation, 25.0, 1e-12);
    assert_within_tolerance!(state.estimate, 61.7, 0.05);
    assert_within_tolerance!(state.error_covariance, 0.335, 0.001);
    assert_eq!(state.process_noise, 0.025);

    assert_eq!(*engine.cusum_state(), CumSumState { positive: 24.5, negative: 0.0 });
    assert_eq!(outcome.reading.direction, Direction::High);
    assert_eq!(outcome.reading.raw, 70.0);
    assert_eq!(outcome.reading.timestamp, 0);
    // 61.7% moisture is outside the 55% warning ceiling
    assert_eq!(outcome.classification, Classification::Critical);
}

#[test]
fn history_keeps_most_recent_in_order() {
    let series: Vec<f64> = (0..30).map(|i| 45.0 + (i % 3) as f64 * 0.1).collect();
    let mut engine = replay_engine(&series);

    for _ in 0..30 {
        engine.tick().unwrap();
    }

    let timestamps: Vec<u64> = engine.history().map(|r| r.timestamp).collect();
    let expected: Vec<u64> = (5..30).map(|i| i * TICK_MS).collect();
    assert_eq!(timestamps.len(), 25);
    assert_eq!(timestamps, expected);

    let raws: Vec<f64> = engine.history().map(|r| r.raw).collect();
    assert_eq!(raws, series[5..].to_vec());
}

#[test]
fn alert_log_keeps_newest_eight() {
    let mut engine = replay_engine(&[0.0; 12]);

    for _ in 0..12 {
        let outcome = engine.tick().unwrap();
        assert_eq!(outcome.reading.direction, Direction::Low);
    }

    let alerts: Vec<_> = engine.alerts().collect();
    assert_eq!(alerts.len(), 8);
    assert_eq!(alerts.first().map(|a| a.id), Some(12));
    assert_eq!(alerts.last().map(|a| a.id), Some(5));
    assert!(alerts.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
    assert!(alerts
        .iter()
        .all(|a| a.severity == Severity::Critical && a.message == LOW_MOISTURE_MESSAGE));
    assert_eq!(engine.stats().anomalies_detected, 12);
}

#[test]
fn step_change_is_tracked_and_flagged() {
    let mut series = vec![45.0; 20];
    series.extend(std::iter::repeat(55.0).take(40));
    let mut engine = replay_engine(&series);

    let mut high_alerts = 0;
    for _ in 0..60 {
        if let Some(alert) = engine.tick().unwrap().alert {
            assert_eq!(alert.message, HIGH_MOISTURE_MESSAGE);
            assert_eq!(alert.parameter, Parameter::Moisture);
            high_alerts += 1;
        }
    }

    assert!(high_alerts > 0);
    assert_within_tolerance!(engine.kalman_state().estimate, 55.0, 0.5);
}

#[test]
fn classification_boundaries() {
    let classifier = RangeClassifier::default();
    assert_eq!(classifier.classify(40.0, "moisture"), Classification::Optimal);
    assert_eq!(classifier.classify(36.0, "moisture"), Classification::Warning);
    assert_eq!(classifier.classify(10.0, "moisture"), Classification::Critical);
    assert_eq!(classifier.classify(45.0, "salinity"), Classification::Unknown);
}

#[test]
fn reset_is_idempotent() {
    let mut engine = noisy_engine(7);
    engine.inject_anomaly();
    for _ in 0..40 {
        engine.tick().unwrap();
    }

    engine.reset();
    let once = engine.snapshot();
    engine.reset();
    let twice = engine.snapshot();
    assert_eq!(once, twice);

    assert_eq!(
        *engine.kalman_state(),
        KalmanState {
            estimate: 45.0,
            error_covariance: 1.0,
            process_noise: 0.01,
            measurement_noise: 0.5,
            innovation: 0.0,
        }
    );
    assert_eq!(*engine.cusum_state(), CumSumState::default());
    assert_eq!(once.stats.total_readings, 0);
    assert_eq!(once.stats.anomalies_detected, 0);
    assert_eq!(once.stats.data_accuracy, 0.0);
    assert!(once.history.is_empty());
    assert!(once.alerts.is_empty());
    assert_eq!(once.run_state, RunState::Running);

    // Indistinguishable from a freshly started engine
    assert_eq!(once, noisy_engine(7).snapshot());
}

#[test]
fn injected_spike_fires_high() {
    let mut engine = AnomalyEngine::new(
        EngineConfig::default(),
        NoisyProbe::new(99).with_spike(40.0),
        SteppedTime::new(0, TICK_MS),
    )
    .unwrap();
    engine.start();

    for _ in 0..10 {
        engine.tick().unwrap();
    }

    engine.inject_anomaly();
    let outcome = engine.tick().unwrap();
    assert_eq!(outcome.reading.direction, Direction::High);
    assert!(outcome.reading.raw > 75.0);
    assert_eq!(outcome.alert.map(|a| a.severity), Some(Severity::Warning));
    assert!(!engine.injection_pending());
}

#[test]
fn rejected_ticks_change_nothing() {
    let mut engine = replay_engine(&[46.0, f64::NAN, 44.0]);
    engine.tick().unwrap();

    let before = engine.snapshot();
    assert!(matches!(
        engine.tick(),
        Err(TickError::InvalidMeasurement { parameter: Parameter::Moisture, value }) if value.is_nan()
    ));
    assert_eq!(engine.snapshot(), before);

    engine.stop();
    let idle = engine.snapshot();
    assert_eq!(engine.tick(), Err(TickError::NotRunning));
    assert_eq!(engine.snapshot(), idle);

    engine.start();
    let outcome = engine.tick().unwrap();
    assert_eq!(outcome.reading.raw, 44.0);
    assert_eq!(engine.stats().total_readings, 2);
}

#[test]
fn accuracy_is_monotone_and_bounded() {
    let mut engine = noisy_engine(1234);
    let mut previous = engine.stats().data_accuracy;

    for tick in 0..200 {
        if tick % 17 == 0 {
            engine.inject_anomaly();
        }
        engine.tick().unwrap();
        let accuracy = engine.stats().data_accuracy;
        assert!(accuracy >= previous);
        assert!(accuracy <= 100.0);
        previous = accuracy;
    }

    assert!(previous > 99.0);
}

#[test]
fn full_gain_reaches_ceiling_in_one_tick() {
    let config = EngineConfig::default().with_accuracy_gain(1.0);
    let mut engine = AnomalyEngine::new(config, ReplaySource::new([45.0]), FixedTime::new(0)).unwrap();
    engine.start();
    engine.tick().unwrap();
    assert_eq!(engine.stats().data_accuracy, 100.0);
}

#[test]
fn invalid_configuration_is_rejected() {
    let config = EngineConfig::default()
        .with_kalman(KalmanConfig::default().with_inflation(1.0));
    let result = AnomalyEngine::new(config, ReplaySource::new([]), FixedTime::new(0));
    assert!(matches!(result, Err(ConfigError::InvalidInflation { .. })));
}

#[test]
fn snapshot_reflects_latest_auxiliaries() {
    let mut engine = noisy_engine(3);
    let outcome = engine.tick().unwrap();
    let snapshot = engine.snapshot();

    let order: Vec<Parameter> = snapshot.parameters.iter().map(|s| s.parameter).collect();
    assert_eq!(order, Parameter::ALL.to_vec());

    for parameter in Parameter::AUXILIARY {
        let status = snapshot.parameter(parameter).unwrap();
        assert_eq!(Some(status.value), outcome.reading.auxiliary.get(parameter));
    }
    assert_eq!(
        snapshot.parameter(Parameter::Moisture).map(|s| s.value),
        Some(outcome.reading.filtered)
    );
    assert_eq!(snapshot.history.len(), 1);
}
