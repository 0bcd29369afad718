//! Moisture Engine Example
//!
//! Replays a short field log through the anomaly engine: a settled soil,
//! an irrigation pulse, then a drying trend.
//!
//! ## What You'll Learn
//!
//! - Building an engine from the default configuration
//! - Ticking it against a replayed moisture series
//! - Reading alerts, filter metrics and stats from a snapshot
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_moisture_engine
//! ```

use soilguard_core::{
    constants::time::{DEFAULT_TICK_INTERVAL_MS, MS_PER_SECOND},
    source::ReplaySource,
    time::SteppedTime,
    AnomalyEngine, EngineConfig, TickError,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("SoilGuard Moisture Engine Example");
    println!("=================================\n");

    // 10 settled readings, an irrigation pulse, then a slow dry-down
    let mut series = vec![45.2, 44.8, 45.5, 44.9, 45.1, 45.3, 44.7, 45.0, 45.4, 44.9];
    series.extend([68.0, 66.5, 64.0]);
    series.extend((0..12).map(|i| 44.0 - i as f64 * 1.5));

    let source = ReplaySource::new(series.iter().copied());
    let mut engine = AnomalyEngine::new(EngineConfig::default(), source, SteppedTime::new(0, DEFAULT_TICK_INTERVAL_MS))?;
    engine.start();

    println!("  {:>6} {:>7} {:>9} {:>10}  {}", "t(s)", "raw", "filtered", "innovation", "state");
    loop {
        let outcome = match engine.tick() {
            Ok(outcome) => outcome,
            Err(TickError::NotRunning) => break,
            Err(e) => {
                println!("  tick rejected: {}", e);
                continue;
            }
        };

        let reading = outcome.reading;
        println!(
            "  {:>6} {:>7.2} {:>9.2} {:>10.2}  {}{}",
            reading.timestamp / MS_PER_SECOND,
            reading.raw,
            reading.filtered,
            reading.innovation,
            outcome.classification.as_str(),
            if outcome.process_noise_inflated { " (Q inflated)" } else { "" },
        );

        if let Some(alert) = outcome.alert {
            println!("    ⚠ alert #{} [{:?}]: {}", alert.id, alert.severity, alert.message);
        }

        if engine.source().remaining() == 0 {
            engine.stop();
        }
    }

    let snapshot = engine.snapshot();
    println!("\nEngine is {} after the replay", snapshot.run_state.as_str());
    println!("\nFilter metrics:");
    println!("  estimate:         {:.2}%", snapshot.metrics.estimate);
    println!("  error covariance: {:.4}", snapshot.metrics.error_covariance);
    println!("  process noise:    {}", snapshot.metrics.process_noise);
    println!(
        "  CUSUM:            S+={:.2}  S-={:.2}  (h={})",
        snapshot.metrics.cusum_positive, snapshot.metrics.cusum_negative, snapshot.metrics.cusum_threshold
    );

    println!("\nStats:");
    println!("  readings:  {}", snapshot.stats.total_readings);
    println!("  anomalies: {}", snapshot.stats.anomalies_detected);
    println!("  accuracy:  {:.1}%", snapshot.stats.data_accuracy);

    println!("\nAlerts (newest first):");
    for alert in &snapshot.alerts {
        println!("  #{} t={}s {:.2}% {}", alert.id, alert.timestamp / MS_PER_SECOND, alert.value, alert.message);
    }

    Ok(())
}
