//! Live Monitor Example
//!
//! Runs the engine against a simulated probe on a fast cadence, prints each
//! snapshot as a JSON line and injects an anomaly halfway through.
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run -p soilguard-connectors --example monitor
//! ```

use std::time::Duration;

use soilguard_connectors::{JsonLinesSink, SchedulerConfig, SimulatedProbe, TickScheduler};
use soilguard_core::{time::SystemTime, AnomalyEngine, EngineConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let probe = SimulatedProbe::from_entropy().with_spontaneous_probability(0.02);
    let engine = AnomalyEngine::new(EngineConfig::default(), probe, SystemTime)?;

    let mut scheduler = TickScheduler::new(engine, SchedulerConfig::default().with_interval_ms(250));
    scheduler.add_sink(JsonLinesSink::new(std::io::stdout()));
    scheduler.start().await?;

    tokio::time::sleep(Duration::from_secs(3)).await;
    eprintln!(">>> injecting anomaly");
    scheduler.inject_anomaly().await;

    tokio::time::sleep(Duration::from_secs(3)).await;
    scheduler.stop().await?;

    let snapshot = scheduler.snapshot();
    eprintln!(
        ">>> engine {}: {} readings, {} anomalies, accuracy {:.1}%",
        snapshot.run_state.as_str(),
        snapshot.stats.total_readings, snapshot.stats.anomalies_detected, snapshot.stats.data_accuracy
    );
    for alert in &snapshot.alerts {
        eprintln!("    #{} {:?}: {}", alert.id, alert.severity, alert.message);
    }

    Ok(())
}
