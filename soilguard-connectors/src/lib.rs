//! Runtime Connectors for the SoilGuard Engine
//!
//! ## Overview
//!
//! `soilguard-core` is synchronous and knows nothing about wall clocks,
//! threads or where its numbers end up. This crate supplies the pieces
//! around it for a running deployment:
//!
//! ```text
//!  SimulatedProbe ──→ AnomalyEngine ──→ EngineSnapshot ──→ SnapshotSink(s)
//!                          ↑                  │
//!                    TickScheduler            └──→ watch::Receiver (dashboards)
//! ```
//!
//! ### TickScheduler
//!
//! Drives `tick()` on a fixed cadence (2 s by default) from a tokio task.
//! Late ticks are skipped rather than bunched up, and a tick always runs to
//! completion before the next begins. Requires the `std` feature.
//!
//! ### SnapshotSink
//!
//! Anything that accepts a snapshot after each successful tick. Ships with
//! [`JsonLinesSink`] (one JSON document per line on any `io::Write`) and
//! [`MemorySink`] (keeps snapshots for inspection).
//!
//! ### SimulatedProbe
//!
//! A seeded random source for demos and soak tests: jitter around each
//! channel's baseline, plus a 15-25 unit moisture spike on demand or at a
//! configured spontaneous rate.
//!
//! ## Example Usage
//!
//! ```no_run
//! use soilguard_connectors::{JsonLinesSink, SchedulerConfig, SimulatedProbe, TickScheduler};
//! use soilguard_core::{time::SystemTime, AnomalyEngine, EngineConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = AnomalyEngine::new(EngineConfig::default(), SimulatedProbe::seeded(7), SystemTime)?;
//!
//! let mut scheduler = TickScheduler::new(engine, SchedulerConfig::default());
//! scheduler.add_sink(JsonLinesSink::new(std::io::stdout()));
//! scheduler.start().await?;
//!
//! tokio::time::sleep(std::time::Duration::from_secs(60)).await;
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod probe;
pub mod sink;

#[cfg(feature = "std")]
pub mod scheduler;

// Re-export common types
pub use probe::SimulatedProbe;
pub use sink::{JsonLinesSink, MemorySink, SinkError, SinkStats, SnapshotSink};

#[cfg(feature = "std")]
pub use scheduler::{SchedulerConfig, SchedulerError, SharedEngine, TickFailurePolicy, TickScheduler};
