//! Fixed-cadence tick scheduler
//!
//! Owns the engine behind an `Arc<tokio::sync::Mutex<_>>` and ticks it from
//! a background task. A tick holds the lock for its whole duration, so ticks
//! never overlap with each other or with operator actions. Ticks that fall
//! behind schedule are skipped, not replayed.
//!
//! After every successful tick the scheduler publishes the snapshot to a
//! `watch` channel while still holding the lock, then hands it to every
//! connected sink. Operator actions (`reset`,
//! `clear_alerts`) also publish, so subscribers never show stale state.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use soilguard_core::{
    constants::DEFAULT_TICK_INTERVAL_MS, time::TimeSource, traits::MeasurementSource,
    AnomalyEngine, EngineSnapshot,
};
use thiserror::Error;
use tokio::sync::{oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::sink::SnapshotSink;

/// Engine shared between the scheduler task and operator actions
pub type SharedEngine<S, C> = Arc<Mutex<AnomalyEngine<S, C>>>;

type BoxedSink = Box<dyn SnapshotSink + Send>;

/// What the tick task does when `tick()` fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickFailurePolicy {
    /// Log the error and wait for the next tick
    #[default]
    Skip,
    /// Log the error, stop the engine and end the task
    Stop,
}

/// Scheduler settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Cadence between ticks in milliseconds
    pub interval_ms: u64,
    #[serde(default)]
    pub failure_policy: TickFailurePolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_TICK_INTERVAL_MS,
            failure_policy: TickFailurePolicy::Skip,
        }
    }
}

impl SchedulerConfig {
    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    pub fn with_failure_policy(mut self, policy: TickFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Cadence as a `Duration`; never zero
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

/// Scheduler errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Scheduler is already running")]
    AlreadyRunning,

    #[error("Scheduler is not running")]
    NotRunning,

    #[error("Tick task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

struct TickTask {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<Vec<BoxedSink>>,
}

/// Ticks an [`AnomalyEngine`] on a fixed cadence
pub struct TickScheduler<S, C> {
    engine: SharedEngine<S, C>,
    config: SchedulerConfig,
    snapshot_tx: watch::Sender<Arc<EngineSnapshot>>,
    sinks: Vec<BoxedSink>,
    task: Option<TickTask>,
}

impl<S, C> TickScheduler<S, C>
where
    S: MeasurementSource + Send + 'static,
    C: TimeSource + Send + 'static,
{
    pub fn new(engine: AnomalyEngine<S, C>, config: SchedulerConfig) -> Self {
        let (snapshot_tx, _) = watch::channel(Arc::new(engine.snapshot()));
        Self {
            engine: Arc::new(Mutex::new(engine)),
            config,
            snapshot_tx,
            sinks: Vec::new(),
            task: None,
        }
    }

    /// Register a sink
    ///
    /// Sinks move into the tick task on `start()` and come back on `stop()`;
    /// one added while running is picked up by the next `start()`.
    pub fn add_sink<K>(&mut self, sink: K)
    where
        K: SnapshotSink + Send + 'static,
    {
        self.sinks.push(Box::new(sink));
    }

    /// Handle to the engine for operator actions
    pub fn engine(&self) -> SharedEngine<S, C> {
        Arc::clone(&self.engine)
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<EngineSnapshot> {
        Arc::clone(&self.snapshot_tx.borrow())
    }

    /// Receiver that sees every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<Arc<EngineSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    /// Whether the tick task is alive
    pub fn is_running(&self) -> bool {
        self.task
            .as_ref()
            .map_or(false, |task| !task.handle.is_finished())
    }

    /// Put the engine in Running and begin ticking
    ///
    /// The first tick fires immediately, then one every interval.
    pub async fn start(&mut self) -> Result<(), SchedulerError> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }
        // A task that stopped itself still holds the sinks
        if let Some(task) = self.task.take() {
            let sinks = task.handle.await?;
            self.sinks.extend(sinks);
        }

        {
            let mut engine = self.engine.lock().await;
            engine.start();
            self.snapshot_tx.send_replace(Arc::new(engine.snapshot()));
        }

        let (shutdown, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(run_ticks(
            Arc::clone(&self.engine),
            self.config.clone(),
            std::mem::take(&mut self.sinks),
            self.snapshot_tx.clone(),
            shutdown_rx,
        ));

        log::info!(
            "tick scheduler started: interval={}ms, policy={:?}",
            self.config.interval_ms,
            self.config.failure_policy
        );
        self.task = Some(TickTask { shutdown, handle });
        Ok(())
    }

    /// Stop ticking and put the engine in Idle; state is kept
    pub async fn stop(&mut self) -> Result<(), SchedulerError> {
        let task = self.task.take().ok_or(SchedulerError::NotRunning)?;

        // Err means the task already ended on its own
        let _ = task.shutdown.send(());
        let sinks = task.handle.await?;
        self.sinks.extend(sinks);

        let mut engine = self.engine.lock().await;
        engine.stop();
        self.snapshot_tx.send_replace(Arc::new(engine.snapshot()));
        log::info!("tick scheduler stopped");
        Ok(())
    }

    /// Reset the engine and publish the cleared state
    pub async fn reset(&self) {
        let mut engine = self.engine.lock().await;
        engine.reset();
        self.snapshot_tx.send_replace(Arc::new(engine.snapshot()));
    }

    /// Arm a one-shot anomaly for the next tick
    pub async fn inject_anomaly(&self) {
        self.engine.lock().await.inject_anomaly();
    }

    /// Empty the alert log and publish
    pub async fn clear_alerts(&self) {
        let mut engine = self.engine.lock().await;
        engine.clear_alerts();
        self.snapshot_tx.send_replace(Arc::new(engine.snapshot()));
    }
}

async fn run_ticks<S, C>(
    engine: SharedEngine<S, C>,
    config: SchedulerConfig,
    mut sinks: Vec<BoxedSink>,
    snapshot_tx: watch::Sender<Arc<EngineSnapshot>>,
    mut shutdown: oneshot::Receiver<()>,
) -> Vec<BoxedSink>
where
    S: MeasurementSource + Send + 'static,
    C: TimeSource + Send + 'static,
{
    let mut ticker = interval(config.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        let snapshot = {
            let mut engine = engine.lock().await;
            match engine.tick() {
                Ok(outcome) => {
                    if let Some(alert) = outcome.alert {
                        log::warn!(
                            "alert #{} ({:?}): {} [{:.2}%]",
                            alert.id,
                            alert.severity,
                            alert.message,
                            alert.value
                        );
                    }
                    // Publish under the lock; a concurrent reset must land after this
                    let snapshot = Arc::new(engine.snapshot());
                    snapshot_tx.send_replace(Arc::clone(&snapshot));
                    snapshot
                }
                Err(e) => {
                    log::error!("tick failed: {}", e);
                    match config.failure_policy {
                        TickFailurePolicy::Skip => continue,
                        TickFailurePolicy::Stop => {
                            engine.stop();
                            snapshot_tx.send_replace(Arc::new(engine.snapshot()));
                            break;
                        }
                    }
                }
            }
        };

        for sink in sinks.iter_mut() {
            if !sink.is_connected() {
                log::debug!("skipping disconnected sink");
                continue;
            }
            if let Err(e) = sink.publish(&snapshot) {
                log::warn!("sink publish failed: {}", e);
            }
        }
    }

    sinks
}
