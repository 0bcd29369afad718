//! Snapshot sinks
//!
//! A sink receives the engine snapshot after every successful tick. Sinks
//! are called from the scheduler's tick task, so a slow sink delays the next
//! tick; keep `publish` cheap or hand the work off.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};

use soilguard_core::EngineSnapshot;
use thiserror::Error;

/// Errors a sink can report
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Sink closed")]
    Closed,
}

/// Trait for all snapshot consumers
pub trait SnapshotSink {
    /// Deliver one snapshot
    fn publish(&mut self, snapshot: &EngineSnapshot) -> Result<(), SinkError>;

    /// Check if the sink can currently accept snapshots
    fn is_connected(&self) -> bool {
        true
    }

    /// Delivery statistics
    fn stats(&self) -> SinkStats;
}

/// Delivery statistics common to all sinks
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SinkStats {
    /// Snapshots delivered successfully
    pub snapshots_published: u64,
    /// Snapshots that failed to deliver
    pub snapshots_failed: u64,
    /// Bytes written (serializing sinks only)
    pub bytes_written: u64,
    /// Last error message
    pub last_error: Option<String>,
}

impl SinkStats {
    fn record<T>(&mut self, result: &Result<T, SinkError>) {
        match result {
            Ok(_) => self.snapshots_published += 1,
            Err(e) => {
                self.snapshots_failed += 1;
                self.last_error = Some(e.to_string());
            }
        }
    }
}

/// Writes each snapshot as a single line of JSON
pub struct JsonLinesSink<W: Write> {
    writer: W,
    stats: SinkStats,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            stats: SinkStats::default(),
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, snapshot: &EngineSnapshot) -> Result<usize, SinkError> {
        let mut line = serde_json::to_vec(snapshot)?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        self.writer.flush()?;
        Ok(line.len())
    }
}

impl<W: Write> SnapshotSink for JsonLinesSink<W> {
    fn publish(&mut self, snapshot: &EngineSnapshot) -> Result<(), SinkError> {
        let result = self.write_line(snapshot);
        self.stats.record(&result);
        let written = result?;
        self.stats.bytes_written += written as u64;
        Ok(())
    }

    fn stats(&self) -> SinkStats {
        self.stats.clone()
    }
}

/// Keeps every published snapshot in memory
///
/// Clones share storage, so a test can keep one handle and give the other
/// to the scheduler.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    snapshots: Arc<Mutex<VecDeque<EngineSnapshot>>>,
    capacity: Option<usize>,
    stats: Arc<Mutex<SinkStats>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the most recent `capacity` snapshots
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity.max(1)),
            ..Self::default()
        }
    }

    /// Copy of the stored snapshots, oldest first
    pub fn snapshots(&self) -> Vec<EngineSnapshot> {
        self.snapshots
            .lock()
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_else(|poisoned| poisoned.into_inner().iter().cloned().collect())
    }

    pub fn latest(&self) -> Option<EngineSnapshot> {
        self.snapshots.lock().ok().and_then(|s| s.back().cloned())
    }

    pub fn len(&self) -> usize {
        self.snapshots.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SnapshotSink for MemorySink {
    fn publish(&mut self, snapshot: &EngineSnapshot) -> Result<(), SinkError> {
        let result = match self.snapshots.lock() {
            Ok(mut snapshots) => {
                if let Some(capacity) = self.capacity {
                    while snapshots.len() >= capacity {
                        snapshots.pop_front();
                    }
                }
                snapshots.push_back(snapshot.clone());
                Ok(())
            }
            Err(_) => Err(SinkError::Closed),
        };

        if let Ok(mut stats) = self.stats.lock() {
            stats.record(&result);
        }
        result
    }

    fn is_connected(&self) -> bool {
        !self.snapshots.is_poisoned()
    }

    fn stats(&self) -> SinkStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }
}
