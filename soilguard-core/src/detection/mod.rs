//! Adaptive Kalman–CUSUM Detection
//!
//! ## Overview
//!
//! Two small state machines run back to back on every moisture sample:
//!
//! ```text
//!  raw ──→ KalmanEstimator ──→ estimate (denoised)
//!                │
//!                └── innovation ──→ CumSumDetector ──→ High / Low / Normal
//! ```
//!
//! The filter turns a noisy reading into an estimate plus a *surprise* value
//! (the innovation). The CUSUM accumulates surprise over time so a single
//! spike and a sustained shift can be told apart.
//!
//! Both components expose the same shape of API:
//! - a pure `advance` on their state type, used by the engine to compute a
//!   whole tick before committing anything
//! - a stateful `step` that computes and stores in one go
//! - `reset` back to configured defaults

pub mod cusum;
pub mod kalman;

pub use cusum::{CumSumDetector, CumSumState, CusumConfig, CusumVerdict};
pub use kalman::{KalmanConfig, KalmanEstimator, KalmanState, KalmanStep};
