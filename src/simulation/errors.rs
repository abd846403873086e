//! Error taxonomy for stepping the system
//!
//! - input errors: rejected before any arithmetic, never coerced
//! - channel failures: only produced by the offloaded worker path
//!
//! Coincident bodies are not an error here, their pairwise
//! contribution is skipped (see [`crate::simulation::forces`])

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimError {
    #[error("cannot step an empty system")]
    EmptySystem,

    #[error("time step must be finite, got {0}")]
    NonFiniteTimeStep(f64),

    #[error("body {index} has non-positive or non-finite mass {mass}")]
    NonPositiveMass { index: usize, mass: f64 },

    #[error("body {index} has a non-finite position or velocity")]
    NonFiniteState { index: usize },

    #[error("step overflowed for body {index}, time step too large for this configuration")]
    NonFiniteResult { index: usize },

    #[error("expected {expected} step results, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("physics worker did not answer request {seq} within {waited_ms} ms")]
    WorkerTimeout { seq: u64, waited_ms: u128 },

    #[error("physics worker channel closed")]
    WorkerDisconnected,

    #[error("failed to spawn physics worker: {0}")]
    WorkerSpawn(String),
}

impl SimError {
    /// Bad data handed to the integrator or to `BodyRegistry::apply`
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SimError::EmptySystem
                | SimError::NonFiniteTimeStep(_)
                | SimError::NonPositiveMass { .. }
                | SimError::NonFiniteState { .. }
                | SimError::NonFiniteResult { .. }
                | SimError::LengthMismatch { .. }
        )
    }

    /// Worker unavailable, stalled or lost
    pub fn is_channel_failure(&self) -> bool {
        matches!(
            self,
            SimError::WorkerTimeout { .. } | SimError::WorkerDisconnected | SimError::WorkerSpawn(_)
        )
    }
}
