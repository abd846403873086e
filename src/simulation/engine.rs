//! High-level runtime engine settings
//!
//! Selects where the integrator runs (caller thread or worker thread)
//! and how long an offloaded step may stay unanswered

use std::time::Duration;

use crate::configuration::config::StepMode;

#[derive(Debug, Clone, PartialEq)]
pub struct Engine {
    pub mode: StepMode, // inline or offloaded
    pub timeout: Duration, // stall threshold for offloaded steps
    pub report_every: u64, // frames between progress logs, 0 = never
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            mode: StepMode::Inline,
            timeout: Duration::from_millis(250),
            report_every: 60,
        }
    }
}
