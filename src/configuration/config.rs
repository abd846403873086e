//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – where steps run (inline / offloaded) and stall timeout
//! - [`ParametersConfig`] – step size, duration and physical constants
//! - [`BodyConfig`]       – initial state for each body
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! An example scenario YAML matching these types:
//!
//! ```yaml
//! engine:
//!   mode: offloaded         # or "inline"
//!   timeout_ms: 250         # optional, stall threshold for the worker
//!   report_every: 60        # optional, frames between progress logs
//!
//! parameters:
//!   t_end: 10.0             # total simulated time
//!   h0: 0.016               # per-frame step size
//!   eps2: 0.0               # optional softening epsilon^2
//!   G: 6.67430e-11          # optional gravitational constant
//!
//! bodies:
//!   - name: Sun
//!     x: [ 0.0, 0.0, 0.0 ]
//!     v: [ 0.0, 0.0, 0.0 ]
//!     m: 3.33e13
//!   - name: Earth
//!     x: [ 100.0, 0.0, 0.0 ]
//!     v: [ 0.0, 5.0, 0.0 ]
//!     m: 1.0
//! ```
//!
//! The engine then maps this configuration into its runtime `Scenario`
//! (see [`crate::simulation::scenario`]).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::simulation::forces::G_SI;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scenario YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("body {index}: `{field}` must have 3 components, got {got}")]
    VectorLength { index: usize, field: &'static str, got: usize },

    #[error("body {index}: {reason}")]
    Body { index: usize, reason: String },

    #[error("parameter `{name}`: {reason}")]
    Parameter { name: &'static str, reason: String },

    #[error("scenario has no bodies")]
    NoBodies,
}

/// Where the integrator runs each frame
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepMode {
    #[default]
    #[serde(rename = "inline")] // synchronous, on the thread driving the frame loop
    Inline,

    #[serde(rename = "offloaded")] // background worker thread, message passing only
    Offloaded,
}

/// High-level engine configuration
#[derive(Deserialize, Debug, Clone, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub mode: StepMode, // inline or offloaded, defaults to inline
    pub timeout_ms: Option<u64>, // how long an offloaded step may stay unanswered
    pub report_every: Option<u64>, // frames between progress logs, 0 disables
}

/// Global numerical and physical parameters for a scenario
#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub t_end: f64, // time end
    pub h0: f64, // time step size, one per frame
    #[serde(default)]
    pub eps2: f64, // softening, 0 = plain inverse-square
    #[serde(default = "default_g")]
    pub G: f64, // gravitational constant
}

fn default_g() -> f64 {
    G_SI
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub name: Option<String>, // label used in logs
    pub x: Vec<f64>, // initial position
    pub v: Vec<f64>, // initial velocity
    pub m: f64, // mass, strictly positive
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub engine: EngineConfig, // where and how steps run
    pub parameters: ParametersConfig, // global numerical and physical parameters
    pub bodies: Vec<BodyConfig>, // initial state of the system
}

impl ScenarioConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: ScenarioConfig = serde_yaml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let reader = BufReader::new(File::open(path)?);
        let cfg: ScenarioConfig = serde_yaml::from_reader(reader)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Catch bad input at load time instead of on the first frame
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.parameters;
        if !(p.h0.is_finite() && p.h0 > 0.0) {
            return Err(ConfigError::Parameter { name: "h0", reason: format!("must be finite and > 0, got {}", p.h0) });
        }
        if !(p.t_end.is_finite() && p.t_end >= 0.0) {
            return Err(ConfigError::Parameter { name: "t_end", reason: format!("must be finite and >= 0, got {}", p.t_end) });
        }
        if !(p.eps2.is_finite() && p.eps2 >= 0.0) {
            return Err(ConfigError::Parameter { name: "eps2", reason: format!("must be finite and >= 0, got {}", p.eps2) });
        }
        if !(p.G.is_finite() && p.G > 0.0) {
            return Err(ConfigError::Parameter { name: "G", reason: format!("must be finite and > 0, got {}", p.G) });
        }

        if self.bodies.is_empty() {
            return Err(ConfigError::NoBodies);
        }
        for (index, b) in self.bodies.iter().enumerate() {
            for (field, vals) in [("x", &b.x), ("v", &b.v)] {
                if vals.len() != 3 {
                    return Err(ConfigError::VectorLength { index, field, got: vals.len() });
                }
                if vals.iter().any(|c| !c.is_finite()) {
                    return Err(ConfigError::Body { index, reason: format!("`{field}` has a non-finite component") });
                }
            }
            if !(b.m.is_finite() && b.m > 0.0) {
                return Err(ConfigError::Body { index, reason: format!("mass must be > 0, got {}", b.m) });
            }
        }
        Ok(())
    }
}
