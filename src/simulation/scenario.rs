//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! `Scenario` containing:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - the body registry at t = 0 (`BodyRegistry`)

use std::time::Duration;

use crate::configuration::config::{BodyConfig, ConfigError, ScenarioConfig, StepMode};
use crate::simulation::engine::Engine;
use crate::simulation::forces::G_SI;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, BodyRegistry, NVec3};

/// Scaled astronomical unit of the built-in scene
pub const AU: f64 = 100.0;
/// Scaled masses, chosen for visible motion rather than realism
pub const SUN_MASS: f64 = 3.33e13;
pub const EARTH_MASS: f64 = 1.0;
pub const MOON_MASS: f64 = 0.1;
pub const EARTH_ORBITAL_VELOCITY: f64 = 5.0;

/// Runtime bundle handed to the frame driver
#[derive(Debug, Clone)]
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub registry: BodyRegistry,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;

        // Bodies: map `BodyConfig` -> runtime `Body` using nalgebra vectors
        let bodies: Vec<Body> = cfg.bodies.iter().map(|bc: &BodyConfig| Body {
            x: NVec3::new(bc.x[0], bc.x[1], bc.x[2]),
            v: NVec3::new(bc.v[0], bc.v[1], bc.v[2]),
            m: bc.m,
            name: bc.name.clone(),
        }).collect();

        let p_cfg = cfg.parameters;
        let parameters = Parameters {
            t_end: p_cfg.t_end,
            h0: p_cfg.h0,
            eps2: p_cfg.eps2,
            G: p_cfg.G,
        };

        let defaults = Engine::default();
        let e_cfg = cfg.engine;
        let engine = Engine {
            mode: e_cfg.mode,
            timeout: e_cfg.timeout_ms.map(Duration::from_millis).unwrap_or(defaults.timeout),
            report_every: e_cfg.report_every.unwrap_or(defaults.report_every),
        };

        Ok(Self {
            engine,
            parameters,
            registry: BodyRegistry::new(bodies),
        })
    }

    /// Sun, Earth and Moon in scaled units, all starting on the +x axis.
    /// Earth and Moon share the same initial velocity.
    pub fn solar_system() -> Self {
        let sun = Body::named("Sun", NVec3::zeros(), NVec3::zeros(), SUN_MASS);
        let earth = Body::named(
            "Earth",
            NVec3::new(AU, 0.0, 0.0),
            NVec3::new(0.0, EARTH_ORBITAL_VELOCITY, 0.0),
            EARTH_MASS,
        );
        let moon = Body::named(
            "Moon",
            NVec3::new(AU + 10.0, 0.0, 0.0),
            NVec3::new(0.0, EARTH_ORBITAL_VELOCITY, 0.0),
            MOON_MASS,
        );

        Self {
            engine: Engine { mode: StepMode::Inline, ..Engine::default() },
            parameters: Parameters {
                t_end: 60.0,
                h0: 1.0 / 60.0,
                eps2: 0.0,
                G: G_SI,
            },
            registry: BodyRegistry::new(vec![sun, earth, moon]),
        }
    }
}
