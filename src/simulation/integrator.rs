//! Fixed-step time integrator for the N-body system
//!
//! One scheme only: semi-implicit (symplectic) Euler.
//!
//! ```text
//! a_n   = F(x_n) / m
//! v_n+1 = v_n + dt a_n
//! x_n+1 = x_n + dt v_n+1
//! ```
//!
//! All forces are evaluated on the pre-step snapshot before any result is
//! produced, and the input slice is never written to. The caller applies the
//! returned results in one batch (see `BodyRegistry::apply`).

use super::errors::SimError;
use super::forces::NewtonianGravity;
use super::states::{is_finite, Body, NVec3, StepResult};

/// Stateless stepping function bound to a force law.
/// `Copy` so the worker thread can own its own instance.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Integrator {
    pub gravity: NewtonianGravity,
}

impl Integrator {
    pub fn new(gravity: NewtonianGravity) -> Self {
        Self { gravity }
    }

    /// Advance every body by `dt`.
    /// Output has the same length and order as `bodies`
    pub fn step(&self, bodies: &[Body], dt: f64) -> Result<Vec<StepResult>, SimError> {
        validate(bodies, dt)?;

        let n = bodies.len();

        // F_n from x_n, whole snapshot first
        let mut forces = vec![NVec3::zeros(); n];
        for (i, j) in self.gravity.accumulate_forces(bodies, &mut forces) {
            log::warn!("bodies {i} and {j} coincide, pair exerts no force this step");
        }

        // Kick then drift, using the new velocity for the position update
        let results: Vec<StepResult> = bodies
            .iter()
            .zip(forces.iter())
            .map(|(b, f)| {
                let a = *f / b.m;
                let v = b.v + dt * a;
                let x = b.x + dt * v;
                StepResult { x, v }
            })
            .collect();

        // finite input can still overflow with a huge dt
        if let Some(index) = results.iter().position(|r| !is_finite(&r.x) || !is_finite(&r.v)) {
            return Err(SimError::NonFiniteResult { index });
        }

        Ok(results)
    }
}

/// Step with the SI gravitational constant and no softening
pub fn step(bodies: &[Body], dt: f64) -> Result<Vec<StepResult>, SimError> {
    Integrator::default().step(bodies, dt)
}

/// Reject input that would otherwise turn into NaN further down
pub fn validate(bodies: &[Body], dt: f64) -> Result<(), SimError> {
    if bodies.is_empty() {
        return Err(SimError::EmptySystem);
    }
    if !dt.is_finite() {
        return Err(SimError::NonFiniteTimeStep(dt));
    }
    for (index, b) in bodies.iter().enumerate() {
        // also catches NaN
        if !(b.m.is_finite() && b.m > 0.0) {
            return Err(SimError::NonPositiveMass { index, mass: b.m });
        }
        if !is_finite(&b.x) || !is_finite(&b.v) {
            return Err(SimError::NonFiniteState { index });
        }
    }
    Ok(())
}
