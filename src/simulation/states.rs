//! Core state types for the N-body simulation.
//!
//! - `Body`: one point mass (position, velocity, mass)
//! - `StepResult`: the updated position/velocity the integrator emits per body
//! - `BodyRegistry`: the caller-owned list of bodies and the current time `t`
//!
//! The registry is only ever mutated through [`BodyRegistry::apply`], which
//! writes a whole step at once or nothing.

use nalgebra::Vector3;
pub type NVec3 = Vector3<f64>;

use super::errors::SimError;

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub x: NVec3, // position
    pub v: NVec3, // velocity
    pub m: f64, // mass
    pub name: Option<String>, // label for logs only
}

impl Body {
    pub fn new(x: NVec3, v: NVec3, m: f64) -> Self {
        Self { x, v, m, name: None }
    }

    pub fn named(name: impl Into<String>, x: NVec3, v: NVec3, m: f64) -> Self {
        Self { x, v, m, name: Some(name.into()) }
    }

    /// Name if set, otherwise `#index`
    pub fn label(&self, index: usize) -> String {
        match &self.name {
            Some(n) => n.clone(),
            None => format!("#{index}"),
        }
    }
}

/// Next state of one body, index-aligned with the step input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    pub x: NVec3,
    pub v: NVec3,
}

#[derive(Debug, Clone, Default)]
pub struct BodyRegistry {
    pub bodies: Vec<Body>, // collection of bodies
    pub t: f64, // time
}

impl BodyRegistry {
    pub fn new(bodies: Vec<Body>) -> Self {
        Self { bodies, t: 0.0 }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Read-only view handed to the integrator for one step
    pub fn snapshot(&self) -> &[Body] {
        &self.bodies
    }

    /// Write one step of results back into the registry and advance `t` by `dt`.
    ///
    /// Everything is checked before the first body is touched, so on error the
    /// registry is exactly as it was.
    pub fn apply(&mut self, results: &[StepResult], dt: f64) -> Result<(), SimError> {
        if results.len() != self.bodies.len() {
            return Err(SimError::LengthMismatch {
                expected: self.bodies.len(),
                got: results.len(),
            });
        }
        if let Some(index) = results.iter().position(|r| !is_finite(&r.x) || !is_finite(&r.v)) {
            return Err(SimError::NonFiniteState { index });
        }

        for (b, r) in self.bodies.iter_mut().zip(results.iter()) {
            b.x = r.x;
            b.v = r.v;
        }
        self.t += dt;
        Ok(())
    }

    /// Σ m v
    pub fn total_momentum(&self) -> NVec3 {
        self.bodies.iter().fold(NVec3::zeros(), |p, b| p + b.m * b.v)
    }

    /// Σ ½ m |v|²
    pub fn kinetic_energy(&self) -> f64 {
        self.bodies.iter().map(|b| 0.5 * b.m * b.v.norm_squared()).sum()
    }

    /// −Σ_{i<j} G m_i m_j / r_ij, coincident pairs skipped like in the force loop
    #[allow(non_snake_case)]
    pub fn potential_energy(&self, G: f64) -> f64 {
        let n = self.bodies.len();
        let mut u = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                let r = (self.bodies[j].x - self.bodies[i].x).norm();
                if r > 0.0 {
                    u -= G * self.bodies[i].m * self.bodies[j].m / r;
                }
            }
        }
        u
    }

    #[allow(non_snake_case)]
    pub fn total_energy(&self, G: f64) -> f64 {
        self.kinetic_energy() + self.potential_energy(G)
    }
}

pub(crate) fn is_finite(v: &NVec3) -> bool {
    v.iter().all(|c| c.is_finite())
}
