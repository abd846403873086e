//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - per-frame step size and end time,
//! - softening and gravitational constant (`eps2`, `G`)

use super::forces::{NewtonianGravity, G_SI};
use super::integrator::Integrator;

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub t_end: f64, // time end
    pub h0: f64, // step size (one frame)
    pub eps2: f64, // softening
    pub G: f64, // gravitational constant
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            t_end: 10.0,
            h0: 1.0 / 60.0,
            eps2: 0.0,
            G: G_SI,
        }
    }
}

impl Parameters {
    /// Number of whole frames needed to reach `t_end`
    pub fn frames(&self) -> u64 {
        if self.h0 <= 0.0 || self.t_end <= 0.0 {
            return 0;
        }
        // tolerate t_end / h0 landing a hair above an integer
        (self.t_end / self.h0 - 1e-9).ceil().max(0.0) as u64
    }

    pub fn integrator(&self) -> Integrator {
        Integrator::new(NewtonianGravity::new(self.G).with_softening(self.eps2))
    }
}
