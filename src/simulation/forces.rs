//! Pairwise Newtonian gravity for the n-body engine
//!
//! Forces (not accelerations) are accumulated here so that Newton's third
//! law holds exactly: every unordered pair is evaluated once and applied
//! equal and opposite. The integrator divides by mass afterwards.

use crate::simulation::states::{Body, NVec3};

/// Gravitational constant used when nothing else is configured
pub const G_SI: f64 = 6.67430e-11;

/// Direct n^2 Newtonian gravity with optional softening
///
/// With `eps2 == 0` this is the plain inverse-square law. Bodies sharing a
/// position exert no force on each other: the pair is skipped instead of
/// dividing by zero.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonianGravity {
    pub G: f64, // gravitational constant
    pub eps2: f64, // softening, added to distance^2
}

impl Default for NewtonianGravity {
    fn default() -> Self {
        Self { G: G_SI, eps2: 0.0 }
    }
}

impl NewtonianGravity {
    #[allow(non_snake_case)]
    pub fn new(G: f64) -> Self {
        Self { G, eps2: 0.0 }
    }

    pub fn with_softening(mut self, eps2: f64) -> Self {
        self.eps2 = eps2;
        self
    }

    /// Force on `a` due to `b`. Zero when the pair coincides
    pub fn pair_force(&self, a: &Body, b: &Body) -> NVec3 {
        self.pair_term(a.x, a.m, b.x, b.m).unwrap_or_else(NVec3::zeros)
    }

    /// Fill `out[i]` with the net force on body `i`.
    ///
    /// `out` is zeroed first. Returns the `(i, j)` pairs that were skipped
    /// because the bodies coincide.
    pub fn accumulate_forces(&self, bodies: &[Body], out: &mut [NVec3]) -> Vec<(usize, usize)> {
        for f in out.iter_mut() {
            *f = NVec3::zeros();
        }

        let n = bodies.len();
        let mut skipped = Vec::new();

        // Loop over each unordered pair (i, j) with i < j
        for i in 0..n {
            let bi = &bodies[i];

            for j in (i + 1)..n {
                let bj = &bodies[j];

                match self.pair_term(bi.x, bi.m, bj.x, bj.m) {
                    // i is pulled along +r (toward j), j along -r
                    Some(f) => {
                        out[i] += f;
                        out[j] -= f;
                    }
                    None => skipped.push((i, j)),
                }
            }
        }

        skipped
    }

    /// Force on body i from body j, `None` if the softened distance is zero
    fn pair_term(&self, xi: NVec3, mi: f64, xj: NVec3, mj: f64) -> Option<NVec3> {
        // r is the displacement vector from i to j
        let r = xj - xi;

        // d2 = |r|^2 + softening
        let d2 = r.dot(&r) + self.eps2;
        if d2 == 0.0 {
            return None;
        }

        // |F| = G mi mj / d2, direction r / |r_soft|
        //   => F = G mi mj r / |r_soft|^3
        let inv_d = d2.sqrt().recip();
        let coef = self.G * (mi * mj) * (inv_d * inv_d * inv_d);

        let f = coef * r;
        // underflow of d2 for nearly-coincident points can still blow up
        if f.iter().all(|c| c.is_finite()) {
            Some(f)
        } else {
            None
        }
    }
}
