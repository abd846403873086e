use approx::assert_abs_diff_eq;

use gravsim::simulation::integrator::validate;
use gravsim::{step, Body, BodyRegistry, Integrator, NewtonianGravity, NVec3, SimError, StepResult, G_SI};

/// Build a simple 2-body system separated along x-axis
pub fn two_body(dist: f64, m1: f64, m2: f64) -> Vec<Body> {
    vec![
        Body::new([-dist / 2.0, 0.0, 0.0].into(), NVec3::zeros(), m1),
        Body::new([dist / 2.0, 0.0, 0.0].into(), NVec3::zeros(), m2),
    ]
}

/// Deterministic, non-coincident cloud of `n` bodies with some velocity
pub fn cloud(n: usize) -> Vec<Body> {
    (0..n)
        .map(|i| {
            let i_f = i as f64;
            let x = NVec3::new((i_f * 0.37).sin() * 5.0, (i_f * 0.13).cos() * 5.0, i_f * 0.5);
            let v = NVec3::new(0.01 * i_f, -0.02, 0.0);
            Body::new(x, v, 1.0 + i_f)
        })
        .collect()
}

/// G large enough that forces are visible at unit scale
pub fn test_gravity() -> NewtonianGravity {
    NewtonianGravity::new(0.1)
}

fn momentum(bodies: &[Body]) -> NVec3 {
    bodies.iter().fold(NVec3::zeros(), |p, b| p + b.m * b.v)
}

fn momentum_of(bodies: &[Body], results: &[StepResult]) -> NVec3 {
    bodies.iter().zip(results).fold(NVec3::zeros(), |p, (b, r)| p + b.m * r.v)
}

fn advance(integrator: &Integrator, bodies: &mut [Body], dt: f64, steps: usize) {
    for _ in 0..steps {
        let results = integrator.step(bodies, dt).unwrap();
        for (b, r) in bodies.iter_mut().zip(results) {
            b.x = r.x;
            b.v = r.v;
        }
    }
}

// ==================================================================================
// Gravity tests
// ==================================================================================

#[test]
fn gravity_newton_third_law() {
    let bodies = two_body(1.0, 2.0, 3.0);
    let g = test_gravity();

    let f_ab = g.pair_force(&bodies[0], &bodies[1]);
    let f_ba = g.pair_force(&bodies[1], &bodies[0]);
    assert_eq!(f_ab, -f_ba);

    let mut net = vec![NVec3::zeros(); 2];
    g.accumulate_forces(&bodies, &mut net);
    assert_eq!(net[0], -net[1]);
    assert_eq!(net[0], f_ab);
}

#[test]
fn gravity_magnitude_matches_inverse_square_formula() {
    let bodies = two_body(2.0, 3.0, 5.0);
    let g = test_gravity();

    let f = g.pair_force(&bodies[0], &bodies[1]);
    assert_abs_diff_eq!(f.norm(), 0.1 * 3.0 * 5.0 / 4.0, epsilon = 1e-12);
}

#[test]
fn gravity_points_toward_other_body() {
    let bodies = two_body(2.0, 1.0, 1.0);
    let f = test_gravity().pair_force(&bodies[0], &bodies[1]);

    let dx = bodies[1].x - bodies[0].x;
    assert!(f.dot(&dx) > 0.0, "Force is not toward second body");
}

#[test]
fn gravity_inverse_square_law() {
    let g = test_gravity();
    let r = two_body(1.0, 1.0, 1.0);
    let r2 = two_body(2.0, 1.0, 1.0);

    let ratio = g.pair_force(&r[0], &r[1]).norm() / g.pair_force(&r2[0], &r2[1]).norm();
    assert_abs_diff_eq!(ratio, 4.0, epsilon = 1e-9);
}

#[test]
fn gravity_softening_prevents_blowup() {
    let g = test_gravity().with_softening(0.1);
    let bodies = two_body(1e-9, 1.0, 1.0);

    let f = g.pair_force(&bodies[0], &bodies[1]);
    assert!(f.norm() < 1e-6, "Softening failed; force too large");
}

// ==================================================================================
// Integrator tests
// ==================================================================================

#[test]
fn single_body_moves_in_a_straight_line() {
    let body = Body::new([1.0, 2.0, 3.0].into(), [0.5, -1.0, 2.0].into(), 7.0);
    let dt = 0.25;

    let out = step(&[body.clone()], dt).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].v, body.v);
    assert_eq!(out[0].x, body.x + body.v * dt);
}

#[test]
fn zero_dt_is_identity() {
    let bodies = cloud(7);
    let out = Integrator::new(test_gravity()).step(&bodies, 0.0).unwrap();

    for (b, r) in bodies.iter().zip(&out) {
        assert_eq!(r.x, b.x);
        assert_eq!(r.v, b.v);
    }
}

#[test]
fn results_keep_length_and_order() {
    let integrator = Integrator::new(test_gravity());

    for n in [1, 2, 3, 50] {
        let bodies = cloud(n);
        let dt = 1e-3;
        let out = integrator.step(&bodies, dt).unwrap();
        assert_eq!(out.len(), n);

        // result i stays next to body i, far from every other body
        for (i, r) in out.iter().enumerate() {
            let nearest = bodies
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| (a.x - r.x).norm().total_cmp(&(b.x - r.x).norm()))
                .map(|(j, _)| j)
                .unwrap();
            assert_eq!(nearest, i, "n = {n}: result {i} closest to body {nearest}");
        }
    }
}

#[test]
fn step_uses_semi_implicit_euler() {
    let bodies = two_body(2.0, 1.0, 1.0);
    let g = test_gravity();
    let dt = 0.1;

    let out = Integrator::new(g).step(&bodies, dt).unwrap();
    let a0 = g.pair_force(&bodies[0], &bodies[1]) / bodies[0].m;
    let v0 = bodies[0].v + a0 * dt;

    assert_eq!(out[0].v, v0);
    assert_eq!(out[0].x, bodies[0].x + v0 * dt);
}

#[test]
fn step_reads_only_the_pre_step_snapshot() {
    // symmetric system: any in-place update would break the mirror symmetry
    let bodies = vec![
        Body::new([-1.0, 0.0, 0.0].into(), [0.0, 0.3, 0.0].into(), 2.0),
        Body::new([1.0, 0.0, 0.0].into(), [0.0, -0.3, 0.0].into(), 2.0),
    ];
    let out = Integrator::new(test_gravity()).step(&bodies, 0.5).unwrap();

    assert_eq!(out[0].x, -out[1].x);
    assert_eq!(out[0].v, -out[1].v);
}

#[test]
fn momentum_drift_shrinks_with_dt() {
    let integrator = Integrator::new(test_gravity());
    let start = cloud(5);
    let p0 = momentum(&start);

    let mut drifts = Vec::new();
    for dt in [1e-2, 1e-3] {
        let mut bodies = start.clone();
        let steps = (0.1 / dt) as usize;
        advance(&integrator, &mut bodies, dt, steps);
        drifts.push((momentum(&bodies) - p0).norm());
    }

    assert!(drifts[0] < 1e-9, "momentum drift too large: {}", drifts[0]);
    assert!(drifts[1] <= drifts[0] + 1e-12, "drift grew when dt shrank: {drifts:?}");
}

#[test]
fn single_step_conserves_momentum() {
    let bodies = cloud(10);
    let out = Integrator::new(test_gravity()).step(&bodies, 0.01).unwrap();

    let dp = momentum_of(&bodies, &out) - momentum(&bodies);
    assert!(dp.norm() < 1e-12, "momentum changed by {dp:?}");
}

/// Satellite on a circular orbit around a heavy star comes back after one period
#[test]
fn circular_orbit_returns_after_one_period() {
    let m_star = 3.33e13;
    let r = 100.0;
    let dt = 0.01;

    let v = (G_SI * m_star / r).sqrt();
    let period = 2.0 * std::f64::consts::PI * r / v;
    let steps = (period / dt).round() as usize;

    let mut bodies = vec![
        Body::new(NVec3::zeros(), NVec3::zeros(), m_star),
        Body::new([r, 0.0, 0.0].into(), [0.0, v, 0.0].into(), 1.0),
    ];
    let start = bodies[1].x;

    advance(&Integrator::default(), &mut bodies, dt, steps);

    let err = (bodies[1].x - start).norm();
    assert!(err < 0.1, "orbit did not close: error {err}");
    assert_abs_diff_eq!(bodies[1].x.norm(), r, epsilon = 0.1);
}

#[test]
fn coincident_bodies_exert_no_force() {
    let p = NVec3::new(3.0, -1.0, 2.0);
    let bodies = vec![
        Body::new(p, [1.0, 0.0, 0.0].into(), 1.0),
        Body::new(p, [0.0, 1.0, 0.0].into(), 5.0),
    ];
    let dt = 0.1;

    let out = step(&bodies, dt).unwrap();
    for (b, r) in bodies.iter().zip(&out) {
        assert!(r.x.iter().chain(r.v.iter()).all(|c| c.is_finite()));
        assert_eq!(r.v, b.v);
        assert_eq!(r.x, b.x + b.v * dt);
    }
}

#[test]
fn coincident_pair_does_not_hide_other_forces() {
    let p = NVec3::zeros();
    let bodies = vec![
        Body::new(p, NVec3::zeros(), 1.0),
        Body::new(p, NVec3::zeros(), 1.0),
        Body::new([2.0, 0.0, 0.0].into(), NVec3::zeros(), 1.0),
    ];
    let g = test_gravity();

    let mut net = vec![NVec3::zeros(); 3];
    let skipped = g.accumulate_forces(&bodies, &mut net);

    assert_eq!(skipped, vec![(0, 1)]);
    assert!(net[0].x > 0.0 && net[1].x > 0.0 && net[2].x < 0.0);
    assert_abs_diff_eq!(net[0].x + net[1].x + net[2].x, 0.0, epsilon = 1e-15);
}

#[test]
fn huge_time_step_reports_overflow_instead_of_infinity() {
    let bodies = vec![
        Body::new(NVec3::zeros(), [1e10, 0.0, 0.0].into(), 1.0),
        Body::new([1.0, 0.0, 0.0].into(), NVec3::zeros(), 1.0),
    ];

    let err = step(&bodies, 1e300).unwrap_err();
    assert_eq!(err, SimError::NonFiniteResult { index: 0 });
    assert!(err.is_input_error());
}

#[test]
fn rejects_invalid_input() {
    let good = cloud(2);

    assert_eq!(step(&[], 0.1), Err(SimError::EmptySystem));
    assert!(matches!(step(&good, f64::NAN), Err(SimError::NonFiniteTimeStep(_))));
    assert!(matches!(step(&good, f64::INFINITY), Err(SimError::NonFiniteTimeStep(_))));

    let mut zero_mass = good.clone();
    zero_mass[1].m = 0.0;
    assert_eq!(step(&zero_mass, 0.1), Err(SimError::NonPositiveMass { index: 1, mass: 0.0 }));

    let mut negative_mass = good.clone();
    negative_mass[0].m = -3.0;
    assert!(matches!(step(&negative_mass, 0.1), Err(SimError::NonPositiveMass { index: 0, .. })));

    let mut nan_pos = good.clone();
    nan_pos[1].x.y = f64::NAN;
    assert_eq!(validate(&nan_pos, 0.1), Err(SimError::NonFiniteState { index: 1 }));

    let err = step(&zero_mass, 0.1).unwrap_err();
    assert!(err.is_input_error());
    assert!(!err.is_channel_failure());
}

// ==================================================================================
// Registry tests
// ==================================================================================

#[test]
fn registry_apply_is_atomic() {
    let mut reg = BodyRegistry::new(cloud(3));
    let before = reg.bodies.clone();

    let short = vec![StepResult { x: NVec3::zeros(), v: NVec3::zeros() }; 2];
    assert_eq!(reg.apply(&short, 0.1), Err(SimError::LengthMismatch { expected: 3, got: 2 }));
    assert_eq!(reg.bodies, before);
    assert_eq!(reg.t, 0.0);

    let mut bad = vec![StepResult { x: NVec3::zeros(), v: NVec3::zeros() }; 3];
    bad[2].v.z = f64::INFINITY;
    assert_eq!(reg.apply(&bad, 0.1), Err(SimError::NonFiniteState { index: 2 }));
    assert_eq!(reg.bodies, before);
}

#[test]
fn registry_apply_writes_every_body_and_time() {
    let mut reg = BodyRegistry::new(cloud(3));
    let integrator = Integrator::new(test_gravity());

    let results = integrator.step(reg.snapshot(), 0.1).unwrap();
    reg.apply(&results, 0.1).unwrap();

    assert_abs_diff_eq!(reg.t, 0.1);
    for (b, r) in reg.bodies.iter().zip(&results) {
        assert_eq!(b.x, r.x);
        assert_eq!(b.v, r.v);
    }
}

#[test]
fn registry_energy_of_bound_pair_is_negative() {
    let reg = BodyRegistry::new(two_body(2.0, 3.0, 5.0));

    assert_eq!(reg.kinetic_energy(), 0.0);
    assert_abs_diff_eq!(reg.potential_energy(0.1), -0.1 * 15.0 / 2.0, epsilon = 1e-12);
    assert!(reg.total_energy(0.1) < 0.0);
    assert_eq!(reg.total_momentum(), NVec3::zeros());
}
