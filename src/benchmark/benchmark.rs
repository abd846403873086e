use std::time::{Duration, Instant};

use crate::configuration::config::StepMode;
use crate::simulation::driver::FrameDriver;
use crate::simulation::engine::Engine;
use crate::simulation::errors::SimError;
use crate::simulation::forces::NewtonianGravity;
use crate::simulation::integrator::Integrator;
use crate::simulation::states::{Body, BodyRegistry, NVec3};

/// Time one `step` call for increasing body counts
pub fn bench_step() -> Result<(), SimError> {
    let ns = [3, 50, 200, 400, 800, 1600, 3200];
    let integrator = make_integrator();

    for n in ns {
        let bodies = make_bodies(n);
        // small n finishes in microseconds, average over more calls
        let steps = if n <= 200 { 100 } else { 3 };

        // Warm up
        integrator.step(&bodies, 0.001)?;

        let t0 = Instant::now();
        for _ in 0..steps {
            integrator.step(&bodies, 0.001)?;
        }
        let per_step = t0.elapsed().as_secs_f64() / steps as f64;

        println!("N = {n:5}, step = {per_step:10.6} s");
    }
    Ok(())
}

/// Compare a frame loop run inline against the same loop through the worker.
/// Each offloaded frame is waited on, so this measures the channel round trip
pub fn bench_worker() -> Result<(), SimError> {
    let ns = [3, 50, 400, 1600];
    let frames = 20;

    for n in ns {
        let mut per_mode = Vec::with_capacity(2);

        for mode in [StepMode::Inline, StepMode::Offloaded] {
            let engine = Engine { mode, ..Engine::default() };
            let mut driver = FrameDriver::new(BodyRegistry::new(make_bodies(n)), make_integrator(), engine)?;

            let t0 = Instant::now();
            for _ in 0..frames {
                driver.frame(0.001)?;
                driver.finish(Duration::from_secs(10))?;
            }
            per_mode.push(t0.elapsed().as_secs_f64() / frames as f64);
        }

        println!("N = {n:5}, inline = {:10.6} s, offloaded = {:10.6} s", per_mode[0], per_mode[1]);
    }
    Ok(())
}

/// Step cost over a range of n
/// Paste output directly into excel to graph
pub fn bench_step_curve() -> Result<(), SimError> {
    println!("N,step_ms");
    let integrator = make_integrator();

    // Steps of 200 to give smoother graph
    for n in (200..=6400).step_by(200) {
        let steps = if n <= 800 { 5 } else { 1 };
        let bodies = make_bodies(n);

        let t0 = Instant::now();
        for _ in 0..steps {
            integrator.step(&bodies, 0.001)?;
        }
        let ms = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;

        println!("{},{:.6}", n, ms);
    }
    Ok(())
}

/// Deterministic cloud of `n` unit masses, no rand needed
fn make_bodies(n: usize) -> Vec<Body> {
    (0..n)
        .map(|i| {
            let i_f = i as f64;
            let x = NVec3::new(
                (i_f * 0.37).sin() * 5.0,
                (i_f * 0.13).cos() * 5.0,
                (i_f * 0.07).sin() * 5.0,
            );
            Body::new(x, NVec3::zeros(), 1.0)
        })
        .collect()
}

fn make_integrator() -> Integrator {
    Integrator::new(NewtonianGravity { G: 0.1, eps2: 1e-4 })
}
