use gravsim::{FrameDriver, FrameOutcome, Scenario, ScenarioConfig};
use gravsim::{bench_step, bench_worker, bench_step_curve};

use anyhow::{Context, Result};
use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Headless N-body gravity simulation")]
struct Args {
    /// Scenario file under `scenarios/`
    #[arg(short, default_value = "sun_earth_moon.yaml")]
    file_name: String,

    /// Ignore the file and run the built-in Sun/Earth/Moon scene
    #[arg(long)]
    builtin: bool,

    /// Run the timing benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,

    /// With --bench, print the step-cost curve as CSV
    #[arg(long, requires = "bench")]
    curve: bool,
}

// load here to keep main clean
fn load_scenario(args: &Args) -> Result<Scenario> {
    if args.builtin {
        return Ok(Scenario::solar_system());
    }

    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(&args.file_name);
    let scenario_cfg = ScenarioConfig::from_path(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    Ok(Scenario::build_scenario(scenario_cfg)?)
}

fn run(scenario: Scenario) -> Result<()> {
    let Scenario { engine, parameters, registry } = scenario;
    let frames = parameters.frames();
    let report_every = engine.report_every;
    let timeout = engine.timeout;
    let e0 = registry.total_energy(parameters.G);

    let mut driver = FrameDriver::new(registry, parameters.integrator(), engine)?;

    for frame in 1..=frames {
        let outcome = driver.frame(parameters.h0)?;

        if report_every > 0 && frame % report_every == 0 {
            let reg = driver.registry();
            log::info!("frame {frame}/{frames} t = {:.3} ({outcome:?})", reg.t);
            for (i, b) in reg.bodies.iter().enumerate() {
                log::debug!("  {:>8} x = [{:.4}, {:.4}, {:.4}]", b.label(i), b.x.x, b.x.y, b.x.z);
            }
        } else if outcome == FrameOutcome::Stalled {
            log::warn!("frame {frame}: physics stalled");
        }
    }
    driver.finish(timeout)?;

    let stalls = driver.stalls();
    let reg = driver.into_registry();
    let e1 = reg.total_energy(parameters.G);

    println!("t = {:.4} after {frames} frames ({stalls} stalled)", reg.t);
    for (i, b) in reg.bodies.iter().enumerate() {
        println!(
            "{:>8}  x = [{:12.5}, {:12.5}, {:12.5}]  v = [{:10.5}, {:10.5}, {:10.5}]",
            b.label(i), b.x.x, b.x.y, b.x.z, b.v.x, b.v.y, b.v.z
        );
    }
    if e0 != 0.0 {
        println!("relative energy drift = {:.3e}", (e1 - e0) / e0.abs());
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.bench {
        if args.curve {
            bench_step_curve()?;
        } else {
            bench_step()?;
            bench_worker()?;
        }
        return Ok(());
    }

    let scenario = load_scenario(&args)?;
    run(scenario)
}
