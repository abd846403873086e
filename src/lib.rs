pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::states::{Body, BodyRegistry, StepResult, NVec3};
pub use simulation::errors::SimError;
pub use simulation::forces::{NewtonianGravity, G_SI};
pub use simulation::integrator::{step, Integrator};
pub use simulation::worker::{PhysicsWorker, Submitted};
pub use simulation::driver::{FrameDriver, FrameOutcome};
pub use simulation::engine::Engine;
pub use simulation::params::Parameters;
pub use simulation::scenario::Scenario;

pub use configuration::config::{ConfigError, EngineConfig, ParametersConfig, BodyConfig, ScenarioConfig, StepMode};

pub use benchmark::benchmark::{bench_step, bench_worker, bench_step_curve};
