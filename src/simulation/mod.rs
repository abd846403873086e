pub mod states;
pub mod errors;
pub mod params;
pub mod engine;
pub mod forces;
pub mod integrator;
pub mod messages;
pub mod worker;
pub mod driver;
pub mod scenario;
