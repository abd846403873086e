//! Per-frame caller of the integrator
//!
//! Owns the `BodyRegistry` and advances it once per frame, either on the
//! calling thread or through a `PhysicsWorker`. Results are always applied
//! as a whole step; a failed or stalled step leaves the registry untouched.
//!
//! Offloaded policy:
//! - one request in flight; frames that arrive while it is outstanding add
//!   their `dt` to a pending budget that rides on the next request
//! - a request older than `engine.timeout` is reported as `Stalled` and the
//!   visual state stays frozen; it is not resent, so a slow worker never
//!   builds a backlog, and its result is applied whenever it lands
//! - a failed step hands its `dt` back to the pending budget, so a caller
//!   that keeps going does not lose simulated time

use std::time::Duration;

use crate::configuration::config::StepMode;

use super::engine::Engine;
use super::errors::SimError;
use super::integrator::Integrator;
use super::states::BodyRegistry;
use super::worker::{PhysicsWorker, Submitted};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    Applied { t: f64 }, // a step landed, registry is now at time t
    Pending, // request outstanding, nothing applied this frame
    Stalled, // request older than the timeout, state frozen
}

enum Stepper {
    Inline(Integrator),
    Offloaded(PhysicsWorker),
}

pub struct FrameDriver {
    registry: BodyRegistry,
    stepper: Stepper,
    engine: Engine,
    pending_dt: f64,
    frames: u64,
    stalls: u64,
    stalled_seq: Option<u64>, // request already counted as stalled
}

impl FrameDriver {
    pub fn new(registry: BodyRegistry, integrator: Integrator, engine: Engine) -> Result<Self, SimError> {
        let stepper = match engine.mode {
            StepMode::Inline => Stepper::Inline(integrator),
            StepMode::Offloaded => Stepper::Offloaded(PhysicsWorker::spawn(integrator)?),
        };
        log::info!("frame driver: {:?} mode, {} bodies", engine.mode, registry.len());

        Ok(Self {
            registry,
            stepper,
            engine,
            pending_dt: 0.0,
            frames: 0,
            stalls: 0,
            stalled_seq: None,
        })
    }

    pub fn registry(&self) -> &BodyRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> BodyRegistry {
        self.registry
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn stalls(&self) -> u64 {
        self.stalls
    }

    /// Simulated time accepted by the driver but not yet applied
    pub fn pending_dt(&self) -> f64 {
        self.pending_dt
    }

    /// Advance one frame of `dt`
    pub fn frame(&mut self, dt: f64) -> Result<FrameOutcome, SimError> {
        if !dt.is_finite() {
            return Err(SimError::NonFiniteTimeStep(dt));
        }
        self.frames += 1;

        let worker = match &mut self.stepper {
            Stepper::Inline(integrator) => {
                let results = integrator.step(self.registry.snapshot(), dt)?;
                self.registry.apply(&results, dt)?;
                return Ok(FrameOutcome::Applied { t: self.registry.t });
            }
            Stepper::Offloaded(worker) => worker,
        };

        let mut outcome = FrameOutcome::Pending;

        if worker.is_busy() {
            let in_flight_dt = worker.in_flight().map_or(0.0, |f| f.dt);
            match worker.try_collect() {
                Ok(Some(c)) => {
                    if let Err(e) = self.registry.apply(&c.results, c.dt) {
                        self.pending_dt += c.dt + dt;
                        return Err(e);
                    }
                    outcome = FrameOutcome::Applied { t: self.registry.t };
                }
                Ok(None) => {}
                Err(e) => {
                    // a resolved request no longer carries its dt
                    if !worker.is_busy() {
                        self.pending_dt += in_flight_dt;
                    }
                    self.pending_dt += dt;
                    return Err(e);
                }
            }
        }

        if let Some(f) = worker.in_flight() {
            self.pending_dt += dt;

            let overdue = worker.in_flight_age().is_some_and(|age| age > self.engine.timeout);
            if overdue {
                if self.stalled_seq != Some(f.seq) {
                    log::warn!("step request {} unanswered after {:?}, freezing frames", f.seq, self.engine.timeout);
                    self.stalled_seq = Some(f.seq);
                    self.stalls += 1;
                }
                return Ok(FrameOutcome::Stalled);
            }
            return Ok(outcome);
        }

        let budget = self.pending_dt + dt;
        match worker.submit(self.registry.snapshot(), budget)? {
            Submitted::Accepted(seq) => {
                log::trace!("submitted step request {seq} with dt {budget}");
                self.pending_dt = 0.0;
            }
            Submitted::Busy => self.pending_dt += dt,
        }

        Ok(outcome)
    }

    /// Block until every accepted frame has been applied.
    /// No-op in inline mode
    pub fn finish(&mut self, timeout: Duration) -> Result<(), SimError> {
        let Stepper::Offloaded(worker) = &mut self.stepper else {
            return Ok(());
        };

        loop {
            if !worker.is_busy() {
                if self.pending_dt == 0.0 {
                    return Ok(());
                }
                if let Submitted::Accepted(_) = worker.submit(self.registry.snapshot(), self.pending_dt)? {
                    self.pending_dt = 0.0;
                }
            }

            let in_flight_dt = worker.in_flight().map_or(0.0, |f| f.dt);
            match worker.collect_timeout(timeout) {
                Ok(Some(c)) => {
                    if let Err(e) = self.registry.apply(&c.results, c.dt) {
                        self.pending_dt += c.dt;
                        return Err(e);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    if !worker.is_busy() {
                        self.pending_dt += in_flight_dt;
                    }
                    return Err(e);
                }
            }
        }
    }
}
