//! Offloaded stepping on a background thread
//!
//! The worker owns a copy of the `Integrator` and nothing else. Requests and
//! responses are immutable value messages over `mpsc` channels, so the
//! caller's registry is never shared with the worker thread.
//!
//! At most one request is ever queued or running. A second `submit` while
//! the first is outstanding is refused with [`Submitted::Busy`]. An
//! abandoned request still occupies the worker until its response has been
//! drained, so `submit` keeps refusing until then.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::errors::SimError;
use super::integrator::Integrator;
use super::messages::{ResultMessage, StepRequest, StepResponse};
use super::states::{Body, StepResult};

/// Outcome of [`PhysicsWorker::submit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitted {
    Accepted(u64), // sequence number of the new request
    Busy, // a request is in flight or still draining, nothing was sent
}

/// Bookkeeping for the outstanding request
#[derive(Debug, Clone, Copy)]
pub struct InFlight {
    pub seq: u64,
    pub dt: f64,
    expected: usize,
    sent_at: Instant,
}

/// A response matched to its request and converted back to runtime types
#[derive(Debug, Clone)]
pub struct Collected {
    pub seq: u64,
    pub dt: f64,
    pub results: Vec<StepResult>,
}

pub struct PhysicsWorker {
    tx: Option<Sender<StepRequest>>,
    rx: Receiver<StepResponse>,
    handle: Option<JoinHandle<()>>,
    next_seq: u64,
    in_flight: Option<InFlight>,
    draining: Option<u64>, // abandoned seq the worker has not answered yet
}

impl PhysicsWorker {
    pub fn spawn(integrator: Integrator) -> Result<Self, SimError> {
        let (req_tx, req_rx) = mpsc::channel::<StepRequest>();
        let (resp_tx, resp_rx) = mpsc::channel::<StepResponse>();

        let handle = thread::Builder::new()
            .name("physics-worker".into())
            .spawn(move || worker_loop(integrator, req_rx, resp_tx))
            .map_err(|e| SimError::WorkerSpawn(e.to_string()))?;

        log::debug!("physics worker started");

        Ok(Self::from_parts(req_tx, resp_rx, Some(handle)))
    }

    fn from_parts(tx: Sender<StepRequest>, rx: Receiver<StepResponse>, handle: Option<JoinHandle<()>>) -> Self {
        Self {
            tx: Some(tx),
            rx,
            handle,
            next_seq: 1,
            in_flight: None,
            draining: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// An abandoned request is still being computed
    pub fn is_draining(&self) -> bool {
        self.draining.is_some()
    }

    pub fn in_flight(&self) -> Option<InFlight> {
        self.in_flight
    }

    /// How long the outstanding request has been waiting
    pub fn in_flight_age(&self) -> Option<Duration> {
        self.in_flight.map(|f| f.sent_at.elapsed())
    }

    /// Send a snapshot of `bodies` to be advanced by `dt`
    pub fn submit(&mut self, bodies: &[Body], dt: f64) -> Result<Submitted, SimError> {
        let tx = self.tx.as_ref().ok_or(SimError::WorkerDisconnected)?;
        if self.in_flight.is_some() || self.draining.is_some() {
            return Ok(Submitted::Busy);
        }

        let seq = self.next_seq;
        tx.send(StepRequest::from_snapshot(seq, bodies, dt))
            .map_err(|_| SimError::WorkerDisconnected)?;

        self.next_seq += 1;
        self.in_flight = Some(InFlight {
            seq,
            dt,
            expected: bodies.len(),
            sent_at: Instant::now(),
        });
        Ok(Submitted::Accepted(seq))
    }

    /// Non-blocking. `Ok(None)` if the in-flight request has not resolved yet.
    /// Also drains the response of an abandoned request
    pub fn try_collect(&mut self) -> Result<Option<Collected>, SimError> {
        loop {
            match self.rx.try_recv() {
                Ok(resp) => {
                    if let Some(c) = self.accept(resp)? {
                        return Ok(Some(c));
                    }
                }
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Disconnected) => return Err(SimError::WorkerDisconnected),
            }
        }
    }

    /// Block up to `timeout` for the in-flight request, draining an abandoned
    /// one first if needed. `Ok(None)` once nothing is outstanding.
    /// On timeout the request stays in flight.
    pub fn collect_timeout(&mut self, timeout: Duration) -> Result<Option<Collected>, SimError> {
        let deadline = Instant::now() + timeout;

        loop {
            let seq = match (self.in_flight, self.draining) {
                (Some(f), _) => f.seq,
                (None, Some(seq)) => seq,
                (None, None) => return Ok(None),
            };

            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(resp) => {
                    if let Some(c) = self.accept(resp)? {
                        return Ok(Some(c));
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    return Err(SimError::WorkerTimeout { seq, waited_ms: timeout.as_millis() });
                }
                Err(RecvTimeoutError::Disconnected) => return Err(SimError::WorkerDisconnected),
            }
        }
    }

    /// Give up on the outstanding request. Its response is dropped when it
    /// arrives, and no new request is accepted before that
    pub fn abandon(&mut self) -> Option<InFlight> {
        let f = self.in_flight.take()?;
        log::debug!("abandoning step request {}", f.seq);
        self.draining = Some(f.seq);
        Some(f)
    }

    /// Close the request channel and wait for the thread to exit
    pub fn shutdown(&mut self) {
        self.tx = None;
        self.in_flight = None;
        self.draining = None;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("physics worker panicked");
            }
        }
    }

    /// Match a response to the in-flight request
    fn accept(&mut self, resp: StepResponse) -> Result<Option<Collected>, SimError> {
        if self.draining == Some(resp.seq) {
            log::debug!("drained abandoned step response {}", resp.seq);
            self.draining = None;
            return Ok(None);
        }

        let f = match self.in_flight {
            Some(f) if f.seq == resp.seq => f,
            _ => {
                log::debug!("discarding stale step response {}", resp.seq);
                return Ok(None);
            }
        };
        self.in_flight = None;

        let msgs = resp.outcome?;
        if msgs.len() != f.expected {
            return Err(SimError::LengthMismatch { expected: f.expected, got: msgs.len() });
        }

        Ok(Some(Collected {
            seq: f.seq,
            dt: f.dt,
            results: msgs.iter().map(StepResult::from).collect(),
        }))
    }
}

impl Drop for PhysicsWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(integrator: Integrator, requests: Receiver<StepRequest>, responses: Sender<StepResponse>) {
    for req in requests {
        let bodies: Vec<Body> = req.bodies.iter().map(Body::from).collect();
        let outcome = integrator
            .step(&bodies, req.delta_time)
            .map(|rs| rs.iter().map(ResultMessage::from).collect());

        if responses.send(StepResponse { seq: req.seq, outcome }).is_err() {
            break;
        }
    }
    log::debug!("physics worker stopped");
}
