//! Value messages exchanged with the physics worker.
//!
//! Field names follow the wire schema
//! `{ bodies: [{ position: {x,y,z}, velocity: {x,y,z}, mass }], deltaTime }`
//! so the same types can be serialized if the worker ever lives out of process.

use serde::{Deserialize, Serialize};

use super::errors::SimError;
use super::states::{Body, NVec3, StepResult};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Xyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<NVec3> for Xyz {
    fn from(v: NVec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

impl From<Xyz> for NVec3 {
    fn from(p: Xyz) -> Self {
        NVec3::new(p.x, p.y, p.z)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BodyMessage {
    pub position: Xyz,
    pub velocity: Xyz,
    pub mass: f64,
}

impl From<&Body> for BodyMessage {
    fn from(b: &Body) -> Self {
        Self { position: b.x.into(), velocity: b.v.into(), mass: b.m }
    }
}

impl From<&BodyMessage> for Body {
    fn from(msg: &BodyMessage) -> Self {
        Body::new(msg.position.into(), msg.velocity.into(), msg.mass)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StepRequest {
    pub seq: u64,
    pub bodies: Vec<BodyMessage>,
    pub delta_time: f64,
}

impl StepRequest {
    pub fn from_snapshot(seq: u64, bodies: &[Body], delta_time: f64) -> Self {
        Self {
            seq,
            bodies: bodies.iter().map(BodyMessage::from).collect(),
            delta_time,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ResultMessage {
    pub position: Xyz,
    pub velocity: Xyz,
}

impl From<&StepResult> for ResultMessage {
    fn from(r: &StepResult) -> Self {
        Self { position: r.x.into(), velocity: r.v.into() }
    }
}

impl From<&ResultMessage> for StepResult {
    fn from(msg: &ResultMessage) -> Self {
        StepResult { x: msg.position.into(), v: msg.velocity.into() }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StepResponse {
    pub seq: u64,
    pub outcome: Result<Vec<ResultMessage>, SimError>,
}
