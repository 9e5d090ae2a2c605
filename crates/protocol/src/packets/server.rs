//! Server -> Client message building.

use crate::{Color, ProtocolError};
use serde::Serialize;

/// One sample of an avatar's motion trail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrailPoint {
    pub x: f64,
    pub y: f64,
    pub opacity: f64,
}

/// Full public state of one avatar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarState {
    pub id: u32,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub size: f64,
    pub emoji: String,
    pub color: Color,
    pub score: u64,
    pub speed: f64,
    pub max_speed: f64,
    pub acceleration: f64,
    pub friction: f64,
    pub target_angle: f64,
    pub angle: f64,
    pub trail: Vec<TrailPoint>,
    pub movement_intensity: f64,
}

/// Public state of one food particle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodState {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub emoji: String,
    pub phase: f64,
}

/// Server message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Sent only to the joining connection.
    PlayerJoined { player: AvatarState },
    /// Full world snapshot, sent every tick.
    #[serde(rename_all = "camelCase")]
    GameState {
        players: Vec<AvatarState>,
        food: Vec<FoodState>,
        world_width: f64,
        world_height: f64,
    },
    /// One avatar consumed another.
    #[serde(rename_all = "camelCase")]
    PlayerEaten {
        eater: String,
        eaten: String,
        eater_emoji: String,
    },
}

impl ServerMessage {
    /// Encode the message as a JSON text frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}
