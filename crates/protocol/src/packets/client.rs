//! Client -> Server message parsing.

use crate::ProtocolError;
use serde::Deserialize;

/// Parsed client message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Join the arena with a display name.
    JoinGame { name: String },
    /// Steer toward a world-space point.
    #[serde(rename_all = "camelCase")]
    PlayerMove { mouse_x: f64, mouse_y: f64 },
}

impl ClientMessage {
    /// Parse a client message from a text frame.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a client message from a binary frame. Binary frames are only
    /// accepted when they hold UTF-8 JSON.
    pub fn parse_bytes(data: &[u8]) -> Result<Self, ProtocolError> {
        match std::str::from_utf8(data) {
            Ok(text) => Self::parse(text),
            Err(_) => Err(ProtocolError::UnexpectedBinary(data.len())),
        }
    }
}
