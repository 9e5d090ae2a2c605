//! Shared protocol crate for the arena server.
//!
//! This crate contains:
//! - Client -> server message parsing
//! - Server -> client message definitions and encoding
//! - Shared types (Color, trail samples, entity states)

mod error;
pub mod packets;

pub use error::ProtocolError;
use serde::{Deserialize, Serialize};

/// RGB color used for avatars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}
