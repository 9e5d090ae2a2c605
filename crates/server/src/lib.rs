//! Authoritative simulation server for a grow-by-consuming arena.

pub mod collision;
pub mod config;
pub mod entity;
pub mod movement;
pub mod server;
pub mod world;

// Re-export commonly used types
pub use collision::EatEvent;
pub use config::Config;
pub use server::{run, serve, Frame, GameState, PendingBroadcasts};
pub use world::{World, WorldBorder};
