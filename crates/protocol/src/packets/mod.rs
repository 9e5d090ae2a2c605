//! Message definitions for the arena protocol.
//!
//! Every frame is a JSON object tagged by `"type"`. Client messages are
//! parsed from text frames, server messages are encoded once per tick and
//! fanned out to every connection.

mod client;
mod server;

pub use client::*;
pub use server::*;
