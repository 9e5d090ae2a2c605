//! Arena entities.
//!
//! Avatars are steered by participants; food items are static particles
//! kept in a fixed-size pool.

mod avatar;
mod body;
mod food;

pub use avatar::{Avatar, TrailSample};
pub use body::{random_color, random_emoji, Body, EMOJIS};
pub use food::{FoodItem, FoodPool};
