//! Common entity behaviour and cosmetic palettes.

use glam::DVec2;
use protocol::Color;
use rand::Rng;

/// Glyphs handed out to avatars and food.
pub const EMOJIS: [&str; 30] = [
    "😀", "😎", "🤖", "👽", "🦄", "🐉", "🔥", "⚡", "🌟", "💎",
    "🍕", "🍔", "🍟", "🍩", "🍰", "🍭", "🎮", "🎯", "🎪", "🎨",
    "🚀", "🛸", "🚗", "🏎️", "🚲", "🛴", "🦋", "🐸", "🐙", "🦑",
];

/// Pick a random glyph.
#[inline]
pub fn random_emoji() -> &'static str {
    EMOJIS[rand::rng().random_range(0..EMOJIS.len())]
}

/// Generate a random color.
#[inline]
pub fn random_color() -> Color {
    let mut rng = rand::rng();
    Color::new(
        rng.random_range(50..=255),
        rng.random_range(50..=255),
        rng.random_range(50..=255),
    )
}

/// Anything that occupies a circle in the world.
pub trait Body {
    /// Center in world coordinates.
    fn position(&self) -> DVec2;

    /// Collision radius.
    fn radius(&self) -> f64;

    /// Squared distance between the centers of two bodies.
    #[inline]
    fn distance_squared_to(&self, other: &impl Body) -> f64 {
        self.position().distance_squared(other.position())
    }
}
