//! Participant-controlled avatar.

use super::body::{random_color, random_emoji, Body};
use crate::config::AvatarConfig;
use crate::world::WorldBorder;
use glam::DVec2;
use protocol::packets::{AvatarState, TrailPoint};
use protocol::Color;
use std::collections::VecDeque;

/// One point of the fading motion trail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSample {
    pub position: DVec2,
    /// 0..=1, newest sample is fully opaque.
    pub opacity: f64,
}

/// An avatar, keyed by its connection id.
#[derive(Debug, Clone)]
pub struct Avatar {
    /// Connection id of the owning participant.
    pub id: u32,
    pub name: String,
    pub position: DVec2,
    pub velocity: DVec2,
    /// Radius, never below `AvatarConfig::base_size`.
    pub size: f64,
    pub emoji: &'static str,
    pub color: Color,
    pub score: u64,
    /// Magnitude of the desired velocity when steering.
    pub speed: f64,
    /// Hard cap on the velocity magnitude.
    pub max_speed: f64,
    pub acceleration: f64,
    pub friction: f64,
    /// Heading toward the last steering target (radians).
    pub target_angle: f64,
    /// Smoothed facing (radians).
    pub angle: f64,
    pub trail: VecDeque<TrailSample>,
    /// Current speed relative to `max_speed`, in 0..=1.
    pub movement_intensity: f64,
    /// Set when a move-intent was applied since the last tick.
    pub steered: bool,
}

impl Avatar {
    /// Create a fresh avatar at a random position inside the boundary margin.
    pub fn spawn(id: u32, name: String, border: &WorldBorder, config: &AvatarConfig) -> Self {
        let mut avatar = Self {
            id,
            name,
            position: DVec2::ZERO,
            velocity: DVec2::ZERO,
            size: config.base_size,
            emoji: random_emoji(),
            color: random_color(),
            score: 0,
            speed: 0.0,
            max_speed: 0.0,
            acceleration: config.acceleration,
            friction: config.friction,
            target_angle: 0.0,
            angle: 0.0,
            trail: VecDeque::new(),
            movement_intensity: 0.0,
            steered: false,
        };
        avatar.respawn(border, config);
        avatar
    }

    /// Reset to a fresh spawn state after being eaten. Identity, name and
    /// color survive.
    pub fn respawn(&mut self, border: &WorldBorder, config: &AvatarConfig) {
        self.size = config.base_size;
        self.position = border.random_position(border.margin(self.size, config.margin_multiplier));
        self.velocity = DVec2::ZERO;
        self.emoji = random_emoji();
        self.score = 0;
        self.acceleration = config.acceleration;
        self.friction = config.friction;
        self.target_angle = 0.0;
        self.angle = 0.0;
        self.trail.clear();
        self.movement_intensity = 0.0;
        self.steered = false;
        self.speed = config.base_speed;
        self.max_speed = config.base_max_speed;
    }

    /// Increase the radius and recompute the speed caps.
    #[inline]
    pub fn grow(&mut self, amount: f64, config: &AvatarConfig) {
        self.size += amount;
        self.update_speed_caps(config);
    }

    /// Derive `speed` and `max_speed` from the current radius. Fresh avatars
    /// start at the base values instead.
    #[inline]
    pub fn update_speed_caps(&mut self, config: &AvatarConfig) {
        self.speed = config.speed_for(self.size);
        self.max_speed = config.max_speed_for(self.size);
    }

    /// Public state sent to clients.
    pub fn state(&self) -> AvatarState {
        AvatarState {
            id: self.id,
            name: self.name.clone(),
            x: self.position.x,
            y: self.position.y,
            vx: self.velocity.x,
            vy: self.velocity.y,
            size: self.size,
            emoji: self.emoji.to_string(),
            color: self.color,
            score: self.score,
            speed: self.speed,
            max_speed: self.max_speed,
            acceleration: self.acceleration,
            friction: self.friction,
            target_angle: self.target_angle,
            angle: self.angle,
            trail: self
                .trail
                .iter()
                .map(|s| TrailPoint { x: s.position.x, y: s.position.y, opacity: s.opacity })
                .collect(),
            movement_intensity: self.movement_intensity,
        }
    }
}

impl Body for Avatar {
    fn position(&self) -> DVec2 {
        self.position
    }

    fn radius(&self) -> f64 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EMOJIS;

    fn border() -> WorldBorder {
        WorldBorder::new(3000.0, 3000.0)
    }

    #[test]
    fn test_spawn_defaults() {
        let config = AvatarConfig::default();
        let avatar = Avatar::spawn(1, "blob".to_string(), &border(), &config);

        assert_eq!(avatar.size, config.base_size);
        assert_eq!(avatar.score, 0);
        assert_eq!(avatar.velocity, DVec2::ZERO);
        assert_eq!(avatar.speed, 3.0);
        assert_eq!(avatar.max_speed, 5.0);
        assert!(!avatar.steered);
        assert!(avatar.trail.is_empty());
        assert!(EMOJIS.contains(&avatar.emoji));
        assert!(avatar.color.r >= 50 && avatar.color.g >= 50 && avatar.color.b >= 50);

        let margin = config.base_size * config.margin_multiplier;
        assert!(avatar.position.x >= margin && avatar.position.x <= 3000.0 - margin);
        assert!(avatar.position.y >= margin && avatar.position.y <= 3000.0 - margin);
    }

    #[test]
    fn test_respawn_resets_progress() {
        let config = AvatarConfig::default();
        let mut avatar = Avatar::spawn(1, "blob".to_string(), &border(), &config);
        avatar.grow(30.0, &config);
        avatar.score = 500;
        avatar.velocity = DVec2::new(2.0, 1.0);
        avatar.movement_intensity = 0.7;
        avatar.trail.push_back(TrailSample { position: DVec2::ONE, opacity: 1.0 });

        avatar.respawn(&border(), &config);

        assert_eq!(avatar.id, 1);
        assert_eq!(avatar.name, "blob");
        assert_eq!(avatar.size, config.base_size);
        assert_eq!(avatar.score, 0);
        assert_eq!(avatar.velocity, DVec2::ZERO);
        assert_eq!(avatar.movement_intensity, 0.0);
        assert!(avatar.trail.is_empty());
        assert_eq!(avatar.speed, config.base_speed);
        assert_eq!(avatar.max_speed, config.base_max_speed);
    }

    #[test]
    fn test_grow_slows_down() {
        let config = AvatarConfig::default();
        let mut avatar = Avatar::spawn(1, "blob".to_string(), &border(), &config);
        let (speed, max_speed) = (avatar.speed, avatar.max_speed);
        avatar.grow(10.0, &config);
        assert_eq!(avatar.size, config.base_size + 10.0);
        assert!(avatar.speed < speed);
        assert!(avatar.max_speed < max_speed);
        assert_eq!(avatar.speed, config.speed_for(30.0));
        assert_eq!(avatar.max_speed, config.max_speed_for(30.0));
    }
}
