//! Per-step avatar movement.
//!
//! Steering blends the current velocity toward a desired one instead of
//! setting it outright, which is what gives avatars their drift toward the
//! cursor. Friction then applies on top, and a second time while settling
//! near the target.

use crate::config::AvatarConfig;
use crate::entity::{Avatar, TrailSample};
use crate::world::WorldBorder;
use glam::DVec2;
use std::f64::consts::{PI, TAU};

/// Advance `avatar` one step toward `target`.
pub fn step(avatar: &mut Avatar, target: DVec2, border: &WorldBorder, config: &AvatarConfig) {
    let delta = target - avatar.position;
    let distance = delta.length();
    avatar.target_angle = delta.y.atan2(delta.x);

    if distance > config.near_target {
        let desired = delta / distance * avatar.speed;
        avatar.velocity += (desired - avatar.velocity) * avatar.acceleration;

        clamp_speed(avatar);
        avatar.movement_intensity = (avatar.velocity.length() / avatar.max_speed).min(1.0);
    } else {
        avatar.velocity *= avatar.friction;
        avatar.movement_intensity *= config.settle_decay;
    }
    avatar.velocity *= avatar.friction;

    let turn = shortest_arc(avatar.angle, avatar.target_angle);
    avatar.angle = wrap_angle(avatar.angle + turn * config.turn_smoothing);

    avatar.position += avatar.velocity;
    contain(avatar, border, config);
    update_trail(avatar, config);
}

/// Re-establish the speed, bounds and trail invariants after the radius
/// changed outside of a movement step.
pub fn refit(avatar: &mut Avatar, border: &WorldBorder, config: &AvatarConfig) {
    clamp_speed(avatar);
    avatar.movement_intensity = avatar.movement_intensity.min(1.0);
    contain(avatar, border, config);
    trim_trail(avatar, config);
}

/// Decay an avatar that received no move-intent this tick. It keeps its
/// position; only velocity, intensity and the trail wind down.
pub fn idle(avatar: &mut Avatar, config: &AvatarConfig) {
    avatar.velocity *= avatar.friction;
    avatar.movement_intensity *= config.settle_decay;
    trim_trail(avatar, config);
}

/// Scale velocity down uniformly to `max_speed`.
#[inline]
fn clamp_speed(avatar: &mut Avatar) {
    let current = avatar.velocity.length();
    if current > avatar.max_speed {
        avatar.velocity *= avatar.max_speed / current;
    }
}

/// Soft boundary: clamp to the margin and bounce back toward the interior
/// with a fraction of the speed.
pub fn contain(avatar: &mut Avatar, border: &WorldBorder, config: &AvatarConfig) {
    let margin = border.margin(avatar.size, config.margin_multiplier);
    let max = DVec2::new(border.width, border.height) - margin;

    if avatar.position.x < margin.x {
        avatar.position.x = margin.x;
        avatar.velocity.x = avatar.velocity.x.abs() * config.bounce;
    } else if avatar.position.x > max.x {
        avatar.position.x = max.x;
        avatar.velocity.x = -avatar.velocity.x.abs() * config.bounce;
    }

    if avatar.position.y < margin.y {
        avatar.position.y = margin.y;
        avatar.velocity.y = avatar.velocity.y.abs() * config.bounce;
    } else if avatar.position.y > max.y {
        avatar.position.y = max.y;
        avatar.velocity.y = -avatar.velocity.y.abs() * config.bounce;
    }
}

fn update_trail(avatar: &mut Avatar, config: &AvatarConfig) {
    let speed = avatar.velocity.length();
    if speed > config.trail_min_speed {
        let tail = avatar.position - avatar.velocity / speed * avatar.size;
        avatar.trail.push_back(TrailSample { position: tail, opacity: 1.0 });
    }
    trim_trail(avatar, config);
}

/// Drop the oldest samples beyond the speed-dependent cap and re-ramp
/// opacity so the oldest sample is the faintest.
fn trim_trail(avatar: &mut Avatar, config: &AvatarConfig) {
    let cap = config.trail_cap(avatar.velocity.length());
    while avatar.trail.len() > cap {
        avatar.trail.pop_front();
    }

    let len = avatar.trail.len() as f64;
    for (i, sample) in avatar.trail.iter_mut().enumerate() {
        sample.opacity = (i + 1) as f64 / len;
    }
}

/// Signed angular distance from `from` to `to`, in (-PI, PI].
#[inline]
pub fn shortest_arc(from: f64, to: f64) -> f64 {
    wrap_angle(to - from)
}

/// Wrap an angle into (-PI, PI].
#[inline]
pub fn wrap_angle(angle: f64) -> f64 {
    PI - (PI - angle).rem_euclid(TAU)
}
