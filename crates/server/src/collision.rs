//! Collision detection and resolution.
//!
//! One pass per tick over every avatar in join order:
//! - Food consumption (growth, score, in-place food respawn)
//! - Avatar-eats-avatar under the strict size-ratio rule
//!
//! Each ordered pair is checked independently, so an avatar that eats early
//! in the pass can itself be eaten later in the same pass.

use crate::config::Config;
use crate::entity::{Avatar, Body, FoodPool};
use crate::movement;
use crate::world::{World, WorldBorder};

/// An avatar consumed another one.
#[derive(Debug, Clone, PartialEq)]
pub struct EatEvent {
    pub eater_id: u32,
    pub eater: String,
    pub eaten_id: u32,
    pub eaten: String,
    /// Glyph the eater took over from its victim.
    pub eater_emoji: &'static str,
}

/// Whether a body of `eater_radius` at squared distance `distance_squared`
/// touches a food item of `food_radius`.
#[inline]
pub fn touches_food(distance_squared: f64, eater_radius: f64, food_radius: f64) -> bool {
    let reach = eater_radius + food_radius;
    distance_squared < reach * reach
}

/// Whether `eater` may consume `prey`: the prey's center lies strictly inside
/// the eater and the eater is strictly more than `size_ratio` times larger.
#[inline]
pub fn can_eat(eater: &Avatar, prey: &Avatar, size_ratio: f64) -> bool {
    let r = eater.radius();
    eater.distance_squared_to(prey) < r * r && r > prey.radius() * size_ratio
}

/// Run the collision pass and return every eat event in the order it
/// happened.
pub fn resolve(world: &mut World, config: &Config) -> Vec<EatEvent> {
    let World { border, avatars, food, .. } = world;
    let mut events = Vec::new();

    for i in 0..avatars.len() {
        eat_food(&mut avatars[i], food, border, config);

        for j in 0..avatars.len() {
            if i == j {
                continue;
            }
            let (eater, prey) = pair_mut(avatars, i, j);
            if can_eat(eater, prey, config.eat.size_ratio) {
                events.push(consume(eater, prey, border, config));
            }
        }
    }

    events
}

/// Let `avatar` eat every food item it touches. Each eaten slot is
/// replaced before the next slot is examined.
fn eat_food(avatar: &mut Avatar, food: &mut FoodPool, border: &WorldBorder, config: &Config) {
    let mut grew = false;
    for slot in 0..food.len() {
        let Some(item) = food.get(slot) else { continue };
        if !touches_food(avatar.distance_squared_to(item), avatar.size, item.size) {
            continue;
        }
        avatar.grow(config.food.growth, &config.avatar);
        avatar.score += config.food.score;
        food.respawn_one(slot, border);
        grew = true;
    }
    if grew {
        movement::refit(avatar, border, &config.avatar);
    }
}

/// Apply an eat: the eater absorbs part of the prey's radius, all of its
/// score plus the bonus, and its glyph; the prey respawns.
fn consume(eater: &mut Avatar, prey: &mut Avatar, border: &WorldBorder, config: &Config) -> EatEvent {
    eater.grow(prey.size * config.eat.growth_factor, &config.avatar);
    eater.score += prey.score + config.eat.score_bonus;
    eater.emoji = prey.emoji;
    movement::refit(eater, border, &config.avatar);

    prey.respawn(border, &config.avatar);

    EatEvent {
        eater_id: eater.id,
        eater: eater.name.clone(),
        eaten_id: prey.id,
        eaten: prey.name.clone(),
        eater_emoji: eater.emoji,
    }
}

/// Borrow two distinct elements mutably.
fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
