//! Food particles and the fixed-size pool that holds them.

use super::body::{random_emoji, Body};
use crate::world::WorldBorder;
use glam::DVec2;
use protocol::packets::FoodState;
use rand::Rng;
use std::f64::consts::TAU;

/// A food particle that can be eaten by avatars.
#[derive(Debug, Clone)]
pub struct FoodItem {
    pub position: DVec2,
    pub size: f64,
    /// Idle animation offset, cosmetic only.
    pub phase: f64,
    pub emoji: &'static str,
}

impl FoodItem {
    /// Create a food item at a random position.
    pub fn random(border: &WorldBorder, size: f64) -> Self {
        Self {
            position: border.random_position(DVec2::ZERO),
            size,
            phase: rand::rng().random_range(0.0..TAU),
            emoji: random_emoji(),
        }
    }

    /// Public state sent to clients.
    pub fn state(&self) -> FoodState {
        FoodState {
            x: self.position.x,
            y: self.position.y,
            size: self.size,
            emoji: self.emoji.to_string(),
            phase: self.phase,
        }
    }
}

impl Body for FoodItem {
    fn position(&self) -> DVec2 {
        self.position
    }

    fn radius(&self) -> f64 {
        self.size
    }
}

/// Constant-size pool of food items. Slots are replaced in place, so the
/// pool length never changes after construction.
#[derive(Debug, Clone)]
pub struct FoodPool {
    items: Vec<FoodItem>,
    size: f64,
}

impl FoodPool {
    /// Fill a new pool with `count` randomly placed items.
    pub fn new(count: usize, size: f64, border: &WorldBorder) -> Self {
        let items = (0..count).map(|_| FoodItem::random(border, size)).collect();
        Self { items, size }
    }

    /// Replace the item in `slot` with a freshly randomized one.
    /// Out-of-range slots are ignored.
    pub fn respawn_one(&mut self, slot: usize, border: &WorldBorder) -> Option<&FoodItem> {
        let item = self.items.get_mut(slot)?;
        *item = FoodItem::random(border, self.size);
        Some(item)
    }

    #[inline]
    pub fn items(&self) -> &[FoodItem] {
        &self.items
    }

    #[inline]
    pub fn get(&self, slot: usize) -> Option<&FoodItem> {
        self.items.get(slot)
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, slot: usize, position: DVec2) {
        if let Some(item) = self.items.get_mut(slot) {
            item.position = position;
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
