//! World state management.
//!
//! Holds every avatar (in join order) and the food pool.

use crate::config::Config;
use crate::entity::{Avatar, FoodItem, FoodPool};
use glam::DVec2;
use rand::Rng;
use std::collections::HashMap;

/// World bounds, spanning `0..=width` and `0..=height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBorder {
    pub width: f64,
    pub height: f64,
}

impl WorldBorder {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Soft-boundary margin for a body of the given radius. Each axis is
    /// capped at half the world so the allowed band never inverts.
    #[inline]
    pub fn margin(&self, radius: f64, multiplier: f64) -> DVec2 {
        let m = radius * multiplier;
        DVec2::new(m.min(self.width / 2.0), m.min(self.height / 2.0))
    }

    /// Get a random position at least `margin` away from every edge.
    #[inline]
    pub fn random_position(&self, margin: DVec2) -> DVec2 {
        let mut rng = rand::rng();
        DVec2::new(
            rng.random_range(margin.x..=self.width - margin.x),
            rng.random_range(margin.y..=self.height - margin.y),
        )
    }
}

/// The arena: avatars, food and bounds.
#[derive(Debug)]
pub struct World {
    pub border: WorldBorder,
    /// Avatars in join order.
    pub(crate) avatars: Vec<Avatar>,
    /// Connection id -> index into `avatars`.
    pub(crate) avatar_pos: HashMap<u32, usize>,
    pub(crate) food: FoodPool,
}

impl World {
    /// Create a world and fill its food pool.
    pub fn new(config: &Config) -> Self {
        let border = WorldBorder::new(config.world.width, config.world.height);
        Self {
            food: FoodPool::new(config.food.count, config.food.size, &border),
            avatars: Vec::with_capacity(64),
            avatar_pos: HashMap::with_capacity(64),
            border,
        }
    }

    /// Create an avatar for `id`. A second join on the same id replaces the
    /// old avatar in its original join slot.
    pub fn add_avatar(&mut self, id: u32, name: String, config: &Config) -> &Avatar {
        let avatar = Avatar::spawn(id, name, &self.border, &config.avatar);
        let pos = match self.avatar_pos.get(&id) {
            Some(&pos) => {
                self.avatars[pos] = avatar;
                pos
            }
            None => {
                let pos = self.avatars.len();
                self.avatars.push(avatar);
                self.avatar_pos.insert(id, pos);
                pos
            }
        };
        &self.avatars[pos]
    }

    /// Remove the avatar for `id`. Absent ids are a no-op.
    pub fn remove_avatar(&mut self, id: u32) -> Option<Avatar> {
        let pos = self.avatar_pos.remove(&id)?;
        let avatar = self.avatars.remove(pos);
        // Shift the indices of everyone who joined later.
        for (i, later) in self.avatars.iter().enumerate().skip(pos) {
            self.avatar_pos.insert(later.id, i);
        }
        Some(avatar)
    }

    /// Get an avatar by connection id.
    #[inline]
    pub fn avatar(&self, id: u32) -> Option<&Avatar> {
        self.avatar_pos.get(&id).map(|&pos| &self.avatars[pos])
    }

    /// Get a mutable avatar by connection id.
    #[inline]
    pub fn avatar_mut(&mut self, id: u32) -> Option<&mut Avatar> {
        self.avatar_pos.get(&id).map(|&pos| &mut self.avatars[pos])
    }

    /// All avatars, in join order.
    #[inline]
    pub fn avatars(&self) -> &[Avatar] {
        &self.avatars
    }

    /// All food items.
    #[inline]
    pub fn food(&self) -> &[FoodItem] {
        self.food.items()
    }

    #[cfg(test)]
    pub(crate) fn food_pool_mut(&mut self) -> &mut FoodPool {
        &mut self.food
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(&Config::default())
    }

    #[test]
    fn test_new_world_fills_food() {
        let config = Config::default();
        let world = World::new(&config);
        assert_eq!(world.food().len(), config.food.count);
        assert_eq!(world.border, WorldBorder::new(3000.0, 3000.0));
        assert!(world.avatars().is_empty());
    }

    #[test]
    fn test_add_and_lookup() {
        let config = Config::default();
        let mut world = world();
        let avatar = world.add_avatar(7, "seven".to_string(), &config);
        assert_eq!(avatar.id, 7);
        assert_eq!(world.avatar(7).map(|a| a.name.as_str()), Some("seven"));
        assert!(world.avatar(8).is_none());
    }

    #[test]
    fn test_remove_keeps_join_order() {
        let config = Config::default();
        let mut world = world();
        for id in 1..=4 {
            world.add_avatar(id, format!("p{id}"), &config);
        }

        assert!(world.remove_avatar(2).is_some());

        let ids: Vec<u32> = world.avatars().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
        assert_eq!(world.avatar(4).map(|a| a.id), Some(4));
        assert_eq!(world.avatar(3).map(|a| a.id), Some(3));
    }

    #[test]
    fn test_remove_twice_is_noop() {
        let config = Config::default();
        let mut world = world();
        world.add_avatar(1, "a".to_string(), &config);
        world.add_avatar(2, "b".to_string(), &config);

        assert!(world.remove_avatar(1).is_some());
        assert!(world.remove_avatar(1).is_none());
        assert_eq!(world.avatars().len(), 1);
        assert!(world.avatar(2).is_some());
    }

    #[test]
    fn test_rejoin_replaces_in_place() {
        let config = Config::default();
        let mut world = world();
        world.add_avatar(1, "a".to_string(), &config);
        world.add_avatar(2, "b".to_string(), &config);
        world.avatar_mut(1).unwrap().score = 99;

        world.add_avatar(1, "again".to_string(), &config);

        let names: Vec<&str> = world.avatars().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["again", "b"]);
        assert_eq!(world.avatar(1).unwrap().score, 0);
    }

    #[test]
    fn test_margin_never_inverts() {
        let border = WorldBorder::new(100.0, 60.0);
        let margin = border.margin(40.0, 2.0);
        assert_eq!(margin, DVec2::new(50.0, 30.0));
        assert_eq!(border.random_position(margin), DVec2::new(50.0, 30.0));
    }
}
