//! Server configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub avatar: AvatarConfig,
    #[serde(default)]
    pub food: FoodConfig,
    #[serde(default)]
    pub eat: EatConfig,
}

impl Config {
    /// Load configuration from `config.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    /// Load configuration from `path`, writing the defaults there if it
    /// does not exist yet.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }
}

/// Server networking and scheduling settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Simulation ticks per second.
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
}

impl ServerConfig {
    /// Time between two ticks.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate.max(1)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            tick_rate: default_tick_rate(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_tick_rate() -> u32 {
    60
}

/// World dimensions.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorldConfig {
    #[serde(default = "default_world_size")]
    pub width: f64,
    #[serde(default = "default_world_size")]
    pub height: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: default_world_size(),
            height: default_world_size(),
        }
    }
}

fn default_world_size() -> f64 {
    3000.0
}

/// Avatar movement and sizing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AvatarConfig {
    /// Spawn radius, also the minimum radius.
    #[serde(default = "default_base_size")]
    pub base_size: f64,
    /// Desired speed of a freshly spawned avatar.
    #[serde(default = "default_base_speed")]
    pub base_speed: f64,
    /// Speed cap of a freshly spawned avatar.
    #[serde(default = "default_base_max_speed")]
    pub base_max_speed: f64,
    /// Floor for the desired speed of large avatars.
    #[serde(default = "default_min_speed")]
    pub min_speed: f64,
    /// Floor for the speed cap of large avatars.
    #[serde(default = "default_min_max_speed")]
    pub min_max_speed: f64,
    /// Desired speed lost per unit of radius.
    #[serde(default = "default_speed_falloff")]
    pub speed_falloff: f64,
    /// Speed cap lost per unit of radius.
    #[serde(default = "default_max_speed_falloff")]
    pub max_speed_falloff: f64,
    /// Fraction of the gap to the desired velocity closed each step.
    #[serde(default = "default_acceleration")]
    pub acceleration: f64,
    /// Multiplicative velocity decay.
    #[serde(default = "default_friction")]
    pub friction: f64,
    /// Distance under which an avatar settles instead of steering.
    #[serde(default = "default_near_target")]
    pub near_target: f64,
    /// Boundary margin as a multiple of the radius.
    #[serde(default = "default_margin_multiplier")]
    pub margin_multiplier: f64,
    /// Fraction of velocity kept when bouncing off the boundary.
    #[serde(default = "default_bounce")]
    pub bounce: f64,
    /// Movement-intensity decay while settling.
    #[serde(default = "default_settle_decay")]
    pub settle_decay: f64,
    /// Fraction of the angular gap closed each step.
    #[serde(default = "default_turn_smoothing")]
    pub turn_smoothing: f64,
    /// Minimum speed that leaves a trail sample.
    #[serde(default = "default_trail_min_speed")]
    pub trail_min_speed: f64,
    #[serde(default = "default_trail_base_length")]
    pub trail_base_length: f64,
    #[serde(default = "default_trail_speed_length")]
    pub trail_speed_length: f64,
}

impl AvatarConfig {
    /// Desired speed for an avatar of the given radius.
    #[inline]
    pub fn speed_for(&self, radius: f64) -> f64 {
        (self.base_speed - radius * self.speed_falloff).max(self.min_speed)
    }

    /// Speed cap for an avatar of the given radius.
    #[inline]
    pub fn max_speed_for(&self, radius: f64) -> f64 {
        (self.base_max_speed - radius * self.max_speed_falloff).max(self.min_max_speed)
    }

    /// Longest trail allowed at the given speed.
    #[inline]
    pub fn trail_cap(&self, speed: f64) -> usize {
        (self.trail_base_length + self.trail_speed_length * speed).floor() as usize
    }
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            base_size: default_base_size(),
            base_speed: default_base_speed(),
            base_max_speed: default_base_max_speed(),
            min_speed: default_min_speed(),
            min_max_speed: default_min_max_speed(),
            speed_falloff: default_speed_falloff(),
            max_speed_falloff: default_max_speed_falloff(),
            acceleration: default_acceleration(),
            friction: default_friction(),
            near_target: default_near_target(),
            margin_multiplier: default_margin_multiplier(),
            bounce: default_bounce(),
            settle_decay: default_settle_decay(),
            turn_smoothing: default_turn_smoothing(),
            trail_min_speed: default_trail_min_speed(),
            trail_base_length: default_trail_base_length(),
            trail_speed_length: default_trail_speed_length(),
        }
    }
}

fn default_base_size() -> f64 {
    20.0
}
fn default_base_speed() -> f64 {
    3.0
}
fn default_base_max_speed() -> f64 {
    5.0
}
fn default_min_speed() -> f64 {
    1.0
}
fn default_min_max_speed() -> f64 {
    2.0
}
fn default_speed_falloff() -> f64 {
    0.02
}
fn default_max_speed_falloff() -> f64 {
    0.03
}
fn default_acceleration() -> f64 {
    0.1
}
fn default_friction() -> f64 {
    0.95
}
fn default_near_target() -> f64 {
    10.0
}
fn default_margin_multiplier() -> f64 {
    2.0
}
fn default_bounce() -> f64 {
    0.5
}
fn default_settle_decay() -> f64 {
    0.9
}
fn default_turn_smoothing() -> f64 {
    0.1
}
fn default_trail_min_speed() -> f64 {
    0.5
}
fn default_trail_base_length() -> f64 {
    10.0
}
fn default_trail_speed_length() -> f64 {
    2.0
}

/// Food pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FoodConfig {
    /// Pool size, constant for the lifetime of the world.
    #[serde(default = "default_food_count")]
    pub count: usize,
    #[serde(default = "default_food_size")]
    pub size: f64,
    /// Radius gained per food item.
    #[serde(default = "default_food_growth")]
    pub growth: f64,
    /// Score gained per food item.
    #[serde(default = "default_food_score")]
    pub score: u64,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            count: default_food_count(),
            size: default_food_size(),
            growth: default_food_growth(),
            score: default_food_score(),
        }
    }
}

fn default_food_count() -> usize {
    200
}
fn default_food_size() -> f64 {
    5.0
}
fn default_food_growth() -> f64 {
    0.8
}
fn default_food_score() -> u64 {
    10
}

/// Avatar-eats-avatar rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EatConfig {
    /// Eater radius must be strictly greater than this multiple of the victim's.
    #[serde(default = "default_size_ratio")]
    pub size_ratio: f64,
    /// Score awarded on top of the victim's score.
    #[serde(default = "default_score_bonus")]
    pub score_bonus: u64,
    /// Fraction of the victim's radius the eater gains.
    #[serde(default = "default_growth_factor")]
    pub growth_factor: f64,
}

impl Default for EatConfig {
    fn default() -> Self {
        Self {
            size_ratio: default_size_ratio(),
            score_bonus: default_score_bonus(),
            growth_factor: default_growth_factor(),
        }
    }
}

fn default_size_ratio() -> f64 {
    1.2
}
fn default_score_bonus() -> u64 {
    100
}
fn default_growth_factor() -> f64 {
    0.5
}
