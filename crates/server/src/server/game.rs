//! Game state and main loop.

use crate::collision::{self, EatEvent};
use crate::config::Config;
use crate::movement;
use crate::world::World;
use glam::DVec2;
use protocol::packets::{AvatarState, ClientMessage, ServerMessage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::Frame;

/// Ticks between two statistics log lines.
const STATS_EVERY: u64 = 600;

/// Pending broadcasts to send after releasing the game state lock.
#[derive(Debug)]
pub struct PendingBroadcasts {
    /// Eat events produced by this tick, in resolution order.
    pub eaten: Vec<EatEvent>,
    /// World snapshot taken after the collision pass.
    pub snapshot: ServerMessage,
}

impl PendingBroadcasts {
    /// Encode every message into frames, eat notifications first.
    pub fn into_frames(self) -> Vec<Frame> {
        self.eaten
            .into_iter()
            .map(eaten_message)
            .chain(std::iter::once(self.snapshot))
            .filter_map(|msg| match msg.encode() {
                Ok(text) => Some(Frame::from(text)),
                Err(e) => {
                    warn!("Failed to encode broadcast: {}", e);
                    None
                }
            })
            .collect()
    }
}

fn eaten_message(event: EatEvent) -> ServerMessage {
    ServerMessage::PlayerEaten {
        eater: event.eater,
        eaten: event.eaten,
        eater_emoji: event.eater_emoji.to_string(),
    }
}

/// Main game state. Owns the world; every mutation goes through here.
pub struct GameState {
    pub config: Config,
    pub world: World,
    pub tick_count: u64,

    // ID counter for connections
    next_connection_id: u32,

    // Outbound frame channel
    frame_tx: broadcast::Sender<Frame>,

    // Average tick duration in milliseconds (exponential moving average).
    pub update_time_avg: f64,
}

impl GameState {
    /// Create a new game state with a freshly populated world.
    pub fn new(config: &Config, frame_tx: broadcast::Sender<Frame>) -> Self {
        let world = World::new(config);
        info!(
            "World initialized: {}x{}, {} food",
            world.border.width,
            world.border.height,
            world.food().len()
        );

        Self {
            config: config.clone(),
            world,
            tick_count: 0,
            next_connection_id: 1,
            frame_tx,
            update_time_avg: 0.0,
        }
    }

    /// Allocate an id for a new connection.
    pub fn next_connection_id(&mut self) -> u32 {
        let id = self.next_connection_id;
        self.next_connection_id = self.next_connection_id.wrapping_add(1).max(1);
        id
    }

    /// Subscribe to outbound frames.
    pub fn subscribe(&self) -> broadcast::Receiver<Frame> {
        self.frame_tx.subscribe()
    }

    /// Create the avatar for a connection and return its full state.
    pub fn join(&mut self, connection_id: u32, name: String) -> AvatarState {
        let avatar = self.world.add_avatar(connection_id, name, &self.config);
        info!("Player {} joined as {:?} {}", connection_id, avatar.name, avatar.emoji);
        avatar.state()
    }

    /// Steer a connection's avatar one step toward `target`.
    /// Returns false for connections without an avatar.
    pub fn move_intent(&mut self, connection_id: u32, target: DVec2) -> bool {
        let border = self.world.border;
        let Some(avatar) = self.world.avatar_mut(connection_id) else {
            return false;
        };
        movement::step(avatar, target, &border, &self.config.avatar);
        avatar.steered = true;
        true
    }

    /// Remove a connection's avatar. Safe to call more than once.
    pub fn leave(&mut self, connection_id: u32) -> bool {
        match self.world.remove_avatar(connection_id) {
            Some(avatar) => {
                info!("Player {} ({:?}) left", connection_id, avatar.name);
                true
            }
            None => false,
        }
    }

    /// Apply a client message. Returns a reply meant only for the sender.
    pub fn handle_message(&mut self, connection_id: u32, message: ClientMessage) -> Option<ServerMessage> {
        match message {
            ClientMessage::JoinGame { name } => {
                let player = self.join(connection_id, name);
                Some(ServerMessage::PlayerJoined { player })
            }
            ClientMessage::PlayerMove { mouse_x, mouse_y } => {
                self.move_intent(connection_id, DVec2::new(mouse_x, mouse_y));
                None
            }
        }
    }

    /// Full snapshot of the world.
    pub fn snapshot(&self) -> ServerMessage {
        ServerMessage::GameState {
            players: self.world.avatars().iter().map(|a| a.state()).collect(),
            food: self.world.food().iter().map(|f| f.state()).collect(),
            world_width: self.world.border.width,
            world_height: self.world.border.height,
        }
    }

    /// Run a single game tick and return pending broadcasts.
    pub fn tick(&mut self) -> PendingBroadcasts {
        self.tick_count += 1;

        for avatar in &mut self.world.avatars {
            if !std::mem::take(&mut avatar.steered) {
                movement::idle(avatar, &self.config.avatar);
            }
        }

        let eaten = collision::resolve(&mut self.world, &self.config);
        for event in &eaten {
            debug!(
                "Tick #{}: {} ({}) ate {} ({})",
                self.tick_count, event.eater, event.eater_id, event.eaten, event.eaten_id
            );
        }

        if self.tick_count % STATS_EVERY == 0 {
            debug!(
                "Tick #{}: avg {:.3}ms | {} players, {} food",
                self.tick_count,
                self.update_time_avg,
                self.world.avatars().len(),
                self.world.food().len()
            );
        }

        PendingBroadcasts {
            eaten,
            snapshot: self.snapshot(),
        }
    }
}

/// Run the main game loop.
pub async fn run_game_loop(state: Arc<RwLock<GameState>>, tick_interval: Duration) {
    let mut ticker = interval(tick_interval);
    // Skip missed ticks rather than bursting to catch up.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let frame_tx = state.read().await.frame_tx.clone();

    loop {
        ticker.tick().await;

        // Run tick and extract pending broadcasts
        let broadcasts = {
            let mut game = state.write().await;
            let tick_start = std::time::Instant::now();
            let broadcasts = game.tick();
            let tick_ms = tick_start.elapsed().as_secs_f64() * 1000.0;

            game.update_time_avg = game.update_time_avg * 0.5 + tick_ms * 0.5;

            let tick_budget = tick_interval.as_secs_f64() * 1000.0 * 0.9;
            if tick_ms > tick_budget {
                warn!(
                    "Slow tick #{}: {:.3}ms (budget: {:.1}ms) - {} players",
                    game.tick_count,
                    tick_ms,
                    tick_budget,
                    game.world.avatars().len()
                );
            }

            broadcasts
        }; // Write lock released here

        for frame in broadcasts.into_frames() {
            // No receivers just means nobody is connected.
            let _ = frame_tx.send(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn game_with(config: Config) -> GameState {
        let (tx, _) = broadcast::channel(16);
        GameState::new(&config, tx)
    }

    fn lone_food_config() -> Config {
        let mut config = Config::default();
        config.food.count = 1;
        config
    }

    #[test]
    fn test_join_returns_state() {
        let mut game = game_with(Config::default());
        let id = game.next_connection_id();

        let reply = game.handle_message(id, ClientMessage::JoinGame { name: "blob".to_string() });

        let Some(ServerMessage::PlayerJoined { player }) = reply else {
            panic!("expected PlayerJoined");
        };
        assert_eq!(player.id, id);
        assert_eq!(player.name, "blob");
        assert_eq!(player.size, 20.0);
        assert_eq!(player.score, 0);
    }

    #[test]
    fn test_connection_ids_are_unique() {
        let mut game = game_with(Config::default());
        let a = game.next_connection_id();
        let b = game.next_connection_id();
        assert_ne!(a, b);
        assert_ne!(a, 0);
    }

    #[test]
    fn test_move_for_unknown_connection_is_noop() {
        let mut game = game_with(Config::default());
        assert!(!game.move_intent(42, DVec2::new(10.0, 10.0)));
        assert!(game.handle_message(42, ClientMessage::PlayerMove { mouse_x: 1.0, mouse_y: 2.0 }).is_none());
    }

    #[test]
    fn test_leave_twice() {
        let mut game = game_with(Config::default());
        game.join(1, "a".to_string());
        game.join(2, "b".to_string());

        assert!(game.leave(1));
        assert!(!game.leave(1));
        assert_eq!(game.world.avatars().len(), 1);
        assert!(game.world.avatar(2).is_some());
    }

    #[test]
    fn test_move_then_tick_eats_food() {
        let mut game = game_with(lone_food_config());
        game.join(1, "eater".to_string());
        game.world.avatar_mut(1).unwrap().position = DVec2::new(1500.0, 1500.0);
        let food_at = DVec2::new(1515.0, 1500.0);
        game.world.food_pool_mut().place(0, food_at);

        assert!(game.move_intent(1, food_at));
        let pending = game.tick();

        assert!(pending.eaten.is_empty());
        let avatar = game.world.avatar(1).unwrap();
        assert_eq!(avatar.score, 10);
        assert!((avatar.size - 20.8).abs() < 1e-9);
        assert_eq!(game.world.food().len(), 1);
        assert_ne!(game.world.food()[0].position, food_at);
    }

    #[test]
    fn test_idle_avatar_decays_across_ticks() {
        let mut config = Config::default();
        config.food.count = 0;
        let mut game = game_with(config);
        game.join(1, "drifter".to_string());
        game.world.avatar_mut(1).unwrap().position = DVec2::new(1500.0, 1500.0);
        for _ in 0..20 {
            game.move_intent(1, DVec2::new(2900.0, 1500.0));
        }
        // The tick that follows the intents leaves the avatar alone.
        game.tick();
        let (position, speed, intensity) = {
            let avatar = game.world.avatar(1).unwrap();
            assert!(!avatar.steered);
            (avatar.position, avatar.velocity.length(), avatar.movement_intensity)
        };
        assert!(speed > 0.5);
        assert!(intensity > 0.0);

        game.tick();
        let avatar = game.world.avatar(1).unwrap();
        assert!((avatar.velocity.length() - speed * avatar.friction).abs() < 1e-9);

        for _ in 0..600 {
            game.tick();
        }
        let avatar = game.world.avatar(1).unwrap();
        assert_eq!(avatar.position, position);
        assert!(avatar.velocity.length() < 1e-6);
        assert!(avatar.movement_intensity < 1e-6);
        assert!(avatar.trail.len() <= game.config.avatar.trail_cap(avatar.velocity.length()));
    }

    #[test]
    fn test_tick_without_players_still_runs() {
        let mut game = game_with(Config::default());
        let pending = game.tick();
        assert_eq!(game.tick_count, 1);
        let ServerMessage::GameState { players, food, world_width, world_height } = pending.snapshot else {
            panic!("expected GameState");
        };
        assert!(players.is_empty());
        assert_eq!(food.len(), 200);
        assert_eq!((world_width, world_height), (3000.0, 3000.0));
    }

    #[test]
    fn test_eat_frames_precede_snapshot() {
        let mut config = Config::default();
        config.food.count = 0;
        let mut game = game_with(config);
        game.join(1, "big".to_string());
        game.join(2, "small".to_string());
        let here = DVec2::new(1500.0, 1500.0);
        {
            let big = game.world.avatar_mut(1).unwrap();
            big.size = 30.0;
            big.position = here;
        }
        game.world.avatar_mut(2).unwrap().position = here;

        let frames = game.tick().into_frames();

        assert_eq!(frames.len(), 2);
        let first: Value = serde_json::from_str(&frames[0]).unwrap();
        assert_eq!(first["type"], "playerEaten");
        assert_eq!(first["eater"], "big");
        assert_eq!(first["eaten"], "small");
        let second: Value = serde_json::from_str(&frames[1]).unwrap();
        assert_eq!(second["type"], "gameState");
        assert_eq!(second["players"][0]["size"], 40.0);
        assert_eq!(second["players"][1]["size"], 20.0);
    }

    #[test]
    fn test_snapshot_keeps_food_count_over_many_ticks() {
        let mut config = Config::default();
        config.food.count = 50;
        config.world.width = 400.0;
        config.world.height = 400.0;
        let mut game = game_with(config);
        for id in 1..=4 {
            game.join(id, format!("p{id}"));
        }

        for n in 0..300u32 {
            for id in 1..=4u32 {
                let angle = f64::from(n + id * 40) * 0.05;
                let target = DVec2::new(200.0 + angle.cos() * 150.0, 200.0 + angle.sin() * 150.0);
                game.move_intent(id, target);
            }
            let before: Vec<f64> = game.world.avatars().iter().map(|a| a.size).collect();
            let pending = game.tick();
            assert_eq!(game.world.food().len(), 50);

            let eaten: Vec<u32> = pending.eaten.iter().map(|e| e.eaten_id).collect();
            for (avatar, old) in game.world.avatars().iter().zip(before) {
                if eaten.contains(&avatar.id) {
                    continue;
                }
                assert!(avatar.size >= old);
            }
            for avatar in game.world.avatars() {
                let margin = game.world.border.margin(avatar.size, 2.0);
                assert!(avatar.position.x >= margin.x && avatar.position.x <= 400.0 - margin.x);
                assert!(avatar.position.y >= margin.y && avatar.position.y <= 400.0 - margin.y);
            }
        }
    }

    #[tokio::test]
    async fn test_game_loop_broadcasts_snapshots() {
        let (tx, _) = broadcast::channel(16);
        let state = Arc::new(RwLock::new(GameState::new(&Config::default(), tx)));
        let mut rx = state.read().await.subscribe();

        tokio::spawn(run_game_loop(Arc::clone(&state), Duration::from_millis(5)));

        let frame = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("no frame within timeout")
            .expect("channel closed");
        let v: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(v["type"], "gameState");
        assert!(state.read().await.tick_count >= 1);
    }
}
