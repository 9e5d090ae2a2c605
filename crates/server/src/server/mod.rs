//! Game server implementation.
//!
//! Each WebSocket connection gets a connection id. Inbound frames are
//! applied to the shared [`GameState`] under its write lock; outbound
//! frames are encoded once per tick and fanned out through a broadcast
//! channel.

use crate::config::Config;
use futures_util::{SinkExt, StreamExt};
use protocol::packets::ClientMessage;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, RwLock};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

pub mod game;

pub use game::{run_game_loop, GameState, PendingBroadcasts};

/// An encoded JSON text frame, shared by every receiver.
pub type Frame = Arc<str>;

/// Outbound frames buffered per connection before it starts lagging.
const FRAME_BUFFER: usize = 64;

/// Run the game server.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on ws://{}", addr);

    serve(listener, config).await
}

/// Start the game loop and accept connections on `listener`.
pub async fn serve(listener: TcpListener, config: Config) -> anyhow::Result<()> {
    let (frame_tx, _) = broadcast::channel::<Frame>(FRAME_BUFFER);

    // Shared game state
    let game_state = Arc::new(RwLock::new(GameState::new(&config, frame_tx)));

    // Start the game loop
    let game_loop_state = Arc::clone(&game_state);
    let tick_interval = config.server.tick_interval();
    tokio::spawn(async move {
        run_game_loop(game_loop_state, tick_interval).await;
    });

    loop {
        let (stream, addr) = listener.accept().await?;
        let game_state = Arc::clone(&game_state);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, addr, game_state).await {
                error!("Connection error from {}: {}", addr, e);
            }
        });
    }
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    game_state: Arc<RwLock<GameState>>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    let (mut write, mut read) = ws_stream.split();

    let (connection_id, mut frame_rx) = {
        let mut state = game_state.write().await;
        (state.next_connection_id(), state.subscribe())
    };
    info!("Connection {} opened from {}", connection_id, addr);

    // Message loop - handle both incoming messages and broadcasts
    loop {
        tokio::select! {
            msg = read.next() => {
                let parsed = match msg {
                    Some(Ok(Message::Text(text))) => ClientMessage::parse(text.as_str()),
                    Some(Ok(Message::Binary(data))) => ClientMessage::parse_bytes(&data),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!("WebSocket error from {}: {}", addr, e);
                        break;
                    }
                    Some(Ok(_)) => continue,
                };

                let message = match parsed {
                    Ok(message) => message,
                    Err(e) => {
                        warn!("Bad frame from {}: {}", addr, e);
                        continue;
                    }
                };

                let reply = game_state.write().await.handle_message(connection_id, message);
                if let Some(reply) = reply {
                    let text = match reply.encode() {
                        Ok(text) => text,
                        Err(e) => {
                            error!("Failed to encode reply for {}: {}", addr, e);
                            break;
                        }
                    };
                    if let Err(e) = write.send(Message::text(text)).await {
                        warn!("Failed to send reply to {}: {}", addr, e);
                        break;
                    }
                }
            }
            frame = frame_rx.recv() => {
                match frame {
                    Ok(frame) => {
                        if let Err(e) = write.send(Message::text(frame.to_string())).await {
                            warn!("Failed to send frame to {}: {}", addr, e);
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!("Connection {} lagged, skipped {} frames", connection_id, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    game_state.write().await.leave(connection_id);
    info!("Connection {} closed ({})", connection_id, addr);

    Ok(())
}
