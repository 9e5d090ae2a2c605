//! Arena game server.

use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Arena Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = arena_server::Config::load()?;
    info!("Loaded configuration");
    info!("  Port: {}", config.server.port);
    info!("  World: {}x{}", config.world.width, config.world.height);
    info!("  Food: {}", config.food.count);
    info!("  Tick rate: {}/s", config.server.tick_rate);

    // Start the game server
    arena_server::run(config).await?;

    Ok(())
}
