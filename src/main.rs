use anyhow::{Context, Result};
use jankypet::api::create_app;
use jankypet::config::load_or_default;
use jankypet::state::{run_decay_scheduler, GameState};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jankypet=info".into()),
        )
        .init();

    info!("Jankypet starting...");

    let config_path =
        std::env::var("JANKYPET_CONFIG").unwrap_or_else(|_| "jankypet.toml".to_string());
    let config = load_or_default(&config_path).context("Failed to load configuration")?;

    info!(
        config_path = %config_path,
        pet_name = %config.game.pet_name,
        decay_interval_seconds = config.game.decay_interval_seconds,
        bind = %config.server.bind_address(),
        "Configuration loaded"
    );

    // The one game state, shared by the scheduler and every session
    let game = Arc::new(GameState::new(&config.game));

    tokio::spawn(run_decay_scheduler(
        Arc::clone(&game),
        config.game.decay_period(),
    ));

    let app = create_app(Arc::clone(&game));
    let listener = tokio::net::TcpListener::bind(config.server.bind_address())
        .await
        .context("Failed to bind server address")?;
    info!(address = %config.server.bind_address(), "Jankypet listening");

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "Server error");
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    server_handle.abort();
    info!("Jankypet stopped");

    Ok(())
}
