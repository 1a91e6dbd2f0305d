//! Quanta Logger - Discord guild event logger
//!
//! Watches guild activity (messages, members, roles, channels, threads,
//! moderation) and posts a notification for each event to one logging
//! channel provisioned with the `setup` command.

mod common;
mod config;
mod discord;
mod logger;

use tokio::signal;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use common::error::Result;
use config::{env::get_config_path, load_and_validate};
use discord::DiscordBotBuilder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    match dotenv {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env file loaded: {}", e),
    }

    info!("Quanta Logger v{} starting...", env!("CARGO_PKG_VERSION"));

    run().await.map_err(|e| {
        error!("Fatal: {}", e);
        anyhow::Error::from(e)
    })
}

async fn run() -> Result<()> {
    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Set QUANTA_DISCORD_TOKEN (or TOKEN) or add it to {}.", config_path);
        e
    })?;

    info!("Configuration loaded successfully");
    info!("  Command prefix: {}", config.discord.command_prefix);
    info!("  Logger channel name: {}", config.logger.channel_name);
    info!("  State file: {}", config.logger.state_file);
    if config.discord.owner_id.is_none() {
        warn!("No owner_id configured, directme reports are disabled");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let discord_bot = DiscordBotBuilder::new(config, shutdown_rx)
        .build()
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {}", e);
            e
        })?;

    info!("Starting Discord bot...");
    let mut discord_task = tokio::spawn(discord_bot.run());

    let shutdown = tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("Shutdown signal received - stopping...");
            true
        }
        _ = &mut discord_task => false,
    };

    if shutdown {
        if let Err(e) = shutdown_tx.send(true) {
            debug!("Shutdown channel closed (bot already exited): {}", e);
        }
        let timeout = tokio::time::Duration::from_secs(5);
        match tokio::time::timeout(timeout, discord_task).await {
            Ok(Ok(())) => info!("Discord bot stopped gracefully"),
            Ok(Err(e)) => warn!("Discord task panicked: {}", e),
            Err(_) => warn!("Discord shutdown timed out"),
        }
    }

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
