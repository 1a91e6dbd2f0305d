//! Discord bot client.
//!
//! Owns the serenity client, the reconnect loop and the single task that
//! processes gateway events in arrival order.

use std::sync::Arc;
use std::time::Duration;

use backon::BackoffBuilder;
use serenity::all::{ActivityData, UserId};
use serenity::prelude::*;
use serenity::Client;
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::discord::commands::CommandHandler;
use crate::discord::convert;
use crate::discord::greeting;
use crate::discord::handler::{DiscordBotEvent, DiscordBotEvents};
use crate::discord::sink::DiscordSink;
use crate::logger::{EventLogger, LogEvent, Observation, SnapshotTracker, StateStore};

/// Upper bound between reconnect attempts.
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(300);

/// Builder for creating the Discord bot.
pub struct DiscordBotBuilder {
    config: Config,
    shutdown_rx: watch::Receiver<bool>,
}

impl DiscordBotBuilder {
    pub fn new(config: Config, shutdown_rx: watch::Receiver<bool>) -> Self {
        Self {
            config,
            shutdown_rx,
        }
    }

    /// Build the Discord bot.
    pub async fn build(self) -> Result<DiscordBot, serenity::Error> {
        let (discord_events_tx, discord_events_rx) = mpsc::unbounded_channel::<DiscordBotEvent>();

        let client = build_client(&self.config, discord_events_tx.clone()).await?;

        let sink = Arc::new(DiscordSink::new(client.http.clone()));
        let store = StateStore::new(&self.config.logger.state_file);
        info!("Logger state file: {}", store.path().display());

        let commands = CommandHandler::new(
            self.config.discord.command_prefix.clone(),
            self.config.discord.owner_id.map(UserId::new),
            self.config.logger.channel_name.clone(),
        );

        Ok(DiscordBot {
            client: Some(client),
            config: self.config,
            logger: EventLogger::new(sink, store),
            tracker: SnapshotTracker::default(),
            commands,
            discord_events_rx,
            discord_events_tx,
            shutdown_rx: self.shutdown_rx,
        })
    }
}

pub fn gateway_intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MODERATION
        | GatewayIntents::GUILD_EMOJIS_AND_STICKERS
        | GatewayIntents::GUILD_INTEGRATIONS
        | GatewayIntents::GUILD_WEBHOOKS
        | GatewayIntents::GUILD_INVITES
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::GUILD_PRESENCES
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_SCHEDULED_EVENTS
        | GatewayIntents::AUTO_MODERATION_CONFIGURATION
        | GatewayIntents::DIRECT_MESSAGES
}

async fn build_client(
    config: &Config,
    discord_events_tx: mpsc::UnboundedSender<DiscordBotEvent>,
) -> Result<Client, serenity::Error> {
    let events = DiscordBotEvents::new(discord_events_tx);
    let mut builder = Client::builder(&config.discord.token, gateway_intents()).event_handler(events);
    if let Some(activity) = &config.discord.activity {
        builder = builder.activity(ActivityData::watching(activity));
    }
    builder.await
}

pub struct DiscordBot {
    client: Option<Client>,
    config: Config,
    logger: EventLogger,
    tracker: SnapshotTracker,
    commands: CommandHandler,
    discord_events_rx: mpsc::UnboundedReceiver<DiscordBotEvent>,
    discord_events_tx: mpsc::UnboundedSender<DiscordBotEvent>,
    shutdown_rx: watch::Receiver<bool>,
}

impl DiscordBot {
    pub async fn run(mut self) {
        // Extract shard manager before we move client into run_connection
        let shard_manager = self.client.as_ref().map(|c| c.shard_manager.clone());
        let mut shutdown_rx = self.shutdown_rx.clone();

        let mut state = LoopState {
            logger: &mut self.logger,
            tracker: &mut self.tracker,
            commands: &self.commands,
            restored: false,
        };

        tokio::select! {
            _ = Self::run_connection(&mut self.client, &self.config, &self.discord_events_tx) => {},
            _ = Self::process_events(&mut self.discord_events_rx, &mut state, &mut self.shutdown_rx) => {},
            _ = async {
                // Wait for shutdown signal
                loop {
                    if shutdown_rx.changed().await.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            } => {}
        }

        // Outside the select so no finished branch can cancel it.
        if *shutdown_rx.borrow() {
            if let Some(manager) = shard_manager {
                info!("Initiating graceful Discord shutdown...");
                manager.shutdown_all().await;
                info!("Discord shutdown complete");
            }
        }

        if let Err(e) = self.logger.persist() {
            error!("Failed to save logger state: {}", e);
        }
        info!("Discord task ended");
    }

    async fn run_connection(
        client: &mut Option<Client>,
        config: &Config,
        discord_events_tx: &mpsc::UnboundedSender<DiscordBotEvent>,
    ) {
        /// Create an exponential backoff iterator for Discord reconnection.
        /// 5s initial, 5min max, factor 1.1, with jitter, unlimited retries.
        fn discord_backoff() -> impl Iterator<Item = Duration> {
            backon::ExponentialBuilder::default()
                .with_min_delay(Duration::from_secs(5))
                .with_max_delay(MAX_RECONNECT_DELAY)
                .with_factor(1.1)
                .with_jitter()
                .without_max_times()
                .build()
        }

        let mut backoff = discord_backoff();

        loop {
            info!("Connecting to Discord...");

            let mut client = match client.take() {
                Some(client) => client,
                None => {
                    // serenity mostly handles reconnections itself.
                    match build_client(config, discord_events_tx.clone()).await {
                        Ok(client) => {
                            backoff = discord_backoff();
                            client
                        }
                        Err(e) => {
                            error!("Failed to rebuild Discord client: {}", e);
                            let delay = backoff.next().unwrap_or(MAX_RECONNECT_DELAY);
                            warn!("Retrying in {:.1}s...", delay.as_secs_f64());
                            sleep(delay).await;
                            continue;
                        }
                    }
                }
            };

            match client.start().await {
                Ok(()) => {
                    info!("Discord client disconnected normally");
                    if let Err(error) = discord_events_tx.send(DiscordBotEvent::Disconnected) {
                        warn!("Failed to process discord event: {}", error);
                    }
                    break;
                }
                Err(e) => {
                    error!("Discord client error: {}", e);
                    let delay = backoff.next().unwrap_or(MAX_RECONNECT_DELAY);
                    warn!(
                        "Discord disconnected. Reconnecting in {:.1}s...",
                        delay.as_secs_f64(),
                    );
                    if let Err(error) = discord_events_tx.send(DiscordBotEvent::Disconnected) {
                        warn!("Failed to process discord event: {}", error);
                    }
                    sleep(delay).await;
                }
            }
        }
    }

    async fn process_events(
        discord_events_rx: &mut mpsc::UnboundedReceiver<DiscordBotEvent>,
        state: &mut LoopState<'_>,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                event = discord_events_rx.recv() => {
                    match event {
                        Some(event) => state.dispatch(event).await,
                        None => {
                            debug!("Discord events channel closed.");
                            break;
                        }
                    }
                }

                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Shutdown signal received, stopping event processing");
                        break;
                    }
                }
            }
        }
    }
}

/// What the processing task owns while it runs.
struct LoopState<'a> {
    logger: &'a mut EventLogger,
    tracker: &'a mut SnapshotTracker,
    commands: &'a CommandHandler,
    restored: bool,
}

impl LoopState<'_> {
    async fn dispatch(&mut self, event: DiscordBotEvent) {
        match event {
            DiscordBotEvent::Ready { ready } => {
                info!(
                    "Discord bot connected as {} ({} guilds)",
                    ready.user.name,
                    ready.guilds.len()
                );
                if !self.restored {
                    self.logger.restore().await;
                    self.restored = true;
                }
            }
            DiscordBotEvent::GuildCreate {
                context,
                guild,
                is_new,
            } => {
                info!("Received guild data for '{}'", guild.name);
                self.tracker.observe(convert::guild_snapshot(&guild));
                if is_new {
                    self.logger
                        .handle(&LogEvent::GuildJoined {
                            guild: guild.id,
                            name: guild.name.clone(),
                            member_count: guild.member_count,
                        })
                        .await;
                    greeting::thank_inviter(&context, &guild).await;
                }
            }
            DiscordBotEvent::Message { context, message } => {
                match self
                    .commands
                    .handle_command(&context, &message, self.logger)
                    .await
                {
                    Ok(true) => debug!("Handled command from {}", message.author.name),
                    Ok(false) => {}
                    Err(e) => error!("Command handler error: {}", e),
                }
                // Direct messages are not logged.
                if message.guild_id.is_some() {
                    let observation = Observation::MessagePosted(convert::message_snapshot(&message));
                    self.observe(observation).await;
                }
            }
            DiscordBotEvent::Observed(observation) => self.observe(observation).await,
            DiscordBotEvent::Log(event) => {
                self.logger.handle(&event).await;
            }
            DiscordBotEvent::Disconnected => debug!("Discord connection lost"),
        }
    }

    async fn observe(&mut self, observation: Observation) {
        // Nothing posted in the destination enters the message cache.
        if let Observation::MessagePosted(snapshot) = &observation {
            if Some(snapshot.channel) == self.logger.destination() {
                return;
            }
        }
        if let Some(event) = self.tracker.observe(observation) {
            self.logger.handle(&event).await;
        }
    }
}
