//! Event logging core.
//!
//! [`EventLogger`] owns the destination channel. Each event is filtered,
//! rendered into [`Notification`]s and handed to a [`NotificationSink`].

pub mod diff;
pub mod event;
pub mod formatter;
pub mod record;
pub mod store;
pub mod tracker;

use std::sync::Arc;

use serenity::async_trait;
use serenity::model::id::ChannelId;
use tracing::{debug, error, info, warn};

use crate::common::{DeliveryError, StoreError};

pub use event::LogEvent;
pub use formatter::render;
pub use record::{Notification, Tone};
pub use store::StateStore;
pub use tracker::{Observation, SnapshotTracker};

/// Outbound delivery of notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, channel: ChannelId, notification: &Notification) -> Result<(), DeliveryError>;

    /// Whether the channel still resolves on the platform.
    async fn channel_exists(&self, channel: ChannelId) -> bool;
}

pub struct EventLogger {
    sink: Arc<dyn NotificationSink>,
    store: StateStore,
    destination: Option<ChannelId>,
}

impl EventLogger {
    /// Starts unconfigured. Call [`restore`](Self::restore) to pick up persisted state.
    pub fn new(sink: Arc<dyn NotificationSink>, store: StateStore) -> Self {
        Self {
            sink,
            store,
            destination: None,
        }
    }

    /// Load the persisted destination and check it still exists.
    pub async fn restore(&mut self) -> Option<ChannelId> {
        self.destination = match self.store.load() {
            Some(channel) if self.sink.channel_exists(channel).await => {
                info!("Logging to channel {}", channel);
                Some(channel)
            }
            Some(channel) => {
                warn!(
                    "Stored logger channel {} no longer exists, logging disabled until setup",
                    channel
                );
                None
            }
            None => {
                info!("No logger channel configured, run setup to enable logging");
                None
            }
        };
        self.destination
    }

    pub fn destination(&self) -> Option<ChannelId> {
        self.destination
    }

    /// Switch destination and persist it right away.
    pub fn set_destination(&mut self, channel: ChannelId) -> Result<(), StoreError> {
        self.destination = Some(channel);
        info!("Logger channel set to {}", channel);
        self.store.save(self.destination)
    }

    pub fn persist(&self) -> Result<(), StoreError> {
        self.store.save(self.destination)
    }

    /// Destination for this event, or `None` if it must not be logged.
    pub fn admit(&self, event: &LogEvent) -> Option<ChannelId> {
        let destination = self.destination?;
        if event.origin_channel() == Some(destination) {
            return None;
        }
        Some(destination)
    }

    /// Render and deliver one event. Returns how many records were delivered.
    pub async fn handle(&self, event: &LogEvent) -> usize {
        let Some(destination) = self.admit(event) else {
            debug!("Skipping {} event", event.kind());
            return 0;
        };

        let notifications = render(event);
        if notifications.is_empty() {
            debug!("No watched change in {} event", event.kind());
            return 0;
        }

        let mut delivered = 0;
        for notification in &notifications {
            match self.sink.deliver(destination, notification).await {
                Ok(()) => delivered += 1,
                Err(e) => error!(
                    "Failed to deliver '{}' to {}: {}",
                    notification.title, destination, e
                ),
            }
        }
        debug!(
            "Delivered {}/{} record(s) for {} event",
            delivered,
            notifications.len(),
            event.kind()
        );
        delivered
    }
}
