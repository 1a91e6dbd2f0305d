//! Embed delivery through the Discord HTTP API.

use std::sync::Arc;

use serenity::all::{
    ChannelId, Colour, CreateEmbed, CreateEmbedFooter, CreateMessage, Http, HttpError, Timestamp,
};
use serenity::async_trait;
use tracing::{debug, warn};

use crate::common::DeliveryError;
use crate::logger::{Notification, NotificationSink, Tone};

/// Field values up to this many chars are laid out side by side.
const INLINE_VALUE_LIMIT: usize = 64;

pub struct DiscordSink {
    http: Arc<Http>,
}

impl DiscordSink {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl NotificationSink for DiscordSink {
    async fn deliver(&self, channel: ChannelId, notification: &Notification) -> Result<(), DeliveryError> {
        let builder = CreateMessage::new().embed(to_embed(notification));
        match channel.send_message(&self.http, builder).await {
            Ok(_) => Ok(()),
            Err(e) if is_not_found(&e) => Err(DeliveryError::ChannelNotFound {
                channel_id: channel.get(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn channel_exists(&self, channel: ChannelId) -> bool {
        match channel.to_channel(&self.http).await {
            Ok(_) => true,
            Err(e) if is_not_found(&e) => {
                debug!("Channel {} is gone", channel);
                false
            }
            Err(e) => {
                // Not proof the channel is gone, so keep it.
                warn!("Could not verify channel {}: {}", channel, e);
                true
            }
        }
    }
}

fn is_not_found(error: &serenity::Error) -> bool {
    matches!(
        error,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 404
    )
}

pub fn tone_colour(tone: Tone) -> Colour {
    match tone {
        Tone::Affirmative => Colour::new(0x2ECC71),
        Tone::Alerting => Colour::new(0xE67E22),
        Tone::Neutral => Colour::new(0x3498DB),
        Tone::Severe => Colour::new(0xE74C3C),
        Tone::Informational => Colour::new(0x95A5A6),
    }
}

pub fn to_embed(notification: &Notification) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(&notification.title)
        .colour(tone_colour(notification.tone));

    for field in &notification.fields {
        let inline = field.value.chars().count() <= INLINE_VALUE_LIMIT && !field.value.contains('\n');
        embed = embed.field(&field.label, &field.value, inline);
    }

    if let Some(description) = &notification.description {
        embed = embed.description(description);
    }
    if let Some(footer) = &notification.footer {
        embed = embed.footer(CreateEmbedFooter::new(footer));
    }
    if let Some(at) = notification.timestamp {
        if let Ok(ts) = Timestamp::from_unix_timestamp(at.timestamp()) {
            embed = embed.timestamp(ts);
        }
    }
    embed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_tone_has_its_own_colour() {
        let tones = [
            Tone::Affirmative,
            Tone::Alerting,
            Tone::Neutral,
            Tone::Severe,
            Tone::Informational,
        ];
        let colours: HashSet<u32> = tones.iter().map(|t| tone_colour(*t).0).collect();
        assert_eq!(colours.len(), tones.len());
    }

    #[test]
    fn test_creation_is_green() {
        assert_eq!(tone_colour(Tone::Affirmative).0, 0x2ECC71);
    }
}
