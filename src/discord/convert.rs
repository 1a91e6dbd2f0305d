//! Serenity models to logger snapshots.
//!
//! Missing or blank data becomes a placeholder, never an error.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serenity::all::{
    Emoji, EmojiId, Guild, GuildChannel, ImageHash, Member, Message, Presence, Role, ScheduledEvent,
    Sticker, StickerId, Timestamp, User,
};
use serenity::model::guild::automod::Rule;

use crate::logger::event::*;
use crate::logger::Observation;

const UNKNOWN_NAME: &str = "*unknown*";

pub fn timestamp(at: Timestamp) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(at.unix_timestamp(), 0)
}

pub fn user_ref(user: &User) -> UserRef {
    UserRef {
        id: user.id,
        name: non_blank(&user.name),
        bot: user.bot,
    }
}

pub fn message_snapshot(message: &Message) -> MessageSnapshot {
    MessageSnapshot {
        id: message.id,
        channel: message.channel_id,
        guild: message.guild_id,
        author: user_ref(&message.author),
        content: message.content.clone(),
        attachments: message
            .attachments
            .iter()
            .map(|a| AttachmentRef {
                filename: a.filename.clone(),
                url: a.url.clone(),
            })
            .collect(),
        timestamp: timestamp(message.timestamp),
    }
}

pub fn channel_ref(channel: &GuildChannel) -> ChannelRef {
    ChannelRef {
        id: channel.id,
        name: non_blank(&channel.name),
        kind: channel.kind.name().to_string(),
    }
}

pub fn channel_state(channel: &GuildChannel) -> ChannelState {
    ChannelState {
        name: channel.name.clone(),
        topic: channel.topic.clone(),
        nsfw: channel.nsfw,
        parent: channel.parent_id,
    }
}

pub fn thread_state(thread: &GuildChannel) -> ThreadState {
    let (archived, locked) = thread
        .thread_metadata
        .as_ref()
        .map(|m| (m.archived, m.locked))
        .unwrap_or_default();
    ThreadState {
        name: thread.name.clone(),
        archived,
        locked,
    }
}

pub fn role_state(role: &Role) -> RoleState {
    RoleState {
        name: role.name.clone(),
        colour: role.colour.0,
        hoist: role.hoist,
        mentionable: role.mentionable,
        permissions: role.permissions.bits(),
    }
}

pub fn member_state(member: &Member) -> MemberState {
    MemberState {
        username: member.user.name.clone(),
        nick: member.nick.clone(),
        roles: member.roles.clone(),
    }
}

pub fn guild_state(name: &str, description: Option<&String>, icon: Option<&ImageHash>) -> GuildState {
    GuildState {
        name: name.to_string(),
        description: description.cloned(),
        icon: icon.map(|hash| hash.to_string()),
    }
}

pub fn emoji_assets(emojis: &HashMap<EmojiId, Emoji>) -> Vec<Asset> {
    sorted_assets(emojis.values().map(|emoji| Asset {
        id: emoji.id.get(),
        name: emoji.name.clone(),
        display: emoji.to_string(),
    }))
}

pub fn sticker_assets(stickers: &HashMap<StickerId, Sticker>) -> Vec<Asset> {
    sorted_assets(stickers.values().map(|sticker| Asset {
        id: sticker.id.get(),
        name: sticker.name.clone(),
        display: sticker.name.clone(),
    }))
}

/// Everything a GUILD_CREATE tells the tracker about the guild.
pub fn guild_snapshot(guild: &Guild) -> Observation {
    Observation::GuildAvailable {
        guild: guild.id,
        emojis: emoji_assets(&guild.emojis),
        stickers: sticker_assets(&guild.stickers),
        presences: guild
            .presences
            .iter()
            .map(|(user, presence)| (*user, presence_state(presence)))
            .collect(),
        scheduled_events: guild
            .scheduled_events
            .iter()
            .map(|event| (event.id.get(), scheduled_event_state(event)))
            .collect(),
    }
}

/// Map iteration order is arbitrary; sort so records list items stably.
pub fn sorted_assets(assets: impl Iterator<Item = Asset>) -> Vec<Asset> {
    let mut assets: Vec<Asset> = assets.collect();
    assets.sort_by_key(|a| a.id);
    assets
}

pub fn presence_state(presence: &Presence) -> PresenceState {
    PresenceState {
        status: presence.status.name().to_string(),
        activity: presence.activities.first().map(|a| a.name.clone()),
    }
}

pub fn scheduled_event_state(event: &ScheduledEvent) -> ScheduledEventState {
    ScheduledEventState {
        name: event.name.clone(),
        description: event.description.clone(),
        status: format!("{:?}", event.status),
        start: timestamp(event.start_time),
        channel: event.channel_id,
    }
}

pub fn automod_rule_state(rule: &Rule) -> AutoModRuleState {
    AutoModRuleState {
        name: rule.name.clone(),
        enabled: rule.enabled,
    }
}

fn non_blank(text: &str) -> String {
    if text.trim().is_empty() {
        UNKNOWN_NAME.to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_conversion() {
        let at = Timestamp::from_unix_timestamp(1_700_000_000).unwrap();
        let converted = timestamp(at).unwrap();
        assert_eq!(converted.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_assets_are_sorted_by_id() {
        let assets = sorted_assets(
            [30, 10, 20].into_iter().map(|id| Asset {
                id,
                name: id.to_string(),
                display: id.to_string(),
            }),
        );
        let ids: Vec<u64> = assets.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn test_blank_names_get_placeholder() {
        assert_eq!(non_blank("  "), UNKNOWN_NAME);
        assert_eq!(non_blank("ada"), "ada");
    }
}
