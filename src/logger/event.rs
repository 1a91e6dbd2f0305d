//! Platform event snapshots.
//!
//! Every event the logger understands is a variant of [`LogEvent`]. Payloads
//! are plain owned data captured at dispatch time, never live handles.

use chrono::{DateTime, Utc};
use serenity::model::id::{ChannelId, GuildId, MessageId, RoleId, UserId};
use serenity::model::mention::Mentionable;

/// A user as seen in an event payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: UserId,
    pub name: String,
    pub bot: bool,
}

impl UserRef {
    /// `<@id> (name)` so the log stays readable after the user leaves.
    pub fn label(&self) -> String {
        if self.bot {
            format!("{} ({}) [bot]", self.id.mention(), self.name)
        } else {
            format!("{} ({})", self.id.mention(), self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    pub filename: String,
    pub url: String,
}

/// A message as it was when posted (or last edited).
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSnapshot {
    pub id: MessageId,
    pub channel: ChannelId,
    pub guild: Option<GuildId>,
    pub author: UserRef,
    pub content: String,
    pub attachments: Vec<AttachmentRef>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRef {
    pub id: ChannelId,
    pub name: String,
    pub kind: String,
}

/// Watched channel fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelState {
    pub name: String,
    pub topic: Option<String>,
    pub nsfw: bool,
    pub parent: Option<ChannelId>,
}

/// Watched role fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleState {
    pub name: String,
    pub colour: u32,
    pub hoist: bool,
    pub mentionable: bool,
    pub permissions: u64,
}

/// Watched member fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberState {
    pub username: String,
    pub nick: Option<String>,
    pub roles: Vec<RoleId>,
}

/// Watched guild fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildState {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

/// An emoji or sticker. Identity is the id; `display` is what gets rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub id: u64,
    pub name: String,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceState {
    pub status: String,
    pub activity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadState {
    pub name: String,
    pub archived: bool,
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledEventState {
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub start: Option<DateTime<Utc>>,
    pub channel: Option<ChannelId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoModRuleState {
    pub name: String,
    pub enabled: bool,
}

/// Closed set of event kinds the logger reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    MessagePosted(MessageSnapshot),
    MessageEdited {
        guild: Option<GuildId>,
        channel: ChannelId,
        message: MessageId,
        author: Option<UserRef>,
        before: Option<String>,
        after: String,
    },
    MessageDeleted {
        guild: Option<GuildId>,
        channel: ChannelId,
        message: MessageId,
        cached: Option<MessageSnapshot>,
    },
    MessagesBulkDeleted {
        guild: Option<GuildId>,
        channel: ChannelId,
        messages: Vec<MessageId>,
        cached: Vec<MessageSnapshot>,
    },

    MemberJoined {
        guild: GuildId,
        user: UserRef,
        account_created: Option<DateTime<Utc>>,
    },
    MemberLeft {
        guild: GuildId,
        user: UserRef,
    },
    MemberBanned {
        guild: GuildId,
        user: UserRef,
    },
    MemberUnbanned {
        guild: GuildId,
        user: UserRef,
    },
    MemberUpdated {
        guild: GuildId,
        user: UserRef,
        before: Option<MemberState>,
        after: MemberState,
    },
    VoiceStateChanged {
        guild: Option<GuildId>,
        user: UserId,
        before: Option<ChannelId>,
        after: Option<ChannelId>,
    },
    PresenceChanged {
        guild: Option<GuildId>,
        user: UserId,
        before: Option<PresenceState>,
        after: PresenceState,
    },

    ChannelCreated {
        guild: GuildId,
        channel: ChannelRef,
    },
    ChannelDeleted {
        guild: GuildId,
        channel: ChannelRef,
    },
    ChannelUpdated {
        guild: GuildId,
        channel: ChannelRef,
        before: Option<ChannelState>,
        after: ChannelState,
    },
    ChannelPinsUpdated {
        guild: Option<GuildId>,
        channel: ChannelId,
        last_pin: Option<DateTime<Utc>>,
    },

    RoleCreated {
        guild: GuildId,
        role: RoleId,
        state: RoleState,
    },
    RoleDeleted {
        guild: GuildId,
        role: RoleId,
        name: Option<String>,
    },
    RoleUpdated {
        guild: GuildId,
        role: RoleId,
        before: Option<RoleState>,
        after: RoleState,
    },

    GuildJoined {
        guild: GuildId,
        name: String,
        member_count: u64,
    },
    GuildLeft {
        guild: GuildId,
        name: Option<String>,
    },
    GuildUpdated {
        guild: GuildId,
        before: Option<GuildState>,
        after: GuildState,
    },
    EmojisUpdated {
        guild: GuildId,
        before: Option<Vec<Asset>>,
        after: Vec<Asset>,
    },
    StickersUpdated {
        guild: GuildId,
        before: Option<Vec<Asset>>,
        after: Vec<Asset>,
    },

    InviteCreated {
        guild: Option<GuildId>,
        channel: ChannelId,
        code: String,
        inviter: Option<UserRef>,
        max_uses: u32,
        max_age: u32,
    },
    InviteDeleted {
        guild: Option<GuildId>,
        channel: ChannelId,
        code: String,
    },

    ReactionAdded {
        guild: Option<GuildId>,
        channel: ChannelId,
        message: MessageId,
        user: Option<UserId>,
        emoji: String,
    },
    ReactionRemoved {
        guild: Option<GuildId>,
        channel: ChannelId,
        message: MessageId,
        user: Option<UserId>,
        emoji: String,
    },
    ReactionsCleared {
        guild: Option<GuildId>,
        channel: ChannelId,
        message: MessageId,
    },
    ReactionEmojiCleared {
        guild: Option<GuildId>,
        channel: ChannelId,
        message: MessageId,
        emoji: String,
    },

    ThreadCreated {
        guild: GuildId,
        thread: ChannelRef,
        parent: Option<ChannelId>,
    },
    ThreadUpdated {
        guild: GuildId,
        thread: ChannelRef,
        before: Option<ThreadState>,
        after: ThreadState,
    },
    ThreadDeleted {
        guild: GuildId,
        thread: ChannelId,
        name: Option<String>,
        parent: Option<ChannelId>,
    },
    ThreadMembersUpdated {
        guild: GuildId,
        thread: ChannelId,
        added: Vec<UserId>,
        removed: Vec<UserId>,
    },

    IntegrationCreated {
        id: u64,
        name: String,
        kind: String,
    },
    IntegrationUpdated {
        id: u64,
        name: String,
        kind: String,
    },
    IntegrationDeleted {
        guild: GuildId,
        id: u64,
    },
    WebhooksUpdated {
        guild: GuildId,
        channel: ChannelId,
    },

    ScheduledEventCreated {
        guild: GuildId,
        id: u64,
        state: ScheduledEventState,
        creator: Option<UserId>,
    },
    ScheduledEventUpdated {
        guild: GuildId,
        id: u64,
        before: Option<ScheduledEventState>,
        after: ScheduledEventState,
    },
    ScheduledEventDeleted {
        guild: GuildId,
        id: u64,
        state: ScheduledEventState,
    },

    AutoModRuleCreated {
        guild: GuildId,
        id: u64,
        state: AutoModRuleState,
        creator: UserId,
    },
    AutoModRuleUpdated {
        guild: GuildId,
        id: u64,
        before: Option<AutoModRuleState>,
        after: AutoModRuleState,
    },
    AutoModRuleDeleted {
        guild: GuildId,
        id: u64,
        state: AutoModRuleState,
    },

    AuditLogEntryCreated {
        guild: GuildId,
        entry: u64,
        action: String,
        user: Option<UserId>,
        target: Option<u64>,
        reason: Option<String>,
    },
}

impl LogEvent {
    /// Short, stable name used in trace output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MessagePosted(_) => "message_posted",
            Self::MessageEdited { .. } => "message_edited",
            Self::MessageDeleted { .. } => "message_deleted",
            Self::MessagesBulkDeleted { .. } => "messages_bulk_deleted",
            Self::MemberJoined { .. } => "member_joined",
            Self::MemberLeft { .. } => "member_left",
            Self::MemberBanned { .. } => "member_banned",
            Self::MemberUnbanned { .. } => "member_unbanned",
            Self::MemberUpdated { .. } => "member_updated",
            Self::VoiceStateChanged { .. } => "voice_state_changed",
            Self::PresenceChanged { .. } => "presence_changed",
            Self::ChannelCreated { .. } => "channel_created",
            Self::ChannelDeleted { .. } => "channel_deleted",
            Self::ChannelUpdated { .. } => "channel_updated",
            Self::ChannelPinsUpdated { .. } => "channel_pins_updated",
            Self::RoleCreated { .. } => "role_created",
            Self::RoleDeleted { .. } => "role_deleted",
            Self::RoleUpdated { .. } => "role_updated",
            Self::GuildJoined { .. } => "guild_joined",
            Self::GuildLeft { .. } => "guild_left",
            Self::GuildUpdated { .. } => "guild_updated",
            Self::EmojisUpdated { .. } => "emojis_updated",
            Self::StickersUpdated { .. } => "stickers_updated",
            Self::InviteCreated { .. } => "invite_created",
            Self::InviteDeleted { .. } => "invite_deleted",
            Self::ReactionAdded { .. } => "reaction_added",
            Self::ReactionRemoved { .. } => "reaction_removed",
            Self::ReactionsCleared { .. } => "reactions_cleared",
            Self::ReactionEmojiCleared { .. } => "reaction_emoji_cleared",
            Self::ThreadCreated { .. } => "thread_created",
            Self::ThreadUpdated { .. } => "thread_updated",
            Self::ThreadDeleted { .. } => "thread_deleted",
            Self::ThreadMembersUpdated { .. } => "thread_members_updated",
            Self::IntegrationCreated { .. } => "integration_created",
            Self::IntegrationUpdated { .. } => "integration_updated",
            Self::IntegrationDeleted { .. } => "integration_deleted",
            Self::WebhooksUpdated { .. } => "webhooks_updated",
            Self::ScheduledEventCreated { .. } => "scheduled_event_created",
            Self::ScheduledEventUpdated { .. } => "scheduled_event_updated",
            Self::ScheduledEventDeleted { .. } => "scheduled_event_deleted",
            Self::AutoModRuleCreated { .. } => "automod_rule_created",
            Self::AutoModRuleUpdated { .. } => "automod_rule_updated",
            Self::AutoModRuleDeleted { .. } => "automod_rule_deleted",
            Self::AuditLogEntryCreated { .. } => "audit_log_entry_created",
        }
    }

    /// Channel the event happened in, for events that can echo back from
    /// the logging channel itself.
    pub fn origin_channel(&self) -> Option<ChannelId> {
        match self {
            Self::MessagePosted(message) => Some(message.channel),
            Self::MessageEdited { channel, .. }
            | Self::MessageDeleted { channel, .. }
            | Self::MessagesBulkDeleted { channel, .. }
            | Self::ChannelPinsUpdated { channel, .. }
            | Self::ReactionAdded { channel, .. }
            | Self::ReactionRemoved { channel, .. }
            | Self::ReactionsCleared { channel, .. }
            | Self::ReactionEmojiCleared { channel, .. } => Some(*channel),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_label() {
        let user = UserRef {
            id: UserId::new(42),
            name: "ada".to_string(),
            bot: false,
        };
        assert_eq!(user.label(), "<@42> (ada)");

        let bot = UserRef { bot: true, ..user };
        assert_eq!(bot.label(), "<@42> (ada) [bot]");
    }

    #[test]
    fn test_origin_channel() {
        let event = LogEvent::ReactionsCleared {
            guild: None,
            channel: ChannelId::new(7),
            message: MessageId::new(8),
        };
        assert_eq!(event.origin_channel(), Some(ChannelId::new(7)));

        let event = LogEvent::RoleDeleted {
            guild: GuildId::new(1),
            role: RoleId::new(2),
            name: None,
        };
        assert_eq!(event.origin_channel(), None);
    }
}
