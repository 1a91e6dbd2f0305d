//! Gateway callbacks.
//!
//! Every callback converts its payload to owned snapshots and forwards it to
//! the processing loop. Nothing here awaits network I/O.

use std::collections::HashMap;

use serenity::all::{
    ApplicationId, AuditLogEntry, ChannelId, ChannelPinsUpdateEvent, Emoji, EmojiId, Guild,
    GuildChannel, GuildId, GuildMemberUpdateEvent, Integration, IntegrationId, InviteCreateEvent,
    InviteDeleteEvent, Member, Message, MessageId, MessageUpdateEvent, PartialGuild,
    PartialGuildChannel, Presence, Reaction, Ready, Role, RoleId, ScheduledEvent, Sticker,
    StickerId, ThreadMembersUpdateEvent, UnavailableGuild, User, VoiceState,
};
use serenity::async_trait;
use serenity::cache::Cache;
use serenity::model::guild::automod::Rule;
use serenity::prelude::*;
use tokio::sync::mpsc;
use tracing::warn;

use crate::discord::convert;
use crate::logger::{LogEvent, Observation};

#[derive(Debug, Clone)]
pub enum DiscordBotEvent {
    /// Bot connected and ready.
    Ready { ready: Ready },
    /// Guild data received.
    GuildCreate {
        context: Context,
        guild: Guild,
        is_new: bool,
    },
    /// Message received. Commands need the context to reply.
    Message { context: Context, message: Message },
    /// Needs the tracker to become a loggable event.
    Observed(Observation),
    /// Ready to log as is.
    Log(LogEvent),
    Disconnected,
}

pub struct DiscordBotEvents {
    discord_events_tx: mpsc::UnboundedSender<DiscordBotEvent>,
}

impl DiscordBotEvents {
    pub fn new(discord_events_tx: mpsc::UnboundedSender<DiscordBotEvent>) -> Self {
        Self { discord_events_tx }
    }

    fn forward(&self, event: DiscordBotEvent) {
        if let Err(error) = self.discord_events_tx.send(event) {
            warn!("Failed to process discord event: {}", error);
        }
    }

    fn observe(&self, observation: Observation) {
        self.forward(DiscordBotEvent::Observed(observation));
    }

    fn log(&self, event: LogEvent) {
        self.forward(DiscordBotEvent::Log(event));
    }
}

/// The payload of a reaction clear has no guild id; find the owner of the
/// channel among cached guilds.
fn cached_guild_of(cache: &Cache, channel: ChannelId) -> Option<GuildId> {
    cache.guilds().into_iter().find(|id| {
        cache.guild(*id).is_some_and(|guild| {
            guild.channels.contains_key(&channel) || guild.threads.iter().any(|t| t.id == channel)
        })
    })
}

#[async_trait]
impl EventHandler for DiscordBotEvents {
    async fn ready(&self, _context: Context, ready: Ready) {
        self.forward(DiscordBotEvent::Ready { ready });
    }

    async fn guild_create(&self, context: Context, guild: Guild, is_new: Option<bool>) {
        self.forward(DiscordBotEvent::GuildCreate {
            context,
            guild,
            is_new: is_new.unwrap_or(false),
        });
    }

    async fn guild_delete(&self, _context: Context, incomplete: UnavailableGuild, full: Option<Guild>) {
        self.observe(Observation::GuildUnavailable { guild: incomplete.id });
        // An outage also arrives as a guild delete.
        if incomplete.unavailable {
            return;
        }
        self.log(LogEvent::GuildLeft {
            guild: incomplete.id,
            name: full.map(|g| g.name),
        });
    }

    async fn guild_update(&self, _context: Context, old: Option<Guild>, new: PartialGuild) {
        self.log(LogEvent::GuildUpdated {
            guild: new.id,
            before: old.map(|g| convert::guild_state(&g.name, g.description.as_ref(), g.icon.as_ref())),
            after: convert::guild_state(&new.name, new.description.as_ref(), new.icon.as_ref()),
        });
    }

    async fn message(&self, context: Context, message: Message) {
        self.forward(DiscordBotEvent::Message { context, message });
    }

    async fn message_update(
        &self,
        _context: Context,
        _old: Option<Message>,
        _new: Option<Message>,
        event: MessageUpdateEvent,
    ) {
        // Direct messages are not logged.
        if event.guild_id.is_none() {
            return;
        }
        self.observe(Observation::MessageEdited {
            guild: event.guild_id,
            channel: event.channel_id,
            message: event.id,
            author: event.author.as_ref().map(convert::user_ref),
            content: event.content,
        });
    }

    async fn message_delete(
        &self,
        _context: Context,
        channel: ChannelId,
        message: MessageId,
        guild: Option<GuildId>,
    ) {
        if guild.is_none() {
            return;
        }
        self.observe(Observation::MessageDeleted {
            guild,
            channel,
            message,
        });
    }

    async fn message_delete_bulk(
        &self,
        _context: Context,
        channel: ChannelId,
        messages: Vec<MessageId>,
        guild: Option<GuildId>,
    ) {
        self.observe(Observation::MessagesBulkDeleted {
            guild,
            channel,
            messages,
        });
    }

    async fn guild_member_addition(&self, _context: Context, member: Member) {
        self.log(LogEvent::MemberJoined {
            guild: member.guild_id,
            user: convert::user_ref(&member.user),
            account_created: convert::timestamp(member.user.id.created_at()),
        });
    }

    async fn guild_member_removal(&self, _context: Context, guild: GuildId, user: User, _member: Option<Member>) {
        self.observe(Observation::MemberRemoved {
            guild,
            user: convert::user_ref(&user),
            banned: false,
        });
    }

    async fn guild_member_update(
        &self,
        _context: Context,
        old: Option<Member>,
        _new: Option<Member>,
        event: GuildMemberUpdateEvent,
    ) {
        self.log(LogEvent::MemberUpdated {
            guild: event.guild_id,
            user: convert::user_ref(&event.user),
            before: old.as_ref().map(convert::member_state),
            after: crate::logger::event::MemberState {
                username: event.user.name.clone(),
                nick: event.nick.clone(),
                roles: event.roles.clone(),
            },
        });
    }

    async fn guild_ban_addition(&self, _context: Context, guild: GuildId, user: User) {
        self.observe(Observation::MemberRemoved {
            guild,
            user: convert::user_ref(&user),
            banned: true,
        });
    }

    async fn guild_ban_removal(&self, _context: Context, guild: GuildId, user: User) {
        self.log(LogEvent::MemberUnbanned {
            guild,
            user: convert::user_ref(&user),
        });
    }

    async fn voice_state_update(&self, _context: Context, old: Option<VoiceState>, new: VoiceState) {
        self.log(LogEvent::VoiceStateChanged {
            guild: new.guild_id,
            user: new.user_id,
            before: old.and_then(|s| s.channel_id),
            after: new.channel_id,
        });
    }

    async fn presence_update(&self, _context: Context, presence: Presence) {
        self.observe(Observation::PresenceChanged {
            guild: presence.guild_id,
            user: presence.user.id,
            state: convert::presence_state(&presence),
        });
    }

    async fn channel_create(&self, _context: Context, channel: GuildChannel) {
        self.log(LogEvent::ChannelCreated {
            guild: channel.guild_id,
            channel: convert::channel_ref(&channel),
        });
    }

    async fn channel_delete(&self, _context: Context, channel: GuildChannel, _messages: Option<Vec<Message>>) {
        self.log(LogEvent::ChannelDeleted {
            guild: channel.guild_id,
            channel: convert::channel_ref(&channel),
        });
    }

    async fn channel_update(&self, _context: Context, old: Option<GuildChannel>, new: GuildChannel) {
        self.log(LogEvent::ChannelUpdated {
            guild: new.guild_id,
            channel: convert::channel_ref(&new),
            before: old.as_ref().map(convert::channel_state),
            after: convert::channel_state(&new),
        });
    }

    async fn channel_pins_update(&self, _context: Context, pin: ChannelPinsUpdateEvent) {
        self.log(LogEvent::ChannelPinsUpdated {
            guild: pin.guild_id,
            channel: pin.channel_id,
            last_pin: pin.last_pin_timestamp.and_then(convert::timestamp),
        });
    }

    async fn guild_role_create(&self, _context: Context, role: Role) {
        self.log(LogEvent::RoleCreated {
            guild: role.guild_id,
            role: role.id,
            state: convert::role_state(&role),
        });
    }

    async fn guild_role_delete(&self, _context: Context, guild: GuildId, role: RoleId, data: Option<Role>) {
        self.log(LogEvent::RoleDeleted {
            guild,
            role,
            name: data.map(|r| r.name),
        });
    }

    async fn guild_role_update(&self, _context: Context, old: Option<Role>, new: Role) {
        self.log(LogEvent::RoleUpdated {
            guild: new.guild_id,
            role: new.id,
            before: old.as_ref().map(convert::role_state),
            after: convert::role_state(&new),
        });
    }

    async fn guild_emojis_update(&self, _context: Context, guild: GuildId, emojis: HashMap<EmojiId, Emoji>) {
        self.observe(Observation::EmojisChanged {
            guild,
            emojis: convert::emoji_assets(&emojis),
        });
    }

    async fn guild_stickers_update(
        &self,
        _context: Context,
        guild: GuildId,
        stickers: HashMap<StickerId, Sticker>,
    ) {
        self.observe(Observation::StickersChanged {
            guild,
            stickers: convert::sticker_assets(&stickers),
        });
    }

    async fn invite_create(&self, _context: Context, invite: InviteCreateEvent) {
        self.log(LogEvent::InviteCreated {
            guild: invite.guild_id,
            channel: invite.channel_id,
            code: invite.code.clone(),
            inviter: invite.inviter.as_ref().map(convert::user_ref),
            max_uses: u32::from(invite.max_uses),
            max_age: invite.max_age,
        });
    }

    async fn invite_delete(&self, _context: Context, invite: InviteDeleteEvent) {
        self.log(LogEvent::InviteDeleted {
            guild: invite.guild_id,
            channel: invite.channel_id,
            code: invite.code,
        });
    }

    async fn reaction_add(&self, _context: Context, reaction: Reaction) {
        self.log(LogEvent::ReactionAdded {
            guild: reaction.guild_id,
            channel: reaction.channel_id,
            message: reaction.message_id,
            user: reaction.user_id,
            emoji: reaction.emoji.to_string(),
        });
    }

    async fn reaction_remove(&self, _context: Context, reaction: Reaction) {
        self.log(LogEvent::ReactionRemoved {
            guild: reaction.guild_id,
            channel: reaction.channel_id,
            message: reaction.message_id,
            user: reaction.user_id,
            emoji: reaction.emoji.to_string(),
        });
    }

    async fn reaction_remove_all(&self, context: Context, channel: ChannelId, message: MessageId) {
        let guild = cached_guild_of(&context.cache, channel);
        self.log(LogEvent::ReactionsCleared {
            guild,
            channel,
            message,
        });
    }

    async fn reaction_remove_emoji(&self, _context: Context, reaction: Reaction) {
        self.log(LogEvent::ReactionEmojiCleared {
            guild: reaction.guild_id,
            channel: reaction.channel_id,
            message: reaction.message_id,
            emoji: reaction.emoji.to_string(),
        });
    }

    async fn thread_create(&self, _context: Context, thread: GuildChannel) {
        self.log(LogEvent::ThreadCreated {
            guild: thread.guild_id,
            thread: convert::channel_ref(&thread),
            parent: thread.parent_id,
        });
    }

    async fn thread_update(&self, _context: Context, old: Option<GuildChannel>, new: GuildChannel) {
        self.log(LogEvent::ThreadUpdated {
            guild: new.guild_id,
            thread: convert::channel_ref(&new),
            before: old.as_ref().map(convert::thread_state),
            after: convert::thread_state(&new),
        });
    }

    async fn thread_delete(&self, _context: Context, thread: PartialGuildChannel, full: Option<GuildChannel>) {
        self.log(LogEvent::ThreadDeleted {
            guild: thread.guild_id,
            thread: thread.id,
            name: full.map(|t| t.name),
            parent: Some(thread.parent_id),
        });
    }

    async fn thread_members_update(&self, _context: Context, update: ThreadMembersUpdateEvent) {
        self.log(LogEvent::ThreadMembersUpdated {
            guild: update.guild_id,
            thread: update.id,
            added: update.added_members.iter().map(|m| m.user_id).collect(),
            removed: update.removed_member_ids.clone(),
        });
    }

    async fn integration_create(&self, _context: Context, integration: Integration) {
        self.log(LogEvent::IntegrationCreated {
            id: integration.id.get(),
            name: integration.name,
            kind: integration.kind,
        });
    }

    async fn integration_update(&self, _context: Context, integration: Integration) {
        self.log(LogEvent::IntegrationUpdated {
            id: integration.id.get(),
            name: integration.name,
            kind: integration.kind,
        });
    }

    async fn integration_delete(
        &self,
        _context: Context,
        integration: IntegrationId,
        guild: GuildId,
        _application: Option<ApplicationId>,
    ) {
        self.log(LogEvent::IntegrationDeleted {
            guild,
            id: integration.get(),
        });
    }

    async fn webhook_update(&self, _context: Context, guild: GuildId, channel: ChannelId) {
        self.log(LogEvent::WebhooksUpdated { guild, channel });
    }

    async fn guild_scheduled_event_create(&self, _context: Context, event: ScheduledEvent) {
        self.observe(Observation::ScheduledEventCreated {
            guild: event.guild_id,
            id: event.id.get(),
            state: convert::scheduled_event_state(&event),
            creator: event.creator_id,
        });
    }

    async fn guild_scheduled_event_update(&self, _context: Context, event: ScheduledEvent) {
        self.observe(Observation::ScheduledEventUpdated {
            guild: event.guild_id,
            id: event.id.get(),
            state: convert::scheduled_event_state(&event),
        });
    }

    async fn guild_scheduled_event_delete(&self, _context: Context, event: ScheduledEvent) {
        self.observe(Observation::ScheduledEventDeleted {
            guild: event.guild_id,
            id: event.id.get(),
            state: convert::scheduled_event_state(&event),
        });
    }

    async fn auto_moderation_rule_create(&self, _context: Context, rule: Rule) {
        self.observe(Observation::AutoModRuleCreated {
            guild: rule.guild_id,
            id: rule.id.get(),
            state: convert::automod_rule_state(&rule),
            creator: rule.creator_id,
        });
    }

    async fn auto_moderation_rule_update(&self, _context: Context, rule: Rule) {
        self.observe(Observation::AutoModRuleUpdated {
            guild: rule.guild_id,
            id: rule.id.get(),
            state: convert::automod_rule_state(&rule),
        });
    }

    async fn auto_moderation_rule_delete(&self, _context: Context, rule: Rule) {
        self.observe(Observation::AutoModRuleDeleted {
            guild: rule.guild_id,
            id: rule.id.get(),
            state: convert::automod_rule_state(&rule),
        });
    }

    async fn guild_audit_log_entry_create(&self, _context: Context, entry: AuditLogEntry, guild: GuildId) {
        self.log(LogEvent::AuditLogEntryCreated {
            guild,
            entry: entry.id.get(),
            action: format!("{:?}", entry.action),
            user: Some(entry.user_id),
            target: entry.target_id.map(|t| t.get()),
            reason: entry.reason.clone(),
        });
    }
}
