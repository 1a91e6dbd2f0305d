//! Event to notification rendering.
//!
//! [`render`] is a pure function of the event: same input, same titles,
//! same field order, same tone. Each event kind has exactly one arm.

use chrono::{DateTime, Utc};
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};
use serenity::model::mention::Mentionable;

use crate::logger::diff::{diff, diff_by};
use crate::logger::event::*;
use crate::logger::record::{truncate, Notification, Tone};

/// Individual items rendered inline for bulk events.
pub const BULK_PREVIEW_LIMIT: usize = 5;

/// Characters of message content shown per bulk preview entry.
pub const PREVIEW_CONTENT_LIMIT: usize = 150;

const NONE: &str = "*none*";
const UNKNOWN: &str = "*unknown*";
const NOT_CACHED: &str = "*not cached*";

/// Build the notifications for one event.
///
/// Returns an empty list when an update changed none of its watched fields
/// or when the previous state is unknown.
pub fn render(event: &LogEvent) -> Vec<Notification> {
    match event {
        LogEvent::MessagePosted(message) => vec![message_posted(message)],
        LogEvent::MessageEdited {
            guild,
            channel,
            message,
            author,
            before,
            after,
        } => message_edited(*guild, *channel, *message, author.as_ref(), before.as_deref(), after)
            .into_iter()
            .collect(),
        LogEvent::MessageDeleted {
            channel,
            message,
            cached,
            ..
        } => vec![message_deleted(*channel, *message, cached.as_ref())],
        LogEvent::MessagesBulkDeleted {
            channel,
            messages,
            cached,
            ..
        } => vec![messages_bulk_deleted(*channel, messages, cached)],

        LogEvent::MemberJoined {
            user,
            account_created,
            ..
        } => vec![Notification::new("Member Joined", Tone::Affirmative)
            .field("Member", user.label())
            .field("Account Created", time_or(account_created.as_ref(), UNKNOWN))
            .footer(format!("User ID: {}", user.id))],
        LogEvent::MemberLeft { user, .. } => vec![member_notice("Member Left", Tone::Severe, user)],
        LogEvent::MemberBanned { user, .. } => {
            vec![member_notice("Member Banned", Tone::Severe, user)]
        }
        LogEvent::MemberUnbanned { user, .. } => {
            vec![member_notice("Member Unbanned", Tone::Affirmative, user)]
        }
        LogEvent::MemberUpdated {
            user,
            before,
            after,
            ..
        } => match before {
            Some(before) => member_updated(user, before, after),
            None => Vec::new(),
        },
        LogEvent::VoiceStateChanged {
            user,
            before,
            after,
            ..
        } => voice_state_changed(*user, *before, *after).into_iter().collect(),
        LogEvent::PresenceChanged {
            user,
            before,
            after,
            ..
        } => match before {
            Some(before) => presence_changed(*user, before, after),
            None => Vec::new(),
        },

        LogEvent::ChannelCreated { channel, .. } => {
            vec![Notification::new("Channel Created", Tone::Affirmative)
                .field("Channel", format!("{} (#{})", channel.id.mention(), channel.name))
                .field("Type", &channel.kind)
                .footer(format!("Channel ID: {}", channel.id))]
        }
        LogEvent::ChannelDeleted { channel, .. } => {
            vec![Notification::new("Channel Deleted", Tone::Alerting)
                .field("Channel", format!("#{}", channel.name))
                .field("Type", &channel.kind)
                .footer(format!("Channel ID: {}", channel.id))]
        }
        LogEvent::ChannelUpdated {
            channel,
            before,
            after,
            ..
        } => match before {
            Some(before) => channel_updated(channel, before, after).into_iter().collect(),
            None => Vec::new(),
        },
        LogEvent::ChannelPinsUpdated {
            channel, last_pin, ..
        } => vec![Notification::new("Channel Pins Updated", Tone::Informational)
            .field("Channel", channel.mention().to_string())
            .field("Last Pin", time_or(last_pin.as_ref(), NONE))],

        LogEvent::RoleCreated { role, state, .. } => {
            vec![Notification::new("Role Created", Tone::Affirmative)
                .field("Role", role.mention().to_string())
                .field("Name", &state.name)
                .field("Colour", colour_hex(state.colour))
                .footer(format!("Role ID: {}", role))]
        }
        LogEvent::RoleDeleted { role, name, .. } => {
            vec![Notification::new("Role Deleted", Tone::Alerting)
                .field("Role", name.as_deref().unwrap_or(UNKNOWN))
                .footer(format!("Role ID: {}", role))]
        }
        LogEvent::RoleUpdated {
            role,
            before,
            after,
            ..
        } => match before {
            Some(before) => role_updated(role.mention().to_string(), before, after)
                .into_iter()
                .collect(),
            None => Vec::new(),
        },

        LogEvent::GuildJoined {
            guild,
            name,
            member_count,
        } => vec![Notification::new("Joined Guild", Tone::Affirmative)
            .field("Guild", name)
            .field("Members", member_count.to_string())
            .footer(format!("Guild ID: {}", guild))],
        LogEvent::GuildLeft { guild, name } => {
            vec![Notification::new("Left Guild", Tone::Severe)
                .field("Guild", name.as_deref().unwrap_or(UNKNOWN))
                .footer(format!("Guild ID: {}", guild))]
        }
        LogEvent::GuildUpdated { before, after, .. } => match before {
            Some(before) => guild_updated(before, after).into_iter().collect(),
            None => Vec::new(),
        },
        LogEvent::EmojisUpdated { before, after, .. } => match before {
            Some(before) => assets_updated("Emoji", before, after),
            None => Vec::new(),
        },
        LogEvent::StickersUpdated { before, after, .. } => match before {
            Some(before) => assets_updated("Sticker", before, after),
            None => Vec::new(),
        },

        LogEvent::InviteCreated {
            channel,
            code,
            inviter,
            max_uses,
            max_age,
            ..
        } => vec![Notification::new("Invite Created", Tone::Affirmative)
            .field("Code", code)
            .field("Channel", channel.mention().to_string())
            .field("Author", inviter.as_ref().map(UserRef::label).unwrap_or_else(|| UNKNOWN.to_string()))
            .field("Max Uses", if *max_uses == 0 { "unlimited".to_string() } else { max_uses.to_string() })
            .field("Expires", expiry(*max_age))],
        LogEvent::InviteDeleted { channel, code, .. } => {
            vec![Notification::new("Invite Deleted", Tone::Alerting)
                .field("Code", code)
                .field("Channel", channel.mention().to_string())]
        }

        LogEvent::ReactionAdded {
            guild,
            channel,
            message,
            user,
            emoji,
        } => vec![reaction("Reaction Added", Tone::Affirmative, *guild, *channel, *message, *user, emoji)],
        LogEvent::ReactionRemoved {
            guild,
            channel,
            message,
            user,
            emoji,
        } => vec![reaction("Reaction Removed", Tone::Alerting, *guild, *channel, *message, *user, emoji)],
        LogEvent::ReactionsCleared {
            guild,
            channel,
            message,
        } => vec![Notification::new("Reactions Cleared", Tone::Alerting)
            .field("Channel", channel.mention().to_string())
            .field("Message", jump_url(*guild, *channel, *message))],
        LogEvent::ReactionEmojiCleared {
            guild,
            channel,
            message,
            emoji,
        } => vec![Notification::new("Reaction Emoji Cleared", Tone::Alerting)
            .field("Emoji", emoji)
            .field("Channel", channel.mention().to_string())
            .field("Message", jump_url(*guild, *channel, *message))],

        LogEvent::ThreadCreated { thread, parent, .. } => {
            vec![Notification::new("Thread Created", Tone::Affirmative)
                .field("Thread", format!("{} ({})", thread.id.mention(), thread.name))
                .field("Parent", channel_or_none(*parent))]
        }
        LogEvent::ThreadUpdated {
            thread,
            before,
            after,
            ..
        } => match before {
            Some(before) => thread_updated(thread, before, after).into_iter().collect(),
            None => Vec::new(),
        },
        LogEvent::ThreadDeleted {
            thread,
            name,
            parent,
            ..
        } => vec![Notification::new("Thread Deleted", Tone::Alerting)
            .field("Thread", name.as_deref().unwrap_or(UNKNOWN))
            .field("Parent", channel_or_none(*parent))
            .footer(format!("Thread ID: {}", thread))],
        LogEvent::ThreadMembersUpdated {
            thread,
            added,
            removed,
            ..
        } => thread_members_updated(*thread, added, removed),

        LogEvent::IntegrationCreated { id, name, kind } => {
            vec![integration("Integration Created", Tone::Affirmative, *id, name, kind)]
        }
        LogEvent::IntegrationUpdated { id, name, kind } => {
            vec![integration("Integration Updated", Tone::Neutral, *id, name, kind)]
        }
        LogEvent::IntegrationDeleted { id, .. } => {
            vec![Notification::new("Integration Deleted", Tone::Alerting)
                .field("Integration ID", id.to_string())]
        }
        LogEvent::WebhooksUpdated { channel, .. } => {
            vec![Notification::new("Webhooks Updated", Tone::Informational)
                .field("Channel", channel.mention().to_string())]
        }

        LogEvent::ScheduledEventCreated {
            id, state, creator, ..
        } => vec![scheduled_event("Scheduled Event Created", Tone::Affirmative, *id, state)
            .field("Creator", user_or_unknown(*creator))],
        LogEvent::ScheduledEventUpdated {
            id, before, after, ..
        } => match before {
            Some(before) => scheduled_event_updated(*id, before, after).into_iter().collect(),
            None => Vec::new(),
        },
        LogEvent::ScheduledEventDeleted { id, state, .. } => {
            vec![scheduled_event("Scheduled Event Deleted", Tone::Alerting, *id, state)]
        }

        LogEvent::AutoModRuleCreated {
            id, state, creator, ..
        } => vec![Notification::new("AutoMod Rule Created", Tone::Affirmative)
            .field("Rule", &state.name)
            .field("Enabled", yes_no(state.enabled))
            .field("Creator", creator.mention().to_string())
            .footer(format!("Rule ID: {}", id))],
        LogEvent::AutoModRuleUpdated {
            id, before, after, ..
        } => match before {
            Some(before) => automod_rule_updated(*id, before, after).into_iter().collect(),
            None => Vec::new(),
        },
        LogEvent::AutoModRuleDeleted { id, state, .. } => {
            vec![Notification::new("AutoMod Rule Deleted", Tone::Alerting)
                .field("Rule", &state.name)
                .footer(format!("Rule ID: {}", id))]
        }

        LogEvent::AuditLogEntryCreated {
            entry,
            action,
            user,
            target,
            reason,
            ..
        } => vec![Notification::new("Audit Log Entry", Tone::Informational)
            .field("Action", action)
            .field("User", user_or_unknown(*user))
            .field("Target", target.map(|t| t.to_string()).unwrap_or_else(|| NONE.to_string()))
            .field("Reason", reason.as_deref().unwrap_or(NONE))
            .footer(format!("Entry ID: {}", entry))],
    }
}

fn message_posted(message: &MessageSnapshot) -> Notification {
    let mut n = Notification::new("Message Log", Tone::Affirmative)
        .field("Author", message.author.label())
        .field("Channel", message.channel.mention().to_string())
        .field("Content", &message.content);
    if !message.attachments.is_empty() {
        n = n.field("Attachments", attachment_list(&message.attachments));
    }
    n.footer(format!("Message ID: {}", message.id))
        .timestamp(message.timestamp)
}

fn message_edited(
    guild: Option<GuildId>,
    channel: ChannelId,
    message: MessageId,
    author: Option<&UserRef>,
    before: Option<&str>,
    after: &str,
) -> Option<Notification> {
    // Uncached messages also get updates for pins and embeds, not only edits.
    let before = before?;
    if before == after {
        return None;
    }
    Some(
        Notification::new("Message Edited", Tone::Neutral)
            .field("Author", author.map(UserRef::label).unwrap_or_else(|| UNKNOWN.to_string()))
            .field("Channel", channel.mention().to_string())
            .field("Before", before)
            .field("After", after)
            .field("Message", jump_url(guild, channel, message)),
    )
}

fn message_deleted(
    channel: ChannelId,
    message: MessageId,
    cached: Option<&MessageSnapshot>,
) -> Notification {
    let n = Notification::new("Message Deleted", Tone::Alerting);
    let n = match cached {
        Some(snapshot) => {
            let mut n = n
                .field("Author", snapshot.author.label())
                .field("Channel", channel.mention().to_string())
                .field("Content", &snapshot.content);
            if !snapshot.attachments.is_empty() {
                n = n.field("Attachments", attachment_list(&snapshot.attachments));
            }
            n
        }
        None => n
            .field("Channel", channel.mention().to_string())
            .field("Content", NOT_CACHED),
    };
    n.footer(format!("Message ID: {}", message))
}

fn messages_bulk_deleted(
    channel: ChannelId,
    messages: &[MessageId],
    cached: &[MessageSnapshot],
) -> Notification {
    let mut n = Notification::new("Bulk Message Delete", Tone::Alerting)
        .field("Channel", channel.mention().to_string())
        .field("Message Count", messages.len().to_string());

    for (index, id) in messages.iter().take(BULK_PREVIEW_LIMIT).enumerate() {
        let preview = match cached.iter().find(|m| m.id == *id) {
            Some(m) => format!(
                "{}: {}",
                m.author.label(),
                truncate(&m.content, PREVIEW_CONTENT_LIMIT)
            ),
            None => format!("`{}` {}", id, NOT_CACHED),
        };
        n = n.field(format!("Message #{}", index + 1), preview);
    }

    if messages.len() > BULK_PREVIEW_LIMIT {
        n = n.footer(format!("and {} more", messages.len() - BULK_PREVIEW_LIMIT));
    }
    n
}

fn member_notice(title: &str, tone: Tone, user: &UserRef) -> Notification {
    Notification::new(title, tone)
        .field("Member", user.label())
        .footer(format!("User ID: {}", user.id))
}

fn member_updated(user: &UserRef, before: &MemberState, after: &MemberState) -> Vec<Notification> {
    let mut out = Vec::new();

    let roles = diff(&before.roles, &after.roles);
    if !roles.is_empty() {
        out.push(
            Notification::new("Roles Updated", Tone::Neutral)
                .field("Member", user.label())
                .field("Added", mention_list(roles.added.iter().map(|r| r.mention().to_string())))
                .field("Removed", mention_list(roles.removed.iter().map(|r| r.mention().to_string()))),
        );
    }

    if before.nick != after.nick {
        out.push(
            Notification::new("Nickname Updated", Tone::Neutral)
                .field("Member", user.label())
                .field("Before", before.nick.as_deref().unwrap_or(NONE))
                .field("After", after.nick.as_deref().unwrap_or(NONE)),
        );
    }

    if before.username != after.username {
        out.push(
            Notification::new("Username Updated", Tone::Neutral)
                .field("Member", user.label())
                .field("Before", &before.username)
                .field("After", &after.username),
        );
    }

    out
}

fn voice_state_changed(
    user: UserId,
    before: Option<ChannelId>,
    after: Option<ChannelId>,
) -> Option<Notification> {
    let n = match (before, after) {
        (Some(old), Some(new)) if old == new => return None,
        (None, None) => return None,
        (None, Some(new)) => Notification::new("Voice Channel Joined", Tone::Affirmative)
            .field("Member", user.mention().to_string())
            .field("Channel", new.mention().to_string()),
        (Some(old), None) => Notification::new("Voice Channel Left", Tone::Alerting)
            .field("Member", user.mention().to_string())
            .field("Channel", old.mention().to_string()),
        (Some(old), Some(new)) => Notification::new("Voice Channel Moved", Tone::Neutral)
            .field("Member", user.mention().to_string())
            .field("Before", old.mention().to_string())
            .field("After", new.mention().to_string()),
    };
    Some(n)
}

fn presence_changed(user: UserId, before: &PresenceState, after: &PresenceState) -> Vec<Notification> {
    let mut out = Vec::new();

    if before.status != after.status {
        out.push(
            Notification::new("Status Updated", Tone::Informational)
                .field("Member", user.mention().to_string())
                .field("Before", &before.status)
                .field("After", &after.status),
        );
    }

    if before.activity != after.activity {
        out.push(
            Notification::new("Activity Updated", Tone::Informational)
                .field("Member", user.mention().to_string())
                .field("Before", before.activity.as_deref().unwrap_or(NONE))
                .field("After", after.activity.as_deref().unwrap_or(NONE)),
        );
    }

    out
}

/// Collects `before → after` lines for the watched fields that differ.
#[derive(Default)]
struct Changes(Vec<(&'static str, String)>);

impl Changes {
    fn watch<T: PartialEq>(&mut self, label: &'static str, before: &T, after: &T, show: impl Fn(&T) -> String) {
        if before != after {
            self.0.push((label, format!("{} → {}", show(before), show(after))));
        }
    }

    /// `None` when nothing watched changed.
    fn into_notification(self, base: Notification) -> Option<Notification> {
        if self.0.is_empty() {
            return None;
        }
        Some(self.0.into_iter().fold(base, |n, (label, value)| n.field(label, value)))
    }
}

fn channel_updated(channel: &ChannelRef, before: &ChannelState, after: &ChannelState) -> Option<Notification> {
    let mut changes = Changes::default();
    changes.watch("Name", &before.name, &after.name, |v| format!("`{}`", v));
    changes.watch("Topic", &before.topic, &after.topic, |v| text_or_none(v.as_deref()));
    changes.watch("NSFW", &before.nsfw, &after.nsfw, |v| yes_no(*v).to_string());
    changes.watch("Category", &before.parent, &after.parent, |v| channel_or_none(*v));

    changes.into_notification(
        Notification::new("Channel Updated", Tone::Neutral).field("Channel", channel.id.mention().to_string()),
    )
}

fn role_updated(role: String, before: &RoleState, after: &RoleState) -> Option<Notification> {
    let mut changes = Changes::default();
    changes.watch("Name", &before.name, &after.name, |v| format!("`{}`", v));
    changes.watch("Colour", &before.colour, &after.colour, |v| colour_hex(*v));
    changes.watch("Hoisted", &before.hoist, &after.hoist, |v| yes_no(*v).to_string());
    changes.watch("Mentionable", &before.mentionable, &after.mentionable, |v| yes_no(*v).to_string());
    changes.watch("Permissions", &before.permissions, &after.permissions, |v| format!("`{:#x}`", v));

    changes.into_notification(Notification::new("Role Updated", Tone::Neutral).field("Role", role))
}

fn guild_updated(before: &GuildState, after: &GuildState) -> Option<Notification> {
    let mut changes = Changes::default();
    changes.watch("Name", &before.name, &after.name, |v| format!("`{}`", v));
    changes.watch("Description", &before.description, &after.description, |v| text_or_none(v.as_deref()));
    changes.watch("Icon", &before.icon, &after.icon, |v| text_or_none(v.as_deref()));

    changes.into_notification(Notification::new("Guild Updated", Tone::Neutral))
}

fn thread_updated(thread: &ChannelRef, before: &ThreadState, after: &ThreadState) -> Option<Notification> {
    let mut changes = Changes::default();
    changes.watch("Name", &before.name, &after.name, |v| format!("`{}`", v));
    changes.watch("Archived", &before.archived, &after.archived, |v| yes_no(*v).to_string());
    changes.watch("Locked", &before.locked, &after.locked, |v| yes_no(*v).to_string());

    changes.into_notification(
        Notification::new("Thread Updated", Tone::Neutral).field("Thread", thread.id.mention().to_string()),
    )
}

fn scheduled_event_updated(
    id: u64,
    before: &ScheduledEventState,
    after: &ScheduledEventState,
) -> Option<Notification> {
    let mut changes = Changes::default();
    changes.watch("Name", &before.name, &after.name, |v| format!("`{}`", v));
    changes.watch("Description", &before.description, &after.description, |v| text_or_none(v.as_deref()));
    changes.watch("Status", &before.status, &after.status, |v| v.clone());
    changes.watch("Starts", &before.start, &after.start, |v| time_or(v.as_ref(), NONE));
    changes.watch("Channel", &before.channel, &after.channel, |v| channel_or_none(*v));

    changes.into_notification(
        Notification::new("Scheduled Event Updated", Tone::Neutral)
            .field("Event", &after.name)
            .footer(format!("Event ID: {}", id)),
    )
}

fn automod_rule_updated(id: u64, before: &AutoModRuleState, after: &AutoModRuleState) -> Option<Notification> {
    let mut changes = Changes::default();
    changes.watch("Name", &before.name, &after.name, |v| format!("`{}`", v));
    changes.watch("Enabled", &before.enabled, &after.enabled, |v| yes_no(*v).to_string());

    changes.into_notification(
        Notification::new("AutoMod Rule Updated", Tone::Neutral)
            .field("Rule", &after.name)
            .footer(format!("Rule ID: {}", id)),
    )
}

/// Added and removed are reported independently, so one update can yield two records.
fn assets_updated(noun: &str, before: &[Asset], after: &[Asset]) -> Vec<Notification> {
    let change = diff_by(before, after, |asset| asset.id);
    let mut out = Vec::new();

    if !change.added.is_empty() {
        out.push(
            Notification::new(format!("{} Added", noun), Tone::Affirmative)
                .field(noun, mention_list(change.added.iter().map(|a| a.display.clone()))),
        );
    }
    if !change.removed.is_empty() {
        out.push(
            Notification::new(format!("{} Removed", noun), Tone::Alerting)
                .field(noun, mention_list(change.removed.iter().map(|a| a.name.clone()))),
        );
    }

    out
}

fn thread_members_updated(thread: ChannelId, added: &[UserId], removed: &[UserId]) -> Vec<Notification> {
    let mut out = Vec::new();

    if !added.is_empty() {
        out.push(
            Notification::new("Users Joined Thread", Tone::Affirmative)
                .field("Thread", thread.mention().to_string())
                .field("Users", mention_list(added.iter().map(|u| u.mention().to_string()))),
        );
    }
    if !removed.is_empty() {
        out.push(
            Notification::new("Users Left Thread", Tone::Alerting)
                .field("Thread", thread.mention().to_string())
                .field("Users", mention_list(removed.iter().map(|u| u.mention().to_string()))),
        );
    }

    out
}

fn reaction(
    title: &str,
    tone: Tone,
    guild: Option<GuildId>,
    channel: ChannelId,
    message: MessageId,
    user: Option<UserId>,
    emoji: &str,
) -> Notification {
    Notification::new(title, tone)
        .field("User", user_or_unknown(user))
        .field("Channel", channel.mention().to_string())
        .field("Message", jump_url(guild, channel, message))
        .field("Emoji", emoji)
}

fn integration(title: &str, tone: Tone, id: u64, name: &str, kind: &str) -> Notification {
    Notification::new(title, tone)
        .field("Integration", name)
        .field("Type", kind)
        .footer(format!("Integration ID: {}", id))
}

fn scheduled_event(title: &str, tone: Tone, id: u64, state: &ScheduledEventState) -> Notification {
    Notification::new(title, tone)
        .field("Event", &state.name)
        .field("Starts", time_or(state.start.as_ref(), UNKNOWN))
        .field("Channel", channel_or_none(state.channel))
        .field("Status", &state.status)
        .footer(format!("Event ID: {}", id))
}

/// Link that opens the message in the client.
pub fn jump_url(guild: Option<GuildId>, channel: ChannelId, message: MessageId) -> String {
    let scope = guild.map(|g| g.to_string()).unwrap_or_else(|| "@me".to_string());
    format!("https://discord.com/channels/{}/{}/{}", scope, channel, message)
}

/// Discord timestamp markup, rendered in the reader's timezone.
fn time_or(at: Option<&DateTime<Utc>>, fallback: &str) -> String {
    at.map(|t| format!("<t:{}:F>", t.timestamp()))
        .unwrap_or_else(|| fallback.to_string())
}

fn attachment_list(attachments: &[AttachmentRef]) -> String {
    attachments
        .iter()
        .map(|a| format!("[{}]({})", a.filename, a.url))
        .collect::<Vec<_>>()
        .join("\n")
}

fn mention_list(items: impl Iterator<Item = String>) -> String {
    let joined = items.collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        NONE.to_string()
    } else {
        joined
    }
}

fn user_or_unknown(user: Option<UserId>) -> String {
    user.map(|u| u.mention().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn channel_or_none(channel: Option<ChannelId>) -> String {
    channel
        .map(|c| c.mention().to_string())
        .unwrap_or_else(|| NONE.to_string())
}

fn text_or_none(text: Option<&str>) -> String {
    match text {
        Some(t) if !t.is_empty() => truncate(t, PREVIEW_CONTENT_LIMIT),
        _ => NONE.to_string(),
    }
}

fn colour_hex(colour: u32) -> String {
    format!("#{:06X}", colour)
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn expiry(max_age: u32) -> String {
    match max_age {
        0 => "never".to_string(),
        secs if secs % 86_400 == 0 => format!("{} day(s)", secs / 86_400),
        secs if secs % 3_600 == 0 => format!("{} hour(s)", secs / 3_600),
        secs if secs % 60 == 0 => format!("{} minute(s)", secs / 60),
        secs => format!("{} second(s)", secs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::record::{FIELD_VALUE_LIMIT, TRUNCATION_MARKER};
    use crate::logger::tracker::{Observation, SnapshotTracker};
    use serenity::model::id::RoleId;

    fn user(id: u64, name: &str) -> UserRef {
        UserRef {
            id: UserId::new(id),
            name: name.to_string(),
            bot: false,
        }
    }

    fn snapshot(id: u64, content: &str) -> MessageSnapshot {
        MessageSnapshot {
            id: MessageId::new(id),
            channel: ChannelId::new(10),
            guild: Some(GuildId::new(1)),
            author: user(5, "ada"),
            content: content.to_string(),
            attachments: Vec::new(),
            timestamp: None,
        }
    }

    fn member(username: &str, nick: Option<&str>, roles: &[u64]) -> MemberState {
        MemberState {
            username: username.to_string(),
            nick: nick.map(str::to_string),
            roles: roles.iter().map(|r| RoleId::new(*r)).collect(),
        }
    }

    fn asset(id: u64, name: &str) -> Asset {
        Asset {
            id,
            name: name.to_string(),
            display: format!("<:{}:{}>", name, id),
        }
    }

    fn titles(notifications: &[Notification]) -> Vec<&str> {
        notifications.iter().map(|n| n.title.as_str()).collect()
    }

    #[test]
    fn test_message_posted_fields() {
        let mut message = snapshot(100, "hello");
        message.attachments.push(AttachmentRef {
            filename: "cat.png".to_string(),
            url: "https://cdn/cat.png".to_string(),
        });

        let out = render(&LogEvent::MessagePosted(message));
        assert_eq!(out.len(), 1);
        let n = &out[0];
        assert_eq!(n.title, "Message Log");
        assert_eq!(n.tone, Tone::Affirmative);
        assert_eq!(n.value_of("Author"), Some("<@5> (ada)"));
        assert_eq!(n.value_of("Channel"), Some("<#10>"));
        assert_eq!(n.value_of("Content"), Some("hello"));
        assert_eq!(n.value_of("Attachments"), Some("[cat.png](https://cdn/cat.png)"));
    }

    #[test]
    fn test_long_content_is_truncated() {
        let content = "z".repeat(2000);
        let out = render(&LogEvent::MessagePosted(snapshot(1, &content)));

        let value = out[0].value_of("Content").unwrap();
        assert_eq!(value, format!("{}{}", "z".repeat(FIELD_VALUE_LIMIT), TRUNCATION_MARKER));
    }

    #[test]
    fn test_empty_content_gets_placeholder() {
        let out = render(&LogEvent::MessagePosted(snapshot(1, "")));
        assert_eq!(out[0].value_of("Content"), Some("*empty*"));
    }

    #[test]
    fn test_message_edit_unchanged_content_is_silent() {
        let event = LogEvent::MessageEdited {
            guild: None,
            channel: ChannelId::new(10),
            message: MessageId::new(1),
            author: Some(user(5, "ada")),
            before: Some("same".to_string()),
            after: "same".to_string(),
        };
        assert!(render(&event).is_empty());
    }

    #[test]
    fn test_message_edit_unknown_before_is_silent() {
        let event = LogEvent::MessageEdited {
            guild: Some(GuildId::new(1)),
            channel: ChannelId::new(10),
            message: MessageId::new(3),
            author: None,
            before: None,
            after: "new".to_string(),
        };
        assert!(render(&event).is_empty());
    }

    #[test]
    fn test_uncached_edit_through_tracker_is_silent() {
        let mut tracker = SnapshotTracker::default();
        let event = tracker
            .observe(Observation::MessageEdited {
                guild: Some(GuildId::new(1)),
                channel: ChannelId::new(10),
                message: MessageId::new(7),
                author: None,
                content: Some("unchanged text".to_string()),
            })
            .unwrap();
        assert!(render(&event).is_empty());
    }

    #[test]
    fn test_message_edit_links_to_message() {
        let event = LogEvent::MessageEdited {
            guild: Some(GuildId::new(1)),
            channel: ChannelId::new(10),
            message: MessageId::new(3),
            author: None,
            before: Some("old".to_string()),
            after: "new".to_string(),
        };
        let out = render(&event);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value_of("Before"), Some("old"));
        assert_eq!(out[0].value_of("Author"), Some("*unknown*"));
        assert_eq!(
            out[0].value_of("Message"),
            Some("https://discord.com/channels/1/10/3")
        );
    }

    #[test]
    fn test_message_deleted_uncached() {
        let event = LogEvent::MessageDeleted {
            guild: None,
            channel: ChannelId::new(10),
            message: MessageId::new(99),
            cached: None,
        };
        let out = render(&event);
        assert_eq!(out[0].tone, Tone::Alerting);
        assert_eq!(out[0].value_of("Content"), Some("*not cached*"));
        assert_eq!(out[0].footer.as_deref(), Some("Message ID: 99"));
    }

    #[test]
    fn test_bulk_delete_preview_is_bounded() {
        let ids: Vec<MessageId> = (1..=12).map(MessageId::new).collect();
        let cached = vec![snapshot(2, "second")];
        let event = LogEvent::MessagesBulkDeleted {
            guild: None,
            channel: ChannelId::new(10),
            messages: ids,
            cached,
        };

        let out = render(&event);
        assert_eq!(out.len(), 1);
        let n = &out[0];
        assert_eq!(n.value_of("Message Count"), Some("12"));
        let previews = n.fields.iter().filter(|f| f.label.starts_with("Message #")).count();
        assert_eq!(previews, BULK_PREVIEW_LIMIT);
        assert_eq!(n.value_of("Message #2"), Some("<@5> (ada): second"));
        assert_eq!(n.value_of("Message #1"), Some("`1` *not cached*"));
        assert_eq!(n.footer.as_deref(), Some("and 7 more"));
    }

    #[test]
    fn test_bulk_delete_small_batch_has_no_footer() {
        let event = LogEvent::MessagesBulkDeleted {
            guild: None,
            channel: ChannelId::new(10),
            messages: vec![MessageId::new(1), MessageId::new(2)],
            cached: Vec::new(),
        };
        let out = render(&event);
        assert_eq!(out[0].fields.iter().filter(|f| f.label.starts_with("Message #")).count(), 2);
        assert!(out[0].footer.is_none());
    }

    #[test]
    fn test_member_update_roles_and_nick_yield_two() {
        let event = LogEvent::MemberUpdated {
            guild: GuildId::new(1),
            user: user(5, "ada"),
            before: Some(member("ada", None, &[1, 2])),
            after: member("ada", Some("Countess"), &[2, 3]),
        };

        let out = render(&event);
        assert_eq!(titles(&out), vec!["Roles Updated", "Nickname Updated"]);
        assert_eq!(out[0].value_of("Added"), Some("<@&3>"));
        assert_eq!(out[0].value_of("Removed"), Some("<@&1>"));
        assert_eq!(out[1].value_of("Before"), Some("*none*"));
        assert_eq!(out[1].value_of("After"), Some("Countess"));
    }

    #[test]
    fn test_member_update_only_added_roles() {
        let event = LogEvent::MemberUpdated {
            guild: GuildId::new(1),
            user: user(5, "ada"),
            before: Some(member("ada", None, &[1])),
            after: member("ada", None, &[1, 4]),
        };
        let out = render(&event);
        assert_eq!(titles(&out), vec!["Roles Updated"]);
        assert_eq!(out[0].value_of("Removed"), Some("*none*"));
    }

    #[test]
    fn test_member_update_without_changes_is_silent() {
        let state = member("ada", Some("Countess"), &[1, 2]);
        let event = LogEvent::MemberUpdated {
            guild: GuildId::new(1),
            user: user(5, "ada"),
            before: Some(state.clone()),
            after: state,
        };
        assert!(render(&event).is_empty());
    }

    #[test]
    fn test_member_update_unknown_before_is_silent() {
        let event = LogEvent::MemberUpdated {
            guild: GuildId::new(1),
            user: user(5, "ada"),
            before: None,
            after: member("ada", None, &[]),
        };
        assert!(render(&event).is_empty());
    }

    #[test]
    fn test_username_change() {
        let event = LogEvent::MemberUpdated {
            guild: GuildId::new(1),
            user: user(5, "lovelace"),
            before: Some(member("ada", None, &[])),
            after: member("lovelace", None, &[]),
        };
        assert_eq!(titles(&render(&event)), vec!["Username Updated"]);
    }

    #[test]
    fn test_emoji_update_reports_both_sides() {
        let event = LogEvent::EmojisUpdated {
            guild: GuildId::new(1),
            before: Some(vec![asset(1, "A"), asset(2, "B")]),
            after: vec![asset(2, "B"), asset(3, "C")],
        };

        let out = render(&event);
        assert_eq!(titles(&out), vec!["Emoji Added", "Emoji Removed"]);
        assert_eq!(out[0].value_of("Emoji"), Some("<:C:3>"));
        assert_eq!(out[1].value_of("Emoji"), Some("A"));
    }

    #[test]
    fn test_sticker_rename_is_not_a_set_change() {
        let event = LogEvent::StickersUpdated {
            guild: GuildId::new(1),
            before: Some(vec![asset(1, "old")]),
            after: vec![asset(1, "new")],
        };
        assert!(render(&event).is_empty());
    }

    #[test]
    fn test_channel_update_lists_changed_fields_only() {
        let before = ChannelState {
            name: "general".to_string(),
            topic: None,
            nsfw: false,
            parent: None,
        };
        let mut after = before.clone();
        after.name = "lobby".to_string();
        after.nsfw = true;

        let event = LogEvent::ChannelUpdated {
            guild: GuildId::new(1),
            channel: ChannelRef {
                id: ChannelId::new(10),
                name: "lobby".to_string(),
                kind: "Text".to_string(),
            },
            before: Some(before.clone()),
            after,
        };

        let out = render(&event);
        assert_eq!(out.len(), 1);
        let labels: Vec<_> = out[0].fields.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["Channel", "Name", "NSFW"]);
        assert_eq!(out[0].value_of("Name"), Some("`general` → `lobby`"));

        let unchanged = LogEvent::ChannelUpdated {
            guild: GuildId::new(1),
            channel: ChannelRef {
                id: ChannelId::new(10),
                name: "general".to_string(),
                kind: "Text".to_string(),
            },
            before: Some(before.clone()),
            after: before,
        };
        assert!(render(&unchanged).is_empty());
    }

    #[test]
    fn test_each_role_field_triggers_alone() {
        let base = RoleState {
            name: "mods".to_string(),
            colour: 0x00FF00,
            hoist: false,
            mentionable: false,
            permissions: 0,
        };
        let variants = [
            RoleState { name: "admins".to_string(), ..base.clone() },
            RoleState { colour: 0xFF0000, ..base.clone() },
            RoleState { hoist: true, ..base.clone() },
            RoleState { mentionable: true, ..base.clone() },
            RoleState { permissions: 8, ..base.clone() },
        ];

        for after in variants {
            let event = LogEvent::RoleUpdated {
                guild: GuildId::new(1),
                role: serenity::model::id::RoleId::new(2),
                before: Some(base.clone()),
                after,
            };
            let out = render(&event);
            assert_eq!(out.len(), 1);
            assert_eq!(out[0].fields.len(), 2);
        }
    }

    #[test]
    fn test_voice_moves() {
        let join = LogEvent::VoiceStateChanged {
            guild: None,
            user: UserId::new(5),
            before: None,
            after: Some(ChannelId::new(20)),
        };
        assert_eq!(titles(&render(&join)), vec!["Voice Channel Joined"]);

        let mute = LogEvent::VoiceStateChanged {
            guild: None,
            user: UserId::new(5),
            before: Some(ChannelId::new(20)),
            after: Some(ChannelId::new(20)),
        };
        assert!(render(&mute).is_empty());

        let moved = LogEvent::VoiceStateChanged {
            guild: None,
            user: UserId::new(5),
            before: Some(ChannelId::new(20)),
            after: Some(ChannelId::new(21)),
        };
        assert_eq!(titles(&render(&moved)), vec!["Voice Channel Moved"]);
    }

    #[test]
    fn test_presence_status_and_activity_are_independent() {
        let event = LogEvent::PresenceChanged {
            guild: None,
            user: UserId::new(5),
            before: Some(PresenceState {
                status: "online".to_string(),
                activity: None,
            }),
            after: PresenceState {
                status: "idle".to_string(),
                activity: Some("Chess".to_string()),
            },
        };
        assert_eq!(titles(&render(&event)), vec!["Status Updated", "Activity Updated"]);
    }

    #[test]
    fn test_thread_members_both_sides() {
        let event = LogEvent::ThreadMembersUpdated {
            guild: GuildId::new(1),
            thread: ChannelId::new(30),
            added: vec![UserId::new(1)],
            removed: vec![UserId::new(2)],
        };
        let out = render(&event);
        assert_eq!(titles(&out), vec!["Users Joined Thread", "Users Left Thread"]);
        assert_eq!(out[0].value_of("Users"), Some("<@1>"));
        assert_eq!(out[1].value_of("Users"), Some("<@2>"));
    }

    #[test]
    fn test_invite_created() {
        let event = LogEvent::InviteCreated {
            guild: Some(GuildId::new(1)),
            channel: ChannelId::new(10),
            code: "abc".to_string(),
            inviter: None,
            max_uses: 0,
            max_age: 86_400,
        };
        let n = &render(&event)[0];
        assert_eq!(n.value_of("Code"), Some("abc"));
        assert_eq!(n.value_of("Author"), Some("*unknown*"));
        assert_eq!(n.value_of("Max Uses"), Some("unlimited"));
        assert_eq!(n.value_of("Expires"), Some("1 day(s)"));
    }

    #[test]
    fn test_audit_log_entry_raw_target() {
        let event = LogEvent::AuditLogEntryCreated {
            guild: GuildId::new(1),
            entry: 77,
            action: "Member(BanAdd)".to_string(),
            user: Some(UserId::new(5)),
            target: Some(6),
            reason: None,
        };
        let n = &render(&event)[0];
        assert_eq!(n.value_of("Action"), Some("Member(BanAdd)"));
        assert_eq!(n.value_of("Target"), Some("6"));
        assert_eq!(n.value_of("Reason"), Some("*none*"));
        assert_eq!(n.footer.as_deref(), Some("Entry ID: 77"));
    }

    #[test]
    fn test_scheduled_event_update() {
        let before = ScheduledEventState {
            name: "Raid".to_string(),
            description: None,
            status: "Scheduled".to_string(),
            start: None,
            channel: None,
        };
        let after = ScheduledEventState {
            status: "Active".to_string(),
            ..before.clone()
        };
        let out = render(&LogEvent::ScheduledEventUpdated {
            guild: GuildId::new(1),
            id: 9,
            before: Some(before),
            after,
        });
        assert_eq!(out[0].value_of("Status"), Some("Scheduled → Active"));
    }

    #[test]
    fn test_creation_and_deletion_tones() {
        let created = render(&LogEvent::RoleCreated {
            guild: GuildId::new(1),
            role: RoleId::new(2),
            state: RoleState {
                name: "mods".to_string(),
                colour: 0x3498DB,
                hoist: false,
                mentionable: true,
                permissions: 0,
            },
        });
        assert_eq!(created[0].tone, Tone::Affirmative);
        assert_eq!(created[0].value_of("Colour"), Some("#3498DB"));

        let deleted = render(&LogEvent::RoleDeleted {
            guild: GuildId::new(1),
            role: RoleId::new(2),
            name: None,
        });
        assert_eq!(deleted[0].tone, Tone::Alerting);
        assert_eq!(deleted[0].value_of("Role"), Some("*unknown*"));
    }
}
