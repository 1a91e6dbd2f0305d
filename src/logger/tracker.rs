//! Remembers the last known state of entities whose gateway events carry
//! only the new value, so updates can be rendered as before/after.

use std::collections::{HashMap, VecDeque};

use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};

use crate::logger::event::{
    Asset, AutoModRuleState, LogEvent, MessageSnapshot, PresenceState, ScheduledEventState,
    UserRef,
};

/// Messages kept for edit/delete lookups. Oldest are evicted first.
pub const RECENT_MESSAGE_CAPACITY: usize = 1000;

/// Raw facts fed in from the gateway. Most turn into a [`LogEvent`].
#[derive(Debug, Clone)]
pub enum Observation {
    MessagePosted(MessageSnapshot),
    MessageEdited {
        guild: Option<GuildId>,
        channel: ChannelId,
        message: MessageId,
        author: Option<UserRef>,
        /// `None` for embed-only updates, which are not edits.
        content: Option<String>,
    },
    MessageDeleted {
        guild: Option<GuildId>,
        channel: ChannelId,
        message: MessageId,
    },
    MessagesBulkDeleted {
        guild: Option<GuildId>,
        channel: ChannelId,
        messages: Vec<MessageId>,
    },
    /// Full guild snapshot from GUILD_CREATE; seeds every per-guild map.
    GuildAvailable {
        guild: GuildId,
        emojis: Vec<Asset>,
        stickers: Vec<Asset>,
        presences: Vec<(UserId, PresenceState)>,
        scheduled_events: Vec<(u64, ScheduledEventState)>,
    },
    GuildUnavailable {
        guild: GuildId,
    },
    EmojisChanged {
        guild: GuildId,
        emojis: Vec<Asset>,
    },
    StickersChanged {
        guild: GuildId,
        stickers: Vec<Asset>,
    },
    PresenceChanged {
        guild: Option<GuildId>,
        user: UserId,
        state: PresenceState,
    },
    /// Member left or was banned.
    MemberRemoved {
        guild: GuildId,
        user: UserRef,
        banned: bool,
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
        state: ScheduledEventState,
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
        state: AutoModRuleState,
    },
    AutoModRuleDeleted {
        guild: GuildId,
        id: u64,
        state: AutoModRuleState,
    },
}

#[derive(Debug)]
pub struct SnapshotTracker {
    capacity: usize,
    messages: HashMap<MessageId, MessageSnapshot>,
    message_order: VecDeque<MessageId>,
    emojis: HashMap<GuildId, Vec<Asset>>,
    stickers: HashMap<GuildId, Vec<Asset>>,
    presences: HashMap<(Option<GuildId>, UserId), PresenceState>,
    scheduled_events: HashMap<(GuildId, u64), ScheduledEventState>,
    automod_rules: HashMap<(GuildId, u64), AutoModRuleState>,
}

impl Default for SnapshotTracker {
    fn default() -> Self {
        Self::new(RECENT_MESSAGE_CAPACITY)
    }
}

impl SnapshotTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            messages: HashMap::new(),
            message_order: VecDeque::new(),
            emojis: HashMap::new(),
            stickers: HashMap::new(),
            presences: HashMap::new(),
            scheduled_events: HashMap::new(),
            automod_rules: HashMap::new(),
        }
    }

    #[cfg(test)]
    pub fn cached_messages(&self) -> usize {
        self.messages.len()
    }

    #[cfg(test)]
    pub fn tracked_presences(&self) -> usize {
        self.presences.len()
    }

    /// Record the observation and produce the event to log, if any.
    pub fn observe(&mut self, observation: Observation) -> Option<LogEvent> {
        match observation {
            Observation::MessagePosted(snapshot) => {
                self.remember_message(snapshot.clone());
                Some(LogEvent::MessagePosted(snapshot))
            }
            Observation::MessageEdited {
                guild,
                channel,
                message,
                author,
                content,
            } => {
                let after = content?;
                let cached = self.messages.get_mut(&message);
                let before = cached.as_ref().map(|m| m.content.clone());
                let author = author.or_else(|| cached.as_ref().map(|m| m.author.clone()));
                if let Some(snapshot) = cached {
                    snapshot.content = after.clone();
                }
                Some(LogEvent::MessageEdited {
                    guild,
                    channel,
                    message,
                    author,
                    before,
                    after,
                })
            }
            Observation::MessageDeleted {
                guild,
                channel,
                message,
            } => Some(LogEvent::MessageDeleted {
                guild,
                channel,
                message,
                cached: self.forget_message(message),
            }),
            Observation::MessagesBulkDeleted {
                guild,
                channel,
                messages,
            } => {
                let cached = messages
                    .iter()
                    .filter_map(|id| self.forget_message(*id))
                    .collect();
                Some(LogEvent::MessagesBulkDeleted {
                    guild,
                    channel,
                    messages,
                    cached,
                })
            }

            Observation::GuildAvailable {
                guild,
                emojis,
                stickers,
                presences,
                scheduled_events,
            } => {
                self.presences.retain(|(g, _), _| *g != Some(guild));
                self.scheduled_events.retain(|(g, _), _| *g != guild);
                self.emojis.insert(guild, emojis);
                self.stickers.insert(guild, stickers);
                self.presences.extend(
                    presences
                        .into_iter()
                        .map(|(user, state)| ((Some(guild), user), state)),
                );
                self.scheduled_events.extend(
                    scheduled_events
                        .into_iter()
                        .map(|(id, state)| ((guild, id), state)),
                );
                None
            }
            Observation::GuildUnavailable { guild } => {
                self.forget_guild(guild);
                None
            }
            Observation::EmojisChanged { guild, emojis } => {
                let before = self.emojis.insert(guild, emojis.clone());
                Some(LogEvent::EmojisUpdated {
                    guild,
                    before,
                    after: emojis,
                })
            }
            Observation::StickersChanged { guild, stickers } => {
                let before = self.stickers.insert(guild, stickers.clone());
                Some(LogEvent::StickersUpdated {
                    guild,
                    before,
                    after: stickers,
                })
            }
            Observation::PresenceChanged { guild, user, state } => {
                let before = self.presences.insert((guild, user), state.clone());
                Some(LogEvent::PresenceChanged {
                    guild,
                    user,
                    before,
                    after: state,
                })
            }
            Observation::MemberRemoved {
                guild,
                user,
                banned,
            } => {
                self.presences.remove(&(Some(guild), user.id));
                Some(if banned {
                    LogEvent::MemberBanned { guild, user }
                } else {
                    LogEvent::MemberLeft { guild, user }
                })
            }

            Observation::ScheduledEventCreated {
                guild,
                id,
                state,
                creator,
            } => {
                self.scheduled_events.insert((guild, id), state.clone());
                Some(LogEvent::ScheduledEventCreated {
                    guild,
                    id,
                    state,
                    creator,
                })
            }
            Observation::ScheduledEventUpdated { guild, id, state } => {
                let before = self.scheduled_events.insert((guild, id), state.clone());
                Some(LogEvent::ScheduledEventUpdated {
                    guild,
                    id,
                    before,
                    after: state,
                })
            }
            Observation::ScheduledEventDeleted { guild, id, state } => {
                self.scheduled_events.remove(&(guild, id));
                Some(LogEvent::ScheduledEventDeleted { guild, id, state })
            }

            Observation::AutoModRuleCreated {
                guild,
                id,
                state,
                creator,
            } => {
                self.automod_rules.insert((guild, id), state.clone());
                Some(LogEvent::AutoModRuleCreated {
                    guild,
                    id,
                    state,
                    creator,
                })
            }
            Observation::AutoModRuleUpdated { guild, id, state } => {
                let before = self.automod_rules.insert((guild, id), state.clone());
                Some(LogEvent::AutoModRuleUpdated {
                    guild,
                    id,
                    before,
                    after: state,
                })
            }
            Observation::AutoModRuleDeleted { guild, id, state } => {
                self.automod_rules.remove(&(guild, id));
                Some(LogEvent::AutoModRuleDeleted { guild, id, state })
            }
        }
    }

    fn remember_message(&mut self, snapshot: MessageSnapshot) {
        if self.capacity == 0 {
            return;
        }
        let id = snapshot.id;
        if self.messages.insert(id, snapshot).is_none() {
            self.message_order.push_back(id);
        }
        while self.messages.len() > self.capacity {
            match self.message_order.pop_front() {
                Some(oldest) => {
                    self.messages.remove(&oldest);
                }
                None => break,
            }
        }
    }

    fn forget_guild(&mut self, guild: GuildId) {
        self.emojis.remove(&guild);
        self.stickers.remove(&guild);
        self.presences.retain(|(g, _), _| *g != Some(guild));
        self.scheduled_events.retain(|(g, _), _| *g != guild);
        self.automod_rules.retain(|(g, _), _| *g != guild);
    }

    fn forget_message(&mut self, id: MessageId) -> Option<MessageSnapshot> {
        let snapshot = self.messages.remove(&id)?;
        self.message_order.retain(|m| *m != id);
        Some(snapshot)
    }
}
