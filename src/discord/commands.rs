//! Prefix commands (qsetup, qdirectme, qhelp).
//!
//! Parsing and reply construction are pure; the handler does the I/O.

use chrono::{DateTime, Utc};
use serenity::all::{
    ChannelType, CreateChannel, CreateMessage, GuildChannel, GuildId, PermissionOverwrite,
    PermissionOverwriteType, Permissions, RoleId, UserId,
};
use serenity::model::channel::Message;
use serenity::prelude::*;
use tracing::{debug, info, warn};

use crate::discord::convert;
use crate::discord::sink::to_embed;
use crate::logger::event::UserRef;
use crate::logger::{EventLogger, Notification, Tone};

/// Commands longer than this are treated as chat.
const MAX_COMMAND_LENGTH: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Provision or adopt the logging channel.
    Setup,
    /// Forward a message to the bot owner.
    DirectMe(String),
    Help,
}

/// Parse `<prefix><name> [args]`. Unknown names are not commands.
pub fn parse_command(prefix: &str, content: &str) -> Option<Command> {
    let content = content.trim();
    if content.len() > MAX_COMMAND_LENGTH {
        return None;
    }
    let rest = content.strip_prefix(prefix)?;

    let mut parts = rest.splitn(2, char::is_whitespace);
    let name = parts.next()?.to_lowercase();
    let args = parts.next().map(str::trim).unwrap_or_default();

    match name.as_str() {
        "setup" => Some(Command::Setup),
        "directme" => Some(Command::DirectMe(args.to_string())),
        "help" => Some(Command::Help),
        _ => None,
    }
}

/// Text channel named `name`, if the guild already has one.
pub fn find_logger_channel<'a>(
    channels: impl IntoIterator<Item = &'a GuildChannel>,
    name: &str,
) -> Option<&'a GuildChannel> {
    channels
        .into_iter()
        .find(|c| c.kind == ChannelType::Text && c.name == name)
}

/// Hidden from @everyone, readable by the bot and the guild owner.
pub fn logger_channel_overwrites(guild: GuildId, bot: UserId, owner: UserId) -> Vec<PermissionOverwrite> {
    vec![
        PermissionOverwrite {
            allow: Permissions::empty(),
            deny: Permissions::VIEW_CHANNEL,
            kind: PermissionOverwriteType::Role(RoleId::new(guild.get())),
        },
        PermissionOverwrite {
            allow: Permissions::VIEW_CHANNEL
                | Permissions::SEND_MESSAGES
                | Permissions::EMBED_LINKS
                | Permissions::READ_MESSAGE_HISTORY,
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Member(bot),
        },
        PermissionOverwrite {
            allow: Permissions::VIEW_CHANNEL | Permissions::READ_MESSAGE_HISTORY,
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Member(owner),
        },
    ]
}

/// Owners always pass; everyone else needs ADMINISTRATOR on some role.
pub fn may_run_setup(
    owner: UserId,
    caller: UserId,
    role_permissions: impl IntoIterator<Item = Permissions>,
) -> bool {
    caller == owner
        || role_permissions
            .into_iter()
            .any(|p| p.contains(Permissions::ADMINISTRATOR))
}

pub fn owner_report(author: &UserRef, text: &str, sent_at: Option<DateTime<Utc>>) -> Notification {
    Notification::new("New Message from a User", Tone::Affirmative)
        .description(text)
        .field("Author", author.label())
        .footer(format!("Sent by {}", author.name))
        .timestamp(sent_at)
}

pub fn report_ack() -> Notification {
    Notification::new("Message Sent", Tone::Neutral)
        .description("Your message has been sent to the bot owner.")
        .timestamp(Some(Utc::now()))
}

pub fn help_text(prefix: &str) -> String {
    format!(
        "**Available Commands:**\n\
         • `{p}setup` - Create or adopt the logging channel (administrators)\n\
         • `{p}directme <message>` - Send a message to the bot owner\n\
         • `{p}help` - Show this help message",
        p = prefix
    )
}

/// Command handler for Discord bot.
pub struct CommandHandler {
    prefix: String,
    owner_id: Option<UserId>,
    channel_name: String,
}

impl CommandHandler {
    pub fn new(prefix: String, owner_id: Option<UserId>, channel_name: String) -> Self {
        Self {
            prefix,
            owner_id,
            channel_name,
        }
    }

    /// Parse and execute a command.
    ///
    /// Returns `true` if the message was a command, `false` otherwise.
    pub async fn handle_command(
        &self,
        ctx: &Context,
        msg: &Message,
        logger: &mut EventLogger,
    ) -> anyhow::Result<bool> {
        if msg.author.bot {
            return Ok(false);
        }
        let Some(command) = parse_command(&self.prefix, &msg.content) else {
            return Ok(false);
        };

        debug!("Processing command {:?} from {}", command, msg.author.name);

        match command {
            Command::Setup => self.handle_setup(ctx, msg, logger).await?,
            Command::DirectMe(text) => self.handle_directme(ctx, msg, &text).await?,
            Command::Help => {
                msg.channel_id
                    .say(&ctx.http, help_text(&self.prefix))
                    .await?;
            }
        }
        Ok(true)
    }

    async fn handle_setup(
        &self,
        ctx: &Context,
        msg: &Message,
        logger: &mut EventLogger,
    ) -> anyhow::Result<()> {
        let Some(guild_id) = msg.guild_id else {
            msg.channel_id
                .say(&ctx.http, "This command only works in a server.")
                .await?;
            return Ok(());
        };

        let guild = guild_id.to_partial_guild(&ctx.http).await?;
        let member = guild_id.member(&ctx.http, msg.author.id).await?;
        let everyone = RoleId::new(guild_id.get());
        let role_permissions = member
            .roles
            .iter()
            .chain(std::iter::once(&everyone))
            .filter_map(|id| guild.roles.get(id))
            .map(|role| role.permissions);

        if !may_run_setup(guild.owner_id, msg.author.id, role_permissions) {
            info!("Refused setup from {} in {}", msg.author.name, guild.name);
            msg.channel_id
                .say(&ctx.http, "You need the Administrator permission to run setup.")
                .await?;
            return Ok(());
        }

        let channels = guild_id.channels(&ctx.http).await?;
        let channel = match find_logger_channel(channels.values(), &self.channel_name) {
            Some(existing) => {
                info!("Adopting existing logger channel #{}", existing.name);
                existing.id
            }
            None => {
                let bot_id = ctx.cache.current_user().id;
                let builder = CreateChannel::new(&self.channel_name)
                    .kind(ChannelType::Text)
                    .permissions(logger_channel_overwrites(guild_id, bot_id, guild.owner_id));
                let created = guild_id.create_channel(&ctx.http, builder).await?;
                info!("Created logger channel #{} in {}", created.name, guild.name);
                created.id
            }
        };

        if let Some(previous) = logger.destination() {
            info!("Replacing logger channel {}", previous);
        }
        logger.set_destination(channel)?;
        msg.channel_id
            .say(&ctx.http, "Logger channel has been set up.")
            .await?;
        Ok(())
    }

    async fn handle_directme(&self, ctx: &Context, msg: &Message, text: &str) -> anyhow::Result<()> {
        if text.is_empty() {
            msg.channel_id
                .say(&ctx.http, format!("Usage: `{}directme <message>`", self.prefix))
                .await?;
            return Ok(());
        }

        let Some(owner) = self.owner_id else {
            warn!("directme used but no owner is configured");
            msg.channel_id
                .say(&ctx.http, "No bot owner is configured, so the message could not be sent.")
                .await?;
            return Ok(());
        };

        info!("Forwarding message from {} to the bot owner", msg.author.name);
        let report = owner_report(&convert::user_ref(&msg.author), text, convert::timestamp(msg.timestamp));
        let dm = owner.create_dm_channel(&ctx.http).await?;
        dm.id
            .send_message(&ctx.http, CreateMessage::new().embed(to_embed(&report)))
            .await?;

        msg.channel_id
            .send_message(&ctx.http, CreateMessage::new().embed(to_embed(&report_ack())))
            .await?;
        Ok(())
    }
}
