//! Thank-you DM to whoever added the bot to a guild.

use chrono::Utc;
use serenity::all::{CreateMessage, Guild, UserId};
use serenity::model::guild::audit_log::{Action, MemberAction};
use serenity::prelude::*;
use tracing::{debug, info, warn};

use crate::discord::sink::to_embed;
use crate::logger::{Notification, Tone};

pub fn greeting(inviter: UserId, guild_name: &str) -> Notification {
    Notification::new("Thanks for inviting me!", Tone::Affirmative)
        .description(format!(
            "Thank you <@{}> for inviting me to {}!",
            inviter, guild_name
        ))
        .timestamp(Some(Utc::now()))
}

/// Look up the most recent bot-add audit entry and DM its author.
/// Failures only cost the greeting.
pub async fn thank_inviter(ctx: &Context, guild: &Guild) {
    let logs = match guild
        .id
        .audit_logs(
            &ctx.http,
            Some(Action::Member(MemberAction::BotAdd)),
            None,
            None,
            Some(1),
        )
        .await
    {
        Ok(logs) => logs,
        Err(e) => {
            warn!("Cannot read audit log of {}: {}", guild.name, e);
            return;
        }
    };

    let Some(entry) = logs.entries.first() else {
        debug!("No bot-add entry in audit log of {}", guild.name);
        return;
    };
    let inviter = entry.user_id;

    let embed = to_embed(&greeting(inviter, &guild.name));
    let sent = match inviter.create_dm_channel(&ctx.http).await {
        Ok(dm) => dm.id.send_message(&ctx.http, CreateMessage::new().embed(embed)).await,
        Err(e) => Err(e),
    };
    match sent {
        Ok(_) => info!("Thanked {} for the invite to {}", inviter, guild.name),
        Err(e) => warn!("Could not DM inviter {}: {}", inviter, e),
    }
}
