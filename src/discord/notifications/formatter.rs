use crate::core::notifications::Notification;
use poise::serenity_prelude::{self as serenity, CreateEmbed, CreateEmbedFooter};

/// Embed DMed to the bot owner. Only guild joins and leaves produce one;
/// everything else is log-only.
pub fn owner_notice(notification: &Notification) -> Option<CreateEmbed> {
    let embed = match notification {
        Notification::GuildJoined {
            guild_name,
            member_count,
            ..
        } => CreateEmbed::default()
            .title("Joined Server")
            .description(format!("I was added to **{}**.", guild_name))
            .color(serenity::Color::from_rgb(0, 255, 0)) // Green
            .field("Members", member_count.to_string(), false),

        Notification::GuildLeft { guild_name, .. } => CreateEmbed::default()
            .title("Left Server")
            .description(match guild_name {
                Some(name) => format!("I was removed from **{}**.", name),
                None => "I was removed from a server.".to_string(),
            })
            .color(serenity::Color::RED),

        _ => return None,
    };

    Some(
        embed
            .footer(CreateEmbedFooter::new(format!(
                "Guild ID: {}",
                notification.guild_id()
            )))
            .timestamp(serenity::Timestamp::now()),
    )
}
