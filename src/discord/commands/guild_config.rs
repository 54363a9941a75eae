use crate::core::commands::CommandDescriptor;
use crate::core::config::IdName;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

pub fn descriptor() -> CommandDescriptor {
    CommandDescriptor::new(
        "guildconfig",
        "Show the channels and roles configured for this server.",
    )
}

/// Show the channels and roles configured for this server.
#[poise::command(slash_command, guild_only, rename = "guildconfig")]
pub async fn guild_config(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or("This command only works in servers")?
        .get();

    let mut embed = serenity::CreateEmbed::new()
        .title("Server configuration")
        .color(0x5865F2) // Blurple
        .footer(serenity::CreateEmbedFooter::new(format!("Guild ID: {}", guild_id)));

    for name in IdName::ALL {
        let id = match ctx.data().guilds.get_id(guild_id, name) {
            Ok(id) => id,
            Err(err) => {
                ctx.send(
                    poise::CreateReply::default()
                        .content(err.to_string())
                        .ephemeral(true),
                )
                .await?;
                return Ok(());
            }
        };
        embed = embed.field(name.label(), mention(name, id), true);
    }

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

fn mention(name: IdName, id: u64) -> String {
    match name {
        IdName::ScheduleChannel | IdName::SpoilerChannel => format!("<#{}>", id),
        IdName::MuteRole => format!("<@&{}>", id),
        IdName::Guild | IdName::LegacyReactionWebhookId => format!("`{}`", id),
    }
}
