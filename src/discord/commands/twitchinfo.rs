// Twitch subscription lookup for moderators.
//
// Extract the viewer, let the core service talk to Twitch, post what it
// rendered. Network failures propagate to the framework error hook.

use crate::core::commands::{CommandDescriptor, ParamKind, ParamSpec, PermissionEntry};
use crate::core::config::GuildIdTable;
use crate::discord::{Context, Error};

const ARMORY_MODERATORS: u64 = 84778943529365504;
const DBKYND_MODERATORS: u64 = 140025967044198400;

pub fn descriptor(guilds: &GuildIdTable) -> CommandDescriptor {
    CommandDescriptor::new(
        "twitchinfo",
        "Get the subscription status of a Twitch viewer by name or id.",
    )
    .param(ParamSpec::required(
        "viewer",
        ParamKind::String,
        "Twitch user login or ID.",
    ))
    .guilds(guilds.guild_ids())
    .default_permission(false)
    .permission(PermissionEntry::allow_role(ARMORY_MODERATORS))
    .permission(PermissionEntry::allow_role(DBKYND_MODERATORS))
}

/// Get the subscription status of a Twitch viewer by name or id.
#[poise::command(slash_command, guild_only)]
pub async fn twitchinfo(
    ctx: Context<'_>,
    #[description = "Twitch user login or ID."] viewer: String,
) -> Result<(), Error> {
    let Some(twitch) = ctx.data().twitch.as_ref() else {
        ctx.send(
            poise::CreateReply::default()
                .content("Twitch lookups are not configured on this bot.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    };

    ctx.defer().await?;

    let lookup = twitch.lookup(&viewer).await?;
    ctx.say(lookup.render()).await?;

    Ok(())
}
