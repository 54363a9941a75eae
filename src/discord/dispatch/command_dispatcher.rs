// Turns the command registry into what Discord and poise need.
//
// Registration serializes every descriptor into a `CreateCommand` and pushes
// it globally or into each guild of its scope. At runtime poise routes the
// interaction by name; the check below looks the descriptor up again to
// enforce its scope and permission entries.

use crate::core::commands::{CommandDescriptor, CommandRegistry, ParamKind};
use crate::discord::{CommandFactory, Context, Data, Error};
use poise::serenity_prelude as serenity;

/// Build the poise command list from the registry.
pub fn framework_commands(
    registry: &CommandRegistry<CommandFactory>,
) -> Vec<poise::Command<Data, Error>> {
    registry.iter().map(|entry| (entry.handler)()).collect()
}

fn option_type(kind: ParamKind) -> serenity::CommandOptionType {
    match kind {
        ParamKind::String => serenity::CommandOptionType::String,
    }
}

/// Serialize one descriptor into the platform's command schema.
pub fn to_create_command(descriptor: &CommandDescriptor) -> serenity::CreateCommand {
    let mut command = serenity::CreateCommand::new(descriptor.name.as_str())
        .description(descriptor.description.as_str());

    for param in &descriptor.params {
        command = command.add_option(
            serenity::CreateCommandOption::new(
                option_type(param.kind),
                param.name.as_str(),
                param.description.as_str(),
            )
            .required(param.required),
        );
    }

    if !descriptor.is_global() {
        command = command.dm_permission(false);
    }

    command
}

/// Push every command to Discord: global ones once, scoped ones per guild.
pub async fn register_commands<H>(
    ctx: &serenity::Context,
    registry: &CommandRegistry<H>,
) -> Result<(), serenity::Error> {
    let global: Vec<_> = registry
        .global()
        .map(|entry| to_create_command(&entry.descriptor))
        .collect();
    let global_count = global.len();
    serenity::Command::set_global_commands(&ctx.http, global).await?;
    tracing::info!(count = global_count, "Registered global commands");

    for guild_id in registry.scoped_guilds() {
        let commands: Vec<_> = registry
            .for_guild(guild_id)
            .map(|entry| to_create_command(&entry.descriptor))
            .collect();
        let count = commands.len();

        // A guild the bot was removed from rejects this; the rest still get their commands.
        match serenity::GuildId::new(guild_id)
            .set_commands(&ctx.http, commands)
            .await
        {
            Ok(_) => tracing::info!(guild_id, count, "Registered guild commands"),
            Err(e) => tracing::warn!(guild_id, "Failed to register guild commands: {}", e),
        }
    }

    Ok(())
}

/// Framework-wide check enforcing each command's scope and permission entries.
pub async fn check_permissions(ctx: Context<'_>) -> Result<bool, Error> {
    let name = ctx.command().name.as_str();
    let Some(entry) = ctx.data().registry.resolve(name) else {
        return Ok(true);
    };
    let descriptor = &entry.descriptor;

    let in_scope = match ctx.guild_id() {
        Some(guild_id) => descriptor.is_available_in(guild_id.get()),
        None => descriptor.is_global(),
    };
    if !in_scope {
        return Ok(false);
    }

    if descriptor.permissions.is_empty() && descriptor.default_permission {
        return Ok(true);
    }

    let role_ids: Vec<u64> = match ctx.author_member().await {
        Some(member) => member.roles.iter().map(|role| role.get()).collect(),
        None => Vec::new(),
    };

    Ok(descriptor.permits(ctx.author().id.get(), &role_ids))
}

/// Handler failures end here: log them and tell the user privately.
pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!(command = %ctx.command().qualified_name, "Command failed: {}", error);
            let reply = poise::CreateReply::default()
                .content("Something went wrong while running that command.")
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                tracing::warn!("Failed to send error reply: {}", e);
            }
        }
        poise::FrameworkError::CommandCheckFailed {
            error: None, ctx, ..
        } => {
            tracing::info!(
                command = %ctx.command().qualified_name,
                user_id = ctx.author().id.get(),
                "Command denied"
            );
            let reply = poise::CreateReply::default()
                .content("You do not have permission to use this command.")
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                tracing::warn!("Failed to send permission reply: {}", e);
            }
        }
        poise::FrameworkError::Setup {
            error, framework, ..
        } => {
            tracing::error!("Startup failed: {}", error);
            framework.shard_manager().shutdown_all().await;
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                tracing::error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Hint for a prefixed message that names a slash-only command.
pub fn moved_to_slash_hint<H>(
    registry: &CommandRegistry<H>,
    prefix: &str,
    content: &str,
) -> Option<String> {
    let rest = content.strip_prefix(prefix)?;
    let name = rest.split_whitespace().next()?.to_lowercase();

    registry
        .dispatch(&name, |entry| {
            (!entry.descriptor.prefix).then(|| {
                format!(
                    "`{}{}` has moved to a slash command. Use `/{}` instead.",
                    prefix, name, name
                )
            })
        })
        .flatten()
}
