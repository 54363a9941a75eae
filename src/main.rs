// Entry point of the Armory Discord bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Environment config and the Twitch Helix client
// - `discord/` = Discord-specific adapters (commands, events, session)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Connect and serve until shutdown

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::config::GuildIdTable;
use crate::core::notifications::AuditService;
use crate::core::twitch::TwitchInfoService;
use crate::discord::{commands, dispatch, events, session, Data};
use crate::infra::config::BotConfig;
use crate::infra::twitch::HelixClient;
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Arc::new(BotConfig::from_env().context("Invalid bot configuration")?);
    tracing::info!(
        environment = ?config.environment,
        prefix = %config.command_prefix,
        database = %config.database_url,
        "Configuration loaded"
    );

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================

    let guilds = Arc::new(GuildIdTable::builtin());
    let registry =
        Arc::new(commands::build_registry(&guilds).context("Failed to build command registry")?);
    let event_table = Arc::new(events::build_event_table());

    let twitch = match config.twitch.clone() {
        Some(credentials) => {
            let client =
                HelixClient::new(credentials).context("Failed to create Twitch API client")?;
            Some(Arc::new(TwitchInfoService::new(client)))
        }
        None => {
            tracing::warn!("Twitch credentials not set, /twitchinfo is disabled");
            None
        }
    };

    let data = Data {
        config: Arc::clone(&config),
        guilds,
        registry: Arc::clone(&registry),
        events: event_table,
        audit: Arc::new(AuditService::new()),
        twitch,
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MODERATION
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT; // Required to read message content

    let (ready_tx, ready_rx) = oneshot::channel();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: dispatch::framework_commands(&registry),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(config.command_prefix.clone()),
                ..Default::default()
            },
            command_check: Some(|ctx| Box::pin(dispatch::check_permissions(ctx))),
            on_error: |error| Box::pin(dispatch::on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::handle_event(ctx, event, framework, data))
            },
            pre_command: |ctx| {
                Box::pin(async move {
                    tracing::debug!(
                        command = %ctx.command().qualified_name,
                        user_id = ctx.author().id.get(),
                        guild_id = ctx.guild_id().map(|id| id.get()),
                        "Running command"
                    );
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, _framework| {
            Box::pin(async move {
                session::on_ready(ctx, ready, &data).await?;
                if ready_tx.send(()).is_err() {
                    tracing::warn!("Nobody is waiting for the ready signal");
                }
                Ok(data)
            })
        })
        .build();

    let session = session::connect(&config.bot_token, intents, framework, ready_rx).await?;
    session.serve().await?;

    Ok(())
}
