// Discord layer - commands, dispatch, event handlers and the gateway session.

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "dispatch/command_dispatcher.rs"]
pub mod dispatch;

#[path = "events/event_bridge.rs"]
pub mod events;

#[path = "notifications/mod.rs"]
pub mod notifications;

pub mod session;

use crate::core::commands::CommandRegistry;
use crate::core::config::GuildIdTable;
use crate::core::events::EventTable;
use crate::core::notifications::AuditService;
use crate::core::twitch::TwitchInfoService;
use crate::infra::config::BotConfig;
use crate::infra::twitch::HelixClient;
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Builds the poise command that handles one registry entry.
pub type CommandFactory = fn() -> poise::Command<Data, Error>;

// Shared state handed to every command and event handler.
pub struct Data {
    pub config: Arc<BotConfig>,
    pub guilds: Arc<GuildIdTable>,
    pub registry: Arc<CommandRegistry<CommandFactory>>,
    pub events: Arc<EventTable<events::EventHandler>>,
    pub audit: Arc<AuditService>,
    pub twitch: Option<Arc<TwitchInfoService<HelixClient>>>,
}
