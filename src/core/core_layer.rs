// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "commands/command_registry.rs"]
pub mod commands;

#[path = "config/guild_config.rs"]
pub mod config;

#[path = "events/event_table.rs"]
pub mod events;

#[path = "math/mod.rs"]
pub mod math;

#[path = "notifications/mod.rs"]
pub mod notifications;

#[path = "twitch/mod.rs"]
pub mod twitch;
