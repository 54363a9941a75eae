pub mod twitch_service;

pub use twitch_service::{TwitchApi, TwitchError, TwitchInfoService, TwitchSubscription, TwitchUser};
