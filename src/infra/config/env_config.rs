// Process configuration read from the environment (and `.env` when present).

use crate::infra::twitch::HelixCredentials;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "mongodb://localhost:27017";
const DEFAULT_PREFIX: &str = "!";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvConfigError {
    #[error("Missing {0} environment variable! Create a .env file with your bot settings.")]
    Missing(&'static str),
    #[error("{var} has an invalid value: '{value}'")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub database_url: String,
    pub owner_id: Option<u64>,
    pub environment: Environment,
    pub command_prefix: String,
    pub twitch: Option<HelixCredentials>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, EnvConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, EnvConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bot_token = get("BOT_TOKEN")
            .or_else(|| get("DISCORD_TOKEN"))
            .ok_or(EnvConfigError::Missing("BOT_TOKEN"))?;

        let owner_id = match get("OWNER_ID") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                EnvConfigError::Invalid {
                    var: "OWNER_ID",
                    value: raw.clone(),
                }
            })?),
            None => None,
        };

        let environment = match get("BOT_ENV").as_deref().map(str::trim) {
            Some(env) if env.eq_ignore_ascii_case("production") => Environment::Production,
            _ => Environment::Development,
        };

        let twitch = match (
            get("TWITCH_CLIENT_ID"),
            get("TWITCH_TOKEN"),
            get("TWITCH_BROADCASTER_ID"),
        ) {
            (Some(client_id), Some(access_token), Some(broadcaster_id)) => {
                Some(HelixCredentials {
                    client_id,
                    access_token,
                    broadcaster_id,
                })
            }
            (None, None, None) => None,
            (None, _, _) => return Err(EnvConfigError::Missing("TWITCH_CLIENT_ID")),
            (_, None, _) => return Err(EnvConfigError::Missing("TWITCH_TOKEN")),
            (_, _, None) => return Err(EnvConfigError::Missing("TWITCH_BROADCASTER_ID")),
        };

        Ok(Self {
            bot_token,
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            owner_id,
            environment,
            command_prefix: get("COMMAND_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            twitch,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<BotConfig, EnvConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BotConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn token_is_required() {
        let err = config_from(&[]).unwrap_err();
        assert_eq!(err, EnvConfigError::Missing("BOT_TOKEN"));
    }

    #[test]
    fn defaults_apply() {
        let config = config_from(&[("BOT_TOKEN", "abc")]).unwrap();

        assert_eq!(config.bot_token, "abc");
        assert_eq!(config.database_url, "mongodb://localhost:27017");
        assert_eq!(config.owner_id, None);
        assert_eq!(config.command_prefix, "!");
        assert!(!config.is_production());
        assert!(config.twitch.is_none());
    }

    #[test]
    fn discord_token_is_accepted_as_fallback() {
        let config = config_from(&[("DISCORD_TOKEN", "xyz")]).unwrap();
        assert_eq!(config.bot_token, "xyz");
    }

    #[test]
    fn production_and_owner_are_parsed() {
        let config = config_from(&[
            ("BOT_TOKEN", "abc"),
            ("OWNER_ID", "84770528526602240"),
            ("BOT_ENV", "Production"),
        ])
        .unwrap();

        assert!(config.is_production());
        assert_eq!(config.owner_id, Some(84770528526602240));
    }

    #[test]
    fn invalid_owner_is_rejected() {
        let err = config_from(&[("BOT_TOKEN", "abc"), ("OWNER_ID", "me")]).unwrap_err();
        assert_eq!(
            err,
            EnvConfigError::Invalid {
                var: "OWNER_ID",
                value: "me".to_string()
            }
        );
    }

    #[test]
    fn partial_twitch_settings_are_an_error() {
        let err = config_from(&[("BOT_TOKEN", "abc"), ("TWITCH_CLIENT_ID", "id")]).unwrap_err();
        assert_eq!(err, EnvConfigError::Missing("TWITCH_TOKEN"));

        let config = config_from(&[
            ("BOT_TOKEN", "abc"),
            ("TWITCH_CLIENT_ID", "id"),
            ("TWITCH_TOKEN", "token"),
            ("TWITCH_BROADCASTER_ID", "42"),
        ])
        .unwrap();
        let twitch = config.twitch.unwrap();
        assert_eq!(twitch.broadcaster_id, "42");
    }
}
