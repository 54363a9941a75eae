// Static per-guild resource ids.
//
// Every guild the bot is tuned for gets exactly one `GuildIds` record. The
// table is built once at startup and never mutated, so lookups are plain
// reads with no locking.

use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No config id set found for guild {0}.")]
    NotFound(u64),
}

/// The properties a guild record can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdName {
    Guild,
    ScheduleChannel,
    SpoilerChannel,
    MuteRole,
    LegacyReactionWebhookId,
}

impl IdName {
    pub const ALL: [IdName; 5] = [
        IdName::Guild,
        IdName::ScheduleChannel,
        IdName::SpoilerChannel,
        IdName::MuteRole,
        IdName::LegacyReactionWebhookId,
    ];

    pub fn label(self) -> &'static str {
        match self {
            IdName::Guild => "Guild",
            IdName::ScheduleChannel => "Schedule channel",
            IdName::SpoilerChannel => "Spoiler channel",
            IdName::MuteRole => "Mute role",
            IdName::LegacyReactionWebhookId => "Legacy reaction webhook",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildIds {
    pub label: &'static str,
    pub guild: u64,
    pub schedule_channel: u64,
    pub spoiler_channel: u64,
    pub mute_role: u64,
    pub legacy_reaction_webhook_id: u64,
}

impl GuildIds {
    pub fn get(&self, name: IdName) -> u64 {
        match name {
            IdName::Guild => self.guild,
            IdName::ScheduleChannel => self.schedule_channel,
            IdName::SpoilerChannel => self.spoiler_channel,
            IdName::MuteRole => self.mute_role,
            IdName::LegacyReactionWebhookId => self.legacy_reaction_webhook_id,
        }
    }
}

pub struct GuildIdTable {
    sets: HashMap<u64, GuildIds>,
}

impl GuildIdTable {
    pub fn new(sets: Vec<GuildIds>) -> Self {
        Self {
            sets: sets.into_iter().map(|ids| (ids.guild, ids)).collect(),
        }
    }

    /// The guilds this bot ships configured for.
    pub fn builtin() -> Self {
        Self::new(vec![
            // The Armory
            GuildIds {
                label: "armory",
                guild: 84764735832068096,
                schedule_channel: 362349719663542272,
                spoiler_channel: 148124154602717193,
                mute_role: 706906565784895509,
                legacy_reaction_webhook_id: 901235965216051210,
            },
            // DBKynd
            GuildIds {
                label: "dev",
                guild: 140025699867164673,
                schedule_channel: 872986945788211231,
                spoiler_channel: 872987015677898813,
                mute_role: 835696708657872906,
                legacy_reaction_webhook_id: 887447915440779284,
            },
        ])
    }

    pub fn get(&self, guild_id: u64) -> Option<&GuildIds> {
        self.sets.get(&guild_id)
    }

    pub fn get_id(&self, guild_id: u64, name: IdName) -> Result<u64, ConfigError> {
        self.get(guild_id)
            .map(|ids| ids.get(name))
            .ok_or(ConfigError::NotFound(guild_id))
    }

    pub fn guild_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.sets.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_guild_fails_for_every_property() {
        let table = GuildIdTable::builtin();

        for name in IdName::ALL {
            assert_eq!(table.get_id(42, name), Err(ConfigError::NotFound(42)));
        }
    }

    #[test]
    fn known_guild_returns_stored_values() {
        let table = GuildIdTable::builtin();
        let armory = 84764735832068096;

        assert_eq!(table.get_id(armory, IdName::Guild), Ok(armory));
        assert_eq!(
            table.get_id(armory, IdName::ScheduleChannel),
            Ok(362349719663542272)
        );
        assert_eq!(
            table.get_id(armory, IdName::SpoilerChannel),
            Ok(148124154602717193)
        );
        assert_eq!(table.get_id(armory, IdName::MuteRole), Ok(706906565784895509));
        assert_eq!(
            table.get_id(armory, IdName::LegacyReactionWebhookId),
            Ok(901235965216051210)
        );
    }

    #[test]
    fn records_are_keyed_by_their_guild_field() {
        let table = GuildIdTable::new(vec![GuildIds {
            label: "test",
            guild: 7,
            schedule_channel: 1,
            spoiler_channel: 2,
            mute_role: 3,
            legacy_reaction_webhook_id: 4,
        }]);

        assert_eq!(table.get_id(7, IdName::MuteRole), Ok(3));
        assert_eq!(table.get_id(1, IdName::Guild), Err(ConfigError::NotFound(1)));
        assert_eq!(table.guild_ids(), vec![7]);
    }

    #[test]
    fn not_found_error_names_the_guild() {
        let err = ConfigError::NotFound(99);
        assert_eq!(err.to_string(), "No config id set found for guild 99.");
    }
}
