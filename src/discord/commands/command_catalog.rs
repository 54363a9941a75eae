// Discord commands module.
// Each command file exports the poise command plus the descriptor that is
// registered with Discord for it.

pub mod guild_config;

pub mod math;

// Bot presence management
pub mod presence;

pub mod twitchinfo;

use crate::core::commands::{CommandRegistry, RegistryError};
use crate::core::config::GuildIdTable;
use crate::discord::CommandFactory;

/// Every command the bot knows, paired with its handler.
pub fn build_registry(
    guilds: &GuildIdTable,
) -> Result<CommandRegistry<CommandFactory>, RegistryError> {
    let mut registry: CommandRegistry<CommandFactory> = CommandRegistry::new();
    registry.register(math::descriptor(), math::math)?;
    registry.register(twitchinfo::descriptor(guilds), twitchinfo::twitchinfo)?;
    registry.register(guild_config::descriptor(), guild_config::guild_config)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commands::{CommandScope, PrincipalKind};

    #[test]
    fn every_command_matches_its_descriptor() {
        let registry = build_registry(&GuildIdTable::builtin()).unwrap();
        assert_eq!(registry.len(), 3);

        for entry in registry.iter() {
            let command = (entry.handler)();
            let descriptor = &entry.descriptor;

            assert_eq!(command.name, descriptor.name);
            assert!(command.slash_action.is_some(), "{} is not a slash command", command.name);
            assert_eq!(command.prefix_action.is_some(), descriptor.prefix);
            assert_eq!(command.aliases, descriptor.aliases);

            let params: Vec<(&str, bool)> = command
                .parameters
                .iter()
                .map(|p| (p.name.as_str(), p.required))
                .collect();
            let expected: Vec<(&str, bool)> = descriptor
                .params
                .iter()
                .map(|p| (p.name.as_str(), p.required))
                .collect();
            assert_eq!(params, expected, "parameters of {}", descriptor.name);
        }
    }

    #[test]
    fn twitchinfo_is_limited_to_configured_guild_moderators() {
        let guilds = GuildIdTable::builtin();
        let registry = build_registry(&guilds).unwrap();
        let descriptor = &registry.resolve("twitchinfo").unwrap().descriptor;

        assert_eq!(descriptor.scope, CommandScope::Guilds(guilds.guild_ids()));
        assert!(!descriptor.default_permission);
        assert!(descriptor
            .permissions
            .iter()
            .all(|p| p.kind == PrincipalKind::Role && p.allow));
        assert!(descriptor.permits(1, &[84778943529365504]));
        assert!(!descriptor.permits(1, &[]));
    }

    #[test]
    fn math_is_global_and_prefix_enabled() {
        let registry = build_registry(&GuildIdTable::builtin()).unwrap();
        let descriptor = &registry.resolve("math").unwrap().descriptor;

        assert!(descriptor.is_global());
        assert!(descriptor.prefix);
        assert!(descriptor.permits(1, &[]));
    }
}
