// Command descriptors and the registry that maps a command name to its handler.
//
// The registry is generic over the handler type so the core stays free of
// Discord types. The Discord layer plugs in poise command constructors; the
// tests plug in plain functions.

use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("A command named '{0}' is already registered")]
    Duplicate(String),
}

/// Option types a command parameter can take on the platform. Every shipped
/// command takes free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub description: String,
    pub required: bool,
}

impl ParamSpec {
    pub fn required(name: &str, kind: ParamKind, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            required: true,
        }
    }
}

/// Where a command is made available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandScope {
    Global,
    Guilds(Vec<u64>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalKind {
    Role,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionEntry {
    pub id: u64,
    pub kind: PrincipalKind,
    pub allow: bool,
}

impl PermissionEntry {
    pub fn allow_role(id: u64) -> Self {
        Self {
            id,
            kind: PrincipalKind::Role,
            allow: true,
        }
    }
}

#[cfg(test)]
impl PermissionEntry {
    pub fn allow_user(id: u64) -> Self {
        Self {
            id,
            kind: PrincipalKind::User,
            allow: true,
        }
    }

    pub fn deny_user(id: u64) -> Self {
        Self {
            allow: false,
            ..Self::allow_user(id)
        }
    }
}

/// Everything the platform needs to know about one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
    pub scope: CommandScope,
    pub default_permission: bool,
    pub permissions: Vec<PermissionEntry>,
    /// Whether the legacy text prefix may invoke this command.
    pub prefix: bool,
    pub aliases: Vec<String>,
}

impl CommandDescriptor {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            params: Vec::new(),
            scope: CommandScope::Global,
            default_permission: true,
            permissions: Vec::new(),
            prefix: false,
            aliases: Vec::new(),
        }
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn guilds(mut self, guild_ids: impl IntoIterator<Item = u64>) -> Self {
        self.scope = CommandScope::Guilds(guild_ids.into_iter().collect());
        self
    }

    pub fn default_permission(mut self, allowed: bool) -> Self {
        self.default_permission = allowed;
        self
    }

    pub fn permission(mut self, entry: PermissionEntry) -> Self {
        self.permissions.push(entry);
        self
    }

    pub fn prefix_aliases(mut self, aliases: &[&str]) -> Self {
        self.prefix = true;
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn is_global(&self) -> bool {
        matches!(self.scope, CommandScope::Global)
    }

    pub fn is_available_in(&self, guild_id: u64) -> bool {
        match &self.scope {
            CommandScope::Global => true,
            CommandScope::Guilds(ids) => ids.contains(&guild_id),
        }
    }

    /// Decide whether a caller may run this command.
    ///
    /// A user entry beats any role entry. Among role entries a deny wins over
    /// an allow. Without a matching entry the default permission applies.
    pub fn permits(&self, user_id: u64, role_ids: &[u64]) -> bool {
        if let Some(entry) = self
            .permissions
            .iter()
            .find(|p| p.kind == PrincipalKind::User && p.id == user_id)
        {
            return entry.allow;
        }

        let mut role_matches = self
            .permissions
            .iter()
            .filter(|p| p.kind == PrincipalKind::Role && role_ids.contains(&p.id))
            .peekable();

        if role_matches.peek().is_none() {
            return self.default_permission;
        }

        role_matches.all(|p| p.allow)
    }
}

pub struct RegisteredCommand<H> {
    pub descriptor: CommandDescriptor,
    pub handler: H,
}

pub struct CommandRegistry<H> {
    commands: Vec<RegisteredCommand<H>>,
    by_name: HashMap<String, usize>,
}

impl<H> Default for CommandRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> CommandRegistry<H> {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        descriptor: CommandDescriptor,
        handler: H,
    ) -> Result<(), RegistryError> {
        if self.by_name.contains_key(&descriptor.name) {
            return Err(RegistryError::Duplicate(descriptor.name));
        }

        self.by_name
            .insert(descriptor.name.clone(), self.commands.len());
        self.commands.push(RegisteredCommand {
            descriptor,
            handler,
        });
        Ok(())
    }

    /// Exact-name lookup.
    pub fn resolve(&self, name: &str) -> Option<&RegisteredCommand<H>> {
        self.by_name.get(name).map(|&idx| &self.commands[idx])
    }

    /// Invoke `run` with the command registered under `name`.
    ///
    /// Unknown names run nothing and yield `None`.
    pub fn dispatch<R>(
        &self,
        name: &str,
        run: impl FnOnce(&RegisteredCommand<H>) -> R,
    ) -> Option<R> {
        match self.resolve(name) {
            Some(command) => Some(run(command)),
            None => {
                tracing::debug!(command = name, "Ignoring unknown command");
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredCommand<H>> {
        self.commands.iter()
    }

    pub fn global(&self) -> impl Iterator<Item = &RegisteredCommand<H>> {
        self.commands.iter().filter(|c| c.descriptor.is_global())
    }

    /// Guild-scoped commands that should be registered in `guild_id`.
    pub fn for_guild(&self, guild_id: u64) -> impl Iterator<Item = &RegisteredCommand<H>> {
        self.commands
            .iter()
            .filter(move |c| !c.descriptor.is_global() && c.descriptor.is_available_in(guild_id))
    }

    /// Every guild named by at least one guild-scoped command.
    pub fn scoped_guilds(&self) -> BTreeSet<u64> {
        self.commands
            .iter()
            .filter_map(|c| match &c.descriptor.scope {
                CommandScope::Guilds(ids) => Some(ids.iter().copied()),
                CommandScope::Global => None,
            })
            .flatten()
            .collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.commands.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo(input: &str) -> String {
        format!("echo {}", input)
    }

    fn shout(input: &str) -> String {
        input.to_uppercase()
    }

    fn registry() -> CommandRegistry<fn(&str) -> String> {
        let mut registry: CommandRegistry<fn(&str) -> String> = CommandRegistry::new();
        registry
            .register(CommandDescriptor::new("echo", "Echo input"), echo)
            .unwrap();
        registry
            .register(
                CommandDescriptor::new("shout", "Shout input").guilds([1, 2]),
                shout,
            )
            .unwrap();
        registry
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = registry();
        let err = registry
            .register(CommandDescriptor::new("echo", "Again"), shout)
            .unwrap_err();

        assert_eq!(err, RegistryError::Duplicate("echo".to_string()));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn dispatch_runs_the_matching_handler() {
        let registry = registry();

        let out = registry.dispatch("shout", |cmd| (cmd.handler)("hi"));
        assert_eq!(out.as_deref(), Some("HI"));

        let out = registry.dispatch("echo", |cmd| (cmd.handler)("hi"));
        assert_eq!(out.as_deref(), Some("echo hi"));
    }

    #[test]
    fn dispatch_ignores_unknown_names() {
        let registry = registry();
        let mut ran = false;

        let out = registry.dispatch("Echo", |_| ran = true);

        assert!(out.is_none());
        assert!(!ran);
    }

    #[test]
    fn scope_partitions_commands() {
        let registry = registry();

        let global: Vec<_> = registry.global().map(|c| c.descriptor.name.as_str()).collect();
        assert_eq!(global, vec!["echo"]);

        let in_guild: Vec<_> = registry
            .for_guild(2)
            .map(|c| c.descriptor.name.as_str())
            .collect();
        assert_eq!(in_guild, vec!["shout"]);
        assert_eq!(registry.for_guild(3).count(), 0);

        assert_eq!(registry.scoped_guilds().into_iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn restricted_command_needs_an_allowed_role() {
        let descriptor = CommandDescriptor::new("mod", "Moderators only")
            .default_permission(false)
            .permission(PermissionEntry::allow_role(10));

        assert!(descriptor.permits(1, &[10, 11]));
        assert!(!descriptor.permits(1, &[11]));
        assert!(!descriptor.permits(1, &[]));
    }

    #[test]
    fn user_entries_override_roles() {
        let descriptor = CommandDescriptor::new("mod", "Moderators only")
            .default_permission(false)
            .permission(PermissionEntry::allow_role(10))
            .permission(PermissionEntry::deny_user(5))
            .permission(PermissionEntry::allow_user(6));

        assert!(!descriptor.permits(5, &[10]));
        assert!(descriptor.permits(6, &[]));
    }

    #[test]
    fn open_commands_permit_everyone() {
        let descriptor = CommandDescriptor::new("echo", "Echo input");
        assert!(descriptor.permits(1, &[]));
    }

    #[test]
    fn prefix_aliases_enable_prefix_invocation() {
        let descriptor = CommandDescriptor::new("math", "Math").prefix_aliases(&["calc"]);

        assert!(descriptor.prefix);
        assert_eq!(descriptor.aliases, vec!["calc".to_string()]);
        assert!(!CommandDescriptor::new("other", "Other").prefix);
    }
}
