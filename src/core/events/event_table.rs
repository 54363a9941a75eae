use std::collections::HashMap;

/// Platform events the bot subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Ready,
    ShardStage,
    GuildCreate,
    GuildDelete,
    GuildMemberAdd,
    GuildMemberRemove,
    GuildBanAdd,
    GuildBanRemove,
    MessageCreate,
    MessageUpdate,
    MessageDelete,
}

/// One handler per event kind, fixed once the table is built.
pub struct EventTable<H> {
    handlers: HashMap<EventKind, H>,
}

pub struct EventTableBuilder<H> {
    handlers: HashMap<EventKind, H>,
}

impl<H> EventTable<H> {
    pub fn builder() -> EventTableBuilder<H> {
        EventTableBuilder {
            handlers: HashMap::new(),
        }
    }

    pub fn get(&self, kind: EventKind) -> Option<&H> {
        self.handlers.get(&kind)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }
}

impl<H> EventTableBuilder<H> {
    /// Bind `handler` to `kind`. A later binding for the same kind replaces the earlier one.
    pub fn on(mut self, kind: EventKind, handler: H) -> Self {
        if self.handlers.insert(kind, handler).is_some() {
            tracing::warn!(?kind, "Event handler registered twice, keeping the last one");
        }
        self
    }

    pub fn build(self) -> EventTable<H> {
        EventTable {
            handlers: self.handlers,
        }
    }
}
