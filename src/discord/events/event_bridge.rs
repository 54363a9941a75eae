// Routes gateway events to the handlers bound in the event table.
//
// Every serenity event is first classified into an `EventKind`; events the
// bot does not subscribe to classify as `None` and are dropped. Handler
// failures stop at this boundary.

use crate::core::events::{EventKind, EventTable};
use crate::discord::notifications::{auditor, notifier};
use crate::discord::{Data, Error};
use anyhow::Result;
use poise::serenity_prelude as serenity;

pub type EventHandler = for<'a> fn(
    &'a serenity::Context,
    &'a serenity::FullEvent,
    &'a Data,
) -> poise::BoxFuture<'a, Result<()>>;

pub fn event_kind(event: &serenity::FullEvent) -> Option<EventKind> {
    let kind = match event {
        serenity::FullEvent::Ready { .. } => EventKind::Ready,
        serenity::FullEvent::ShardStageUpdate { .. } => EventKind::ShardStage,
        serenity::FullEvent::GuildCreate { .. } => EventKind::GuildCreate,
        serenity::FullEvent::GuildDelete { .. } => EventKind::GuildDelete,
        serenity::FullEvent::GuildMemberAddition { .. } => EventKind::GuildMemberAdd,
        serenity::FullEvent::GuildMemberRemoval { .. } => EventKind::GuildMemberRemove,
        serenity::FullEvent::GuildBanAddition { .. } => EventKind::GuildBanAdd,
        serenity::FullEvent::GuildBanRemoval { .. } => EventKind::GuildBanRemove,
        serenity::FullEvent::Message { .. } => EventKind::MessageCreate,
        serenity::FullEvent::MessageUpdate { .. } => EventKind::MessageUpdate,
        serenity::FullEvent::MessageDelete { .. } => EventKind::MessageDelete,
        _ => return None,
    };
    Some(kind)
}

pub fn build_event_table() -> EventTable<EventHandler> {
    EventTable::<EventHandler>::builder()
        .on(EventKind::Ready, ready)
        .on(EventKind::ShardStage, shard_stage)
        .on(EventKind::GuildCreate, notifier::guild_create)
        .on(EventKind::GuildDelete, notifier::guild_delete)
        .on(EventKind::GuildMemberAdd, notifier::member_add)
        .on(EventKind::GuildMemberRemove, notifier::member_remove)
        .on(EventKind::GuildBanAdd, notifier::ban_add)
        .on(EventKind::GuildBanRemove, notifier::ban_remove)
        .on(EventKind::MessageCreate, auditor::message_create)
        .on(EventKind::MessageUpdate, auditor::message_update)
        .on(EventKind::MessageDelete, auditor::message_delete)
        .build()
}

/// Framework event hook.
pub async fn handle_event(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    let Some(kind) = event_kind(event) else {
        return Ok(());
    };
    let Some(handler) = data.events.get(kind) else {
        return Ok(());
    };

    if let Err(e) = handler(ctx, event, data).await {
        tracing::error!(?kind, "Error handling event: {:#}", e);
    }

    Ok(())
}

fn ready<'a>(
    _ctx: &'a serenity::Context,
    event: &'a serenity::FullEvent,
    _data: &'a Data,
) -> poise::BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        if let serenity::FullEvent::Ready { data_about_bot } = event {
            tracing::info!(
                user = %data_about_bot.user.tag(),
                guilds = data_about_bot.guilds.len(),
                "Connected to Discord"
            );
        }
        Ok(())
    })
}

fn shard_stage<'a>(
    _ctx: &'a serenity::Context,
    event: &'a serenity::FullEvent,
    _data: &'a Data,
) -> poise::BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        let serenity::FullEvent::ShardStageUpdate { event } = event else {
            return Ok(());
        };

        let shard_id = event.shard_id.0;
        if event.new == serenity::ConnectionStage::Disconnected {
            // serenity reconnects and re-identifies on its own after an invalidated session.
            tracing::warn!(shard_id, old = ?event.old, "Shard disconnected");
        } else {
            tracing::info!(shard_id, old = ?event.old, new = ?event.new, "Shard stage changed");
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subscribed_event_has_a_handler() {
        let table = build_event_table();
        assert_eq!(table.len(), 11);

        for kind in [
            EventKind::Ready,
            EventKind::ShardStage,
            EventKind::GuildCreate,
            EventKind::GuildDelete,
            EventKind::GuildMemberAdd,
            EventKind::GuildMemberRemove,
            EventKind::GuildBanAdd,
            EventKind::GuildBanRemove,
            EventKind::MessageCreate,
            EventKind::MessageUpdate,
            EventKind::MessageDelete,
        ] {
            assert!(table.get(kind).is_some(), "{:?} has no handler", kind);
        }
    }

    #[test]
    fn unsubscribed_events_are_not_classified() {
        let event = serenity::FullEvent::GuildBanAddition {
            guild_id: serenity::GuildId::new(1),
            banned_user: serenity::User::default(),
        };
        assert_eq!(event_kind(&event), Some(EventKind::GuildBanAdd));

        let event = serenity::FullEvent::CacheReady { guilds: vec![] };
        assert_eq!(event_kind(&event), None);
    }
}
