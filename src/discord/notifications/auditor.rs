// Message auditing.
//
// New guild messages are remembered so later edits and deletes can be
// described even after serenity's cache has dropped them. Prefixed messages
// naming a slash-only command get a pointer to the slash version.

use crate::core::commands::CommandRegistry;
use crate::core::config::GuildIdTable;
use crate::core::notifications::{AuditService, TrackedMessage};
use crate::discord::dispatch::moved_to_slash_hint;
use crate::discord::notifications::notifier::notify;
use crate::discord::Data;
use anyhow::Result;
use poise::serenity_prelude::{self as serenity, Context, FullEvent};

pub fn message_create<'a>(
    ctx: &'a Context,
    event: &'a FullEvent,
    data: &'a Data,
) -> poise::BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        let FullEvent::Message { new_message } = event else {
            return Ok(());
        };
        let guild_id = new_message.guild_id.map(|id| id.get());

        if let (Some(guild_id), Some(webhook_id)) = (guild_id, new_message.webhook_id) {
            if is_legacy_webhook(&data.guilds, guild_id, webhook_id.get()) {
                return Ok(());
            }
        }
        if new_message.author.bot {
            return Ok(());
        }

        let hint = record_message(
            &data.audit,
            &*data.registry,
            &data.config.command_prefix,
            &new_message.content,
            guild_id.map(|guild_id| tracked_from(new_message, guild_id)),
        );

        if let Some(hint) = hint {
            tracing::debug!(content = %new_message.content, "Pointing legacy command to slash");
            if let Err(e) = new_message.reply(&ctx.http, hint).await {
                tracing::warn!(
                    channel_id = new_message.channel_id.get(),
                    "Failed to send slash hint: {}",
                    e
                );
            }
        }

        Ok(())
    })
}

pub fn message_update<'a>(
    ctx: &'a Context,
    event: &'a FullEvent,
    data: &'a Data,
) -> poise::BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        let FullEvent::MessageUpdate {
            old_if_available,
            event,
            ..
        } = event
        else {
            return Ok(());
        };

        let Some(guild_id) = event.guild_id.map(|id| id.get()) else {
            return Ok(());
        };
        // Embed-only updates carry no content.
        let Some(new_content) = event.content.as_deref() else {
            return Ok(());
        };

        let fallback = old_if_available
            .as_ref()
            .filter(|message| !message.author.bot)
            .map(|message| tracked_from(message, guild_id));

        if let Some(notification) =
            data.audit
                .message_edited(event.id.get(), guild_id, new_content, fallback)
        {
            notify(ctx, data, notification).await?;
        }
        Ok(())
    })
}

pub fn message_delete<'a>(
    ctx: &'a Context,
    event: &'a FullEvent,
    data: &'a Data,
) -> poise::BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        let FullEvent::MessageDelete {
            channel_id,
            deleted_message_id,
            guild_id,
        } = event
        else {
            return Ok(());
        };
        let Some(guild_id) = guild_id.map(|id| id.get()) else {
            return Ok(());
        };

        // Copy out of the cache before awaiting; cache guards are not Send.
        let fallback = ctx
            .cache
            .message(*channel_id, *deleted_message_id)
            .filter(|message| !message.author.bot)
            .map(|message| tracked_from(&message, guild_id));

        if let Some(notification) =
            data.audit
                .message_deleted(deleted_message_id.get(), guild_id, fallback)
        {
            notify(ctx, data, notification).await?;
        }
        Ok(())
    })
}

/// Remember the snapshot, then work out the slash hint. The snapshot is kept
/// whatever happens to the hint reply.
fn record_message<H>(
    audit: &AuditService,
    registry: &CommandRegistry<H>,
    prefix: &str,
    content: &str,
    snapshot: Option<TrackedMessage>,
) -> Option<String> {
    if let Some(snapshot) = snapshot {
        audit.remember_message(snapshot);
    }
    moved_to_slash_hint(registry, prefix, content)
}

fn tracked_from(message: &serenity::Message, guild_id: u64) -> TrackedMessage {
    TrackedMessage {
        message_id: message.id.get(),
        guild_id,
        channel_id: message.channel_id.get(),
        author_id: message.author.id.get(),
        author_name: message.author.name.clone(),
        content: message.content.clone(),
        attachments: message
            .attachments
            .iter()
            .map(|a| a.filename.clone())
            .collect(),
    }
}

/// Messages relayed by the old reaction-role webhook are not audited.
fn is_legacy_webhook(guilds: &GuildIdTable, guild_id: u64, webhook_id: u64) -> bool {
    guilds
        .get(guild_id)
        .is_some_and(|ids| ids.legacy_reaction_webhook_id == webhook_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commands::CommandDescriptor;

    fn snapshot(message_id: u64, content: &str) -> TrackedMessage {
        TrackedMessage {
            message_id,
            guild_id: 1,
            channel_id: 2,
            author_id: 3,
            author_name: "member".to_string(),
            content: content.to_string(),
            attachments: vec![],
        }
    }

    #[test]
    fn legacy_commands_are_remembered_alongside_the_hint() {
        let audit = AuditService::new();
        let mut registry = CommandRegistry::new();
        registry
            .register(CommandDescriptor::new("twitchinfo", "Twitch").guilds([1]), ())
            .unwrap();

        let hint = record_message(
            &audit,
            &registry,
            "!",
            "!twitchinfo someone",
            Some(snapshot(10, "!twitchinfo someone")),
        );

        assert!(hint.is_some());
        assert_eq!(audit.tracked_count(), 1);
        assert!(audit.message_deleted(10, 1, None).is_some());
    }

    #[test]
    fn direct_messages_are_not_remembered() {
        let audit = AuditService::new();
        let registry: CommandRegistry<()> = CommandRegistry::new();

        assert_eq!(record_message(&audit, &registry, "!", "hello", None), None);
        assert_eq!(audit.tracked_count(), 0);
    }

    #[test]
    fn only_the_configured_webhook_is_skipped() {
        let guilds = GuildIdTable::builtin();
        let guild_id = guilds.guild_ids()[0];
        let webhook = guilds.get(guild_id).unwrap().legacy_reaction_webhook_id;

        assert!(is_legacy_webhook(&guilds, guild_id, webhook));
        assert!(!is_legacy_webhook(&guilds, guild_id, webhook + 1));
        assert!(!is_legacy_webhook(&guilds, 42, webhook));
    }
}
