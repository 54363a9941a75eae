// Guild membership notifications.
//
// Each handler reads its gateway event, builds a `Notification` and hands it
// to `notify`. Everything is logged; guild joins and leaves also go to the
// bot owner by DM.

use crate::core::notifications::Notification;
use crate::discord::notifications::formatter::owner_notice;
use crate::discord::Data;
use anyhow::Result;
use poise::serenity_prelude::{self as serenity, Context, FullEvent};

pub fn guild_create<'a>(
    ctx: &'a Context,
    event: &'a FullEvent,
    data: &'a Data,
) -> poise::BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        let FullEvent::GuildCreate { guild, is_new } = event else {
            return Ok(());
        };

        // Guilds we were already in arrive here on every connect too.
        if *is_new != Some(true) {
            return Ok(());
        }

        let notification = Notification::GuildJoined {
            guild_id: guild.id.get(),
            guild_name: guild.name.clone(),
            member_count: guild.member_count,
        };
        notify(ctx, data, notification).await
    })
}

pub fn guild_delete<'a>(
    ctx: &'a Context,
    event: &'a FullEvent,
    data: &'a Data,
) -> poise::BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        let FullEvent::GuildDelete { incomplete, full } = event else {
            return Ok(());
        };

        // An outage, not a removal.
        if incomplete.unavailable {
            tracing::warn!(guild_id = incomplete.id.get(), "Guild became unavailable");
            return Ok(());
        }

        let notification = Notification::GuildLeft {
            guild_id: incomplete.id.get(),
            guild_name: full.as_ref().map(|guild| guild.name.clone()),
        };
        notify(ctx, data, notification).await
    })
}

pub fn member_add<'a>(
    ctx: &'a Context,
    event: &'a FullEvent,
    data: &'a Data,
) -> poise::BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        let FullEvent::GuildMemberAddition { new_member } = event else {
            return Ok(());
        };

        let notification = Notification::MemberJoined {
            guild_id: new_member.guild_id.get(),
            user_id: new_member.user.id.get(),
            user_tag: new_member.user.tag(),
            created_at: Some(*new_member.user.created_at()),
        };
        notify(ctx, data, notification).await
    })
}

pub fn member_remove<'a>(
    ctx: &'a Context,
    event: &'a FullEvent,
    data: &'a Data,
) -> poise::BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        let FullEvent::GuildMemberRemoval {
            guild_id,
            user,
            member_data_if_available,
        } = event
        else {
            return Ok(());
        };

        // Present when the member list was chunked into the cache on ready.
        let notification = Notification::MemberLeft {
            guild_id: guild_id.get(),
            user_id: user.id.get(),
            user_tag: user.tag(),
            joined_at: member_data_if_available
                .as_ref()
                .and_then(|member| member.joined_at)
                .map(|at| *at),
        };
        notify(ctx, data, notification).await
    })
}

pub fn ban_add<'a>(
    ctx: &'a Context,
    event: &'a FullEvent,
    data: &'a Data,
) -> poise::BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        let FullEvent::GuildBanAddition {
            guild_id,
            banned_user,
        } = event
        else {
            return Ok(());
        };

        let notification = Notification::MemberBanned {
            guild_id: guild_id.get(),
            user_id: banned_user.id.get(),
            user_tag: banned_user.tag(),
        };
        notify(ctx, data, notification).await
    })
}

pub fn ban_remove<'a>(
    ctx: &'a Context,
    event: &'a FullEvent,
    data: &'a Data,
) -> poise::BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        let FullEvent::GuildBanRemoval {
            guild_id,
            unbanned_user,
        } = event
        else {
            return Ok(());
        };

        let notification = Notification::MemberUnbanned {
            guild_id: guild_id.get(),
            user_id: unbanned_user.id.get(),
            user_tag: unbanned_user.tag(),
        };
        notify(ctx, data, notification).await
    })
}

/// Log a notification and DM the owner when it concerns them.
pub async fn notify(ctx: &Context, data: &Data, notification: Notification) -> Result<()> {
    tracing::info!(
        guild_id = notification.guild_id(),
        "{}",
        notification.summary()
    );

    let Some(embed) = owner_notice(&notification) else {
        return Ok(());
    };
    let Some(owner_id) = data.config.owner_id else {
        return Ok(());
    };

    let message = serenity::CreateMessage::new().embed(embed);
    if let Err(e) = serenity::UserId::new(owner_id)
        .direct_message(ctx, message)
        .await
    {
        tracing::warn!(owner_id, "Failed to notify owner: {}", e);
    }

    Ok(())
}
