// Bot presence shown in the member list.

use poise::serenity_prelude as serenity;

/// Advertise the everyday commands in the member list.
pub fn on_ready(ctx: &serenity::Context, prefix: &str) {
    let activity = serenity::ActivityData::listening(format!("/math | {}calc", prefix));
    ctx.set_presence(Some(activity), serenity::OnlineStatus::Online);
}
