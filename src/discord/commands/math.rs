use crate::core::commands::{CommandDescriptor, ParamKind, ParamSpec};
use crate::core::math::{evaluate, MathOutcome};
use crate::discord::{Context, Error};

pub fn descriptor() -> CommandDescriptor {
    CommandDescriptor::new("math", "Evaluate an expression.")
        .param(ParamSpec::required(
            "expression",
            ParamKind::String,
            "Expression to evaluate.",
        ))
        .prefix_aliases(&["calc"])
}

/// Evaluate an expression.
///
/// Failed evaluations are only shown to you, together with how the input was read.
#[poise::command(slash_command, prefix_command, aliases("calc"))]
pub async fn math(
    ctx: Context<'_>,
    #[description = "Expression to evaluate."]
    #[rest]
    expression: String,
) -> Result<(), Error> {
    tracing::debug!(%expression, "Evaluating math expression");

    let outcome = evaluate(&expression);
    if let MathOutcome::Failed { echo, error } = &outcome {
        tracing::warn!(%expression, "Error evaluating '{}': {}", echo, error);
    }

    // Ephemeral is ignored for prefix invocations, which always reply in channel.
    let reply = outcome.reply();
    ctx.send(
        poise::CreateReply::default()
            .content(reply.content)
            .ephemeral(reply.ephemeral),
    )
    .await?;

    Ok(())
}
