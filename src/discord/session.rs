// The Discord gateway connection.
//
// `connect` starts the client on its own task and waits for the framework
// setup hook to report readiness. A session that never becomes ready within
// the connect timeout is torn down; after that the session lives until
// Ctrl-C or until the gateway gives up.

use crate::discord::commands::presence;
use crate::discord::{dispatch, Data, Error};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error as ThisError;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, ThisError)]
pub enum SessionError {
    #[error("Failed to create the Discord client: {0}")]
    Client(#[source] serenity::Error),

    #[error("Took longer than 60 seconds to connect to Discord.")]
    Timeout,

    #[error("Discord gateway error: {0}")]
    Gateway(#[source] serenity::Error),

    #[error("The Discord connection closed unexpectedly.")]
    Closed,
}

type Runner = JoinHandle<Result<(), serenity::Error>>;

pub struct Session {
    shard_manager: Arc<serenity::ShardManager>,
    runner: Runner,
}

/// Start the client and wait until the setup hook signals `ready`.
pub async fn connect(
    token: &str,
    intents: serenity::GatewayIntents,
    framework: poise::Framework<Data, Error>,
    ready: oneshot::Receiver<()>,
) -> Result<Session, SessionError> {
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .map_err(SessionError::Client)?;

    let shard_manager = client.shard_manager.clone();
    let mut runner: Runner = tokio::spawn(async move { client.start().await });

    tracing::info!("Connecting to Discord");

    tokio::select! {
        signal = tokio::time::timeout(CONNECT_TIMEOUT, ready) => match signal {
            Ok(Ok(())) => Ok(Session { shard_manager, runner }),
            // The setup hook dropped its sender without signalling.
            Ok(Err(_)) => {
                shard_manager.shutdown_all().await;
                Err(SessionError::Closed)
            }
            Err(_) => {
                shard_manager.shutdown_all().await;
                Err(SessionError::Timeout)
            }
        },
        finished = &mut runner => Err(stopped(finished)),
    }
}

impl Session {
    /// Run until Ctrl-C or until the gateway stops.
    ///
    /// A gateway failure is returned as-is; there is no reconnect loop here.
    pub async fn serve(mut self) -> Result<(), SessionError> {
        let finished = tokio::select! {
            _ = tokio::signal::ctrl_c() => None,
            finished = &mut self.runner => Some(finished),
        };

        match finished {
            None => {
                tracing::info!("Received Ctrl-C, shutting down");
                self.disconnect().await;
                if let Ok(Err(e)) = (&mut self.runner).await {
                    tracing::warn!("Gateway error during shutdown: {}", e);
                }
                Ok(())
            }
            Some(Ok(Ok(()))) => {
                tracing::info!("Gateway stopped");
                Ok(())
            }
            Some(finished) => Err(stopped(finished)),
        }
    }

    pub async fn disconnect(&self) {
        self.shard_manager.shutdown_all().await;
        tracing::info!("Closed the Discord connection.");
    }
}

fn stopped(finished: Result<Result<(), serenity::Error>, tokio::task::JoinError>) -> SessionError {
    match finished {
        Ok(Err(e)) => SessionError::Gateway(e),
        Ok(Ok(())) => SessionError::Closed,
        Err(e) => {
            tracing::error!("Gateway task failed: {}", e);
            SessionError::Closed
        }
    }
}

/// Setup hook body, run once on the first Ready.
pub async fn on_ready(
    ctx: &serenity::Context,
    ready: &serenity::Ready,
    data: &Data,
) -> Result<(), Error> {
    tracing::info!(user = %ready.user.tag(), "Bot is starting up");

    // Fill the member cache one guild at a time. Chunks arrive over the
    // gateway; channels are already cached from GUILD_CREATE.
    for guild in &ready.guilds {
        ctx.shard.chunk_guild(
            guild.id,
            None,
            false,
            serenity::ChunkGuildFilter::None,
            None,
        );
        tracing::debug!(guild_id = guild.id.get(), "Requested member chunks");
    }

    dispatch::register_commands(ctx, &*data.registry).await?;
    presence::on_ready(ctx, &data.config.command_prefix);

    if data.config.is_production() {
        if let Some(owner_id) = data.config.owner_id {
            let message = serenity::CreateMessage::new().content(startup_message(std::process::id()));
            if let Err(e) = serenity::UserId::new(owner_id)
                .direct_message(ctx, message)
                .await
            {
                tracing::warn!(owner_id, "Failed to send startup message: {}", e);
            }
        }
    }

    tracing::info!("Bot is ready");
    Ok(())
}

fn startup_message(pid: u32) -> String {
    format!("I just started running. Did I crash? :worried:\nPID:``{}``", pid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_message_carries_pid() {
        assert_eq!(
            startup_message(4242),
            "I just started running. Did I crash? :worried:\nPID:``4242``"
        );
    }

    #[test]
    fn timeout_error_reads_as_a_sentence() {
        assert_eq!(
            SessionError::Timeout.to_string(),
            "Took longer than 60 seconds to connect to Discord."
        );
    }

    #[tokio::test]
    async fn stopped_runner_maps_to_session_errors() {
        let clean: Runner = tokio::spawn(async { Ok(()) });
        assert!(matches!(stopped(clean.await), SessionError::Closed));

        let failed: Runner = tokio::spawn(async { Err(serenity::Error::Other("boom")) });
        assert!(matches!(stopped(failed.await), SessionError::Gateway(_)));
    }
}
