//! Serenity gateway runtime: registers the `/autoissue` slash command,
//! collects channel history for each invocation, and delivers the reply.
//!
//! Serenity dispatches each gateway event on its own task, so concurrent
//! invocations stay independent; the only shared state is the process-scoped
//! orchestrator handle.

mod history;
mod reply;

use std::sync::Arc;

use serenity::all::{
    Command, CommandInteraction, Context, CreateCommand, EventHandler, GatewayIntents, Interaction,
    Ready,
};
use serenity::async_trait;
use serenity::Client;
use tracing::{error, info};

use quill_core::InvocationContext;
use quill_orchestrator::Orchestrator;

pub use history::{is_relevant_body, prepare_transcript, ChannelHistorySource};
pub use reply::{error_followup, success_followup};

pub const AUTOISSUE_COMMAND: &str = "autoissue";
const AUTOISSUE_DESCRIPTION: &str = "Create a Linear issue from recent messages";

#[derive(Debug, Clone, Copy)]
/// Public struct `DiscordRuntimeConfig` used across Quill components.
pub struct DiscordRuntimeConfig {
    /// Messages fetched per invocation. Discord caps a history page at 100.
    pub history_limit: u8,
}

impl Default for DiscordRuntimeConfig {
    fn default() -> Self {
        Self { history_limit: 50 }
    }
}

/// Gateway event handler wiring slash-command invocations into the pipeline.
pub struct QuillHandler {
    orchestrator: Arc<Orchestrator>,
    config: DiscordRuntimeConfig,
}

impl QuillHandler {
    pub fn new(orchestrator: Arc<Orchestrator>, config: DiscordRuntimeConfig) -> Self {
        Self {
            orchestrator,
            config,
        }
    }

    async fn handle_autoissue(&self, ctx: Context, command: CommandInteraction) {
        // Defer immediately; the pipeline spans three network round trips.
        if let Err(error) = command.defer(&ctx.http).await {
            error!(error = %error, "failed to defer interaction");
            return;
        }

        let invocation = InvocationContext {
            guild_id: command.guild_id.map(|id| id.get()),
            channel_id: command.channel_id.get(),
            user_id: command.user.id.get(),
            interaction_id: command.id.get(),
            command_name: command.data.name.clone(),
        };

        let source = ChannelHistorySource::new(ctx.http.clone(), self.config.history_limit);
        let followup = match self.orchestrator.run(&source, &invocation).await {
            Ok(report) => success_followup(&report),
            Err(error) => error_followup(&error),
        };

        if let Err(error) = command.create_followup(&ctx.http, followup).await {
            error!(error = %error, "failed to deliver reply");
        }
    }
}

#[async_trait]
impl EventHandler for QuillHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = ready.user.name.as_str(), "gateway session ready");

        let command = CreateCommand::new(AUTOISSUE_COMMAND).description(AUTOISSUE_DESCRIPTION);
        if let Err(error) = Command::create_global_command(&ctx.http, command).await {
            error!(error = %error, "failed to register slash command");
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };
        if command.data.name != AUTOISSUE_COMMAND {
            return;
        }
        self.handle_autoissue(ctx, command).await;
    }
}

/// Connects to the gateway and blocks until shutdown. Ctrl-C tears the shard
/// runner down so the process exits cleanly.
pub async fn run_gateway(token: &str, handler: QuillHandler) -> anyhow::Result<()> {
    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(token, intents)
        .event_handler(handler)
        .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            shard_manager.shutdown_all().await;
        }
    });

    client.start().await?;
    Ok(())
}
