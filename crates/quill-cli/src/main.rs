//! The `quill` binary: wires the Discord gateway, the summarizer, and the
//! Linear client together, or runs the local OAuth helper.

mod oauth_server;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use quill_ai::{IssueSummarizer, OpenAiClient, OpenAiConfig, SummarizerConfig};
use quill_core::QuillConfig;
use quill_discord_runtime::{run_gateway, DiscordRuntimeConfig, QuillHandler};
use quill_linear::{LinearClient, LinearConfig};
use quill_orchestrator::Orchestrator;

#[derive(Debug, Parser)]
#[command(name = "quill", about = "Files Linear issues from Discord conversations")]
struct Cli {
    /// Messages fetched per invocation (1-100).
    #[arg(long, env = "QUILL_HISTORY_LIMIT", default_value_t = 50)]
    history_limit: u8,

    /// Model used for summarization.
    #[arg(long, env = "QUILL_MODEL", default_value = "gpt-4o-mini")]
    model: String,

    /// Base URL of the OpenAI-compatible completion endpoint.
    #[arg(long, env = "QUILL_OPENAI_API_BASE", default_value = "https://api.openai.com/v1")]
    openai_api_base: String,

    /// Linear GraphQL endpoint.
    #[arg(long, env = "QUILL_LINEAR_ENDPOINT", default_value = "https://api.linear.app/graphql")]
    linear_endpoint: String,

    /// Per-request timeout for outbound API calls, in milliseconds.
    #[arg(long, env = "QUILL_REQUEST_TIMEOUT_MS", default_value_t = 30_000)]
    request_timeout_ms: u64,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Run the local Linear OAuth helper and print an access token.
    Oauth {
        /// Port for the local callback listener.
        #[arg(long, env = "QUILL_OAUTH_PORT", default_value_t = 3000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Some(CliCommand::Oauth { port }) => oauth_server::run(port).await,
        None => serve(cli).await,
    }
}

async fn serve(cli: Cli) -> Result<()> {
    let config = QuillConfig::from_env().context("loading configuration")?;

    let llm = OpenAiClient::new(OpenAiConfig::single_attempt(
        cli.openai_api_base,
        config.openai_api_key,
        cli.request_timeout_ms,
    ))
    .context("building summarization client")?;
    let summarizer = IssueSummarizer::new(
        Arc::new(llm),
        SummarizerConfig {
            model: cli.model,
            ..SummarizerConfig::default()
        },
    );

    let linear = LinearClient::new(LinearConfig::new(
        cli.linear_endpoint,
        config.linear_access_token,
        cli.request_timeout_ms,
    ))
    .context("building Linear client")?;

    let orchestrator = Arc::new(Orchestrator::new(Arc::new(summarizer), Arc::new(linear)));
    let handler = QuillHandler::new(
        orchestrator,
        DiscordRuntimeConfig {
            history_limit: cli.history_limit.clamp(1, 100),
        },
    );

    info!("starting gateway session");
    run_gateway(&config.discord_token, handler).await
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
