use std::sync::Arc;

use serenity::all::{Channel, ChannelId, ChannelType, GetMessages, Message, MessageId};
use serenity::async_trait;
use serenity::http::{Http, HttpError};
use tracing::debug;

use quill_core::{ChannelMessage, HistorySource, InvocationContext, PipelineError};

/// Reads recent messages from the invoking channel over the bot's REST
/// session. Constructed per invocation; the `Http` handle is the gateway's
/// shared one.
pub struct ChannelHistorySource {
    http: Arc<Http>,
    limit: u8,
}

impl ChannelHistorySource {
    pub fn new(http: Arc<Http>, limit: u8) -> Self {
        Self {
            http,
            limit: limit.clamp(1, 100),
        }
    }

    /// Threads keep their starter message in the parent channel, under the
    /// thread's own id. Best effort; a failed lookup never fails the fetch.
    async fn thread_starter(&self, channel_id: ChannelId) -> Option<Message> {
        let channel = channel_id.to_channel(&self.http).await.ok()?;
        let Channel::Guild(guild_channel) = channel else {
            return None;
        };
        if !matches!(
            guild_channel.kind,
            ChannelType::PublicThread | ChannelType::PrivateThread | ChannelType::NewsThread
        ) {
            return None;
        }
        let parent_id = guild_channel.parent_id?;
        parent_id
            .message(&self.http, MessageId::new(channel_id.get()))
            .await
            .ok()
    }
}

#[async_trait]
impl HistorySource for ChannelHistorySource {
    async fn fetch_history(
        &self,
        ctx: &InvocationContext,
    ) -> Result<Vec<ChannelMessage>, PipelineError> {
        let channel_id = ChannelId::new(ctx.channel_id);
        let page = GetMessages::new().limit(self.limit.saturating_add(1).min(100));
        let raw = channel_id
            .messages(&self.http, page)
            .await
            .map_err(map_gateway_error)?;

        // Discord returns the page newest first.
        let recent: Vec<ChannelMessage> = raw
            .iter()
            .rev()
            .filter(|message| !message.author.bot)
            .map(to_channel_message)
            .collect();
        let limit = usize::from(self.limit);
        let mut messages = prepare_transcript(recent, limit);

        if messages.len() < limit {
            if let Some(starter) = self.thread_starter(channel_id).await {
                if !starter.author.bot {
                    let starter = to_channel_message(&starter);
                    if is_relevant_body(&starter.body) {
                        messages.insert(0, starter);
                    }
                }
            }
        }

        debug!(
            channel_id = ctx.channel_id,
            count = messages.len(),
            "history collected"
        );
        Ok(messages)
    }
}

/// Drops empty bodies and slash-command echoes, orders chronologically, and
/// keeps the most recent `limit` messages.
pub fn prepare_transcript(
    mut messages: Vec<ChannelMessage>,
    limit: usize,
) -> Vec<ChannelMessage> {
    messages.retain(|message| is_relevant_body(&message.body));
    messages.sort_by_key(|message| message.timestamp_unix_ms);
    if messages.len() > limit {
        let excess = messages.len() - limit;
        messages.drain(..excess);
    }
    messages
}

pub fn is_relevant_body(body: &str) -> bool {
    let trimmed = body.trim();
    !trimmed.is_empty() && !trimmed.starts_with('/')
}

fn to_channel_message(message: &Message) -> ChannelMessage {
    ChannelMessage {
        author_id: message.author.id.get(),
        author_name: message
            .author
            .global_name
            .clone()
            .unwrap_or_else(|| message.author.name.clone()),
        timestamp_unix_ms: message.timestamp.unix_timestamp().saturating_mul(1_000),
        body: message.content.clone(),
    }
}

fn map_gateway_error(error: serenity::Error) -> PipelineError {
    if let serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) = &error {
        return classify_discord_status(response.status_code.as_u16(), &response.error.message);
    }
    PipelineError::PlatformUnavailable(error.to_string())
}

fn classify_discord_status(status: u16, detail: &str) -> PipelineError {
    if status == 403 {
        PipelineError::PermissionDenied(format!("discord status 403: {detail}"))
    } else {
        PipelineError::PlatformUnavailable(format!("discord status {status}: {detail}"))
    }
}
