use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// One channel message, chronological within its sequence. Fetched fresh per
/// invocation and never cached.
pub struct ChannelMessage {
    pub author_id: u64,
    pub author_name: String,
    pub timestamp_unix_ms: i64,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Context captured when a slash command fires; discarded after the reply.
pub struct InvocationContext {
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub user_id: u64,
    pub interaction_id: u64,
    pub command_name: String,
}

impl InvocationContext {
    /// Canonical link back to the invoking conversation, embedded in the
    /// created issue's description. DM invocations use the `@me` segment.
    pub fn source_url(&self) -> String {
        let guild = self
            .guild_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "@me".to_string());
        format!(
            "https://discord.com/channels/{guild}/{}/{}",
            self.channel_id, self.interaction_id
        )
    }
}

/// Renders a message sequence as the `author: body` transcript handed to the
/// summarizer prompt.
pub fn render_transcript(messages: &[ChannelMessage]) -> String {
    messages
        .iter()
        .map(|message| format!("{}: {}", message.author_name, message.body))
        .collect::<Vec<_>>()
        .join("\n")
}
