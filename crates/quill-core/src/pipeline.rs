use async_trait::async_trait;
use thiserror::Error;

use crate::issue::{CreatedIssue, IssueDraft, WorkspaceUser};
use crate::transcript::{ChannelMessage, InvocationContext};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
/// Terminal failure categories for one command invocation. None of these are
/// fatal to the process; the gateway connection stays up.
pub enum PipelineError {
    #[error("chat platform unavailable: {0}")]
    PlatformUnavailable(String),
    #[error("missing channel read permission: {0}")]
    PermissionDenied(String),
    #[error("no messages available to summarize")]
    EmptyHistory,
    #[error("summarizer returned a malformed draft: {0}")]
    MalformedResponse(String),
    #[error("rate limited upstream: {0}")]
    RateLimited(String),
    #[error("upstream service failure: {0}")]
    UpstreamError(String),
    #[error("authentication failed: {0}")]
    AuthError(String),
    #[error("tracker rejected the issue: {0}")]
    ValidationError(String),
}

impl PipelineError {
    /// One fixed sentence per category for the channel reply. Never includes
    /// tokens or raw provider bodies.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PlatformUnavailable(_) => {
                "Discord is unavailable right now. Please try again in a moment."
            }
            Self::PermissionDenied(_) => {
                "I don't have permission to read messages in this channel."
            }
            Self::EmptyHistory => "No recent messages found to create an issue from.",
            Self::MalformedResponse(_) => {
                "The summarizer did not return a usable issue draft. Please try again."
            }
            Self::RateLimited(_) => {
                "The summarization service is rate limiting requests. Please try again shortly."
            }
            Self::UpstreamError(_) => "An upstream service failed. Please try again later.",
            Self::AuthError(_) => {
                "A configured access token was rejected. Please check the bot's credentials."
            }
            Self::ValidationError(_) => "Linear rejected the generated issue.",
        }
    }
}

#[async_trait]
/// Reads the recent message history for an invocation, oldest first.
pub trait HistorySource: Send + Sync {
    async fn fetch_history(
        &self,
        ctx: &InvocationContext,
    ) -> Result<Vec<ChannelMessage>, PipelineError>;
}

#[async_trait]
/// Turns a transcript into an issue draft via the language-model endpoint.
pub trait DraftSummarizer: Send + Sync {
    async fn summarize(
        &self,
        messages: &[ChannelMessage],
        users: &[WorkspaceUser],
    ) -> Result<IssueDraft, PipelineError>;
}

#[async_trait]
/// Trait contract for the issue tracker behind the pipeline.
pub trait IssueTracker: Send + Sync {
    async fn list_users(&self) -> Result<Vec<WorkspaceUser>, PipelineError>;

    async fn create_issue(
        &self,
        draft: &IssueDraft,
        assignee_id: Option<&str>,
        source_url: &str,
    ) -> Result<CreatedIssue, PipelineError>;
}
