use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `MessageRole` values.
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Public struct `Message` used across Quill components.
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: text.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Public struct `ChatRequest` used across Quill components.
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
/// Public struct `ChatUsage` used across Quill components.
pub struct ChatUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Public struct `ChatResponse` used across Quill components.
pub struct ChatResponse {
    pub message: Message,
    pub finish_reason: Option<String>,
    pub usage: ChatUsage,
}

#[derive(Debug, Error)]
/// Enumerates supported `QuillAiError` values.
pub enum QuillAiError {
    #[error("missing API key")]
    MissingApiKey,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned non-success status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
/// Trait contract for `LlmClient` behavior. One completion per call; Quill
/// holds no multi-turn state.
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, QuillAiError>;
}
