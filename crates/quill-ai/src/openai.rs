use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::sleep;

use crate::{
    retry::{
        is_retryable_http_error, new_request_id, parse_retry_after_ms, provider_retry_delay_ms,
        should_retry_status,
    },
    ChatRequest, ChatResponse, ChatUsage, LlmClient, Message, MessageRole, QuillAiError,
};

#[derive(Debug, Clone)]
/// Public struct `OpenAiConfig` used across Quill components.
pub struct OpenAiConfig {
    pub api_base: String,
    pub api_key: String,
    pub organization: Option<String>,
    pub request_timeout_ms: u64,
    pub max_retries: usize,
    pub retry_jitter: bool,
}

impl OpenAiConfig {
    /// Single-attempt config used for summarization: failures propagate to
    /// the invoker instead of retrying.
    pub fn single_attempt(api_base: String, api_key: String, request_timeout_ms: u64) -> Self {
        Self {
            api_base,
            api_key,
            organization: None,
            request_timeout_ms,
            max_retries: 0,
            retry_jitter: false,
        }
    }
}

#[derive(Debug, Clone)]
/// Public struct `OpenAiClient` used across Quill components.
pub struct OpenAiClient {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, QuillAiError> {
        if config.api_key.trim().is_empty() {
            return Err(QuillAiError::MissingApiKey);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let bearer = format!("Bearer {}", config.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&bearer)
                .map_err(|e| QuillAiError::InvalidResponse(format!("invalid API key header: {e}")))?,
        );

        if let Some(org) = &config.organization {
            headers.insert(
                "OpenAI-Organization",
                HeaderValue::from_str(org).map_err(|e| {
                    QuillAiError::InvalidResponse(format!("invalid organization header: {e}"))
                })?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_millis(
                config.request_timeout_ms.max(1),
            ))
            .build()?;

        Ok(Self { client, config })
    }

    fn chat_completions_url(&self) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        if base.ends_with("/chat/completions") {
            return base.to_string();
        }

        format!("{base}/chat/completions")
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, QuillAiError> {
        let body = build_chat_request_body(&request);
        let url = self.chat_completions_url();
        let max_retries = self.config.max_retries;

        for attempt in 0..=max_retries {
            let request_id = new_request_id();
            let response = self
                .client
                .post(&url)
                .header("x-quill-request-id", request_id)
                .header("x-quill-retry-attempt", attempt.to_string())
                .json(&body)
                .send()
                .await;

            match response {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let raw = response.text().await?;
                        return parse_chat_response(&raw);
                    }

                    let retry_after_ms = parse_retry_after_ms(response.headers());
                    let raw = response.text().await?;
                    if attempt < max_retries && should_retry_status(status.as_u16()) {
                        let backoff_ms = provider_retry_delay_ms(
                            attempt,
                            self.config.retry_jitter,
                            retry_after_ms,
                        );
                        sleep(std::time::Duration::from_millis(backoff_ms)).await;
                        continue;
                    }

                    return Err(QuillAiError::HttpStatus {
                        status: status.as_u16(),
                        body: raw,
                    });
                }
                Err(error) => {
                    if attempt < max_retries && is_retryable_http_error(&error) {
                        let backoff_ms =
                            provider_retry_delay_ms(attempt, self.config.retry_jitter, None);
                        sleep(std::time::Duration::from_millis(backoff_ms)).await;
                        continue;
                    }
                    return Err(QuillAiError::Http(error));
                }
            }
        }

        Err(QuillAiError::InvalidResponse(
            "request retry loop terminated unexpectedly".to_string(),
        ))
    }
}

fn build_chat_request_body(request: &ChatRequest) -> Value {
    let messages: Vec<Value> = request
        .messages
        .iter()
        .map(|message| {
            json!({
                "role": role_label(message),
                "content": message.content,
            })
        })
        .collect();

    let mut body = json!({
        "model": request.model,
        "messages": messages,
    });

    if let Some(max_tokens) = request.max_tokens {
        body["max_tokens"] = json!(max_tokens);
    }
    if let Some(temperature) = request.temperature {
        body["temperature"] = json!(temperature);
    }

    body
}

fn role_label(message: &Message) -> &'static str {
    match message.role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    total_tokens: u64,
}

fn parse_chat_response(raw: &str) -> Result<ChatResponse, QuillAiError> {
    let parsed: OpenAiChatResponse = serde_json::from_str(raw)?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| QuillAiError::InvalidResponse("response contained no choices".to_string()))?;

    let usage = parsed
        .usage
        .map(|usage| ChatUsage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        })
        .unwrap_or_default();

    Ok(ChatResponse {
        message: Message::assistant(choice.message.content.unwrap_or_default()),
        finish_reason: choice.finish_reason,
        usage,
    })
}
