use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::OnceCell;
use tokio::time::sleep;

use crate::types::TeamContext;

const BASE_BACKOFF_MS: u64 = 200;

#[derive(Debug, Error)]
/// Enumerates supported `LinearError` values.
pub enum LinearError {
    #[error("missing access token")]
    MissingAccessToken,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("tracker returned non-success status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("graphql error: {0}")]
    Graphql(String),
    #[error("tracker rejected the request: {0}")]
    Rejected(String),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone)]
/// Public struct `LinearConfig` used across Quill components.
pub struct LinearConfig {
    pub endpoint: String,
    pub access_token: String,
    pub request_timeout_ms: u64,
    pub max_retries: usize,
}

impl LinearConfig {
    pub fn new(endpoint: String, access_token: String, request_timeout_ms: u64) -> Self {
        Self {
            endpoint,
            access_token,
            request_timeout_ms,
            // Transport-level retries only; the orchestrator never retries.
            max_retries: 3,
        }
    }
}

/// GraphQL transport with bearer auth and bounded retry on transient
/// failures. The default team is resolved once per process lifetime.
pub struct LinearClient {
    pub(crate) client: reqwest::Client,
    pub(crate) config: LinearConfig,
    pub(crate) team: OnceCell<TeamContext>,
}

impl LinearClient {
    pub fn new(config: LinearConfig) -> Result<Self, LinearError> {
        if config.access_token.trim().is_empty() {
            return Err(LinearError::MissingAccessToken);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = format!("Bearer {}", config.access_token.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&bearer).map_err(|e| {
                LinearError::InvalidResponse(format!("invalid access token header: {e}"))
            })?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_millis(
                config.request_timeout_ms.max(1),
            ))
            .build()?;

        Ok(Self {
            client,
            config,
            team: OnceCell::new(),
        })
    }

    /// Executes one GraphQL document and returns the `data` payload.
    pub(crate) async fn execute(
        &self,
        query: &str,
        variables: Option<Value>,
    ) -> Result<Value, LinearError> {
        let mut body = json!({ "query": query });
        if let Some(variables) = variables {
            body["variables"] = variables;
        }

        let max_retries = self.config.max_retries;
        for attempt in 0..=max_retries {
            let response = self
                .client
                .post(&self.config.endpoint)
                .json(&body)
                .send()
                .await;

            match response {
                Ok(response) => {
                    let status = response.status();
                    let raw = response.text().await?;
                    if status.is_success() {
                        return extract_graphql_data(&raw);
                    }

                    if attempt < max_retries && should_retry_status(status.as_u16()) {
                        sleep(std::time::Duration::from_millis(backoff_ms(attempt))).await;
                        continue;
                    }

                    return Err(LinearError::HttpStatus {
                        status: status.as_u16(),
                        body: raw,
                    });
                }
                Err(error) => {
                    let retryable = error.is_timeout() || error.is_connect() || error.is_request();
                    if attempt < max_retries && retryable {
                        sleep(std::time::Duration::from_millis(backoff_ms(attempt))).await;
                        continue;
                    }
                    return Err(LinearError::Http(error));
                }
            }
        }

        Err(LinearError::InvalidResponse(
            "request retry loop terminated unexpectedly".to_string(),
        ))
    }
}

fn should_retry_status(status: u16) -> bool {
    status == 429 || status >= 500
}

fn backoff_ms(attempt: usize) -> u64 {
    let shift = attempt.min(6);
    BASE_BACKOFF_MS.saturating_mul(1_u64 << shift)
}

fn extract_graphql_data(raw: &str) -> Result<Value, LinearError> {
    let parsed: Value = serde_json::from_str(raw)?;

    if let Some(errors) = parsed.get("errors").and_then(Value::as_array) {
        if !errors.is_empty() {
            let message = errors
                .iter()
                .filter_map(|error| error.get("message").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("; ");
            let message = if message.is_empty() {
                "unspecified GraphQL error".to_string()
            } else {
                message
            };
            return Err(LinearError::Graphql(message));
        }
    }

    parsed
        .get("data")
        .cloned()
        .filter(|data| !data.is_null())
        .ok_or_else(|| LinearError::InvalidResponse("response carried no data".to_string()))
}
