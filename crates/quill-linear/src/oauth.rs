//! Linear OAuth helper: builds the authorization URL and exchanges the
//! callback code for an access token. The `quill oauth` subcommand serves
//! these over a short-lived local HTTP listener; nothing is persisted.

use serde::Deserialize;

use crate::client::LinearError;

pub const DEFAULT_AUTHORIZE_URL: &str = "https://linear.app/oauth/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://api.linear.app/oauth/token";
pub const OAUTH_SCOPE: &str = "read,write,issues:create";

#[derive(Debug, Clone)]
/// Public struct `OauthConfig` used across Quill components.
pub struct OauthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub token_url: String,
}

impl OauthConfig {
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }

    /// The browser entry point for the operator, requesting application-actor
    /// issue-creation scope.
    pub fn authorization_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&actor=application",
            self.authorize_url, self.client_id, self.redirect_uri, OAUTH_SCOPE
        )
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchanges the callback code for an access token at Linear's token
/// endpoint. The caller copies the token into `LINEAR_ACCESS_TOKEN`.
pub async fn exchange_code(
    client: &reqwest::Client,
    config: &OauthConfig,
    code: &str,
) -> Result<String, LinearError> {
    let response = client
        .post(&config.token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", config.redirect_uri.as_str()),
        ])
        .send()
        .await?;

    let status = response.status();
    let raw = response.text().await?;
    if !status.is_success() {
        return Err(LinearError::HttpStatus {
            status: status.as_u16(),
            body: raw,
        });
    }

    let token: TokenResponse = serde_json::from_str(&raw)?;
    Ok(token.access_token)
}
