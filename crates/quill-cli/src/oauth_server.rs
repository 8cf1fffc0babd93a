//! Local OAuth helper: serves the authorize redirect and the callback
//! exchange so an operator can mint a `LINEAR_ACCESS_TOKEN` without leaving
//! the terminal. The token is printed once and never persisted.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{info, warn};

use quill_linear::oauth::{exchange_code, OauthConfig};

#[derive(Clone)]
struct OauthState {
    http: reqwest::Client,
    config: Arc<OauthConfig>,
}

pub async fn run(port: u16) -> Result<()> {
    let client_id = require_env("LINEAR_CLIENT_ID")?;
    let client_secret = require_env("LINEAR_CLIENT_SECRET")?;
    let redirect_uri = format!("http://localhost:{port}/callback");

    let state = OauthState {
        http: reqwest::Client::new(),
        config: Arc::new(OauthConfig::new(client_id, client_secret, redirect_uri)),
    };

    let app = Router::new()
        .route("/", get(authorize))
        .route("/callback", get(callback))
        .with_state(state);

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("binding oauth listener on port {port}"))?;
    info!(port, "open http://localhost:{port}/ in a browser to authorize");

    axum::serve(listener, app).await.context("serving oauth helper")
}

fn require_env(name: &'static str) -> Result<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .with_context(|| format!("missing required environment variable {name}"))
}

async fn authorize(State(state): State<OauthState>) -> Redirect {
    Redirect::temporary(&state.config.authorization_url())
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: String,
}

async fn callback(
    State(state): State<OauthState>,
    Query(query): Query<CallbackQuery>,
) -> impl IntoResponse {
    match exchange_code(&state.http, &state.config, &query.code).await {
        Ok(access_token) => {
            info!("access token issued");
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Authorization successful! Copy this access token to your environment:",
                    "access_token": access_token,
                })),
            )
        }
        Err(error) => {
            warn!(error = %error, "token exchange failed");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": "Failed to get access token" })),
            )
        }
    }
}
