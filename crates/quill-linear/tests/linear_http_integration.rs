use httpmock::prelude::*;
use serde_json::json;

use quill_core::{IssueDraft, IssuePriority, IssueTracker, PipelineError};
use quill_linear::{oauth, LinearClient, LinearConfig, LinearError};

fn client_for(server: &MockServer) -> LinearClient {
    LinearClient::new(LinearConfig {
        endpoint: format!("{}/graphql", server.base_url()),
        access_token: "lin_api_test".to_string(),
        request_timeout_ms: 5_000,
        max_retries: 0,
    })
    .expect("linear client should be created")
}

fn draft() -> IssueDraft {
    IssueDraft {
        title: "Fix login crash".to_string(),
        description: "Submit crashes the page.".to_string(),
        priority: IssuePriority::High,
        assignee_hint: None,
    }
}

#[tokio::test]
async fn linear_client_sends_bearer_auth_and_parses_users() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .header("authorization", "Bearer lin_api_test")
            .body_includes("users");
        then.status(200).json_body(json!({
            "data": {
                "users": {
                    "nodes": [
                        {"id": "u1", "name": "ada", "displayName": "Ada Lovelace"}
                    ]
                }
            }
        }));
    });

    let client = client_for(&server);
    let users = client.list_users().await.expect("users");

    mock.assert();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, "u1");
    assert_eq!(users[0].display_name, "Ada Lovelace");
}

#[tokio::test]
async fn functional_issue_creation_resolves_team_once_and_returns_url() {
    let server = MockServer::start();
    let teams = server.mock(|when, then| {
        when.method(POST).path("/graphql").body_includes("teams");
        then.status(200).json_body(json!({
            "data": {
                "teams": {
                    "nodes": [
                        {
                            "id": "team-1",
                            "states": {"nodes": [{"id": "s2", "name": "Todo"}]}
                        }
                    ]
                }
            }
        }));
    });
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .body_includes("issueCreate")
            .body_includes("\"teamId\":\"team-1\"")
            .body_includes("\"title\":\"Fix login crash\"")
            .body_includes("\"priority\":2")
            .body_includes("\"stateId\":\"s2\"")
            .body_includes("View Discord thread");
        then.status(200).json_body(json!({
            "data": {
                "issueCreate": {
                    "success": true,
                    "issue": {
                        "identifier": "ENG-123",
                        "url": "https://linear.app/team/issue/ENG-123"
                    }
                }
            }
        }));
    });

    let client = client_for(&server);
    let first = client
        .create_issue(&draft(), None, "https://discord.com/channels/42/99/1234")
        .await
        .expect("issue");
    let second = client
        .create_issue(&draft(), None, "https://discord.com/channels/42/99/1234")
        .await
        .expect("issue");

    // Team resolution is cached for the process lifetime.
    teams.assert_calls(1);
    create.assert_calls(2);
    assert_eq!(first.identifier, "ENG-123");
    assert_eq!(first.url, "https://linear.app/team/issue/ENG-123");
    assert_eq!(second.url, first.url);
}

#[tokio::test]
async fn functional_auth_and_validation_failures_map_to_taxonomy() {
    let server = MockServer::start();
    let mut unauthorized = server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(401).body("unauthorized");
    });

    let client = client_for(&server);
    let result = client.list_users().await;
    unauthorized.assert();
    assert!(matches!(result, Err(PipelineError::AuthError(_))));

    unauthorized.delete();
    let rejected = server.mock(|when, then| {
        when.method(POST).path("/graphql").body_includes("issueCreate");
        then.status(200).json_body(json!({
            "data": {"issueCreate": {"success": false, "issue": null}}
        }));
    });
    let teams = server.mock(|when, then| {
        when.method(POST).path("/graphql").body_includes("teams");
        then.status(200).json_body(json!({
            "data": {
                "teams": {"nodes": [{"id": "team-1", "states": {"nodes": []}}]}
            }
        }));
    });

    let result = client
        .create_issue(&draft(), None, "https://discord.com/channels/42/99/1234")
        .await;
    teams.assert_calls(1);
    rejected.assert_calls(1);
    assert!(matches!(result, Err(PipelineError::ValidationError(_))));
}

#[tokio::test]
async fn integration_transport_retries_server_errors() {
    let server = MockServer::start();
    let failing = server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(502).body("bad gateway");
    });

    let client = LinearClient::new(LinearConfig {
        endpoint: format!("{}/graphql", server.base_url()),
        access_token: "lin_api_test".to_string(),
        request_timeout_ms: 5_000,
        max_retries: 2,
    })
    .expect("linear client should be created");

    let result = client.workspace_users().await;
    // Initial attempt plus two retries before giving up.
    failing.assert_calls(3);
    assert!(matches!(
        result,
        Err(LinearError::HttpStatus { status: 502, .. })
    ));
}

#[tokio::test]
async fn integration_oauth_exchange_posts_form_and_returns_token() {
    let server = MockServer::start();
    let token = server.mock(|when, then| {
        when.method(POST)
            .path("/oauth/token")
            .body_includes("grant_type=authorization_code")
            .body_includes("client_id=client-id")
            .body_includes("code=abc123");
        then.status(200).json_body(json!({
            "access_token": "lin_oauth_token",
            "token_type": "Bearer"
        }));
    });

    let mut config = oauth::OauthConfig::new(
        "client-id".to_string(),
        "client-secret".to_string(),
        "http://localhost:3000/callback".to_string(),
    );
    config.token_url = format!("{}/oauth/token", server.base_url());

    let client = reqwest::Client::new();
    let access_token = oauth::exchange_code(&client, &config, "abc123")
        .await
        .expect("token");

    token.assert();
    assert_eq!(access_token, "lin_oauth_token");

    let failure = server.mock(|when, then| {
        when.method(POST).path("/oauth/denied");
        then.status(400).body("bad code");
    });
    config.token_url = format!("{}/oauth/denied", server.base_url());
    let result = oauth::exchange_code(&client, &config, "bad").await;
    failure.assert();
    assert!(matches!(
        result,
        Err(LinearError::HttpStatus { status: 400, .. })
    ));
}
