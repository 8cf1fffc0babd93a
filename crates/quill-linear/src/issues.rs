use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use quill_core::{CreatedIssue, IssueDraft, IssueTracker, PipelineError, WorkspaceUser};

use crate::client::{LinearClient, LinearError};
use crate::types::{IssueCreatePayload, NodeList, TeamContext, TeamNode, UserNode};

const TEAMS_QUERY: &str = "\
query {
    teams {
        nodes {
            id
            states {
                nodes {
                    id
                    name
                }
            }
        }
    }
}";

const USERS_QUERY: &str = "\
query {
    users {
        nodes {
            id
            name
            displayName
        }
    }
}";

const ISSUE_CREATE_MUTATION: &str = "\
mutation CreateIssue(
    $title: String!,
    $description: String!,
    $teamId: String!,
    $priority: Int,
    $assigneeId: String,
    $stateId: String
) {
    issueCreate(input: {
        title: $title,
        description: $description,
        teamId: $teamId,
        priority: $priority,
        assigneeId: $assigneeId,
        stateId: $stateId
    }) {
        success
        issue {
            identifier
            url
        }
    }
}";

impl LinearClient {
    /// First team in the workspace, with its `todo` workflow state when one
    /// exists. Cached for the process lifetime after the first success.
    pub async fn default_team(&self) -> Result<TeamContext, LinearError> {
        self.team
            .get_or_try_init(|| async {
                let data = self.execute(TEAMS_QUERY, None).await?;
                resolve_team_context(&data)
            })
            .await
            .cloned()
    }

    pub async fn workspace_users(&self) -> Result<Vec<WorkspaceUser>, LinearError> {
        let data = self.execute(USERS_QUERY, None).await?;
        let users: NodeList<UserNode> = serde_json::from_value(
            data.get("users")
                .cloned()
                .ok_or_else(|| LinearError::InvalidResponse("missing users node".to_string()))?,
        )?;

        Ok(users
            .nodes
            .into_iter()
            .map(|user| WorkspaceUser {
                id: user.id,
                name: user.name,
                display_name: user.display_name,
            })
            .collect())
    }

    pub async fn submit_issue(
        &self,
        draft: &IssueDraft,
        assignee_id: Option<&str>,
        source_url: &str,
    ) -> Result<CreatedIssue, LinearError> {
        let team = self.default_team().await?;
        let variables = issue_create_variables(draft, assignee_id, source_url, &team);
        let data = self.execute(ISSUE_CREATE_MUTATION, Some(variables)).await?;

        let payload: IssueCreatePayload = serde_json::from_value(
            data.get("issueCreate")
                .cloned()
                .ok_or_else(|| {
                    LinearError::InvalidResponse("missing issueCreate node".to_string())
                })?,
        )?;

        if !payload.success {
            return Err(LinearError::Rejected(
                "issueCreate reported success=false".to_string(),
            ));
        }

        let issue = payload.issue.ok_or_else(|| {
            LinearError::InvalidResponse("issueCreate succeeded without an issue".to_string())
        })?;
        debug!(identifier = issue.identifier.as_str(), "issue created");

        Ok(CreatedIssue {
            identifier: issue.identifier,
            url: issue.url,
        })
    }
}

fn resolve_team_context(data: &Value) -> Result<TeamContext, LinearError> {
    let teams: NodeList<TeamNode> = serde_json::from_value(
        data.get("teams")
            .cloned()
            .ok_or_else(|| LinearError::InvalidResponse("missing teams node".to_string()))?,
    )?;

    let team = teams
        .nodes
        .into_iter()
        .next()
        .ok_or_else(|| LinearError::Rejected("no Linear teams found".to_string()))?;

    let todo_state_id = team
        .states
        .nodes
        .into_iter()
        .find(|state| state.name.eq_ignore_ascii_case("todo"))
        .map(|state| state.id);

    Ok(TeamContext {
        team_id: team.id,
        todo_state_id,
    })
}

fn issue_create_variables(
    draft: &IssueDraft,
    assignee_id: Option<&str>,
    source_url: &str,
    team: &TeamContext,
) -> Value {
    let full_description = format!(
        "{}\n\n---\n[View Discord thread]({source_url})",
        draft.description
    );

    json!({
        "title": draft.title,
        "description": full_description,
        "teamId": team.team_id,
        "priority": draft.priority.linear_priority(),
        "assigneeId": assignee_id,
        "stateId": team.todo_state_id,
    })
}

fn map_linear_error(error: LinearError) -> PipelineError {
    match error {
        LinearError::HttpStatus { status: 401, body }
        | LinearError::HttpStatus { status: 403, body } => PipelineError::AuthError(body),
        LinearError::HttpStatus { status: 429, body } => PipelineError::RateLimited(body),
        LinearError::HttpStatus { status, body } => {
            PipelineError::UpstreamError(format!("tracker status {status}: {body}"))
        }
        LinearError::Graphql(message) => {
            let lowered = message.to_ascii_lowercase();
            if lowered.contains("authentication") || lowered.contains("not authorized") {
                PipelineError::AuthError(message)
            } else {
                PipelineError::ValidationError(message)
            }
        }
        LinearError::Rejected(message) => PipelineError::ValidationError(message),
        LinearError::Http(error) => PipelineError::UpstreamError(error.to_string()),
        LinearError::Serde(error) => PipelineError::UpstreamError(error.to_string()),
        LinearError::InvalidResponse(detail) => PipelineError::UpstreamError(detail),
        LinearError::MissingAccessToken => {
            PipelineError::AuthError("missing access token".to_string())
        }
    }
}

#[async_trait]
impl IssueTracker for LinearClient {
    async fn list_users(&self) -> Result<Vec<WorkspaceUser>, PipelineError> {
        self.workspace_users().await.map_err(map_linear_error)
    }

    async fn create_issue(
        &self,
        draft: &IssueDraft,
        assignee_id: Option<&str>,
        source_url: &str,
    ) -> Result<CreatedIssue, PipelineError> {
        self.submit_issue(draft, assignee_id, source_url)
            .await
            .map_err(map_linear_error)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use quill_core::{IssueDraft, IssuePriority, PipelineError};

    use super::{issue_create_variables, map_linear_error, resolve_team_context};
    use crate::client::LinearError;
    use crate::types::TeamContext;

    fn draft() -> IssueDraft {
        IssueDraft {
            title: "Fix login crash".to_string(),
            description: "Submit crashes the page.".to_string(),
            priority: IssuePriority::High,
            assignee_hint: None,
        }
    }

    #[test]
    fn unit_team_resolution_picks_first_team_and_todo_state() {
        let data = json!({
            "teams": {
                "nodes": [
                    {
                        "id": "team-1",
                        "states": {
                            "nodes": [
                                {"id": "s1", "name": "Backlog"},
                                {"id": "s2", "name": "Todo"}
                            ]
                        }
                    },
                    {"id": "team-2", "states": {"nodes": []}}
                ]
            }
        });
        let team = resolve_team_context(&data).expect("team");
        assert_eq!(team.team_id, "team-1");
        assert_eq!(team.todo_state_id.as_deref(), Some("s2"));
    }

    #[test]
    fn unit_team_resolution_without_teams_is_rejected() {
        let data = json!({"teams": {"nodes": []}});
        assert!(matches!(
            resolve_team_context(&data),
            Err(LinearError::Rejected(_))
        ));
    }

    #[test]
    fn unit_missing_todo_state_leaves_state_unset() {
        let data = json!({
            "teams": {
                "nodes": [
                    {"id": "team-1", "states": {"nodes": [{"id": "s1", "name": "Backlog"}]}}
                ]
            }
        });
        let team = resolve_team_context(&data).expect("team");
        assert!(team.todo_state_id.is_none());
    }

    #[test]
    fn unit_issue_variables_append_source_link_and_keep_fields_verbatim() {
        let team = TeamContext {
            team_id: "team-1".to_string(),
            todo_state_id: Some("s2".to_string()),
        };
        let variables = issue_create_variables(
            &draft(),
            Some("u1"),
            "https://discord.com/channels/42/99/1234",
            &team,
        );

        assert_eq!(variables["title"], "Fix login crash");
        assert_eq!(
            variables["description"],
            "Submit crashes the page.\n\n---\n[View Discord thread](https://discord.com/channels/42/99/1234)"
        );
        assert_eq!(variables["priority"], 2);
        assert_eq!(variables["assigneeId"], "u1");
        assert_eq!(variables["stateId"], "s2");
    }

    #[test]
    fn unit_no_priority_serializes_as_null() {
        let team = TeamContext {
            team_id: "team-1".to_string(),
            todo_state_id: None,
        };
        let mut no_priority = draft();
        no_priority.priority = IssuePriority::None;
        let variables = issue_create_variables(&no_priority, None, "https://example.com", &team);
        assert!(variables["priority"].is_null());
        assert!(variables["assigneeId"].is_null());
        assert!(variables["stateId"].is_null());
    }

    #[test]
    fn unit_linear_error_mapping_matches_taxonomy() {
        assert!(matches!(
            map_linear_error(LinearError::HttpStatus {
                status: 401,
                body: "unauthorized".to_string()
            }),
            PipelineError::AuthError(_)
        ));
        assert!(matches!(
            map_linear_error(LinearError::Graphql("authentication required".to_string())),
            PipelineError::AuthError(_)
        ));
        assert!(matches!(
            map_linear_error(LinearError::Graphql("title is too long".to_string())),
            PipelineError::ValidationError(_)
        ));
        assert!(matches!(
            map_linear_error(LinearError::Rejected("success=false".to_string())),
            PipelineError::ValidationError(_)
        ));
        assert!(matches!(
            map_linear_error(LinearError::HttpStatus {
                status: 502,
                body: "bad gateway".to_string()
            }),
            PipelineError::UpstreamError(_)
        ));
    }
}
