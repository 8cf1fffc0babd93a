use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
/// The default team an issue is filed under, plus its Todo workflow state
/// when one exists. Resolved once per process lifetime.
pub struct TeamContext {
    pub team_id: String,
    pub todo_state_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NodeList<T> {
    pub nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TeamNode {
    pub id: String,
    pub states: NodeList<WorkflowStateNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WorkflowStateNode {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueCreatePayload {
    pub success: bool,
    pub issue: Option<IssueNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueNode {
    pub identifier: String,
    pub url: String,
}
