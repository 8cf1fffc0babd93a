use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `IssuePriority` values.
pub enum IssuePriority {
    #[default]
    None,
    Low,
    Medium,
    High,
    Urgent,
}

impl IssuePriority {
    /// Maps the summarizer's `1-4` answer (1 urgent, 4 low). Anything outside
    /// that range is no priority.
    pub fn from_model_rank(rank: i64) -> Self {
        match rank {
            1 => Self::Urgent,
            2 => Self::High,
            3 => Self::Medium,
            4 => Self::Low,
            _ => Self::None,
        }
    }

    /// Linear's numeric priority. `None` is omitted from the create request
    /// rather than sent as 0.
    pub fn linear_priority(self) -> Option<u8> {
        match self {
            Self::None => None,
            Self::Urgent => Some(1),
            Self::High => Some(2),
            Self::Medium => Some(3),
            Self::Low => Some(4),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Urgent => "Urgent",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// The structured summarization output, consumed exactly once by issue
/// creation. Must carry a non-empty title before submission.
pub struct IssueDraft {
    pub title: String,
    pub description: String,
    pub priority: IssuePriority,
    pub assignee_hint: Option<String>,
}

impl IssueDraft {
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Identifier and canonical URL returned by the tracker; relayed to the user
/// and then discarded.
pub struct CreatedIssue {
    pub identifier: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// A tracker user offered to the summarizer as assignee vocabulary.
pub struct WorkspaceUser {
    pub id: String,
    pub name: String,
    pub display_name: String,
}

/// Resolves a free-text assignee hint against the workspace users. Exact
/// matches on `name` or `display_name` only; anything else stays unassigned.
pub fn resolve_assignee<'a>(
    hint: Option<&str>,
    users: &'a [WorkspaceUser],
) -> Option<&'a WorkspaceUser> {
    let hint = hint.map(str::trim).filter(|value| !value.is_empty())?;
    users
        .iter()
        .find(|user| user.name == hint || user.display_name == hint)
}

#[cfg(test)]
mod tests {
    use super::{resolve_assignee, IssueDraft, IssuePriority, WorkspaceUser};

    fn user(id: &str, name: &str, display_name: &str) -> WorkspaceUser {
        WorkspaceUser {
            id: id.to_string(),
            name: name.to_string(),
            display_name: display_name.to_string(),
        }
    }

    #[test]
    fn unit_priority_rank_mapping_covers_model_range() {
        assert_eq!(IssuePriority::from_model_rank(1), IssuePriority::Urgent);
        assert_eq!(IssuePriority::from_model_rank(2), IssuePriority::High);
        assert_eq!(IssuePriority::from_model_rank(3), IssuePriority::Medium);
        assert_eq!(IssuePriority::from_model_rank(4), IssuePriority::Low);
        assert_eq!(IssuePriority::from_model_rank(0), IssuePriority::None);
        assert_eq!(IssuePriority::from_model_rank(9), IssuePriority::None);
    }

    #[test]
    fn unit_linear_priority_omits_none() {
        assert_eq!(IssuePriority::None.linear_priority(), None);
        assert_eq!(IssuePriority::Urgent.linear_priority(), Some(1));
        assert_eq!(IssuePriority::Low.linear_priority(), Some(4));
    }

    #[test]
    fn unit_draft_title_presence_ignores_whitespace() {
        let draft = IssueDraft {
            title: "   ".to_string(),
            description: "body".to_string(),
            priority: IssuePriority::None,
            assignee_hint: None,
        };
        assert!(!draft.has_title());
    }

    #[test]
    fn unit_resolve_assignee_requires_exact_match() {
        let users = vec![
            user("u1", "ada", "Ada Lovelace"),
            user("u2", "grace", "Grace Hopper"),
        ];

        assert_eq!(
            resolve_assignee(Some("ada"), &users).map(|u| u.id.as_str()),
            Some("u1")
        );
        assert_eq!(
            resolve_assignee(Some("Grace Hopper"), &users).map(|u| u.id.as_str()),
            Some("u2")
        );
        assert!(resolve_assignee(Some("Ada L"), &users).is_none());
        assert!(resolve_assignee(Some(""), &users).is_none());
        assert!(resolve_assignee(None, &users).is_none());
    }
}
