use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use quill_core::{
    render_transcript, ChannelMessage, DraftSummarizer, IssueDraft, IssuePriority, PipelineError,
    WorkspaceUser,
};

use crate::{ChatRequest, LlmClient, Message, QuillAiError};

const SYSTEM_PROMPT_HEADER: &str = "You are a helpful assistant that creates Linear issue details from \
Discord conversations. Create a concise title, detailed description, \
and suggest a priority (1-4, where 1 is urgent and 4 is low). \
If you think someone should be assigned, choose from these Linear users:";

const SYSTEM_PROMPT_FOOTER: &str = "Only suggest an assignee if you're confident about the match. NEVER \
assign someone if it's not specifically mentioned in the conversation who \
should take care of the issue.";

const UNASSIGNED: &str = "unassigned";

#[derive(Debug, Clone)]
/// Public struct `SummarizerConfig` used across Quill components.
pub struct SummarizerConfig {
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: Some(1_024),
            temperature: None,
        }
    }
}

/// Builds the fixed summarization prompt, sends one completion, and parses
/// the structured answer into an issue draft.
pub struct IssueSummarizer {
    client: Arc<dyn LlmClient>,
    config: SummarizerConfig,
}

impl IssueSummarizer {
    pub fn new(client: Arc<dyn LlmClient>, config: SummarizerConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl DraftSummarizer for IssueSummarizer {
    async fn summarize(
        &self,
        messages: &[ChannelMessage],
        users: &[WorkspaceUser],
    ) -> Result<IssueDraft, PipelineError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: build_prompt(messages, users),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .complete(request)
            .await
            .map_err(map_ai_error)?;
        debug!(
            finish_reason = response.finish_reason.as_deref().unwrap_or("none"),
            total_tokens = response.usage.total_tokens,
            "summarization completed"
        );

        parse_draft(&response.message.content)
    }
}

/// The two-message prompt: system instruction carrying the assignable user
/// names, user message carrying the transcript and the output contract.
pub fn build_prompt(messages: &[ChannelMessage], users: &[WorkspaceUser]) -> Vec<Message> {
    let users_info = users
        .iter()
        .map(|user| format!("- {}", user.display_name))
        .collect::<Vec<_>>()
        .join("\n");
    let system = format!("{SYSTEM_PROMPT_HEADER}\n\n{users_info}\n\n{SYSTEM_PROMPT_FOOTER}");

    let conversation = render_transcript(messages);
    let user = format!(
        "Create a Linear issue based on this conversation:\n\n{conversation}\n\n\
Format:\nTITLE: <title>\nDESCRIPTION: <description>\n\
PRIORITY: <1-4>\nASSIGNEE: <exact Linear username or \"{UNASSIGNED}\" if not \
clearly mentioned in the conversation who should be assigned>"
    );

    vec![Message::system(system), Message::user(user)]
}

/// Line-oriented scan for the four answer fields. A draft without a title is
/// malformed and must not reach issue creation.
pub fn parse_draft(content: &str) -> Result<IssueDraft, PipelineError> {
    let mut title = String::new();
    let mut description = String::new();
    let mut priority = IssuePriority::None;
    let mut assignee_hint = None;

    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("TITLE:") {
            title = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("DESCRIPTION:") {
            description = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("PRIORITY:") {
            priority = rest
                .trim()
                .parse::<i64>()
                .map(IssuePriority::from_model_rank)
                .unwrap_or(IssuePriority::None);
        } else if let Some(rest) = line.strip_prefix("ASSIGNEE:") {
            let candidate = rest.trim().trim_matches('"');
            if !candidate.is_empty() && !candidate.eq_ignore_ascii_case(UNASSIGNED) {
                assignee_hint = Some(candidate.to_string());
            }
        }
    }

    if title.is_empty() {
        return Err(PipelineError::MalformedResponse(
            "completion did not include a TITLE line".to_string(),
        ));
    }

    Ok(IssueDraft {
        title,
        description,
        priority,
        assignee_hint,
    })
}

fn map_ai_error(error: QuillAiError) -> PipelineError {
    match error {
        QuillAiError::HttpStatus { status: 429, body } => PipelineError::RateLimited(body),
        QuillAiError::HttpStatus { status, body } => {
            PipelineError::UpstreamError(format!("provider status {status}: {body}"))
        }
        QuillAiError::Http(error) => PipelineError::UpstreamError(error.to_string()),
        QuillAiError::Serde(error) => PipelineError::MalformedResponse(error.to_string()),
        QuillAiError::InvalidResponse(detail) => PipelineError::MalformedResponse(detail),
        QuillAiError::MissingApiKey => PipelineError::AuthError("missing API key".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{build_prompt, map_ai_error, parse_draft};
    use quill_core::{ChannelMessage, IssuePriority, PipelineError, WorkspaceUser};

    use crate::QuillAiError;

    fn message(author: &str, body: &str) -> ChannelMessage {
        ChannelMessage {
            author_id: 1,
            author_name: author.to_string(),
            timestamp_unix_ms: 0,
            body: body.to_string(),
        }
    }

    fn user(name: &str, display_name: &str) -> WorkspaceUser {
        WorkspaceUser {
            id: "u1".to_string(),
            name: name.to_string(),
            display_name: display_name.to_string(),
        }
    }

    #[test]
    fn unit_prompt_embeds_transcript_and_user_roster() {
        let prompt = build_prompt(
            &[message("ada", "login page crashes on submit")],
            &[user("ada", "Ada Lovelace")],
        );

        assert_eq!(prompt.len(), 2);
        assert!(prompt[0].content.contains("- Ada Lovelace"));
        assert!(prompt[1].content.contains("ada: login page crashes on submit"));
        assert!(prompt[1].content.contains("TITLE: <title>"));
        assert!(prompt[1].content.contains("PRIORITY: <1-4>"));
    }

    #[test]
    fn unit_parse_draft_reads_all_four_fields() {
        let draft = parse_draft(
            "TITLE: Fix login crash\nDESCRIPTION: Submit crashes the login page.\nPRIORITY: 2\nASSIGNEE: Ada Lovelace",
        )
        .expect("draft");

        assert_eq!(draft.title, "Fix login crash");
        assert_eq!(draft.description, "Submit crashes the login page.");
        assert_eq!(draft.priority, IssuePriority::High);
        assert_eq!(draft.assignee_hint.as_deref(), Some("Ada Lovelace"));
    }

    #[test]
    fn unit_parse_draft_treats_unassigned_and_bad_priority_as_defaults() {
        let draft = parse_draft("TITLE: t\nDESCRIPTION: d\nPRIORITY: soon\nASSIGNEE: unassigned")
            .expect("draft");
        assert_eq!(draft.priority, IssuePriority::None);
        assert!(draft.assignee_hint.is_none());

        let draft = parse_draft("TITLE: t\nASSIGNEE: \"Unassigned\"").expect("draft");
        assert!(draft.assignee_hint.is_none());
    }

    #[test]
    fn unit_parse_draft_without_title_is_malformed() {
        let result = parse_draft("DESCRIPTION: only a description\nPRIORITY: 1");
        assert!(matches!(result, Err(PipelineError::MalformedResponse(_))));

        let result = parse_draft("TITLE:   \nDESCRIPTION: d");
        assert!(matches!(result, Err(PipelineError::MalformedResponse(_))));
    }

    #[test]
    fn unit_ai_error_mapping_matches_taxonomy() {
        assert!(matches!(
            map_ai_error(QuillAiError::HttpStatus {
                status: 429,
                body: "slow down".to_string()
            }),
            PipelineError::RateLimited(_)
        ));
        assert!(matches!(
            map_ai_error(QuillAiError::HttpStatus {
                status: 502,
                body: "bad gateway".to_string()
            }),
            PipelineError::UpstreamError(_)
        ));
        assert!(matches!(
            map_ai_error(QuillAiError::InvalidResponse("no choices".to_string())),
            PipelineError::MalformedResponse(_)
        ));
    }
}
