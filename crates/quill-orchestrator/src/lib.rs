//! Sequences one `/autoissue` invocation: fetch history, summarize, create
//! the issue, reply. Strictly linear; any failure jumps straight to the
//! reply phase. No retries, no rollback, no cross-invocation state.

use std::sync::Arc;

use tracing::{debug, info, warn};

use quill_core::{
    resolve_assignee, CreatedIssue, DraftSummarizer, HistorySource, InvocationContext,
    IssuePriority, IssueTracker, PipelineError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `PipelinePhase` values.
pub enum PipelinePhase {
    Idle,
    FetchingHistory,
    Summarizing,
    CreatingIssue,
    Replying,
}

impl PipelinePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FetchingHistory => "fetching_history",
            Self::Summarizing => "summarizing",
            Self::CreatingIssue => "creating_issue",
            Self::Replying => "replying",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Everything the reply needs on success: the created issue plus the fields
/// shown in the channel embed.
pub struct IssueReport {
    pub issue: CreatedIssue,
    pub title: String,
    pub priority: IssuePriority,
    pub assignee_display_name: Option<String>,
}

/// Holds the two process-scoped capability handles. The history source is
/// bound to the gateway session, so it is passed per invocation instead.
pub struct Orchestrator {
    summarizer: Arc<dyn DraftSummarizer>,
    tracker: Arc<dyn IssueTracker>,
}

impl Orchestrator {
    pub fn new(summarizer: Arc<dyn DraftSummarizer>, tracker: Arc<dyn IssueTracker>) -> Self {
        Self { summarizer, tracker }
    }

    /// Runs the invocation pipeline to its reply payload. The caller renders
    /// the result into the channel; every error is user-visible, never fatal
    /// to the listener.
    pub async fn run(
        &self,
        history: &dyn HistorySource,
        ctx: &InvocationContext,
    ) -> Result<IssueReport, PipelineError> {
        let outcome = self.advance(history, ctx).await;
        transition(PipelinePhase::Replying, ctx);
        match &outcome {
            Ok(report) => info!(
                issue = report.issue.identifier.as_str(),
                channel_id = ctx.channel_id,
                "issue created"
            ),
            Err(error) => warn!(
                channel_id = ctx.channel_id,
                error = %error,
                "invocation failed"
            ),
        }
        outcome
    }

    async fn advance(
        &self,
        history: &dyn HistorySource,
        ctx: &InvocationContext,
    ) -> Result<IssueReport, PipelineError> {
        transition(PipelinePhase::FetchingHistory, ctx);
        let messages = history.fetch_history(ctx).await?;
        if messages.is_empty() {
            return Err(PipelineError::EmptyHistory);
        }

        transition(PipelinePhase::Summarizing, ctx);
        let users = self.tracker.list_users().await?;
        let draft = self.summarizer.summarize(&messages, &users).await?;
        if !draft.has_title() {
            return Err(PipelineError::MalformedResponse(
                "draft is missing a title".to_string(),
            ));
        }

        transition(PipelinePhase::CreatingIssue, ctx);
        let assignee = resolve_assignee(draft.assignee_hint.as_deref(), &users);
        let issue = self
            .tracker
            .create_issue(
                &draft,
                assignee.map(|user| user.id.as_str()),
                &ctx.source_url(),
            )
            .await?;

        Ok(IssueReport {
            issue,
            title: draft.title,
            priority: draft.priority,
            assignee_display_name: assignee.map(|user| user.display_name.clone()),
        })
    }
}

fn transition(phase: PipelinePhase, ctx: &InvocationContext) {
    debug!(
        phase = phase.as_str(),
        interaction_id = ctx.interaction_id,
        "pipeline phase"
    );
}
