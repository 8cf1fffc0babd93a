use serenity::all::{Colour, CreateEmbed, CreateInteractionResponseFollowup};

use quill_core::PipelineError;
use quill_orchestrator::IssueReport;

// Linear's brand purple, matching the issue link target.
const LINEAR_PURPLE: Colour = Colour(0x823FD7);
const UNASSIGNED_LABEL: &str = "-/-";
const ERROR_TITLE: &str = "❌ Error Creating Issue";

/// Success reply: the issue URL verbatim in the content, plus an embed with
/// the title linked and the priority/assignee fields.
pub fn success_followup(report: &IssueReport) -> CreateInteractionResponseFollowup {
    let assignee = report
        .assignee_display_name
        .clone()
        .unwrap_or_else(|| UNASSIGNED_LABEL.to_string());

    let embed = CreateEmbed::new()
        .title(report.title.clone())
        .url(report.issue.url.clone())
        .colour(LINEAR_PURPLE)
        .field("Priority", report.priority.label(), true)
        .field("Assignee", assignee, true);

    CreateInteractionResponseFollowup::new()
        .content(report.issue.url.clone())
        .embed(embed)
}

/// Failure reply: one red embed carrying the category's fixed sentence.
pub fn error_followup(error: &PipelineError) -> CreateInteractionResponseFollowup {
    let embed = CreateEmbed::new()
        .title(ERROR_TITLE)
        .description(error.user_message())
        .colour(Colour::RED);

    CreateInteractionResponseFollowup::new().embed(embed)
}
