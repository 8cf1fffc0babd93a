//! Shared domain types, configuration, and capability traits for Quill.
//!
//! The orchestrator and the runtime depend on the traits declared here rather
//! than on the concrete Discord, OpenAI, and Linear clients, so every external
//! surface can be substituted with a test double.

pub mod config;
pub mod issue;
pub mod pipeline;
pub mod transcript;

pub use config::{ConfigError, QuillConfig};
pub use issue::{resolve_assignee, CreatedIssue, IssueDraft, IssuePriority, WorkspaceUser};
pub use pipeline::{DraftSummarizer, HistorySource, IssueTracker, PipelineError};
pub use transcript::{render_transcript, ChannelMessage, InvocationContext};
