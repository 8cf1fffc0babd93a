//! Linear GraphQL client: default-team resolution, workspace users, issue
//! creation, and the OAuth code-for-token exchange used by `quill oauth`.

mod client;
mod issues;
pub mod oauth;
mod types;

pub use client::{LinearClient, LinearConfig, LinearError};
pub use types::TeamContext;
