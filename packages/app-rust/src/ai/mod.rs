//! AI-assisted fleet analytics over a third-party chat-completion API.

pub mod client;
pub mod prompt;

pub use client::{AiClient, ChatCompletionClient};
pub use prompt::{build_analysis_prompt, FleetSummary};

/// Errors from the chat-completion endpoint.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("AI analytics are not configured")]
    NotConfigured,
    #[error("AI request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("AI endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("AI endpoint returned no content")]
    EmptyResponse,
}
