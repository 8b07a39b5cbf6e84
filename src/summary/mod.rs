//! Bounded-latency patient summaries.
//!
//! A prompt built from the patient and their three most recent readings
//! is raced across every configured backend under a hard deadline. When
//! no backend answers in time the local rule-based fallback is used, so
//! a caller always gets displayable text.

pub mod fallback;
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod orchestrator;
pub mod prompt;
pub mod types;

pub use fallback::local_fallback_summary;
pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;
pub use orchestrator::SummaryOrchestrator;
pub use types::{SummaryBackend, SummaryOutcome, SummaryRequest, SummarySource};

use thiserror::Error;

/// Failure of a single remote attempt. Always absorbed by the orchestrator.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Backend is not reachable at {0}")]
    Connection(String),

    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Backend returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("Backend returned empty content")]
    EmptyContent,

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl BackendError {
    /// Classify a transport error the way every HTTP backend reports it.
    pub(crate) fn from_reqwest(
        e: reqwest::Error,
        base_url: &str,
        timeout: std::time::Duration,
    ) -> Self {
        if e.is_connect() {
            BackendError::Connection(base_url.to_string())
        } else if e.is_timeout() {
            BackendError::Timeout(timeout)
        } else if e.is_decode() {
            BackendError::MalformedResponse(e.to_string())
        } else {
            BackendError::HttpClient(e.to_string())
        }
    }
}

/// Fault in the orchestration itself, not in any backend.
#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("Summary orchestration panicked: {0}")]
    Panicked(String),
}
