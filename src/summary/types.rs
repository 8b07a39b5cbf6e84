use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

use super::BackendError;

/// A chat-style request: one system instruction plus one user prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Wire shape shared by the chat endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

impl SummaryRequest {
    pub fn messages(&self) -> [ChatMessage<'_>; 2] {
        [
            ChatMessage {
                role: "system",
                content: &self.system,
            },
            ChatMessage {
                role: "user",
                content: &self.prompt,
            },
        ]
    }
}

/// A remote summarization capability.
///
/// Implementations own their transport. The orchestrator may abandon a
/// pending future at any await point; late results are discarded.
pub trait SummaryBackend: Send + Sync {
    /// Name used in logs and in `SummarySource::Remote`.
    fn name(&self) -> &str;

    /// Send one request and return the completion text.
    fn complete<'a>(
        &'a self,
        request: &'a SummaryRequest,
    ) -> BoxFuture<'a, Result<String, BackendError>>;
}

/// Where the summary text came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SummarySource {
    Remote { backend: String },
    Fallback,
}

/// Result of `SummaryOrchestrator::summarize`.
///
/// `text` is never empty. `error` is set only for an internal fault, in
/// which case `text` still carries the fallback summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryOutcome {
    pub text: String,
    pub error: Option<String>,
    pub source: SummarySource,
}

impl SummaryOutcome {
    pub fn remote(backend: &str, text: String) -> Self {
        Self {
            text,
            error: None,
            source: SummarySource::Remote {
                backend: backend.to_string(),
            },
        }
    }

    pub fn fallback(text: String) -> Self {
        Self {
            text,
            error: None,
            source: SummarySource::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == SummarySource::Fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_system_then_user() {
        let req = SummaryRequest {
            system: "sys".into(),
            prompt: "user prompt".into(),
            temperature: 0.2,
            max_tokens: 600,
        };
        let [system, user] = req.messages();
        assert_eq!(system.role, "system");
        assert_eq!(system.content, "sys");
        assert_eq!(user.role, "user");
        assert_eq!(user.content, "user prompt");
    }

    #[test]
    fn outcome_source_serializes_tagged() {
        let outcome = SummaryOutcome::remote("local", "text".into());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["source"]["kind"], "remote");
        assert_eq!(json["source"]["backend"], "local");
        assert!(json["error"].is_null());
    }
}
