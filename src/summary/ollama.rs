use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};

use super::types::{ChatMessage, SummaryBackend, SummaryRequest};
use super::BackendError;
use crate::config::BackendConfig;

/// Ollama HTTP backend using the chat endpoint.
pub struct OllamaBackend {
    name: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl OllamaBackend {
    /// Each backend owns its HTTP client so concurrent candidates never
    /// share a connection pool.
    pub fn new(
        name: &str,
        base_url: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::HttpClient(e.to_string()))?;

        Ok(Self {
            name: name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout,
        })
    }

    pub fn from_config(config: &BackendConfig, timeout: Duration) -> Result<Self, BackendError> {
        Self::new(&config.name, &config.base_url, &config.model, timeout)
    }

    async fn chat(&self, request: &SummaryRequest) -> Result<String, BackendError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = OllamaChatRequest {
            model: &self.model,
            messages: request.messages(),
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(e, &self.base_url, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| BackendError::MalformedResponse(e.to_string()))?;

        let content = parsed.message.content.trim();
        if content.is_empty() {
            return Err(BackendError::EmptyContent);
        }
        Ok(content.to_string())
    }
}

/// Request body for Ollama /api/chat
#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Response body from Ollama /api/chat
#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

impl SummaryBackend for OllamaBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn complete<'a>(
        &'a self,
        request: &'a SummaryRequest,
    ) -> BoxFuture<'a, Result<String, BackendError>> {
        self.chat(request).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    fn request() -> SummaryRequest {
        SummaryRequest {
            system: "system text".into(),
            prompt: "user text".into(),
            temperature: 0.2,
            max_tokens: 600,
        }
    }

    #[test]
    fn constructor_trims_trailing_slash() {
        let backend = OllamaBackend::new(
            "local",
            "http://localhost:11434/",
            "medgemma",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(backend.base_url, "http://localhost:11434");
        assert_eq!(backend.model, "medgemma");
    }

    #[tokio::test]
    async fn chat_sends_both_messages_and_trims_reply() {
        let app = Router::new().route(
            "/api/chat",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["model"], "medgemma");
                assert_eq!(body["stream"], false);
                assert_eq!(body["messages"][0]["role"], "system");
                assert_eq!(body["messages"][1]["content"], "user text");
                assert_eq!(body["options"]["num_predict"], 600);
                Json(serde_json::json!({
                    "message": { "role": "assistant", "content": "  Stable overnight.\n" }
                }))
            }),
        );
        let base = serve(app).await;
        let backend = OllamaBackend::new("local", &base, "medgemma", Duration::from_secs(5)).unwrap();

        let text = backend.complete(&request()).await.unwrap();
        assert_eq!(text, "Stable overnight.");
    }

    #[tokio::test]
    async fn empty_content_is_an_error() {
        let app = Router::new().route(
            "/api/chat",
            post(|| async { Json(serde_json::json!({ "message": { "content": "   " } })) }),
        );
        let base = serve(app).await;
        let backend = OllamaBackend::new("local", &base, "m", Duration::from_secs(5)).unwrap();

        let err = backend.complete(&request()).await.unwrap_err();
        assert!(matches!(err, BackendError::EmptyContent));
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let app = Router::new().route(
            "/api/chat",
            post(|| async { (axum::http::StatusCode::NOT_FOUND, "model not found") }),
        );
        let base = serve(app).await;
        let backend = OllamaBackend::new("local", &base, "m", Duration::from_secs(5)).unwrap();

        let err = backend.complete(&request()).await.unwrap_err();
        match err {
            BackendError::Status { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "model not found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_a_connection_error() {
        // Bind then drop to get a port nobody is listening on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = OllamaBackend::new(
            "local",
            &format!("http://{addr}"),
            "m",
            Duration::from_secs(2),
        )
        .unwrap();
        let err = backend.complete(&request()).await.unwrap_err();
        assert!(matches!(err, BackendError::Connection(_)));
    }
}
