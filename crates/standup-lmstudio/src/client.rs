// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for an LM Studio server's chat completions endpoint.
//!
//! No authentication is involved. Transient failures (429, 500, 503) are
//! retried once after a short delay.

use std::time::Duration;

use standup_core::StandupError;
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, ChatRequest, ChatResponse};

/// Delay before the single retry of a transient failure.
const RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct LmStudioClient {
    client: reqwest::Client,
    endpoint: String,
    max_retries: u32,
}

impl LmStudioClient {
    /// `base_url` is everything up to and including `/v1`; `timeout` caps
    /// each HTTP request.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StandupError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StandupError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            max_retries: 1,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends a non-streaming chat completion request.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, StandupError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying chat completion after transient error");
                tokio::time::sleep(RETRY_DELAY).await;
            }

            let response = self
                .client
                .post(&self.endpoint)
                .json(request)
                .send()
                .await
                .map_err(|e| StandupError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "chat completion response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| StandupError::Provider {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                return serde_json::from_str(&body).map_err(|e| StandupError::Provider {
                    message: format!("failed to parse chat completion: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            let body = response.text().await.unwrap_or_default();
            let error = StandupError::Provider {
                message: describe_failure(status, &body),
                source: None,
            };
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, "transient error, will retry");
                last_error = Some(error);
                continue;
            }
            return Err(error);
        }

        Err(last_error.unwrap_or_else(|| StandupError::Provider {
            message: "chat completion failed after retries".into(),
            source: None,
        }))
    }
}

fn describe_failure(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => match api_err.error.type_ {
            Some(kind) => format!("LM Studio error ({kind}): {}", api_err.error.message),
            None => format!("LM Studio error ({status}): {}", api_err.error.message),
        },
        Err(_) => format!("server returned {status}: {body}"),
    }
}

fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> LmStudioClient {
        LmStudioClient::new(&format!("{}/v1", server.uri()), Duration::from_secs(5)).unwrap()
    }

    fn test_request() -> ChatRequest {
        ChatRequest {
            model: "local-model".into(),
            messages: vec![ChatMessage {
                role: "user".into(),
                content: Some("Hello".into()),
            }],
            temperature: 0.7,
            max_tokens: 500,
            stream: false,
        }
    }

    fn completion(id: &str, text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "object": "chat.completion",
            "model": "local-model",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": text},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        })
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let client = LmStudioClient::new("http://localhost:1234/v1/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:1234/v1/chat/completions");
    }

    #[tokio::test]
    async fn chat_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "local-model",
                "max_tokens": 500,
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("c1", "Hi there!")))
            .mount(&server)
            .await;

        let result = test_client(&server).chat(&test_request()).await.unwrap();
        assert_eq!(result.id, "c1");
        assert_eq!(result.first_text(), Some("Hi there!"));
        assert_eq!(result.usage.unwrap().prompt_tokens, 10);
    }

    #[tokio::test]
    async fn chat_retries_on_503() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("c2", "After retry")))
            .mount(&server)
            .await;

        let result = test_client(&server).chat(&test_request()).await.unwrap();
        assert_eq!(result.id, "c2");
    }

    #[tokio::test]
    async fn chat_exhausts_retries_on_500() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": {"message": "model crashed", "type": "server_error"}
            })))
            .expect(2)
            .mount(&server)
            .await;

        let err = test_client(&server).chat(&test_request()).await.unwrap_err();
        assert!(err.to_string().contains("model crashed"), "got: {err}");
    }

    #[tokio::test]
    async fn chat_fails_fast_on_400() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"message": "No models loaded"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = test_client(&server).chat(&test_request()).await.unwrap_err();
        assert!(err.to_string().contains("No models loaded"), "got: {err}");
    }

    #[tokio::test]
    async fn chat_rejects_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let err = test_client(&server).chat(&test_request()).await.unwrap_err();
        assert!(matches!(err, StandupError::Provider { .. }));
    }
}
