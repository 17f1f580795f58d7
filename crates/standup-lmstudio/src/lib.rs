// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LM Studio provider adapter for the Standup follow-up service.
//!
//! Implements [`ProviderAdapter`] against the OpenAI-compatible chat
//! completions endpoint of a local LM Studio server. Every call is bounded
//! by the request's timeout; an empty completion is an error.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use standup_config::model::LmStudioConfig;
use standup_core::{
    AdapterType, ConnectionProbe, HealthStatus, PluginAdapter, ProbeStatus, ProviderAdapter,
    ProviderMessage, ProviderRequest, ProviderResponse, StandupError, TokenUsage,
};
use tracing::{debug, info, warn};

use crate::client::LmStudioClient;
use crate::types::{ChatMessage, ChatRequest};

/// Prompt sent by [`ProviderAdapter::test_connection`].
pub const PROBE_PROMPT: &str = "Generate a simple test response: 'AI connection working'";

const PROBE_HINT: &str = "Make sure LM Studio server is running on port 1234";

/// Local LM Studio provider.
pub struct LmStudioProvider {
    client: LmStudioClient,
    config: LmStudioConfig,
}

impl LmStudioProvider {
    pub fn new(config: &LmStudioConfig) -> Result<Self, StandupError> {
        let client = LmStudioClient::new(&config.base_url, Duration::from_secs(config.timeout_secs))?;
        info!(base_url = %config.base_url, model = %config.model, "LM Studio provider initialized");
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// A request carrying the configured model, sampling parameters and system prompt.
    pub fn request_for(&self, prompt: impl Into<String>) -> ProviderRequest {
        ProviderRequest {
            model: self.config.model.clone(),
            messages: vec![
                ProviderMessage::system(self.config.system_prompt.clone()),
                ProviderMessage::user(prompt),
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            timeout: Duration::from_secs(self.config.timeout_secs),
        }
    }

    fn to_chat_request(request: &ProviderRequest) -> ChatRequest {
        ChatRequest {
            model: request.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.clone(),
                    content: Some(m.content.clone()),
                })
                .collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        }
    }
}

#[async_trait]
impl PluginAdapter for LmStudioProvider {
    fn name(&self) -> &str {
        "lmstudio"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, StandupError> {
        let probe = self.test_connection().await;
        Ok(match probe.status {
            ProbeStatus::Working => HealthStatus::Healthy,
            ProbeStatus::Failed => HealthStatus::Degraded(
                probe.error.unwrap_or_else(|| "unexpected probe reply".into()),
            ),
            ProbeStatus::Error => HealthStatus::Unhealthy(
                probe.error.unwrap_or_else(|| "server unreachable".into()),
            ),
        })
    }

    async fn shutdown(&self) -> Result<(), StandupError> {
        debug!("LM Studio provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for LmStudioProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, StandupError> {
        let chat = Self::to_chat_request(&request);
        let response = tokio::time::timeout(request.timeout, self.client.chat(&chat))
            .await
            .map_err(|_| StandupError::Timeout {
                duration: request.timeout,
            })??;

        let content = response
            .first_text()
            .ok_or_else(|| StandupError::Provider {
                message: "LM Studio returned an empty response".into(),
                source: None,
            })?
            .to_string();
        debug!(chars = content.len(), "LM Studio generated response");

        Ok(ProviderResponse {
            id: response.id,
            content,
            model: response.model,
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            }),
        })
    }

    async fn test_connection(&self) -> ConnectionProbe {
        let mut probe = ConnectionProbe {
            status: ProbeStatus::Error,
            provider: self.name().to_string(),
            server_url: self.config.base_url.clone(),
            response: None,
            error: None,
            hint: None,
        };

        match self.complete(self.request_for(PROBE_PROMPT)).await {
            Ok(reply) if reply.content.to_lowercase().contains("working") => {
                probe.status = ProbeStatus::Working;
                probe.response = Some(preview(&reply.content, 100));
            }
            Ok(reply) => {
                probe.status = ProbeStatus::Failed;
                probe.error = Some("Invalid response or connection failed".into());
                probe.response = Some(preview(&reply.content, 50));
            }
            Err(e) => {
                warn!(error = %e, "LM Studio connection test failed");
                probe.error = Some(e.to_string());
                probe.hint = Some(PROBE_HINT.into());
            }
        }
        probe
    }

    fn server_url(&self) -> &str {
        &self.config.base_url
    }
}

/// First `max` characters of `text`, with an ellipsis when cut.
fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
