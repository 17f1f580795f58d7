// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock text-generation provider for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with a scripted queue of
//! replies and failures, optional artificial latency, and a call counter,
//! so tests never need a running LM Studio server.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use standup_core::{
    AdapterType, ConnectionProbe, HealthStatus, PluginAdapter, ProbeStatus, ProviderAdapter,
    ProviderRequest, ProviderResponse, StandupError, TokenUsage,
};

/// Text returned when the script is exhausted.
pub const DEFAULT_REPLY: &str = "mock response";

enum Scripted {
    Reply(String),
    Fail(StandupError),
}

/// A mock provider that plays back a script.
///
/// Entries are popped from a FIFO queue. When the queue is empty,
/// [`DEFAULT_REPLY`] is returned.
pub struct MockProvider {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ProviderRequest>>,
    calls: AtomicUsize,
    latency: Option<Duration>,
    probe_status: ProbeStatus,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            latency: None,
            probe_status: ProbeStatus::Working,
        }
    }

    /// Create a mock provider pre-loaded with the given replies.
    pub fn with_responses(responses: Vec<String>) -> Self {
        let provider = Self::new();
        for text in responses {
            provider.push_response(text);
        }
        provider
    }

    /// Delay every call by `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Status reported by [`ProviderAdapter::test_connection`].
    pub fn with_probe_status(mut self, status: ProbeStatus) -> Self {
        self.probe_status = status;
        self
    }

    pub fn push_response(&self, text: impl Into<String>) {
        lock(&self.script).push_back(Scripted::Reply(text.into()));
    }

    pub fn push_error(&self, error: StandupError) {
        lock(&self.script).push_back(Scripted::Fail(error));
    }

    /// Number of `complete` calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ProviderRequest> {
        lock(&self.requests).last().cloned()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, StandupError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), StandupError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, StandupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.requests).push(request.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let next = lock(&self.script).pop_front();
        let content = match next {
            Some(Scripted::Reply(text)) => text,
            Some(Scripted::Fail(error)) => return Err(error),
            None => DEFAULT_REPLY.to_string(),
        };
        Ok(ProviderResponse {
            id: format!("mock-resp-{}", uuid::Uuid::new_v4()),
            content,
            model: request.model,
            usage: Some(TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 20,
            }),
        })
    }

    async fn test_connection(&self) -> ConnectionProbe {
        let working = self.probe_status == ProbeStatus::Working;
        ConnectionProbe {
            status: self.probe_status,
            provider: self.name().to_string(),
            server_url: self.server_url().to_string(),
            response: working.then(|| "AI connection working".to_string()),
            error: (!working).then(|| "mock provider offline".to_string()),
            hint: None,
        }
    }

    fn server_url(&self) -> &str {
        "mock://provider"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ProviderRequest {
        ProviderRequest {
            model: "test-model".to_string(),
            messages: vec![],
            temperature: 0.7,
            max_tokens: 100,
            timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let provider = MockProvider::new();
        let resp = provider.complete(request()).await.unwrap();
        assert_eq!(resp.content, DEFAULT_REPLY);
        assert_eq!(resp.model, "test-model");
    }

    #[tokio::test]
    async fn script_is_played_in_order() {
        let provider = MockProvider::with_responses(vec!["first".to_string()]);
        provider.push_error(StandupError::Provider {
            message: "down".into(),
            source: None,
        });
        provider.push_response("third");

        assert_eq!(provider.complete(request()).await.unwrap().content, "first");
        assert!(provider.complete(request()).await.is_err());
        assert_eq!(provider.complete(request()).await.unwrap().content, "third");
        assert_eq!(provider.call_count(), 3);
        assert_eq!(provider.last_request().unwrap().max_tokens, 100);
    }

    #[tokio::test]
    async fn probe_reflects_configured_status() {
        assert!(MockProvider::new().test_connection().await.is_working());
        let offline = MockProvider::new().with_probe_status(ProbeStatus::Error);
        let probe = offline.test_connection().await;
        assert_eq!(probe.status, ProbeStatus::Error);
        assert!(probe.error.is_some());
    }
}
