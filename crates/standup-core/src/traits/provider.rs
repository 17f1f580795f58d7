// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for text-generation backends (LM Studio, OpenAI-compatible servers).

use async_trait::async_trait;

use crate::error::StandupError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ConnectionProbe, ProviderRequest, ProviderResponse};

/// Adapter for a text-generation capability.
///
/// A provider exposes a single logical model. Callers bound each call with
/// [`ProviderRequest::timeout`]; implementations must honour it.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends a completion request and returns the generated text.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, StandupError>;

    /// Sends a fixed probe prompt and reports whether the backend answers sensibly.
    ///
    /// Never fails: transport errors are reported inside the probe.
    async fn test_connection(&self) -> ConnectionProbe;

    /// Base URL of the backing server, for diagnostics.
    fn server_url(&self) -> &str;
}
