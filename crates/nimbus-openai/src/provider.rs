// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`CompletionAdapter`] implementation over [`OpenAiClient`].

use std::time::Duration;

use async_trait::async_trait;
use nimbus_config::OpenAiConfig;
use nimbus_core::{AdapterType, CompletionAdapter, HealthStatus, NimbusError, PluginAdapter};
use tracing::debug;

use crate::client::OpenAiClient;
use crate::types::{ChatMessage, ChatRequest};

pub struct OpenAiProvider {
    client: OpenAiClient,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, config: &OpenAiConfig) -> Result<Self, NimbusError> {
        Ok(Self {
            client: OpenAiClient::new(
                api_key,
                &config.base_url,
                Duration::from_secs(config.timeout_secs),
            )?,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// `None` when no real API key is configured.
    pub fn from_config(config: &OpenAiConfig) -> Result<Option<Self>, NimbusError> {
        config
            .credential()
            .map(|key| Self::new(key, config))
            .transpose()
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl PluginAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Completion
    }

    async fn health_check(&self) -> Result<HealthStatus, NimbusError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl CompletionAdapter for OpenAiProvider {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, NimbusError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(system_prompt), ChatMessage::user(user_prompt)],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };
        let text = self.client.complete(&request).await?;
        debug!(model = %self.model, chars = text.chars().count(), "completion received");
        Ok(text)
    }
}
