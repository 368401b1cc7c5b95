// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock language model for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use nimbus_core::{AdapterType, CompletionAdapter, HealthStatus, NimbusError, PluginAdapter};

/// A language model that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned. Every prompt pair is
/// recorded for assertions.
pub struct MockCompletion {
    responses: Arc<Mutex<VecDeque<String>>>,
    prompts: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockCompletion {
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn add_response(&self, text: String) {
        self.responses.lock().await.push_back(text);
    }

    /// `(system, user)` pairs received so far.
    pub async fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().await.clone()
    }
}

impl Default for MockCompletion {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockCompletion {
    fn name(&self) -> &str {
        "mock-completion"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Completion
    }

    async fn health_check(&self) -> Result<HealthStatus, NimbusError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl CompletionAdapter for MockCompletion {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, NimbusError> {
        self.prompts
            .lock()
            .await
            .push((system_prompt.to_string(), user_prompt.to_string()));
        Ok(self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn responses_are_fifo_then_default() {
        let mock = MockCompletion::with_responses(vec!["one".into()]);
        mock.add_response("two".into()).await;

        assert_eq!(mock.complete("s", "a").await.unwrap(), "one");
        assert_eq!(mock.complete("s", "b").await.unwrap(), "two");
        assert_eq!(mock.complete("s", "c").await.unwrap(), "mock response");
        assert_eq!(mock.prompts().await.len(), 3);
    }
}
