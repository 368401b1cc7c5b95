// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete [`ChatAgent`] with mock or failing
//! adapters and, optionally, a temp SQLite database.

use std::sync::Arc;

use nimbus_agent::{ChatAgent, Collaborators, Exchange};
use nimbus_config::NimbusConfig;
use nimbus_core::{CompletionAdapter, NimbusError};
use nimbus_memory::VectorKnowledge;
use nimbus_storage::{Database, SqliteStorage};

use crate::failing::{
    FailingCompletion, FailingEmbedder, FailingStorage, FailingVectorIndex, FailingWeather,
};
use crate::mock_completion::MockCompletion;

/// Builder for creating test environments with configurable options.
#[derive(Default)]
pub struct TestHarnessBuilder {
    responses: Option<Vec<String>>,
    durable: bool,
    failing: bool,
    config: NimbusConfig,
}

impl TestHarnessBuilder {
    /// Answer general and knowledge prompts from a [`MockCompletion`].
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = Some(responses);
        self
    }

    /// Persist conversations to a SQLite file in a temp directory.
    pub fn with_durable_storage(mut self) -> Self {
        self.durable = true;
        self
    }

    /// Every external capability is present but fails on each call.
    pub fn with_failing_collaborators(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn with_config(mut self, config: NimbusConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn build(self) -> Result<TestHarness, NimbusError> {
        let mut collaborators = Collaborators::default();
        let mut temp_dir = None;

        if self.durable {
            let dir = tempfile::TempDir::new().map_err(NimbusError::storage)?;
            let path = dir.path().join("nimbus.db");
            let db = Database::open(&path.to_string_lossy(), true).await?;
            collaborators.storage = Some(Arc::new(SqliteStorage::new(db)));
            temp_dir = Some(dir);
        }

        let mock_completion = self.responses.map(|r| Arc::new(MockCompletion::with_responses(r)));
        if let Some(mock) = &mock_completion {
            collaborators.completion = Some(mock.clone() as Arc<dyn CompletionAdapter>);
        }

        if self.failing {
            collaborators.storage = Some(Arc::new(FailingStorage));
            collaborators.knowledge = Some(Arc::new(VectorKnowledge::new(
                Arc::new(FailingEmbedder),
                Arc::new(FailingVectorIndex),
            )));
            collaborators.weather = Some(Arc::new(FailingWeather));
            collaborators.completion = Some(Arc::new(FailingCompletion));
        }

        Ok(TestHarness {
            agent: ChatAgent::assemble(&self.config, collaborators)?,
            mock_completion,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment.
pub struct TestHarness {
    pub agent: ChatAgent,
    /// Present when built with mock responses.
    pub mock_completion: Option<Arc<MockCompletion>>,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::default()
    }

    /// Runs one turn in a fresh conversation.
    pub async fn send_message(&self, text: &str) -> Exchange {
        self.agent.send_message(None, text).await
    }
}
