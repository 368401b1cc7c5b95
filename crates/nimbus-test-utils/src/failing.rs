// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters whose every call fails, for exercising fallback paths.

use async_trait::async_trait;

use nimbus_core::{
    AdapterType, CompletionAdapter, Conversation, EmbeddingAdapter, HealthStatus, Message,
    NimbusError, PluginAdapter, StorageAdapter, VectorIndexAdapter, VectorMatch, VectorRecord,
    WeatherAdapter, WeatherReading,
};

fn outage(name: &str) -> NimbusError {
    NimbusError::provider(format!("{name} is down"))
}

macro_rules! failing_plugin {
    ($ty:ident, $name:literal, $kind:expr) => {
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $ty;

        #[async_trait]
        impl PluginAdapter for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn adapter_type(&self) -> AdapterType {
                $kind
            }

            async fn health_check(&self) -> Result<HealthStatus, NimbusError> {
                Ok(HealthStatus::Unhealthy(format!("{} is down", $name)))
            }
        }
    };
}

failing_plugin!(FailingCompletion, "failing-completion", AdapterType::Completion);
failing_plugin!(FailingEmbedder, "failing-embedder", AdapterType::Embedding);
failing_plugin!(FailingVectorIndex, "failing-vector-index", AdapterType::VectorIndex);
failing_plugin!(FailingWeather, "failing-weather", AdapterType::Weather);
failing_plugin!(FailingStorage, "failing-storage", AdapterType::Storage);

#[async_trait]
impl CompletionAdapter for FailingCompletion {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, NimbusError> {
        Err(outage(self.name()))
    }
}

#[async_trait]
impl EmbeddingAdapter for FailingEmbedder {
    fn dimensions(&self) -> usize {
        8
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, NimbusError> {
        Err(outage(self.name()))
    }
}

#[async_trait]
impl VectorIndexAdapter for FailingVectorIndex {
    async fn upsert(&self, _record: VectorRecord) -> Result<(), NimbusError> {
        Err(outage(self.name()))
    }

    async fn query(&self, _vector: &[f32], _top_k: usize) -> Result<Vec<VectorMatch>, NimbusError> {
        Err(outage(self.name()))
    }
}

#[async_trait]
impl WeatherAdapter for FailingWeather {
    async fn fetch(&self, _city: &str) -> Result<WeatherReading, NimbusError> {
        Err(outage(self.name()))
    }
}

#[async_trait]
impl StorageAdapter for FailingStorage {
    async fn save_conversation(&self, _conversation: &Conversation) -> Result<(), NimbusError> {
        Err(NimbusError::storage(outage(self.name())))
    }

    async fn get_conversation(&self, _id: &str) -> Result<Option<Conversation>, NimbusError> {
        Err(NimbusError::storage(outage(self.name())))
    }

    async fn list_conversations(&self, _limit: usize) -> Result<Vec<Conversation>, NimbusError> {
        Err(NimbusError::storage(outage(self.name())))
    }

    async fn save_message(&self, _message: &Message) -> Result<(), NimbusError> {
        Err(NimbusError::storage(outage(self.name())))
    }

    async fn get_messages(
        &self,
        _conversation_id: &str,
        _limit: usize,
    ) -> Result<Vec<Message>, NimbusError> {
        Err(NimbusError::storage(outage(self.name())))
    }

    async fn delete_conversation(&self, _id: &str) -> Result<bool, NimbusError> {
        Err(NimbusError::storage(outage(self.name())))
    }
}
