// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation persistence that never fails its caller.
//!
//! Every operation goes to the durable adapter first. When there is no
//! durable adapter, or it returns an error, the operation is served by the
//! [`MemoryMirror`] instead. Reads merge both sources so that anything
//! written to the mirror during an outage stays visible.

use std::collections::HashMap;
use std::sync::Arc;

use nimbus_config::StorageConfig;
use nimbus_core::{Conversation, HealthStatus, Message, StorageAdapter};
use tracing::{debug, warn};

use crate::mirror::MemoryMirror;

pub struct ConversationStore {
    durable: Option<Arc<dyn StorageAdapter>>,
    mirror: MemoryMirror,
    message_window: usize,
    conversation_limit: usize,
}

impl ConversationStore {
    pub fn new(durable: Option<Arc<dyn StorageAdapter>>, config: &StorageConfig) -> Self {
        if durable.is_none() {
            debug!("no durable storage configured, conversations live in memory");
        }
        Self {
            durable,
            mirror: MemoryMirror::new(),
            message_window: config.message_window.max(1),
            conversation_limit: config.conversation_limit.max(1),
        }
    }

    /// Mirror-only store.
    pub fn in_memory() -> Self {
        Self::new(None, &StorageConfig::default())
    }

    pub fn is_durable(&self) -> bool {
        self.durable.is_some()
    }

    pub async fn save_conversation(&self, conversation: &Conversation) {
        if let Some(durable) = &self.durable {
            match durable.save_conversation(conversation).await {
                Ok(()) => return,
                Err(e) => warn!(
                    conversation_id = %conversation.id,
                    error = %e,
                    "durable save_conversation failed, keeping it in memory"
                ),
            }
        }
        self.mirror.save_conversation(conversation.clone()).await;
    }

    pub async fn get_conversation(&self, id: &str) -> Option<Conversation> {
        if let Some(durable) = &self.durable {
            match durable.get_conversation(id).await {
                Ok(Some(conversation)) => return Some(conversation),
                Ok(None) => {}
                Err(e) => warn!(conversation_id = %id, error = %e, "durable get_conversation failed"),
            }
        }
        self.mirror.get_conversation(id).await
    }

    /// Conversations, most recently updated first.
    ///
    /// Bounded to the configured limit when the durable store answers.
    pub async fn get_conversations(&self) -> Vec<Conversation> {
        let mirrored = self.mirror.conversations().await;
        let Some(durable) = &self.durable else {
            return mirrored;
        };

        let durable_rows = match durable.list_conversations(self.conversation_limit).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "durable list_conversations failed, serving memory");
                return mirrored;
            }
        };

        let mut by_id: HashMap<String, Conversation> = HashMap::new();
        for conversation in durable_rows.into_iter().chain(mirrored) {
            match by_id.get(&conversation.id) {
                Some(existing) if existing.updated_at >= conversation.updated_at => {}
                _ => {
                    by_id.insert(conversation.id.clone(), conversation);
                }
            }
        }
        let mut merged: Vec<_> = by_id.into_values().collect();
        merged.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        merged.truncate(self.conversation_limit);
        merged
    }

    pub async fn save_message(&self, message: &Message) {
        if let Some(durable) = &self.durable {
            match durable.save_message(message).await {
                Ok(()) => return,
                Err(e) => warn!(
                    conversation_id = %message.conversation_id,
                    error = %e,
                    "durable save_message failed, keeping it in memory"
                ),
            }
        }
        self.mirror.save_message(message.clone()).await;
    }

    /// Messages of a conversation, oldest first.
    ///
    /// Backed by the durable store this is the most recent window; the mirror
    /// alone returns the full history.
    pub async fn get_messages(&self, conversation_id: &str) -> Vec<Message> {
        let mirrored = self.mirror.messages(conversation_id).await;
        let Some(durable) = &self.durable else {
            return mirrored;
        };

        match durable.get_messages(conversation_id, self.message_window).await {
            Ok(mut messages) if !mirrored.is_empty() => {
                messages.extend(mirrored);
                messages.sort_by_key(|m| m.timestamp);
                let excess = messages.len().saturating_sub(self.message_window);
                messages.drain(..excess);
                messages
            }
            Ok(messages) => messages,
            Err(e) => {
                warn!(conversation_id = %conversation_id, error = %e, "durable get_messages failed, serving memory");
                mirrored
            }
        }
    }

    /// Deletes a conversation and its messages from both stores.
    ///
    /// True iff a record existed somewhere and was removed.
    pub async fn delete_conversation(&self, id: &str) -> bool {
        let durable_deleted = match &self.durable {
            Some(durable) => durable.delete_conversation(id).await.unwrap_or_else(|e| {
                warn!(conversation_id = %id, error = %e, "durable delete_conversation failed");
                false
            }),
            None => false,
        };
        let mirror_deleted = self.mirror.delete(id).await;
        durable_deleted || mirror_deleted
    }

    /// Durable backend health, or `Degraded` when running from memory.
    pub async fn health(&self) -> HealthStatus {
        match &self.durable {
            Some(durable) => durable
                .health_check()
                .await
                .unwrap_or_else(|e| HealthStatus::Unhealthy(e.to_string())),
            None => HealthStatus::Degraded("in-memory conversations only".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use nimbus_core::{AdapterType, MessageRole, MessageType, NimbusError, PluginAdapter};

    use super::*;
    use crate::{Database, SqliteStorage};

    struct BrokenStorage;

    #[async_trait]
    impl PluginAdapter for BrokenStorage {
        fn name(&self) -> &str {
            "broken"
        }
        fn adapter_type(&self) -> AdapterType {
            AdapterType::Storage
        }
        async fn health_check(&self) -> Result<HealthStatus, NimbusError> {
            Err(NimbusError::Internal("disk on fire".into()))
        }
    }

    #[async_trait]
    impl StorageAdapter for BrokenStorage {
        async fn save_conversation(&self, _: &Conversation) -> Result<(), NimbusError> {
            Err(NimbusError::Internal("disk on fire".into()))
        }
        async fn get_conversation(&self, _: &str) -> Result<Option<Conversation>, NimbusError> {
            Err(NimbusError::Internal("disk on fire".into()))
        }
        async fn list_conversations(&self, _: usize) -> Result<Vec<Conversation>, NimbusError> {
            Err(NimbusError::Internal("disk on fire".into()))
        }
        async fn save_message(&self, _: &Message) -> Result<(), NimbusError> {
            Err(NimbusError::Internal("disk on fire".into()))
        }
        async fn get_messages(&self, _: &str, _: usize) -> Result<Vec<Message>, NimbusError> {
            Err(NimbusError::Internal("disk on fire".into()))
        }
        async fn delete_conversation(&self, _: &str) -> Result<bool, NimbusError> {
            Err(NimbusError::Internal("disk on fire".into()))
        }
    }

    /// SQLite whose single-conversation lookup always fails.
    struct UnreadableHeaders(SqliteStorage);

    #[async_trait]
    impl PluginAdapter for UnreadableHeaders {
        fn name(&self) -> &str {
            "unreadable-headers"
        }
        fn adapter_type(&self) -> AdapterType {
            AdapterType::Storage
        }
        async fn health_check(&self) -> Result<HealthStatus, NimbusError> {
            Ok(HealthStatus::Healthy)
        }
    }

    #[async_trait]
    impl StorageAdapter for UnreadableHeaders {
        async fn save_conversation(&self, c: &Conversation) -> Result<(), NimbusError> {
            self.0.save_conversation(c).await
        }
        async fn get_conversation(&self, _: &str) -> Result<Option<Conversation>, NimbusError> {
            Err(NimbusError::Internal("database is locked".into()))
        }
        async fn list_conversations(&self, limit: usize) -> Result<Vec<Conversation>, NimbusError> {
            self.0.list_conversations(limit).await
        }
        async fn save_message(&self, m: &Message) -> Result<(), NimbusError> {
            self.0.save_message(m).await
        }
        async fn get_messages(&self, id: &str, limit: usize) -> Result<Vec<Message>, NimbusError> {
            self.0.get_messages(id, limit).await
        }
        async fn delete_conversation(&self, id: &str) -> Result<bool, NimbusError> {
            self.0.delete_conversation(id).await
        }
    }

    fn message(conversation_id: &str, n: i64) -> Message {
        Message {
            id: format!("{conversation_id}-m{n}"),
            conversation_id: conversation_id.into(),
            content: format!("hello {n}"),
            message_type: MessageType::Text,
            role: MessageRole::User,
            timestamp: Utc::now() + Duration::milliseconds(n * 10),
            metadata: None,
        }
    }

    async fn sqlite_store(config: &StorageConfig) -> ConversationStore {
        let db = Database::open_in_memory().await.unwrap();
        ConversationStore::new(Some(Arc::new(SqliteStorage::new(db))), config)
    }

    async fn round_trip(store: ConversationStore) {
        let c = Conversation::new("c1", "天气闲聊", Utc::now());
        store.save_conversation(&c).await;
        store.save_message(&message("c1", 0)).await;

        let listed = store.get_conversations().await;
        assert!(listed.iter().any(|x| x.id == "c1"));
        assert_eq!(store.get_messages("c1").await.len(), 1);

        assert!(store.delete_conversation("c1").await);
        assert!(!store.delete_conversation("c1").await);
        assert!(store.get_messages("c1").await.is_empty());
    }

    #[tokio::test]
    async fn round_trip_in_memory() {
        round_trip(ConversationStore::in_memory()).await;
    }

    #[tokio::test]
    async fn round_trip_durable() {
        round_trip(sqlite_store(&StorageConfig::default()).await).await;
    }

    #[tokio::test]
    async fn round_trip_with_failing_durable_store() {
        let store = ConversationStore::new(Some(Arc::new(BrokenStorage)), &StorageConfig::default());
        round_trip(store).await;
    }

    #[tokio::test]
    async fn durable_window_is_bounded_but_mirror_is_not() {
        let config = StorageConfig {
            message_window: 3,
            ..StorageConfig::default()
        };

        let durable = sqlite_store(&config).await;
        durable.save_conversation(&Conversation::new("c1", "t", Utc::now())).await;
        for n in 0..5 {
            durable.save_message(&message("c1", n)).await;
        }
        let window = durable.get_messages("c1").await;
        assert_eq!(window.len(), 3);
        assert_eq!(window[2].id, "c1-m4");

        let memory = ConversationStore::new(None, &config);
        for n in 0..5 {
            memory.save_message(&message("c1", n)).await;
        }
        assert_eq!(memory.get_messages("c1").await.len(), 5);
    }

    #[tokio::test]
    async fn failed_lookup_then_resave_keeps_title_and_counters() {
        let db = Database::open_in_memory().await.unwrap();
        let store = ConversationStore::new(
            Some(Arc::new(UnreadableHeaders(SqliteStorage::new(db)))),
            &StorageConfig::default(),
        );
        store.save_conversation(&Conversation::new("c1", "旅行计划", Utc::now())).await;
        store.save_message(&message("c1", 0)).await;

        assert!(store.get_conversation("c1").await.is_none());
        store.save_conversation(&Conversation::new("c1", "hello 1", Utc::now())).await;

        let listed = store.get_conversations().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "旅行计划");
        assert_eq!(listed[0].message_count, 1);
    }

    #[tokio::test]
    async fn message_for_conversation_missing_from_database_lands_in_mirror() {
        let store = sqlite_store(&StorageConfig::default()).await;
        // Rejected by the foreign key, so it must be kept in memory.
        store.save_message(&message("ghost", 0)).await;
        let messages = store.get_messages("ghost").await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, "ghost-m0");
    }

    #[tokio::test]
    async fn health_reflects_backend() {
        assert!(matches!(
            ConversationStore::in_memory().health().await,
            HealthStatus::Degraded(_)
        ));
        let broken = ConversationStore::new(Some(Arc::new(BrokenStorage)), &StorageConfig::default());
        assert!(matches!(broken.health().await, HealthStatus::Unhealthy(_)));
    }
}
