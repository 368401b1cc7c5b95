// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process stand-in for the durable store.

use std::collections::HashMap;

use nimbus_core::{Conversation, Message};
use tokio::sync::RwLock;

#[derive(Default)]
struct MirrorState {
    conversations: HashMap<String, Conversation>,
    messages: HashMap<String, Vec<Message>>,
}

/// Conversations and messages kept in memory, keyed by conversation id.
///
/// Never fails. A single lock guards both maps so a message append and the
/// counter refresh on its conversation are observed together.
#[derive(Default)]
pub struct MemoryMirror {
    state: RwLock<MirrorState>,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn save_conversation(&self, conversation: Conversation) {
        let mut state = self.state.write().await;
        state
            .conversations
            .entry(conversation.id.clone())
            .or_insert(conversation);
    }

    pub async fn get_conversation(&self, id: &str) -> Option<Conversation> {
        self.state.read().await.conversations.get(id).cloned()
    }

    /// All conversations, most recently updated first.
    pub async fn conversations(&self) -> Vec<Conversation> {
        let mut conversations: Vec<_> = self
            .state
            .read()
            .await
            .conversations
            .values()
            .cloned()
            .collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        conversations
    }

    /// Appends a message; refreshes the conversation if the mirror holds it.
    pub async fn save_message(&self, message: Message) {
        let mut state = self.state.write().await;
        let state = &mut *state;
        let timestamp = message.timestamp;
        let conversation_id = message.conversation_id.clone();
        let thread = state.messages.entry(conversation_id.clone()).or_default();
        thread.push(message);
        let count = thread.len() as i64;

        if let Some(conversation) = state.conversations.get_mut(&conversation_id) {
            conversation.message_count = count;
            conversation.updated_at = conversation.updated_at.max(timestamp);
        }
    }

    /// Every message of a conversation, chronological.
    pub async fn messages(&self, conversation_id: &str) -> Vec<Message> {
        let mut messages = self
            .state
            .read()
            .await
            .messages
            .get(conversation_id)
            .cloned()
            .unwrap_or_default();
        messages.sort_by_key(|m| m.timestamp);
        messages
    }

    /// Removes a conversation and its messages. True if either existed.
    pub async fn delete(&self, id: &str) -> bool {
        let mut state = self.state.write().await;
        let had_conversation = state.conversations.remove(id).is_some();
        let had_messages = state.messages.remove(id).is_some();
        had_conversation || had_messages
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use nimbus_core::{MessageRole, MessageType};

    use super::*;

    fn message(conversation_id: &str, id: &str, offset: i64) -> Message {
        Message {
            id: id.into(),
            conversation_id: conversation_id.into(),
            content: id.into(),
            message_type: MessageType::Text,
            role: MessageRole::User,
            timestamp: Utc::now() + Duration::seconds(offset),
            metadata: None,
        }
    }

    #[tokio::test]
    async fn append_refreshes_counters() {
        let mirror = MemoryMirror::new();
        let created = Utc::now() - Duration::minutes(1);
        mirror.save_conversation(Conversation::new("c1", "t", created)).await;
        mirror.save_message(message("c1", "m1", 0)).await;
        mirror.save_message(message("c1", "m2", 1)).await;

        let c = mirror.get_conversation("c1").await.unwrap();
        assert_eq!(c.message_count, 2);
        assert!(c.updated_at > created);
    }

    #[tokio::test]
    async fn existing_conversation_is_not_replaced() {
        let mirror = MemoryMirror::new();
        mirror.save_conversation(Conversation::new("c1", "original", Utc::now())).await;
        mirror.save_message(message("c1", "m1", 0)).await;
        mirror.save_conversation(Conversation::new("c1", "retitled", Utc::now())).await;

        let c = mirror.get_conversation("c1").await.unwrap();
        assert_eq!(c.title, "original");
        assert_eq!(c.message_count, 1);
    }

    #[tokio::test]
    async fn messages_are_chronological_regardless_of_insert_order() {
        let mirror = MemoryMirror::new();
        mirror.save_message(message("c1", "late", 5)).await;
        mirror.save_message(message("c1", "early", 0)).await;
        let ids: Vec<_> = mirror.messages("c1").await.into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["early", "late"]);
    }

    #[tokio::test]
    async fn delete_covers_orphan_messages() {
        let mirror = MemoryMirror::new();
        mirror.save_message(message("orphan", "m1", 0)).await;
        assert!(mirror.delete("orphan").await);
        assert!(!mirror.delete("orphan").await);
        assert!(mirror.messages("orphan").await.is_empty());
    }

    #[tokio::test]
    async fn concurrent_appends_are_all_kept() {
        let mirror = std::sync::Arc::new(MemoryMirror::new());
        mirror.save_conversation(Conversation::new("c1", "t", Utc::now())).await;
        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let mirror = mirror.clone();
                tokio::spawn(async move {
                    mirror.save_message(message("c1", &format!("m{i}"), i)).await;
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(mirror.messages("c1").await.len(), 32);
        assert_eq!(mirror.get_conversation("c1").await.unwrap().message_count, 32);
    }
}
