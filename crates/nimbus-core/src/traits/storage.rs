// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable storage adapter trait for conversations and messages.

use async_trait::async_trait;

use crate::error::NimbusError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Conversation, Message};

/// Durable relational backend holding two record kinds keyed by id.
///
/// Referential integrity between conversations and their messages is the
/// adapter's job: deleting a conversation must delete its messages.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Inserts a conversation header. An existing header with the same id is
    /// left untouched.
    async fn save_conversation(&self, conversation: &Conversation) -> Result<(), NimbusError>;

    /// Fetches a single conversation header.
    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, NimbusError>;

    /// Lists conversations, most recently updated first.
    async fn list_conversations(&self, limit: usize) -> Result<Vec<Conversation>, NimbusError>;

    /// Appends a message and refreshes the owning conversation's counters.
    async fn save_message(&self, message: &Message) -> Result<(), NimbusError>;

    /// Returns the `limit` most recent messages, in chronological order.
    async fn get_messages(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> Result<Vec<Message>, NimbusError>;

    /// Deletes a conversation and its messages. Returns whether anything existed.
    async fn delete_conversation(&self, id: &str) -> Result<bool, NimbusError>;
}
