// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use std::str::FromStr;

use async_trait::async_trait;
use rusqlite::{OptionalExtension, Row, params};
use tracing::debug;

use nimbus_core::{
    AdapterType, Conversation, HealthStatus, Message, MessageRole, MessageType, NimbusError,
    PluginAdapter, StorageAdapter,
};

use crate::database::{Database, conversion_err, decode_time, encode_time, map_tr_err};

const CONVERSATION_COLUMNS: &str = "id, title, created_at, updated_at, message_count";
const MESSAGE_COLUMNS: &str = "id, conversation_id, content, type, role, timestamp, metadata";

/// Durable conversation storage over a migrated [`Database`].
pub struct SqliteStorage {
    db: Database,
}

impl SqliteStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, NimbusError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn save_conversation(&self, conversation: &Conversation) -> Result<(), NimbusError> {
        let c = conversation.clone();
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO conversations (id, title, created_at, updated_at, message_count)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(id) DO NOTHING",
                    params![
                        c.id,
                        c.title,
                        encode_time(&c.created_at),
                        encode_time(&c.updated_at),
                        c.message_count,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, NimbusError> {
        let id = id.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<Option<Conversation>, rusqlite::Error> {
                conn.query_row(
                    &format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1"),
                    params![id],
                    row_to_conversation,
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)
    }

    async fn list_conversations(&self, limit: usize) -> Result<Vec<Conversation>, NimbusError> {
        let limit = limit as i64;
        self.db
            .connection()
            .call(move |conn| -> Result<Vec<Conversation>, rusqlite::Error> {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {CONVERSATION_COLUMNS} FROM conversations
                     ORDER BY updated_at DESC, rowid DESC LIMIT ?1"
                ))?;
                let conversations = stmt
                    .query_map(params![limit], row_to_conversation)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(conversations)
            })
            .await
            .map_err(map_tr_err)
    }

    async fn save_message(&self, message: &Message) -> Result<(), NimbusError> {
        let m = message.clone();
        let metadata = m
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| NimbusError::Internal(format!("unserializable metadata: {e}")))?;

        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                let tx = conn.transaction()?;
                let timestamp = encode_time(&m.timestamp);
                tx.execute(
                    &format!(
                        "INSERT INTO messages ({MESSAGE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                    ),
                    params![
                        m.id,
                        m.conversation_id,
                        m.content,
                        m.message_type.to_string(),
                        m.role.to_string(),
                        timestamp,
                        metadata,
                    ],
                )?;
                tx.execute(
                    "UPDATE conversations SET
                        updated_at = MAX(updated_at, ?2),
                        message_count = (SELECT COUNT(*) FROM messages WHERE conversation_id = ?1)
                     WHERE id = ?1",
                    params![m.conversation_id, timestamp],
                )?;
                tx.commit()
            })
            .await
            .map_err(map_tr_err)?;
        debug!(conversation_id = %message.conversation_id, "message persisted");
        Ok(())
    }

    async fn get_messages(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> Result<Vec<Message>, NimbusError> {
        let conversation_id = conversation_id.to_string();
        let limit = limit as i64;
        let mut messages = self
            .db
            .connection()
            .call(move |conn| -> Result<Vec<Message>, rusqlite::Error> {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages WHERE conversation_id = ?1
                     ORDER BY timestamp DESC, rowid DESC LIMIT ?2"
                ))?;
                let messages = stmt
                    .query_map(params![conversation_id, limit], row_to_message)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(messages)
            })
            .await
            .map_err(map_tr_err)?;
        messages.reverse();
        Ok(messages)
    }

    async fn delete_conversation(&self, id: &str) -> Result<bool, NimbusError> {
        let id = id.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<bool, rusqlite::Error> {
                let tx = conn.transaction()?;
                let messages = tx.execute("DELETE FROM messages WHERE conversation_id = ?1", params![id])?;
                let conversations = tx.execute("DELETE FROM conversations WHERE id = ?1", params![id])?;
                tx.commit()?;
                Ok(messages + conversations > 0)
            })
            .await
            .map_err(map_tr_err)
    }
}

fn row_to_conversation(row: &Row<'_>) -> Result<Conversation, rusqlite::Error> {
    Ok(Conversation {
        id: row.get(0)?,
        title: row.get(1)?,
        created_at: decode_time(2, &row.get::<_, String>(2)?)?,
        updated_at: decode_time(3, &row.get::<_, String>(3)?)?,
        message_count: row.get(4)?,
    })
}

fn row_to_message(row: &Row<'_>) -> Result<Message, rusqlite::Error> {
    let message_type: String = row.get(3)?;
    let role: String = row.get(4)?;
    let metadata: Option<String> = row.get(6)?;
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        content: row.get(2)?,
        message_type: MessageType::from_str(&message_type).map_err(|e| conversion_err(3, e))?,
        role: MessageRole::from_str(&role).map_err(|e| conversion_err(4, e))?,
        timestamp: decode_time(5, &row.get::<_, String>(5)?)?,
        metadata: metadata
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(|e| conversion_err(6, e))?,
    })
}
