// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed vector index with embedding BLOBs and in-process cosine scoring.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use nimbus_core::{
    AdapterType, HealthStatus, KnowledgeItem, NimbusError, PluginAdapter, VectorIndexAdapter,
    VectorMatch, VectorRecord,
};
use nimbus_storage::{Database, map_tr_err};
use rusqlite::params;
use tracing::debug;

use crate::types::{blob_to_vec, cosine_similarity, vec_to_blob};

/// Stores one row per knowledge item in `knowledge_items`.
///
/// Queries scan every embedding; rows whose dimension differs from the query
/// (e.g. after an embedding model change) are skipped.
pub struct SqliteVectorIndex {
    db: Database,
}

struct IndexedRow {
    item: KnowledgeItem,
    embedding: Vec<f32>,
}

impl SqliteVectorIndex {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn count(&self) -> Result<usize, NimbusError> {
        self.db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT COUNT(*) FROM knowledge_items", [], |row| row.get(0))
            })
            .await
            .map(|n| n as usize)
            .map_err(map_tr_err)
    }

    async fn all_rows(&self) -> Result<Vec<IndexedRow>, NimbusError> {
        self.db
            .connection()
            .call(|conn| -> Result<Vec<IndexedRow>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, title, content, source, tags, embedding, created_at
                     FROM knowledge_items ORDER BY rowid",
                )?;
                let rows = stmt
                    .query_map([], |row| {
                        let tags: String = row.get(4)?;
                        let blob: Vec<u8> = row.get(5)?;
                        let created_at: String = row.get(6)?;
                        Ok(IndexedRow {
                            item: KnowledgeItem {
                                id: row.get(0)?,
                                title: row.get(1)?,
                                content: row.get(2)?,
                                source: row.get(3)?,
                                // Malformed tag lists degrade to no tags.
                                tags: serde_json::from_str::<BTreeSet<String>>(&tags)
                                    .unwrap_or_default(),
                                created_at: DateTime::parse_from_rfc3339(&created_at)
                                    .map(|ts| ts.with_timezone(&Utc))
                                    .unwrap_or_else(|_| Utc::now()),
                                similarity: None,
                            },
                            embedding: blob_to_vec(&blob),
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(map_tr_err)
    }
}

#[async_trait]
impl PluginAdapter for SqliteVectorIndex {
    fn name(&self) -> &str {
        "sqlite-vector"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VectorIndex
    }

    async fn health_check(&self) -> Result<HealthStatus, NimbusError> {
        self.count().await?;
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl VectorIndexAdapter for SqliteVectorIndex {
    async fn upsert(&self, record: VectorRecord) -> Result<(), NimbusError> {
        if record.vector.is_empty() {
            return Err(NimbusError::Internal(format!(
                "refusing to index `{}` with an empty vector",
                record.id
            )));
        }
        let tags = serde_json::to_string(&record.item.tags)
            .map_err(|e| NimbusError::Internal(format!("unserializable tags: {e}")))?;
        let blob = vec_to_blob(&record.vector);
        let created_at = record
            .item
            .created_at
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        let VectorRecord { id, item, .. } = record;

        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT OR REPLACE INTO knowledge_items
                        (id, title, content, source, tags, embedding, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![id, item.title, item.content, item.source, tags, blob, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>, NimbusError> {
        let rows = self.all_rows().await?;
        let scanned = rows.len();

        let mut matches: Vec<VectorMatch> = rows
            .into_iter()
            .filter(|row| row.embedding.len() == vector.len())
            .map(|row| VectorMatch {
                id: row.item.id.clone(),
                score: cosine_similarity(vector, &row.embedding),
                item: row.item,
            })
            .collect();
        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(top_k);

        debug!(scanned, returned = matches.len(), "vector query complete");
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, vector: Vec<f32>) -> VectorRecord {
        VectorRecord {
            id: id.into(),
            vector,
            item: KnowledgeItem {
                id: id.into(),
                title: format!("title {id}"),
                content: format!("content {id}"),
                source: Some("unit".into()),
                tags: ["a".to_string(), "b".to_string()].into_iter().collect(),
                created_at: Utc::now(),
                similarity: None,
            },
        }
    }

    async fn index() -> SqliteVectorIndex {
        SqliteVectorIndex::new(Database::open_in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn query_ranks_by_cosine() {
        let idx = index().await;
        idx.upsert(record("x", vec![1.0, 0.0])).await.unwrap();
        idx.upsert(record("y", vec![0.0, 1.0])).await.unwrap();
        idx.upsert(record("xy", vec![1.0, 1.0])).await.unwrap();

        let matches = idx.query(&[1.0, 0.1], 2).await.unwrap();
        let ids: Vec<_> = matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "xy"]);
        assert!(matches[0].score > matches[1].score);
        assert_eq!(matches[0].item.source.as_deref(), Some("unit"));
        assert_eq!(matches[0].item.tags.len(), 2);
    }

    #[tokio::test]
    async fn upsert_replaces_existing_id() {
        let idx = index().await;
        idx.upsert(record("x", vec![1.0, 0.0])).await.unwrap();
        idx.upsert(record("x", vec![0.0, 1.0])).await.unwrap();
        assert_eq!(idx.count().await.unwrap(), 1);
        let best = idx.query(&[0.0, 1.0], 1).await.unwrap();
        assert!((best[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn mismatched_dimensions_are_skipped() {
        let idx = index().await;
        idx.upsert(record("old", vec![1.0, 0.0, 0.0])).await.unwrap();
        idx.upsert(record("new", vec![1.0, 0.0])).await.unwrap();
        let matches = idx.query(&[1.0, 0.0], 5).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "new");
    }

    #[tokio::test]
    async fn empty_vector_is_rejected() {
        assert!(index().await.upsert(record("e", vec![])).await.is_err());
    }
}
