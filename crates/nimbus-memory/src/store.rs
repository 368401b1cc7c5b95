// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The knowledge store seam and its vector-backed implementation.

use std::sync::Arc;

use async_trait::async_trait;
use nimbus_core::{EmbeddingAdapter, KnowledgeItem, NimbusError, VectorIndexAdapter, VectorRecord};
use tracing::debug;

use crate::types::RetrievalMode;

/// One retrieval strategy. [`crate::RetrievalEngine`] picks an implementation
/// at construction and demotes to the lexical corpus per call on error.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    fn mode(&self) -> RetrievalMode;

    async fn ingest(&self, item: &KnowledgeItem) -> Result<(), NimbusError>;

    /// Best matches first, each with `similarity` set.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<KnowledgeItem>, NimbusError>;
}

/// Semantic retrieval: embed, then nearest-neighbour lookup.
pub struct VectorKnowledge {
    embedder: Arc<dyn EmbeddingAdapter>,
    index: Arc<dyn VectorIndexAdapter>,
}

impl VectorKnowledge {
    pub fn new(embedder: Arc<dyn EmbeddingAdapter>, index: Arc<dyn VectorIndexAdapter>) -> Self {
        Self { embedder, index }
    }
}

#[async_trait]
impl KnowledgeStore for VectorKnowledge {
    fn mode(&self) -> RetrievalMode {
        RetrievalMode::Vector
    }

    async fn ingest(&self, item: &KnowledgeItem) -> Result<(), NimbusError> {
        let text = format!("{}\n{}", item.title, item.content);
        let vector = self.embedder.embed(&text).await?;
        self.index
            .upsert(VectorRecord {
                id: item.id.clone(),
                vector,
                item: item.clone().without_similarity(),
            })
            .await?;
        debug!(id = %item.id, index = self.index.name(), "knowledge item indexed");
        Ok(())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<KnowledgeItem>, NimbusError> {
        let vector = self.embedder.embed(query).await?;
        let matches = self.index.query(&vector, limit).await?;
        Ok(matches
            .into_iter()
            .take(limit)
            .map(|m| m.item.with_similarity(m.score))
            .collect())
    }
}
