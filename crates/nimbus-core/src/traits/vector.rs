// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector index adapter trait for approximate nearest-neighbor search.

use async_trait::async_trait;

use crate::error::NimbusError;
use crate::traits::adapter::PluginAdapter;
use crate::types::KnowledgeItem;

/// A vector plus the knowledge fields stored alongside it as metadata.
#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub id: String,
    pub vector: Vec<f32>,
    /// Item fields minus `similarity`.
    pub item: KnowledgeItem,
}

/// A ranked hit returned by [`VectorIndexAdapter::query`].
#[derive(Debug, Clone)]
pub struct VectorMatch {
    pub id: String,
    /// Raw index score; higher is more similar.
    pub score: f32,
    pub item: KnowledgeItem,
}

/// Stores embeddings with metadata and answers top-K similarity queries.
#[async_trait]
pub trait VectorIndexAdapter: PluginAdapter {
    /// Inserts or replaces the record with the same id.
    async fn upsert(&self, record: VectorRecord) -> Result<(), NimbusError>;

    /// Returns at most `top_k` matches, best first.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>, NimbusError>;
}
