// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge ingestion and lookup with graceful demotion.
//!
//! The engine is built with an optional primary [`KnowledgeStore`] (normally
//! [`crate::VectorKnowledge`]) and always owns a [`LexicalCorpus`]. A call
//! whose primary path fails is served by the corpus instead; the next call
//! tries the primary again.

use std::sync::Arc;

use nimbus_core::KnowledgeItem;
use tracing::{debug, warn};

use crate::corpus::LexicalCorpus;
use crate::store::KnowledgeStore;
use crate::types::RetrievalMode;

pub struct RetrievalEngine {
    primary: Option<Arc<dyn KnowledgeStore>>,
    corpus: Arc<LexicalCorpus>,
    default_limit: usize,
}

impl RetrievalEngine {
    pub fn new(
        primary: Option<Arc<dyn KnowledgeStore>>,
        corpus: LexicalCorpus,
        default_limit: usize,
    ) -> Self {
        let engine = Self {
            primary,
            corpus: Arc::new(corpus),
            default_limit: default_limit.max(1),
        };
        debug!(mode = %engine.mode(), "retrieval engine ready");
        engine
    }

    /// Lexical-only engine over the seeded corpus.
    pub fn lexical(default_limit: usize) -> Self {
        Self::new(None, LexicalCorpus::seeded(), default_limit)
    }

    /// The mode selected at construction.
    pub fn mode(&self) -> RetrievalMode {
        self.primary
            .as_ref()
            .map_or(RetrievalMode::Lexical, |p| p.mode())
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Adds an item. Never fails: a failed primary ingest lands in the corpus.
    pub async fn ingest(&self, item: KnowledgeItem) {
        let item = item.without_similarity();
        if let Some(primary) = &self.primary {
            match primary.ingest(&item).await {
                Ok(()) => return,
                Err(e) => warn!(
                    id = %item.id,
                    mode = %primary.mode(),
                    error = %e,
                    "knowledge ingest failed, appending to lexical corpus"
                ),
            }
        }
        self.corpus.append(item).await;
    }

    /// Up to `limit` items, highest similarity first, each with similarity set.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<KnowledgeItem> {
        if query.trim().is_empty() || limit == 0 {
            return Vec::new();
        }

        if let Some(primary) = &self.primary {
            match primary.search(query, limit).await {
                Ok(mut items) => {
                    items.truncate(limit);
                    return items
                        .into_iter()
                        .map(|item| {
                            let score = item.similarity.unwrap_or(0.0);
                            item.with_similarity(score)
                        })
                        .collect();
                }
                Err(e) => warn!(
                    mode = %primary.mode(),
                    error = %e,
                    "knowledge search failed, using lexical corpus"
                ),
            }
        }
        self.corpus.rank(query, limit).await
    }

    /// [`Self::search`] with the configured default limit.
    pub async fn search_default(&self, query: &str) -> Vec<KnowledgeItem> {
        self.search(query, self.default_limit).await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;
    use nimbus_core::NimbusError;
    use tokio::sync::Mutex;

    use super::*;

    /// Primary store that records ingests and can be told to fail.
    struct ScriptedStore {
        fail: bool,
        ingested: Mutex<Vec<String>>,
        results: Vec<KnowledgeItem>,
    }

    #[async_trait]
    impl KnowledgeStore for ScriptedStore {
        fn mode(&self) -> RetrievalMode {
            RetrievalMode::Vector
        }

        async fn ingest(&self, item: &KnowledgeItem) -> Result<(), NimbusError> {
            if self.fail {
                return Err(NimbusError::provider("embedding service down"));
            }
            self.ingested.lock().await.push(item.id.clone());
            Ok(())
        }

        async fn search(&self, _: &str, _: usize) -> Result<Vec<KnowledgeItem>, NimbusError> {
            if self.fail {
                return Err(NimbusError::provider("index unreachable"));
            }
            Ok(self.results.clone())
        }
    }

    fn item(id: &str, title: &str, similarity: Option<f32>) -> KnowledgeItem {
        KnowledgeItem {
            id: id.into(),
            title: title.into(),
            content: "content".into(),
            source: None,
            tags: Default::default(),
            created_at: Utc::now(),
            similarity,
        }
    }

    fn scripted(fail: bool, results: Vec<KnowledgeItem>) -> Arc<ScriptedStore> {
        Arc::new(ScriptedStore {
            fail,
            ingested: Mutex::new(Vec::new()),
            results,
        })
    }

    #[tokio::test]
    async fn lexical_mode_without_primary() {
        let engine = RetrievalEngine::lexical(5);
        assert_eq!(engine.mode(), RetrievalMode::Lexical);
        assert!(!engine.search_default("ChatGPT").await.is_empty());
    }

    #[tokio::test]
    async fn vector_scores_are_clamped_and_limited() {
        let store = scripted(
            false,
            vec![
                item("a", "a", Some(1.7)),
                item("b", "b", Some(-0.2)),
                item("c", "c", Some(0.5)),
            ],
        );
        let engine = RetrievalEngine::new(Some(store), LexicalCorpus::empty(), 5);
        assert_eq!(engine.mode(), RetrievalMode::Vector);

        let results = engine.search("q", 2).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].similarity, Some(1.0));
        assert_eq!(results[1].similarity, Some(0.0));
    }

    #[tokio::test]
    async fn failing_primary_demotes_search_to_corpus() {
        let engine = RetrievalEngine::new(Some(scripted(true, vec![])), LexicalCorpus::seeded(), 5);
        let results = engine.search("机器学习", 5).await;
        assert_eq!(results[0].id, "knowledge_2");
        assert_eq!(engine.mode(), RetrievalMode::Vector, "demotion is per call");
    }

    #[tokio::test]
    async fn failing_primary_demotes_ingest_to_corpus() {
        let engine = RetrievalEngine::new(Some(scripted(true, vec![])), LexicalCorpus::empty(), 5);
        engine.ingest(item("new", "Quantum computing", Some(0.9))).await;
        let results = engine.search("quantum", 5).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "new");
    }

    #[tokio::test]
    async fn healthy_primary_receives_ingest() {
        let store = scripted(false, vec![]);
        let engine = RetrievalEngine::new(Some(store.clone()), LexicalCorpus::empty(), 5);
        engine.ingest(item("x", "x", None)).await;
        assert_eq!(*store.ingested.lock().await, vec!["x".to_string()]);
    }

    #[tokio::test]
    async fn blank_query_returns_nothing() {
        let engine = RetrievalEngine::lexical(5);
        assert!(engine.search("  ", 5).await.is_empty());
    }
}
