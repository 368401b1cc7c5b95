// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process knowledge corpus with substring scoring.
//!
//! Serves every search when no vector store is configured, and any search
//! whose vector path failed. Pre-seeded so a fresh install can answer a few
//! questions with nothing ingested.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;
use nimbus_core::{KnowledgeItem, NimbusError};
use tokio::sync::RwLock;

use crate::store::KnowledgeStore;
use crate::types::RetrievalMode;

const TITLE_MATCH: u32 = 10;
const CONTENT_MATCH: u32 = 5;
const TAG_MATCH: u32 = 3;
const TOKEN_IN_TITLE: u32 = 2;
const TOKEN_IN_CONTENT: u32 = 1;
/// Raw score that maps to similarity 1.0.
const FULL_SCORE: u32 = 10;

/// (id, title, content, source, tags)
const SEED: &[(&str, &str, &str, &str, &[&str])] = &[
    (
        "knowledge_1",
        "人工智能基础",
        "人工智能是计算机科学的一个分支，致力于创建能够执行通常需要人类智能的任务的系统。",
        "AI教程",
        &["AI", "技术", "基础"],
    ),
    (
        "knowledge_2",
        "机器学习概念",
        "机器学习是人工智能的一个子集，专注于构建可以从数据中学习和改进的算法。",
        "ML指南",
        &["机器学习", "AI", "算法"],
    ),
    (
        "knowledge_3",
        "ChatGPT介绍",
        "ChatGPT是OpenAI开发的大型语言模型，能够进行自然语言对话和文本生成。",
        "OpenAI文档",
        &["ChatGPT", "OpenAI", "语言模型"],
    ),
];

/// Ordered, append-only collection of knowledge items.
#[derive(Default)]
pub struct LexicalCorpus {
    items: RwLock<Vec<KnowledgeItem>>,
}

impl LexicalCorpus {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A corpus holding the illustrative starter entries.
    pub fn seeded() -> Self {
        let now = Utc::now();
        let items = SEED
            .iter()
            .map(|(id, title, content, source, tags)| KnowledgeItem {
                id: id.to_string(),
                title: title.to_string(),
                content: content.to_string(),
                source: Some(source.to_string()),
                tags: tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
                created_at: now,
                similarity: None,
            })
            .collect();
        Self {
            items: RwLock::new(items),
        }
    }

    pub async fn append(&self, item: KnowledgeItem) {
        self.items.write().await.push(item.without_similarity());
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Scored matches, best first; ties keep insertion order.
    pub async fn rank(&self, query: &str, limit: usize) -> Vec<KnowledgeItem> {
        let query = query.trim().to_lowercase();
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }

        let items = self.items.read().await;
        let mut scored: Vec<(u32, &KnowledgeItem)> = items
            .iter()
            .map(|item| (raw_score(item, &query).min(FULL_SCORE), item))
            .filter(|(score, _)| *score > 0)
            .collect();
        // Ranked on the capped score; `sort_by` is stable.
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        scored
            .into_iter()
            .take(limit)
            .map(|(score, item)| {
                item.clone()
                    .with_similarity(score as f32 / FULL_SCORE as f32)
            })
            .collect()
    }
}

/// Relevance of one item to an already lower-cased query.
fn raw_score(item: &KnowledgeItem, query: &str) -> u32 {
    let title = item.title.to_lowercase();
    let content = item.content.to_lowercase();

    let mut score = 0;
    if title.contains(query) {
        score += TITLE_MATCH;
    }
    if content.contains(query) {
        score += CONTENT_MATCH;
    }
    if item.tags.iter().any(|tag| tag.to_lowercase().contains(query)) {
        score += TAG_MATCH;
    }
    for token in query.split_whitespace() {
        if title.contains(token) {
            score += TOKEN_IN_TITLE;
        }
        if content.contains(token) {
            score += TOKEN_IN_CONTENT;
        }
    }
    score
}

#[async_trait]
impl KnowledgeStore for LexicalCorpus {
    fn mode(&self) -> RetrievalMode {
        RetrievalMode::Lexical
    }

    async fn ingest(&self, item: &KnowledgeItem) -> Result<(), NimbusError> {
        self.append(item.clone()).await;
        Ok(())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<KnowledgeItem>, NimbusError> {
        Ok(self.rank(query, limit).await)
    }
}
