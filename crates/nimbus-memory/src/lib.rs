// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge retrieval for the Nimbus assistant.
//!
//! Two interchangeable [`KnowledgeStore`] strategies sit behind the
//! [`RetrievalEngine`]:
//! - [`VectorKnowledge`]: [`HttpEmbedder`] embeddings in a [`SqliteVectorIndex`]
//! - [`LexicalCorpus`]: substring scoring over a seeded in-process corpus
//!
//! Retrieval quality degrades from semantic to lexical without changing
//! what callers see.

pub mod corpus;
pub mod embedder;
pub mod engine;
pub mod index;
pub mod store;
pub mod types;

pub use corpus::LexicalCorpus;
pub use embedder::HttpEmbedder;
pub use engine::RetrievalEngine;
pub use index::SqliteVectorIndex;
pub use store::{KnowledgeStore, VectorKnowledge};
pub use types::RetrievalMode;
