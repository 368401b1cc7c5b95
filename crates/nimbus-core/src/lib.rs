// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Nimbus assistant.
//!
//! This crate provides the domain types, the error type, and the adapter
//! traits for every external capability Nimbus consumes (embeddings, vector
//! index, weather, language model, durable storage). Concrete adapters live
//! in their own crates and implement the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

pub use error::NimbusError;
pub use types::{
    AdapterType, Conversation, HealthStatus, Intent, KnowledgeItem, Message, MessageRole,
    MessageType, Reply, WeatherReading,
};

pub use traits::{
    CompletionAdapter, EmbeddingAdapter, PluginAdapter, StorageAdapter, VectorIndexAdapter,
    VectorMatch, VectorRecord, WeatherAdapter,
};
