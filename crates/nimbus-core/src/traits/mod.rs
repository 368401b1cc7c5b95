// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the external capabilities Nimbus consumes.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility. Each capability may
//! succeed, fail, or be absent; the consuming components own the fallback.

pub mod adapter;
pub mod completion;
pub mod embedding;
pub mod storage;
pub mod vector;
pub mod weather;

pub use adapter::PluginAdapter;
pub use completion::CompletionAdapter;
pub use embedding::EmbeddingAdapter;
pub use storage::StorageAdapter;
pub use vector::{VectorIndexAdapter, VectorMatch, VectorRecord};
pub use weather::WeatherAdapter;
