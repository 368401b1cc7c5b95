// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter trait for text-to-vector conversion.

use async_trait::async_trait;

use crate::error::NimbusError;
use crate::traits::adapter::PluginAdapter;

/// Converts text into a fixed-length vector for semantic search.
#[async_trait]
pub trait EmbeddingAdapter: PluginAdapter {
    /// Length of every vector this adapter produces.
    fn dimensions(&self) -> usize;

    /// Embeds a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, NimbusError>;
}
