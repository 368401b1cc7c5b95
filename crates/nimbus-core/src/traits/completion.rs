// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Language-model completion adapter trait.

use async_trait::async_trait;

use crate::error::NimbusError;
use crate::traits::adapter::PluginAdapter;

/// Turns a system prompt plus a user prompt into generated text.
#[async_trait]
pub trait CompletionAdapter: PluginAdapter {
    async fn complete(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, NimbusError>;
}
