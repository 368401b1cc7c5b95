// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible language-model adapter for the Nimbus assistant.
//!
//! [`OpenAiProvider`] implements [`nimbus_core::CompletionAdapter`]; any
//! server speaking the `/chat/completions` protocol works via `base_url`.

pub mod client;
pub mod provider;
pub mod types;

pub use client::OpenAiClient;
pub use provider::OpenAiProvider;
