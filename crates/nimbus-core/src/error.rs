// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Nimbus assistant.

use thiserror::Error;

/// The primary error type used across all Nimbus adapter traits.
///
/// Fallback-capable components (retrieval, weather, response generation,
/// conversation storage) absorb these errors at their boundary and degrade
/// to deterministic behavior. Only configuration and programming errors are
/// expected to reach a caller of the core.
#[derive(Debug, Error)]
pub enum NimbusError {
    /// Configuration errors (invalid TOML, bad values, unbuildable patterns).
    #[error("configuration error: {0}")]
    Config(String),

    /// Durable storage errors (connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A provider call was made but failed (network, non-2xx, malformed body).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A provider has no credential or handle configured.
    #[error("provider unavailable: {provider}")]
    ProviderUnavailable { provider: String },

    /// A requested record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl NimbusError {
    /// Shorthand for a provider failure without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        NimbusError::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps any error as a storage failure.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        NimbusError::Storage {
            source: Box::new(source),
        }
    }

    /// Returns true for the provider-side conditions that callers degrade on.
    pub fn is_provider_condition(&self) -> bool {
        matches!(
            self,
            NimbusError::Provider { .. }
                | NimbusError::ProviderUnavailable { .. }
                | NimbusError::Timeout { .. }
        )
    }
}
