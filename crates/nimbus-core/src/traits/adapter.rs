// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that all capability adapters implement.

use async_trait::async_trait;

use crate::error::NimbusError;
use crate::types::{AdapterType, HealthStatus};

/// The base trait for all Nimbus capability adapters.
///
/// Provides identity and a health probe so the binary and gateway can
/// report which capabilities are live and which are running degraded.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    /// Returns the capability this adapter provides.
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, NimbusError>;
}
