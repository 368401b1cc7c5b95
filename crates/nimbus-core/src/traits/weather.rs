// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Weather provider adapter trait.

use async_trait::async_trait;

use crate::error::NimbusError;
use crate::traits::adapter::PluginAdapter;
use crate::types::WeatherReading;

/// Fetches current conditions for a city from an external provider.
#[async_trait]
pub trait WeatherAdapter: PluginAdapter {
    async fn fetch(&self, city: &str) -> Result<WeatherReading, NimbusError>;
}
