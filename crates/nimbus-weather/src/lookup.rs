// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use nimbus_core::{HealthStatus, WeatherAdapter, WeatherReading};
use tracing::{debug, warn};

use crate::synth::synthesize;

/// Weather for a city that always answers.
///
/// With no provider configured, or when the provider fails, the reading is
/// synthesized from the city name.
#[derive(Clone, Default)]
pub struct WeatherLookup {
    provider: Option<Arc<dyn WeatherAdapter>>,
}

impl WeatherLookup {
    pub fn new(provider: Option<Arc<dyn WeatherAdapter>>) -> Self {
        Self { provider }
    }

    /// Synthesized readings only.
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn get(&self, city: &str) -> WeatherReading {
        let Some(provider) = &self.provider else {
            debug!(city, "no weather provider configured, synthesizing reading");
            return synthesize(city);
        };

        match provider.fetch(city).await {
            Ok(reading) => reading,
            Err(e) => {
                warn!(city, provider = provider.name(), error = %e, "weather provider failed, synthesizing reading");
                synthesize(city)
            }
        }
    }

    pub async fn health(&self) -> HealthStatus {
        match &self.provider {
            Some(provider) => provider
                .health_check()
                .await
                .unwrap_or_else(|e| HealthStatus::Unhealthy(e.to_string())),
            None => HealthStatus::Degraded("synthesized weather".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use nimbus_core::{AdapterType, NimbusError, PluginAdapter};
    use tracing_test::traced_test;

    use super::*;

    struct Unreachable;

    #[async_trait]
    impl PluginAdapter for Unreachable {
        fn name(&self) -> &str {
            "unreachable"
        }
        fn adapter_type(&self) -> AdapterType {
            AdapterType::Weather
        }
        async fn health_check(&self) -> Result<HealthStatus, NimbusError> {
            Ok(HealthStatus::Healthy)
        }
    }

    #[async_trait]
    impl WeatherAdapter for Unreachable {
        async fn fetch(&self, _: &str) -> Result<WeatherReading, NimbusError> {
            Err(NimbusError::Timeout {
                duration: std::time::Duration::from_secs(10),
            })
        }
    }

    #[tokio::test]
    async fn offline_lookup_is_deterministic() {
        let lookup = WeatherLookup::offline();
        assert_eq!(lookup.get("北京").await, lookup.get("北京").await);
        assert_eq!(lookup.get("北京").await.city, "北京");
    }

    #[tokio::test]
    #[traced_test]
    async fn provider_failure_synthesizes() {
        let lookup = WeatherLookup::new(Some(Arc::new(Unreachable)));
        assert_eq!(lookup.get("成都").await, synthesize("成都"));
        assert!(logs_contain("weather provider failed, synthesizing reading"));
    }

    #[tokio::test]
    async fn health_reports_missing_provider_as_degraded() {
        assert!(matches!(
            WeatherLookup::offline().health().await,
            HealthStatus::Degraded(_)
        ));
    }
}
