// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenWeatherMap current-conditions API.

use std::time::Duration;

use async_trait::async_trait;
use nimbus_config::WeatherConfig;
use nimbus_core::{
    AdapterType, HealthStatus, NimbusError, PluginAdapter, WeatherAdapter, WeatherReading,
};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    name: String,
    main: MainBlock,
    weather: Vec<Condition>,
    #[serde(default)]
    wind: Option<Wind>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct Wind {
    #[serde(default)]
    speed: Option<f64>,
}

impl CurrentWeather {
    fn into_reading(self) -> Result<WeatherReading, NimbusError> {
        let condition = self
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| NimbusError::provider("weather response had no conditions"))?;
        Ok(WeatherReading {
            city: self.name,
            temperature: self.main.temp.round() as i32,
            description: condition.description,
            humidity: self.main.humidity.round().max(0.0) as u32,
            wind_speed: self
                .wind
                .and_then(|w| w.speed)
                .unwrap_or(0.0)
                .round()
                .max(0.0) as u32,
            icon: condition.icon,
        })
    }
}

/// Fetches live conditions. Any non-2xx status or unexpected body is a
/// provider error; the caller decides how to degrade.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    units: String,
    lang: String,
}

impl OpenWeatherClient {
    pub fn new(api_key: impl Into<String>, config: &WeatherConfig) -> Result<Self, NimbusError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NimbusError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: config.base_url.clone(),
            units: config.units.clone(),
            lang: config.lang.clone(),
        })
    }

    /// Builds a client only when a real credential is configured.
    pub fn from_config(config: &WeatherConfig) -> Result<Option<Self>, NimbusError> {
        config
            .credential()
            .map(|key| Self::new(key, config))
            .transpose()
    }
}

#[async_trait]
impl PluginAdapter for OpenWeatherClient {
    fn name(&self) -> &str {
        "openweathermap"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Weather
    }

    async fn health_check(&self) -> Result<HealthStatus, NimbusError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl WeatherAdapter for OpenWeatherClient {
    async fn fetch(&self, city: &str) -> Result<WeatherReading, NimbusError> {
        let url = reqwest::Url::parse_with_params(
            &self.base_url,
            &[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_str()),
                ("lang", self.lang.as_str()),
            ],
        )
        .map_err(|e| NimbusError::Config(format!("invalid weather base_url: {e}")))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NimbusError::Provider {
                message: format!("weather request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(city, status = %status, "weather response received");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NimbusError::provider(format!(
                "weather API returned {status} for `{city}`: {body}"
            )));
        }

        let body: CurrentWeather = response.json().await.map_err(|e| NimbusError::Provider {
            message: format!("malformed weather response: {e}"),
            source: Some(Box::new(e)),
        })?;
        body.into_reading()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> OpenWeatherClient {
        let config = WeatherConfig {
            api_key: Some("owm-key".into()),
            base_url: format!("{}/data/2.5/weather", server.uri()),
            ..WeatherConfig::default()
        };
        OpenWeatherClient::from_config(&config).unwrap().unwrap()
    }

    #[tokio::test]
    async fn maps_current_conditions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "上海"))
            .and(query_param("appid", "owm-key"))
            .and(query_param("units", "metric"))
            .and(query_param("lang", "zh_cn"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Shanghai",
                "main": {"temp": 23.6, "humidity": 78},
                "weather": [{"description": "小雨", "icon": "10d"}],
                "wind": {"speed": 3.4}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reading = client(&server).fetch("上海").await.unwrap();
        assert_eq!(reading.city, "Shanghai");
        assert_eq!(reading.temperature, 24);
        assert_eq!(reading.humidity, 78);
        assert_eq!(reading.wind_speed, 3);
        assert_eq!(reading.description, "小雨");
        assert_eq!(reading.icon, "10d");
    }

    #[tokio::test]
    async fn missing_wind_is_zero() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Lhasa",
                "main": {"temp": -2.4, "humidity": 20},
                "weather": [{"description": "晴", "icon": "01n"}]
            })))
            .mount(&server)
            .await;

        let reading = client(&server).fetch("拉萨").await.unwrap();
        assert_eq!(reading.wind_speed, 0);
        assert_eq!(reading.temperature, -2);
    }

    #[tokio::test]
    async fn not_found_is_a_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message":"city not found"}"#))
            .mount(&server)
            .await;

        let err = client(&server).fetch("Atlantis").await.unwrap_err();
        assert!(err.is_provider_condition());
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn empty_conditions_are_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "X", "main": {"temp": 1.0, "humidity": 1}, "weather": []
            })))
            .mount(&server)
            .await;

        assert!(client(&server).fetch("X").await.is_err());
    }

    #[test]
    fn placeholder_key_builds_no_client() {
        let config = WeatherConfig {
            api_key: Some("your_weather_api_key_here".into()),
            ..WeatherConfig::default()
        };
        assert!(OpenWeatherClient::from_config(&config).unwrap().is_none());
    }
}
