// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.

use crate::diagnostic::ConfigError;
use crate::model::NimbusConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validates a deserialized configuration, collecting every failure.
pub fn validate_config(config: &NimbusConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::validation(format!(
            "agent.log_level `{}` must be one of {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    if config.storage.enabled && config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty when storage is enabled",
        ));
    }
    if config.storage.message_window == 0 {
        errors.push(ConfigError::validation(
            "storage.message_window must be at least 1",
        ));
    }
    if config.storage.conversation_limit == 0 {
        errors.push(ConfigError::validation(
            "storage.conversation_limit must be at least 1",
        ));
    }

    if !(0.0..=2.0).contains(&config.openai.temperature) {
        errors.push(ConfigError::validation(format!(
            "openai.temperature must be between 0.0 and 2.0, got {}",
            config.openai.temperature
        )));
    }
    if config.openai.max_tokens == 0 {
        errors.push(ConfigError::validation("openai.max_tokens must be at least 1"));
    }
    for (key, url) in [
        ("openai.base_url", &config.openai.base_url),
        ("weather.base_url", &config.weather.base_url),
        ("retrieval.embedding_base_url", &config.retrieval.embedding_base_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ConfigError::validation(format!(
                "{key} `{url}` must be an http(s) URL"
            )));
        }
    }

    if config.retrieval.search_limit == 0 {
        errors.push(ConfigError::validation(
            "retrieval.search_limit must be at least 1",
        ));
    }
    if config.retrieval.embedding_dimensions == 0 {
        errors.push(ConfigError::validation(
            "retrieval.embedding_dimensions must be at least 1",
        ));
    }

    let routing = &config.routing;
    if routing.default_city.trim().is_empty() {
        errors.push(ConfigError::validation(
            "routing.default_city must not be empty",
        ));
    }
    for (key, words) in [
        ("routing.weather_keywords", &routing.weather_keywords),
        ("routing.knowledge_keywords", &routing.knowledge_keywords),
        ("routing.city_anchors", &routing.city_anchors),
    ] {
        if words.iter().all(|w| w.trim().is_empty()) {
            errors.push(ConfigError::validation(format!(
                "{key} must contain at least one non-empty entry"
            )));
        }
    }
    if routing.city_script.trim().is_empty()
        || !routing.city_script.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        errors.push(ConfigError::validation(format!(
            "routing.city_script `{}` is not a Unicode script name",
            routing.city_script
        )));
    }

    if config.gateway.host.trim().is_empty() {
        errors.push(ConfigError::validation("gateway.host must not be empty"));
    } else {
        let host = config.gateway.host.trim();
        let is_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_ip && !is_hostname {
            errors.push(ConfigError::validation(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            )));
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
