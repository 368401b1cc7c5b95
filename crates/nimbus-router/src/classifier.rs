// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword-based intent classification.
//!
//! Pure and deterministic: no model pre-call, no network. Keyword sets come
//! from [`RoutingConfig`] so locale coverage is a configuration change.

use nimbus_config::RoutingConfig;
use nimbus_core::{Intent, NimbusError};
use regex::Regex;

/// Routes a message to WEATHER, KNOWLEDGE or GENERAL.
///
/// Weather keywords are checked strictly before knowledge keywords, so a
/// message matching both is a weather request.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    weather_keywords: Vec<String>,
    knowledge_keywords: Vec<String>,
    city_pattern: Regex,
    non_city_words: Vec<String>,
    default_city: String,
}

impl IntentClassifier {
    /// Builds a classifier, compiling the city pattern once.
    pub fn from_config(config: &RoutingConfig) -> Result<Self, NimbusError> {
        let city_pattern = city_pattern(config)?;
        Ok(Self {
            weather_keywords: normalized(&config.weather_keywords),
            knowledge_keywords: normalized(&config.knowledge_keywords),
            city_pattern,
            non_city_words: config
                .non_city_words
                .iter()
                .filter(|w| !w.is_empty())
                .cloned()
                .collect(),
            default_city: config.default_city.trim().to_string(),
        })
    }

    /// Classifies a message.
    pub fn classify(&self, message: &str) -> Intent {
        let lower = message.to_lowercase();

        if self.weather_keywords.iter().any(|k| lower.contains(k.as_str())) {
            let city = self.extract_city(message);
            tracing::debug!(city = %city, "classified as weather");
            return Intent::Weather { city };
        }

        if self.knowledge_keywords.iter().any(|k| lower.contains(k.as_str())) {
            tracing::debug!("classified as knowledge");
            return Intent::Knowledge;
        }

        Intent::General
    }

    /// The city named right before "天气"/"温度", or the default city.
    pub fn extract_city(&self, message: &str) -> String {
        self.city_pattern
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| self.strip_non_city_words(m.as_str()))
            .filter(|city| !city.is_empty())
            .unwrap_or_else(|| self.default_city.clone())
    }

    pub fn default_city(&self) -> &str {
        &self.default_city
    }

    // "上海今天" -> "上海", "今天" -> "".
    fn strip_non_city_words(&self, candidate: &str) -> String {
        let mut city = candidate;
        loop {
            let before = city.len();
            for word in &self.non_city_words {
                city = city.strip_prefix(word.as_str()).unwrap_or(city);
                city = city.strip_suffix(word.as_str()).unwrap_or(city);
            }
            if city.len() == before {
                return city.to_string();
            }
        }
    }
}

fn normalized(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// `(\p{Han}+?(?:市|县|区)?)(?:的)?(?:天气|温度)` for the default config.
///
/// The run is lazy so an administrative suffix stays attached to the city
/// rather than swallowing the anchor word.
fn city_pattern(config: &RoutingConfig) -> Result<Regex, NimbusError> {
    let alternation = |words: &[String]| {
        words
            .iter()
            .filter(|w| !w.is_empty())
            .map(|w| regex::escape(w))
            .collect::<Vec<_>>()
            .join("|")
    };

    let suffixes = alternation(&config.admin_suffixes);
    let suffix = if suffixes.is_empty() {
        String::new()
    } else {
        format!("(?:{suffixes})?")
    };
    let possessive = if config.possessive.is_empty() {
        String::new()
    } else {
        format!("(?:{})?", regex::escape(&config.possessive))
    };

    let pattern = format!(
        r"(\p{{{script}}}+?{suffix}){possessive}(?:{anchors})",
        script = config.city_script.trim(),
        anchors = alternation(&config.city_anchors),
    );

    Regex::new(&pattern)
        .map_err(|e| NimbusError::Config(format!("invalid city pattern `{pattern}`: {e}")))
}
