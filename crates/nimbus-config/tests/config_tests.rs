// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Nimbus configuration system.

use nimbus_config::diagnostic::ConfigError;
use nimbus_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[agent]
name = "desk-bot"
log_level = "debug"

[storage]
enabled = true
database_path = "/tmp/nimbus-test.db"
wal_mode = false
message_window = 30
conversation_limit = 10

[openai]
api_key = "sk-live"
model = "gpt-4o-mini"
temperature = 0.2

[weather]
api_key = "your_weather_api_key_here"

[retrieval]
vector_enabled = false
search_limit = 3

[routing]
default_city = "上海"
weather_keywords = ["天气", "forecast"]

[gateway]
host = "0.0.0.0"
port = 3001
cors_origins = []
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "desk-bot");
    assert_eq!(config.storage.database_path, "/tmp/nimbus-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.storage.message_window, 30);
    assert_eq!(config.openai.credential(), Some("sk-live"));
    assert_eq!(config.openai.model, "gpt-4o-mini");
    assert!(config.weather.credential().is_none(), "placeholder key is absent");
    assert!(!config.retrieval.vector_enabled);
    assert_eq!(config.retrieval.search_limit, 3);
    assert_eq!(config.routing.default_city, "上海");
    assert_eq!(config.routing.weather_keywords, vec!["天气", "forecast"]);
    // Untouched keys in a partially specified section keep their defaults.
    assert!(!config.routing.knowledge_keywords.is_empty());
    assert_eq!(config.gateway.port, 3001);
    assert!(config.gateway.cors_origins.is_empty());
}

#[test]
fn empty_document_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults are valid");
    assert_eq!(config.storage.message_window, 50);
    assert_eq!(config.storage.conversation_limit, 20);
    assert_eq!(config.openai.max_tokens, 1000);
    assert_eq!(config.weather.lang, "zh_cn");
}

#[test]
fn unknown_key_suggests_correction() {
    let toml = "[routing]\ndefault_ctiy = \"上海\"\n";
    let errors = load_and_validate_str(toml).unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key,
            suggestion,
            valid_keys,
            ..
        } => {
            assert_eq!(key, "default_ctiy");
            assert_eq!(suggestion.as_deref(), Some("default_city"));
            assert!(valid_keys.contains("weather_keywords"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[telegram]\nbot_token = \"x\"\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::UnknownKey { ref key, .. } if key == "telegram"));
}

#[test]
fn wrong_type_is_reported_with_its_path() {
    let errors = load_and_validate_str("[gateway]\nport = \"eighty\"\n").unwrap_err();
    match &errors[0] {
        ConfigError::InvalidType { key, .. } => assert_eq!(key, "gateway.port"),
        other => panic!("expected InvalidType, got {other:?}"),
    }
}

#[test]
fn semantic_validation_runs_after_parsing() {
    let errors = load_and_validate_str("[retrieval]\nsearch_limit = 0\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
    assert!(errors[0].to_string().contains("retrieval.search_limit"));
}

#[test]
fn errors_render_through_miette() {
    let errors = load_and_validate_str("[agent]\nnaem = \"x\"\n").unwrap_err();
    let handler = miette::GraphicalReportHandler::new_themed(miette::GraphicalTheme::unicode_nocolor());
    let mut out = String::new();
    handler
        .render_report(&mut out, &errors[0] as &dyn miette::Diagnostic)
        .unwrap();
    assert!(out.contains("nimbus::config::unknown_key"));
    assert!(out.contains("did you mean `name`?"));
}

#[test]
fn explicit_path_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "[gateway]\nport = 4100\n").unwrap();
    let config = load_and_validate_path(&path).unwrap();
    assert_eq!(config.gateway.port, 4100);
}
