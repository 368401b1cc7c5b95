// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Nimbus assistant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Credential values shipped in sample configs that mean "not configured".
const PLACEHOLDER_SUFFIX: &str = "_here";

/// Returns the credential only if it is set, non-blank, and not a
/// `your_..._here` placeholder.
pub fn effective_credential(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| {
        !v.is_empty() && !(v.starts_with("your_") && v.ends_with(PLACEHOLDER_SUFFIX))
    })
}

/// Top-level Nimbus configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NimbusConfig {
    /// Assistant identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Durable conversation storage.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Language-model provider (OpenAI-compatible chat completions).
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Weather provider.
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Knowledge retrieval (vector index + lexical fallback).
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Intent classification keyword sets.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Prompts and canned fallback replies.
    #[serde(default)]
    pub responder: ResponderConfig,

    /// HTTP gateway.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Assistant identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "nimbus".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Use the SQLite database. When false, everything lives in the in-process mirror.
    #[serde(default = "default_storage_enabled")]
    pub enabled: bool,

    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Most recent messages returned per conversation from the database.
    #[serde(default = "default_message_window")]
    pub message_window: usize,

    /// Most recently updated conversations returned from the database.
    #[serde(default = "default_conversation_limit")]
    pub conversation_limit: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: default_storage_enabled(),
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            message_window: default_message_window(),
            conversation_limit: default_conversation_limit(),
        }
    }
}

fn default_storage_enabled() -> bool {
    true
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("nimbus").join("nimbus.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("nimbus.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_message_window() -> usize {
    50
}

fn default_conversation_limit() -> usize {
    20
}

/// OpenAI-compatible chat completion configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key. `None` runs the assistant on canned fallback replies.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the API, without the `/chat/completions` suffix.
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// Chat model identifier.
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_openai_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature (0.0-2.0).
    #[serde(default = "default_openai_temperature")]
    pub temperature: f32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_openai_timeout_secs")]
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    /// The API key if one is really configured.
    pub fn credential(&self) -> Option<&str> {
        effective_credential(self.api_key.as_deref())
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            model: default_openai_model(),
            max_tokens: default_openai_max_tokens(),
            temperature: default_openai_temperature(),
            timeout_secs: default_openai_timeout_secs(),
        }
    }
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_openai_max_tokens() -> u32 {
    1000
}

fn default_openai_temperature() -> f32 {
    0.7
}

fn default_openai_timeout_secs() -> u64 {
    30
}

/// Weather provider configuration (OpenWeatherMap current-conditions API).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WeatherConfig {
    /// API key. `None` serves synthesized readings.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Current-conditions endpoint.
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    /// Unit system passed to the provider.
    #[serde(default = "default_weather_units")]
    pub units: String,

    /// Language for condition descriptions.
    #[serde(default = "default_weather_lang")]
    pub lang: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_weather_timeout_secs")]
    pub timeout_secs: u64,
}

impl WeatherConfig {
    /// The API key if one is really configured.
    pub fn credential(&self) -> Option<&str> {
        effective_credential(self.api_key.as_deref())
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            units: default_weather_units(),
            lang: default_weather_lang(),
            timeout_secs: default_weather_timeout_secs(),
        }
    }
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5/weather".to_string()
}

fn default_weather_units() -> String {
    "metric".to_string()
}

fn default_weather_lang() -> String {
    "zh_cn".to_string()
}

fn default_weather_timeout_secs() -> u64 {
    10
}

/// Knowledge retrieval configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Use the vector index when an embedding credential and storage are available.
    #[serde(default = "default_vector_enabled")]
    pub vector_enabled: bool,

    /// Default number of results per search.
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Pre-seed the lexical corpus with illustrative entries.
    #[serde(default = "default_seed_corpus")]
    pub seed_corpus: bool,

    /// Embedding API key. Falls back to `openai.api_key` when unset.
    #[serde(default)]
    pub embedding_api_key: Option<String>,

    /// Embedding API base URL, without the `/embeddings` suffix.
    #[serde(default = "default_openai_base_url")]
    pub embedding_base_url: String,

    /// Embedding model identifier.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Expected embedding length.
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            vector_enabled: default_vector_enabled(),
            search_limit: default_search_limit(),
            seed_corpus: default_seed_corpus(),
            embedding_api_key: None,
            embedding_base_url: default_openai_base_url(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: default_embedding_dimensions(),
        }
    }
}

fn default_vector_enabled() -> bool {
    true
}

fn default_search_limit() -> usize {
    5
}

fn default_seed_corpus() -> bool {
    true
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_dimensions() -> usize {
    1536
}

/// Intent classification configuration.
///
/// Keyword sets are data so locale coverage can grow without touching the
/// routing algorithm. Matching is case-insensitive substring matching.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Any of these routes a message to the weather handler.
    #[serde(default = "default_weather_keywords")]
    pub weather_keywords: Vec<String>,

    /// Any of these routes a message to knowledge retrieval.
    #[serde(default = "default_knowledge_keywords")]
    pub knowledge_keywords: Vec<String>,

    /// City used when none can be extracted from a weather message.
    #[serde(default = "default_city")]
    pub default_city: String,

    /// Unicode script whose characters form city names (regex `\p{..}` name).
    #[serde(default = "default_city_script")]
    pub city_script: String,

    /// Optional administrative suffixes kept as part of the city name.
    #[serde(default = "default_admin_suffixes")]
    pub admin_suffixes: Vec<String>,

    /// Words that must directly follow a city name ("weather", "temperature").
    #[serde(default = "default_city_anchors")]
    pub city_anchors: Vec<String>,

    /// Possessive particle allowed between the city and the anchor.
    #[serde(default = "default_possessive")]
    pub possessive: String,

    /// Words stripped from either end of an extracted city (e.g. "today").
    #[serde(default = "default_non_city_words")]
    pub non_city_words: Vec<String>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            weather_keywords: default_weather_keywords(),
            knowledge_keywords: default_knowledge_keywords(),
            default_city: default_city(),
            city_script: default_city_script(),
            admin_suffixes: default_admin_suffixes(),
            city_anchors: default_city_anchors(),
            possessive: default_possessive(),
            non_city_words: default_non_city_words(),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn default_weather_keywords() -> Vec<String> {
    strings(&[
        "天气",
        "温度",
        "下雨",
        "晴天",
        "阴天",
        "多云",
        "weather",
        "temperature",
        "rain",
        "sunny",
        "cloudy",
    ])
}

fn default_knowledge_keywords() -> Vec<String> {
    strings(&[
        "什么是",
        "介绍",
        "解释",
        "告诉我",
        "帮我了解",
        "what is",
        "explain",
        "tell me about",
        "introduce",
    ])
}

fn default_city() -> String {
    "北京".to_string()
}

fn default_city_script() -> String {
    "Han".to_string()
}

fn default_admin_suffixes() -> Vec<String> {
    strings(&["市", "县", "区"])
}

fn default_city_anchors() -> Vec<String> {
    strings(&["天气", "温度"])
}

fn default_possessive() -> String {
    "的".to_string()
}

fn default_non_city_words() -> Vec<String> {
    strings(&["今天", "明天", "后天", "昨天", "现在", "今日", "明日", "目前", "最近"])
}

/// Prompts for the language model and the canned replies used without one.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResponderConfig {
    /// System prompt for general conversation.
    #[serde(default = "default_general_system_prompt")]
    pub general_system_prompt: String,

    /// System prompt for answers grounded in retrieved knowledge.
    #[serde(default = "default_knowledge_system_prompt")]
    pub knowledge_system_prompt: String,

    /// Small-talk greetings answered with the canned greeting.
    #[serde(default = "default_greeting_keywords")]
    pub greeting_keywords: Vec<String>,

    /// Small-talk thanks answered with the canned acknowledgement.
    #[serde(default = "default_thanks_keywords")]
    pub thanks_keywords: Vec<String>,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            general_system_prompt: default_general_system_prompt(),
            knowledge_system_prompt: default_knowledge_system_prompt(),
            greeting_keywords: default_greeting_keywords(),
            thanks_keywords: default_thanks_keywords(),
        }
    }
}

fn default_general_system_prompt() -> String {
    "你是一个友好的AI助手，能够帮助用户解答问题。请用中文回答。".to_string()
}

fn default_knowledge_system_prompt() -> String {
    "你是一个专业的知识助手。请基于提供的上下文准确回答用户的问题。如果上下文中没有相关信息，请诚实地说明。请用中文回答。"
        .to_string()
}

fn default_greeting_keywords() -> Vec<String> {
    strings(&["你好", "hello", "hi", "嗨"])
}

fn default_thanks_keywords() -> Vec<String> {
    strings(&["谢谢", "thank", "感谢"])
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Allowed CORS origins. Empty allows any origin.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8787
}

fn default_cors_origins() -> Vec<String> {
    strings(&["http://localhost:3000"])
}
