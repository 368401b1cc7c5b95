// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Natural-language answers with a deterministic fallback.

use std::sync::Arc;

use nimbus_config::ResponderConfig;
use nimbus_core::{CompletionAdapter, HealthStatus, KnowledgeItem};
use tracing::{debug, warn};

const GREETING_REPLY: &str = "你好！我是你的AI助手，有什么可以帮助您的吗？虽然我现在使用的是模拟数据，但仍然可以回答一些基本问题。";
const THANKS_REPLY: &str = "不客气！如果您有其他问题，随时可以问我。";

/// Retrieved knowledge that constrains an answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Grounding {
    text: String,
    top_excerpt: String,
}

impl Grounding {
    /// Joins item contents with a blank line. `None` for no items.
    pub fn from_items(items: &[KnowledgeItem]) -> Option<Self> {
        let top = items.first()?;
        Some(Self {
            text: items
                .iter()
                .map(|item| item.content.as_str())
                .collect::<Vec<_>>()
                .join("\n\n"),
            top_excerpt: top.content.clone(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Content of the best-ranked item.
    pub fn top_excerpt(&self) -> &str {
        &self.top_excerpt
    }
}

/// Answers prompts with the language model when one is configured and
/// working, and with canned text otherwise. Never fails.
pub struct ResponseGenerator {
    model: Option<Arc<dyn CompletionAdapter>>,
    general_system_prompt: String,
    knowledge_system_prompt: String,
    greeting_keywords: Vec<String>,
    thanks_keywords: Vec<String>,
}

impl ResponseGenerator {
    pub fn new(model: Option<Arc<dyn CompletionAdapter>>, config: &ResponderConfig) -> Self {
        let lower = |words: &[String]| -> Vec<String> {
            words
                .iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect()
        };
        Self {
            model,
            general_system_prompt: config.general_system_prompt.clone(),
            knowledge_system_prompt: config.knowledge_system_prompt.clone(),
            greeting_keywords: lower(&config.greeting_keywords),
            thanks_keywords: lower(&config.thanks_keywords),
        }
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub async fn answer(&self, prompt: &str, grounding: Option<&Grounding>) -> String {
        let Some(model) = &self.model else {
            debug!("no language model configured, using canned reply");
            return self.fallback(prompt, grounding);
        };

        let (system, user) = match grounding {
            Some(g) => (
                self.knowledge_system_prompt.as_str(),
                format!("基于以下知识回答问题：\n\n{}\n\n问题：{prompt}", g.text()),
            ),
            None => (self.general_system_prompt.as_str(), prompt.to_string()),
        };

        match model.complete(system, &user).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!(model = model.name(), "language model returned empty text, using canned reply");
                self.fallback(prompt, grounding)
            }
            Err(e) => {
                warn!(model = model.name(), error = %e, "language model failed, using canned reply");
                self.fallback(prompt, grounding)
            }
        }
    }

    /// The deterministic reply used without a working model.
    pub fn fallback(&self, prompt: &str, grounding: Option<&Grounding>) -> String {
        if let Some(g) = grounding {
            return format!(
                "根据我的知识库，关于\"{prompt}\"：\n\n{}\n\n这是基于模拟数据的回答。配置OpenAI API Key后可以获得更智能的回答。",
                g.top_excerpt()
            );
        }

        let lower = prompt.to_lowercase();
        if self.greeting_keywords.iter().any(|k| lower.contains(k.as_str())) {
            return GREETING_REPLY.to_string();
        }
        if self.thanks_keywords.iter().any(|k| lower.contains(k.as_str())) {
            return THANKS_REPLY.to_string();
        }
        format!(
            "我收到了您的消息：\"{prompt}\"。目前我使用的是模拟回复，如果您配置了OpenAI API Key，我就能提供真正的AI对话了！"
        )
    }

    pub async fn health(&self) -> HealthStatus {
        match &self.model {
            Some(model) => model
                .health_check()
                .await
                .unwrap_or_else(|e| HealthStatus::Unhealthy(e.to_string())),
            None => HealthStatus::Degraded("canned replies only".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;
    use nimbus_core::{AdapterType, NimbusError, PluginAdapter};
    use tokio::sync::Mutex;

    use super::*;

    /// Records prompts and replies with a fixed result.
    struct Recording {
        reply: Result<String, String>,
        seen: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl PluginAdapter for Recording {
        fn name(&self) -> &str {
            "recording"
        }
        fn adapter_type(&self) -> AdapterType {
            AdapterType::Completion
        }
        async fn health_check(&self) -> Result<HealthStatus, NimbusError> {
            Ok(HealthStatus::Healthy)
        }
    }

    #[async_trait]
    impl CompletionAdapter for Recording {
        async fn complete(&self, system: &str, user: &str) -> Result<String, NimbusError> {
            self.seen.lock().await.push((system.into(), user.into()));
            self.reply.clone().map_err(NimbusError::provider)
        }
    }

    fn recording(reply: Result<&str, &str>) -> Arc<Recording> {
        Arc::new(Recording {
            reply: reply.map(String::from).map_err(String::from),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn item(content: &str) -> KnowledgeItem {
        KnowledgeItem {
            id: content.into(),
            title: "t".into(),
            content: content.into(),
            source: None,
            tags: Default::default(),
            created_at: Utc::now(),
            similarity: Some(0.5),
        }
    }

    fn offline() -> ResponseGenerator {
        ResponseGenerator::new(None, &ResponderConfig::default())
    }

    #[tokio::test]
    async fn canned_greeting_and_thanks() {
        let r = offline();
        assert_eq!(r.answer("Hello there", None).await, GREETING_REPLY);
        assert_eq!(r.answer("非常感谢", None).await, THANKS_REPLY);
    }

    #[tokio::test]
    async fn echo_names_the_prompt() {
        let reply = offline().answer("讲个故事", None).await;
        assert!(reply.contains("\"讲个故事\""));
        assert!(reply.contains("OpenAI API Key"));
    }

    #[tokio::test]
    async fn grounded_fallback_quotes_top_excerpt() {
        let grounding = Grounding::from_items(&[item("first excerpt"), item("second")]).unwrap();
        assert_eq!(grounding.text(), "first excerpt\n\nsecond");
        let reply = offline().answer("你好，什么是AI", Some(&grounding)).await;
        assert!(reply.contains("first excerpt"));
        assert!(!reply.contains("second"));
        assert!(reply.starts_with("根据我的知识库"));
    }

    #[test]
    fn no_items_means_no_grounding() {
        assert!(Grounding::from_items(&[]).is_none());
    }

    #[tokio::test]
    async fn model_receives_knowledge_prompt() {
        let model = recording(Ok("AI 是..."));
        let r = ResponseGenerator::new(Some(model.clone()), &ResponderConfig::default());
        let grounding = Grounding::from_items(&[item("ctx")]).unwrap();

        assert_eq!(r.answer("什么是AI", Some(&grounding)).await, "AI 是...");
        let seen = model.seen.lock().await;
        assert!(seen[0].0.contains("知识助手"));
        assert_eq!(seen[0].1, "基于以下知识回答问题：\n\nctx\n\n问题：什么是AI");
    }

    #[tokio::test]
    async fn model_failure_or_blank_output_falls_back() {
        let failing = ResponseGenerator::new(Some(recording(Err("timeout"))), &ResponderConfig::default());
        assert_eq!(failing.answer("hi", None).await, GREETING_REPLY);

        let blank = ResponseGenerator::new(Some(recording(Ok("  "))), &ResponderConfig::default());
        assert_eq!(blank.answer("谢谢", None).await, THANKS_REPLY);
    }
}
