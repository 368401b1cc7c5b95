// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The chat pipeline: persist the user turn, dispatch, persist the reply.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{Local, Utc};
use nimbus_config::NimbusConfig;
use nimbus_core::{
    CompletionAdapter, Conversation, HealthStatus, Intent, KnowledgeItem, Message, MessageRole,
    MessageType, NimbusError, StorageAdapter, WeatherAdapter, WeatherReading,
};
use nimbus_memory::{KnowledgeStore, LexicalCorpus, RetrievalEngine};
use nimbus_router::IntentClassifier;
use nimbus_storage::ConversationStore;
use nimbus_weather::WeatherLookup;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::dispatch::Dispatcher;
use crate::responder::ResponseGenerator;

/// Maximum characters of the first message used as a conversation title.
const TITLE_CHARS: usize = 30;

/// Both sides of one turn.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exchange {
    pub user_message: Message,
    pub bot_message: Message,
}

/// External capabilities handed to [`ChatAgent::assemble`]. `None` selects
/// the fallback for that capability.
#[derive(Default)]
pub struct Collaborators {
    pub storage: Option<Arc<dyn StorageAdapter>>,
    pub knowledge: Option<Arc<dyn KnowledgeStore>>,
    pub weather: Option<Arc<dyn WeatherAdapter>>,
    pub completion: Option<Arc<dyn CompletionAdapter>>,
}

/// Owns every component and exposes the operations callers use.
pub struct ChatAgent {
    dispatcher: Dispatcher,
    conversations: ConversationStore,
    retrieval: Arc<RetrievalEngine>,
    weather: WeatherLookup,
    responder: Arc<ResponseGenerator>,
}

impl ChatAgent {
    pub fn new(
        dispatcher: Dispatcher,
        conversations: ConversationStore,
        retrieval: Arc<RetrievalEngine>,
        weather: WeatherLookup,
        responder: Arc<ResponseGenerator>,
    ) -> Self {
        Self {
            dispatcher,
            conversations,
            retrieval,
            weather,
            responder,
        }
    }

    /// Wires the components from configuration and the given capabilities.
    pub fn assemble(config: &NimbusConfig, collaborators: Collaborators) -> Result<Self, NimbusError> {
        let corpus = if config.retrieval.seed_corpus {
            LexicalCorpus::seeded()
        } else {
            LexicalCorpus::empty()
        };
        let retrieval = Arc::new(RetrievalEngine::new(
            collaborators.knowledge,
            corpus,
            config.retrieval.search_limit,
        ));
        let weather = WeatherLookup::new(collaborators.weather);
        let responder = Arc::new(ResponseGenerator::new(
            collaborators.completion,
            &config.responder,
        ));
        let dispatcher = Dispatcher::new(
            IntentClassifier::from_config(&config.routing)?,
            retrieval.clone(),
            weather.clone(),
            responder.clone(),
        );
        let conversations = ConversationStore::new(collaborators.storage, &config.storage);

        info!(
            retrieval = %retrieval.mode(),
            durable_storage = conversations.is_durable(),
            weather_provider = weather.has_provider(),
            language_model = responder.has_model(),
            "chat agent assembled"
        );
        Ok(Self::new(dispatcher, conversations, retrieval, weather, responder))
    }

    pub fn classify(&self, message: &str) -> Intent {
        self.dispatcher.classify(message)
    }

    /// Runs one turn.
    ///
    /// Without a `conversation_id` (a blank one counts as none), or with one
    /// that does not exist yet, a conversation is created and titled after
    /// the message.
    pub async fn send_message(&self, conversation_id: Option<&str>, content: &str) -> Exchange {
        let conversation_id = conversation_id.filter(|id| !id.trim().is_empty());
        let existing = match conversation_id {
            Some(id) => self.conversations.get_conversation(id).await,
            None => None,
        };
        let conversation_id = match existing {
            Some(conversation) => conversation.id,
            None => {
                let id = conversation_id
                    .map(str::to_string)
                    .unwrap_or_else(|| Uuid::new_v4().to_string());
                let conversation = Conversation::new(id, title_from(content), Utc::now());
                self.conversations.save_conversation(&conversation).await;
                info!(conversation_id = %conversation.id, "conversation started");
                conversation.id
            }
        };

        let user_message = Message {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.clone(),
            content: content.to_string(),
            message_type: MessageType::Text,
            role: MessageRole::User,
            timestamp: Utc::now(),
            metadata: None,
        };
        self.conversations.save_message(&user_message).await;

        let reply = self.dispatcher.handle(content, &conversation_id).await;

        let bot_message = Message {
            id: Uuid::new_v4().to_string(),
            conversation_id,
            content: reply.content,
            message_type: reply.reply_type,
            role: MessageRole::Assistant,
            timestamp: Utc::now(),
            metadata: reply.metadata,
        };
        self.conversations.save_message(&bot_message).await;
        debug!(
            conversation_id = %bot_message.conversation_id,
            reply_type = %bot_message.message_type,
            "turn complete"
        );

        Exchange {
            user_message,
            bot_message,
        }
    }

    /// Creates an empty conversation, titled by timestamp when no title is given.
    pub async fn create_conversation(&self, title: Option<&str>) -> Conversation {
        let title = match title.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => format!("对话 {}", Local::now().format("%Y/%-m/%-d %H:%M:%S")),
        };
        let conversation = Conversation::new(Uuid::new_v4().to_string(), title, Utc::now());
        self.conversations.save_conversation(&conversation).await;
        conversation
    }

    /// Most recently updated first.
    pub async fn conversations(&self) -> Vec<Conversation> {
        self.conversations.get_conversations().await
    }

    pub async fn conversation(&self, id: &str) -> Option<Conversation> {
        self.conversations.get_conversation(id).await
    }

    /// Oldest first.
    pub async fn messages(&self, conversation_id: &str) -> Vec<Message> {
        self.conversations.get_messages(conversation_id).await
    }

    pub async fn delete_conversation(&self, id: &str) -> bool {
        let deleted = self.conversations.delete_conversation(id).await;
        if deleted {
            info!(conversation_id = %id, "conversation deleted");
        }
        deleted
    }

    pub async fn add_knowledge(
        &self,
        title: &str,
        content: &str,
        source: Option<&str>,
        tags: impl IntoIterator<Item = String>,
    ) -> KnowledgeItem {
        let item = KnowledgeItem {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            content: content.to_string(),
            source: source.map(str::to_string).filter(|s| !s.trim().is_empty()),
            tags: tags.into_iter().collect::<BTreeSet<_>>(),
            created_at: Utc::now(),
            similarity: None,
        };
        self.retrieval.ingest(item.clone()).await;
        info!(id = %item.id, "knowledge added");
        item
    }

    /// `limit` defaults to the configured search limit.
    pub async fn search_knowledge(&self, query: &str, limit: Option<usize>) -> Vec<KnowledgeItem> {
        match limit {
            Some(limit) => self.retrieval.search(query, limit).await,
            None => self.retrieval.search_default(query).await,
        }
    }

    pub async fn weather(&self, city: &str) -> WeatherReading {
        self.weather.get(city).await
    }

    /// Health of every collaborator, keyed by component name.
    pub async fn health(&self) -> BTreeMap<&'static str, HealthStatus> {
        let retrieval = match self.retrieval.mode() {
            nimbus_memory::RetrievalMode::Vector => HealthStatus::Healthy,
            nimbus_memory::RetrievalMode::Lexical => {
                HealthStatus::Degraded("lexical retrieval only".into())
            }
        };
        BTreeMap::from([
            ("storage", self.conversations.health().await),
            ("retrieval", retrieval),
            ("weather", self.weather.health().await),
            ("completion", self.responder.health().await),
        ])
    }
}

fn title_from(content: &str) -> String {
    let title: String = content.trim().chars().take(TITLE_CHARS).collect();
    if title.is_empty() {
        "新对话".to_string()
    } else {
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> ChatAgent {
        let config = NimbusConfig::default();
        ChatAgent::assemble(&config, Collaborators::default()).unwrap()
    }

    #[tokio::test]
    async fn first_turn_creates_titled_conversation() {
        let agent = agent();
        let long = "帮我了解一下机器学习和深度学习之间到底有什么区别以及它们各自适合解决哪些类型的问题";
        let exchange = agent.send_message(None, long).await;

        let conversation = agent
            .conversation(&exchange.user_message.conversation_id)
            .await
            .unwrap();
        assert_eq!(conversation.title.chars().count(), TITLE_CHARS);
        assert_eq!(conversation.message_count, 2);
        assert_eq!(exchange.bot_message.role, MessageRole::Assistant);
        assert_eq!(exchange.bot_message.conversation_id, conversation.id);
    }

    #[tokio::test]
    async fn unknown_id_is_adopted() {
        let agent = agent();
        let exchange = agent.send_message(Some("client-chosen"), "你好").await;
        assert_eq!(exchange.user_message.conversation_id, "client-chosen");
        assert!(agent.conversation("client-chosen").await.is_some());
    }

    #[tokio::test]
    async fn blank_id_counts_as_none() {
        let agent = agent();
        let exchange = agent.send_message(Some("  "), "你好").await;
        let id = exchange.user_message.conversation_id;
        assert!(!id.trim().is_empty());
        assert!(agent.conversation("  ").await.is_none());
        assert_eq!(agent.conversation(&id).await.unwrap().title, "你好");
    }

    #[tokio::test]
    async fn turns_append_in_order() {
        let agent = agent();
        let conversation = agent.create_conversation(None).await;
        assert!(conversation.title.starts_with("对话 "));
        assert_eq!(conversation.message_count, 0);

        agent.send_message(Some(&conversation.id), "你好").await;
        agent.send_message(Some(&conversation.id), "上海天气").await;

        let messages = agent.messages(&conversation.id).await;
        let roles: Vec<_> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            [MessageRole::User, MessageRole::Assistant, MessageRole::User, MessageRole::Assistant]
        );
        assert_eq!(messages[3].message_type, MessageType::Weather);
        assert_eq!(agent.conversations().await.len(), 1);
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let agent = agent();
        let conversation = agent.create_conversation(Some("临时")).await;
        agent.send_message(Some(&conversation.id), "hello").await;

        assert!(agent.delete_conversation(&conversation.id).await);
        assert!(!agent.delete_conversation(&conversation.id).await);
        assert!(agent.messages(&conversation.id).await.is_empty());
    }

    #[tokio::test]
    async fn added_knowledge_is_searchable() {
        let agent = agent();
        let item = agent
            .add_knowledge("Tokio", "An async runtime for Rust", Some("docs"), ["rust".to_string()])
            .await;
        assert!(item.similarity.is_none());

        let hits = agent.search_knowledge("tokio", None).await;
        assert_eq!(hits[0].id, item.id);
        assert!(hits[0].similarity.unwrap() > 0.0);
    }

    #[test]
    fn bad_routing_config_is_rejected() {
        let mut config = NimbusConfig::default();
        config.routing.city_script = "NotAScript".into();
        assert!(ChatAgent::assemble(&config, Collaborators::default()).is_err());
    }

    #[tokio::test]
    async fn offline_health_is_degraded() {
        let health = agent().health().await;
        assert_eq!(health.len(), 4);
        assert!(health.values().all(|s| matches!(s, HealthStatus::Degraded(_))));
    }
}
