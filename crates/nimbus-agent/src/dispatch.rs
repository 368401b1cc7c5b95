// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent dispatch: turns a classified message into a [`Reply`].
//!
//! Each branch runs behind a panic boundary, so a fault in any collaborator
//! degrades to a plain-text reply instead of reaching the caller.

use std::collections::BTreeSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use nimbus_core::{Intent, MessageType, Reply};
use nimbus_memory::RetrievalEngine;
use nimbus_router::IntentClassifier;
use nimbus_weather::WeatherLookup;
use serde_json::json;
use tracing::{debug, error, info_span, Instrument};

use crate::responder::{Grounding, ResponseGenerator};

pub struct Dispatcher {
    classifier: IntentClassifier,
    retrieval: Arc<RetrievalEngine>,
    weather: WeatherLookup,
    responder: Arc<ResponseGenerator>,
}

impl Dispatcher {
    pub fn new(
        classifier: IntentClassifier,
        retrieval: Arc<RetrievalEngine>,
        weather: WeatherLookup,
        responder: Arc<ResponseGenerator>,
    ) -> Self {
        Self {
            classifier,
            retrieval,
            weather,
            responder,
        }
    }

    pub fn classify(&self, message: &str) -> Intent {
        self.classifier.classify(message)
    }

    /// Classifies and dispatches in one step.
    pub async fn handle(&self, message: &str, conversation_id: &str) -> Reply {
        let intent = self.classify(message);
        self.dispatch(intent, message, conversation_id).await
    }

    /// Routes to the handler for `intent`. Never fails.
    pub async fn dispatch(&self, intent: Intent, message: &str, conversation_id: &str) -> Reply {
        let span = info_span!("dispatch", conversation_id, intent = intent_name(&intent));
        async {
            match intent {
                Intent::Weather { city } => self.weather_branch(&city).await,
                Intent::Knowledge => self.knowledge_branch(message).await,
                Intent::General => self.general_branch(message).await,
            }
        }
        .instrument(span)
        .await
    }

    async fn weather_branch(&self, city: &str) -> Reply {
        match AssertUnwindSafe(self.weather_reply(city)).catch_unwind().await {
            Ok(reply) => reply,
            Err(_) => {
                error!(city, "weather handler panicked");
                Reply::text(format!("抱歉，无法获取{city}的天气信息。"))
            }
        }
    }

    /// The text names the requested city; the provider's own name for it
    /// only appears in the metadata.
    async fn weather_reply(&self, city: &str) -> Reply {
        let reading = self.weather.get(city).await;
        Reply {
            content: format!(
                "{city}当前天气：{}，温度{}°C，湿度{}%，风速{}m/s",
                reading.description,
                reading.temperature,
                reading.humidity,
                reading.wind_speed
            ),
            reply_type: MessageType::Weather,
            metadata: Some(json!({ "weather": reading })),
        }
    }

    async fn knowledge_branch(&self, message: &str) -> Reply {
        match AssertUnwindSafe(self.knowledge_reply(message)).catch_unwind().await {
            Ok(Some(reply)) => reply,
            Ok(None) => {
                debug!("no knowledge matched, answering as general");
                self.general_branch(message).await
            }
            Err(_) => {
                error!("knowledge handler panicked");
                Reply::text(self.responder.fallback(message, None))
            }
        }
    }

    /// `None` when retrieval finds nothing.
    async fn knowledge_reply(&self, message: &str) -> Option<Reply> {
        let items = self.retrieval.search_default(message).await;
        let grounding = Grounding::from_items(&items)?;
        let confidence = items.first().and_then(|item| item.similarity).unwrap_or(0.0);

        let mut seen = BTreeSet::new();
        let sources: Vec<&str> = items
            .iter()
            .filter_map(|item| item.source.as_deref())
            .filter(|source| !source.trim().is_empty() && seen.insert(*source))
            .collect();

        let content = self.responder.answer(message, Some(&grounding)).await;
        Some(Reply {
            content,
            reply_type: MessageType::Knowledge,
            metadata: Some(json!({ "sources": sources, "confidence": confidence })),
        })
    }

    async fn general_branch(&self, message: &str) -> Reply {
        match AssertUnwindSafe(self.responder.answer(message, None)).catch_unwind().await {
            Ok(content) => Reply::text(content),
            Err(_) => {
                error!("general handler panicked");
                Reply::text(self.responder.fallback(message, None))
            }
        }
    }
}

fn intent_name(intent: &Intent) -> &'static str {
    match intent {
        Intent::Weather { .. } => "weather",
        Intent::Knowledge => "knowledge",
        Intent::General => "general",
    }
}
