// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use nimbus_core::{Conversation, HealthStatus, KnowledgeItem, Message, WeatherReading};
use serde::{Deserialize, Serialize};

use crate::server::GatewayState;

/// Request body for POST /v1/messages.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    pub content: String,
    /// Continue this conversation; a new one is started when absent or unknown.
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// Request body for POST /v1/conversations.
#[derive(Debug, Default, Deserialize)]
pub struct CreateConversationRequest {
    #[serde(default)]
    pub title: Option<String>,
}

/// Request body for POST /v1/knowledge.
#[derive(Debug, Deserialize)]
pub struct KnowledgeRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Query string for GET /v1/knowledge/search.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub components: BTreeMap<&'static str, HealthStatus>,
}

#[derive(Debug, Serialize)]
pub struct WeatherResponse {
    pub data: WeatherReading,
}

#[derive(Debug, Serialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<Conversation>,
}

#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<KnowledgeItem>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// GET /health
///
/// Always "ok": degraded components still serve through their fallbacks.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
        components: state.agent.health().await,
    })
}

/// GET /api/weather/{city}
pub async fn get_weather(
    State(state): State<GatewayState>,
    Path(city): Path<String>,
) -> Response {
    let city = city.trim();
    if city.is_empty() {
        return bad_request("city must not be empty");
    }
    Json(WeatherResponse {
        data: state.agent.weather(city).await,
    })
    .into_response()
}

/// POST /v1/messages
///
/// Runs one turn and returns both the stored user message and the reply.
pub async fn post_messages(
    State(state): State<GatewayState>,
    Json(body): Json<MessageRequest>,
) -> Response {
    if body.content.trim().is_empty() {
        return bad_request("content must not be empty");
    }
    let conversation_id = body
        .conversation_id
        .as_deref()
        .filter(|id| !id.trim().is_empty());
    let exchange = state.agent.send_message(conversation_id, &body.content).await;
    Json(exchange).into_response()
}

/// GET /v1/conversations
pub async fn get_conversations(State(state): State<GatewayState>) -> Json<ConversationListResponse> {
    Json(ConversationListResponse {
        conversations: state.agent.conversations().await,
    })
}

/// POST /v1/conversations
pub async fn post_conversations(
    State(state): State<GatewayState>,
    body: Option<Json<CreateConversationRequest>>,
) -> (StatusCode, Json<Conversation>) {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let conversation = state.agent.create_conversation(request.title.as_deref()).await;
    (StatusCode::CREATED, Json(conversation))
}

/// DELETE /v1/conversations/{id}
pub async fn delete_conversation(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Json<DeleteResponse> {
    Json(DeleteResponse {
        deleted: state.agent.delete_conversation(&id).await,
    })
}

/// GET /v1/conversations/{id}/messages
pub async fn get_messages(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Json<MessageListResponse> {
    Json(MessageListResponse {
        messages: state.agent.messages(&id).await,
    })
}

/// GET /v1/knowledge/search?q=
pub async fn search_knowledge(
    State(state): State<GatewayState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    Json(SearchResponse {
        results: state.agent.search_knowledge(&params.q, params.limit).await,
    })
}

/// POST /v1/knowledge
pub async fn post_knowledge(
    State(state): State<GatewayState>,
    Json(body): Json<KnowledgeRequest>,
) -> Response {
    if body.title.trim().is_empty() || body.content.trim().is_empty() {
        return bad_request("title and content must not be empty");
    }
    let item = state
        .agent
        .add_knowledge(&body.title, &body.content, body.source.as_deref(), body.tags)
        .await;
    (StatusCode::CREATED, Json(item)).into_response()
}
