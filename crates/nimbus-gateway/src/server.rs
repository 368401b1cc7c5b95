// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{delete, get, post},
};
use nimbus_agent::ChatAgent;
use nimbus_config::GatewayConfig;
use nimbus_core::NimbusError;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub agent: Arc<ChatAgent>,
}

/// Builds the application router.
///
/// Routes:
/// - GET /health
/// - GET /api/weather/{city}
/// - POST /v1/messages
/// - GET|POST /v1/conversations
/// - DELETE /v1/conversations/{id}
/// - GET /v1/conversations/{id}/messages
/// - GET /v1/knowledge/search?q=
/// - POST /v1/knowledge
pub fn build_router(state: GatewayState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/api/weather/{city}", get(handlers::get_weather))
        .route("/v1/messages", post(handlers::post_messages))
        .route(
            "/v1/conversations",
            get(handlers::get_conversations).post(handlers::post_conversations),
        )
        .route("/v1/conversations/{id}", delete(handlers::delete_conversation))
        .route("/v1/conversations/{id}/messages", get(handlers::get_messages))
        .route("/v1/knowledge/search", get(handlers::search_knowledge))
        .route("/v1/knowledge", post(handlers::post_knowledge))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Permissive when no origins are configured, otherwise restricted to them.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

/// Binds to the configured host:port and serves until the process exits.
pub async fn start_server(config: &GatewayConfig, state: GatewayState) -> Result<(), NimbusError> {
    let app = build_router(state, &config.cors_origins);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| NimbusError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| NimbusError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
