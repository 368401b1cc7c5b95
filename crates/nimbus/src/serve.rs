// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `nimbus serve` command implementation.

use std::sync::Arc;

use nimbus_config::NimbusConfig;
use nimbus_core::NimbusError;
use nimbus_gateway::GatewayState;
use tracing::info;

use crate::runtime::{build_agent, init_tracing};

/// Builds the agent and serves the HTTP gateway until shutdown.
pub async fn run_serve(config: NimbusConfig) -> Result<(), NimbusError> {
    init_tracing(&config.agent.log_level);
    info!(name = %config.agent.name, "starting nimbus serve");

    let agent = Arc::new(build_agent(&config).await?);
    let state = GatewayState { agent };

    tokio::select! {
        result = nimbus_gateway::start_server(&config.gateway, state) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            Ok(())
        }
    }
}
