// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Nimbus assistant.
//!
//! A thin axum layer over [`nimbus_agent::ChatAgent`]: every handler maps
//! one request to one agent operation and serializes plain data back.

pub mod handlers;
pub mod server;

pub use server::{GatewayState, build_router, start_server};
