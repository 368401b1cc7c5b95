// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request handling for the Nimbus assistant.
//!
//! [`ChatAgent`] runs the per-message pipeline: persist the user turn,
//! classify it, dispatch to weather, knowledge, or general handling, and
//! persist the reply. Every collaborator it calls degrades to a fallback, so
//! a turn always produces a reply.

pub mod agent;
pub mod dispatch;
pub mod responder;

pub use agent::{ChatAgent, Collaborators, Exchange};
pub use dispatch::Dispatcher;
pub use responder::{Grounding, ResponseGenerator};
