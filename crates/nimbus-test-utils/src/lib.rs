// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Nimbus integration tests.
//!
//! Provides mock and failing adapters plus a harness for fast,
//! deterministic tests without external services.
//!
//! # Components
//!
//! - [`MockCompletion`] - Mock language model with pre-configured responses
//! - [`failing`] - One always-failing adapter per capability
//! - [`TestHarness`] - A fully assembled [`nimbus_agent::ChatAgent`]

pub mod failing;
pub mod harness;
pub mod mock_completion;

pub use failing::{
    FailingCompletion, FailingEmbedder, FailingStorage, FailingVectorIndex, FailingWeather,
};
pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_completion::MockCompletion;
