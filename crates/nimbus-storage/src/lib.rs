// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence for the Nimbus assistant.
//!
//! - [`Database`]: a tokio-rusqlite connection with refinery migrations
//! - [`SqliteStorage`]: the durable [`nimbus_core::StorageAdapter`]
//! - [`MemoryMirror`]: the in-process fallback
//! - [`ConversationStore`]: durable-first storage that degrades to the mirror

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod mirror;
pub mod store;

pub use adapter::SqliteStorage;
pub use database::{Database, map_tr_err};
pub use mirror::MemoryMirror;
pub use store::ConversationStore;
