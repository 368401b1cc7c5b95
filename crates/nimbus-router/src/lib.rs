// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent classification for the Nimbus assistant.
//!
//! [`IntentClassifier`] decides whether a message is a weather request (and
//! for which city), a knowledge question, or general conversation. Acting on
//! the intent is the dispatcher's job in `nimbus-agent`.

pub mod classifier;

pub use classifier::IntentClassifier;
