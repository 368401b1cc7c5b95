// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Weather for the Nimbus assistant.
//!
//! [`WeatherLookup`] never fails: it asks an [`OpenWeatherClient`] when a
//! credential is configured and otherwise synthesizes a stable reading from
//! the city name.

pub mod client;
pub mod lookup;
pub mod synth;

pub use client::OpenWeatherClient;
pub use lookup::WeatherLookup;
pub use synth::synthesize;
