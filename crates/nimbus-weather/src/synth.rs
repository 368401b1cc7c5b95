// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic weather readings derived from the city name.
//!
//! Used whenever no real provider answers. The same city always yields the
//! same reading.

use nimbus_core::WeatherReading;

/// (description, icon), in selection order.
const CONDITIONS: &[(&str, &str)] = &[
    ("晴天", "01d"),
    ("多云", "02d"),
    ("小雨", "10d"),
    ("阴天", "04d"),
    ("雾霾", "50d"),
];

/// Synthesizes a reading for `city`.
///
/// Temperature lands in `[0, 40]`, humidity in `[50, 89]`, wind in `[1, 8]`.
pub fn synthesize(city: &str) -> WeatherReading {
    let hash = i64::from(city_hash(city));
    let magnitude = hash.abs();

    let (description, icon) = CONDITIONS[(magnitude % CONDITIONS.len() as i64) as usize];
    let temperature = (15 + magnitude % 20 + (hash % 10 - 5)).clamp(0, 40);

    WeatherReading {
        city: city.to_string(),
        temperature: temperature as i32,
        description: description.to_string(),
        humidity: (50 + magnitude % 40) as u32,
        wind_speed: (1 + magnitude % 8) as u32,
        icon: icon.to_string(),
    }
}

/// 32-bit polynomial string hash (`h = 31 * h + unit`) over UTF-16 code units.
pub fn city_hash(city: &str) -> i32 {
    city.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}
