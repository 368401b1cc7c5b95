// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `./nimbus.toml` > `~/.config/nimbus/nimbus.toml` >
//! `/etc/nimbus/nimbus.toml`, with `NIMBUS_` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::NimbusConfig;

/// Config sections addressable through `NIMBUS_<SECTION>_<KEY>`.
const SECTIONS: &[&str] = &[
    "agent",
    "storage",
    "openai",
    "weather",
    "retrieval",
    "routing",
    "responder",
    "gateway",
];

pub(crate) const SYSTEM_CONFIG: &str = "/etc/nimbus/nimbus.toml";
pub(crate) const LOCAL_CONFIG: &str = "nimbus.toml";

pub(crate) fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("nimbus").join("nimbus.toml"))
        .unwrap_or_default()
}

/// Figment stack for the standard hierarchy, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(NimbusConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Loads configuration from the standard hierarchy plus environment.
pub fn load_config() -> Result<NimbusConfig, figment::Error> {
    build_figment().extract()
}

/// Loads configuration from a TOML string over the defaults. No files, no env.
pub fn load_config_from_str(toml_content: &str) -> Result<NimbusConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NimbusConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Loads configuration from an explicit file with environment overrides.
pub fn load_config_from_path(path: &Path) -> Result<NimbusConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NimbusConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// `NIMBUS_OPENAI_API_KEY` maps to `openai.api_key`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// keys that contain underscores survive intact.
fn env_provider() -> Env {
    Env::prefixed("NIMBUS_").map(|key| {
        let key = key.as_str();
        SECTIONS
            .iter()
            .find_map(|section| {
                key.strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or_else(|| key.to_string())
            .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_map_into_sections() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("NIMBUS_OPENAI_API_KEY", "sk-test");
            jail.set_env("NIMBUS_ROUTING_DEFAULT_CITY", "上海");
            jail.set_env("NIMBUS_GATEWAY_PORT", "9000");
            let config: NimbusConfig = Figment::new()
                .merge(Serialized::defaults(NimbusConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
            assert_eq!(config.routing.default_city, "上海");
            assert_eq!(config.gateway.port, 9000);
            Ok(())
        });
    }

    #[test]
    fn local_file_is_picked_up() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                LOCAL_CONFIG,
                "[storage]\nenabled = false\nmessage_window = 10\n",
            )?;
            let config = load_config()?;
            assert!(!config.storage.enabled);
            assert_eq!(config.storage.message_window, 10);
            Ok(())
        });
    }
}
