// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds a [`ChatAgent`] from configuration.
//!
//! Each optional capability is constructed only when its configuration
//! allows it. Anything that cannot be brought up is logged and left to its
//! fallback, so startup succeeds with nothing but defaults.

use std::sync::Arc;
use std::time::Duration;

use nimbus_agent::{ChatAgent, Collaborators};
use nimbus_config::{NimbusConfig, effective_credential};
use nimbus_core::{NimbusError, StorageAdapter, WeatherAdapter};
use nimbus_memory::{HttpEmbedder, KnowledgeStore, SqliteVectorIndex, VectorKnowledge};
use nimbus_openai::OpenAiProvider;
use nimbus_storage::{Database, SqliteStorage};
use nimbus_weather::OpenWeatherClient;
use tracing::{info, warn};

/// Initializes the tracing subscriber with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("nimbus={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

pub async fn build_agent(config: &NimbusConfig) -> Result<ChatAgent, NimbusError> {
    let database = open_database(config).await;

    let mut collaborators = Collaborators {
        storage: database
            .clone()
            .map(|db| Arc::new(SqliteStorage::new(db)) as Arc<dyn StorageAdapter>),
        ..Collaborators::default()
    };

    if let Some(db) = database {
        collaborators.knowledge = vector_store(config, db)?;
    }

    collaborators.weather = OpenWeatherClient::from_config(&config.weather)?
        .map(|client| Arc::new(client) as Arc<dyn WeatherAdapter>);
    if collaborators.weather.is_none() {
        info!("no weather API key configured, readings will be synthesized");
    }

    if let Some(provider) = OpenAiProvider::from_config(&config.openai)? {
        info!(model = provider.model(), "language model configured");
        collaborators.completion = Some(Arc::new(provider));
    } else {
        info!("no OpenAI API key configured, using canned replies");
    }

    ChatAgent::assemble(config, collaborators)
}

/// `None` when storage is disabled or the database cannot be opened.
async fn open_database(config: &NimbusConfig) -> Option<Database> {
    if !config.storage.enabled {
        info!("durable storage disabled, conversations stay in memory");
        return None;
    }
    match Database::open(&config.storage.database_path, config.storage.wal_mode).await {
        Ok(db) => {
            info!(path = %config.storage.database_path, "database opened");
            Some(db)
        }
        Err(e) => {
            warn!(
                path = %config.storage.database_path,
                error = %e,
                "failed to open database, conversations stay in memory"
            );
            None
        }
    }
}

/// The embedding credential falls back to the OpenAI key.
fn vector_store(
    config: &NimbusConfig,
    db: Database,
) -> Result<Option<Arc<dyn KnowledgeStore>>, NimbusError> {
    let retrieval = &config.retrieval;
    if !retrieval.vector_enabled {
        return Ok(None);
    }
    let Some(api_key) = effective_credential(retrieval.embedding_api_key.as_deref())
        .or_else(|| config.openai.credential())
    else {
        info!("no embedding API key configured, using lexical retrieval");
        return Ok(None);
    };

    let embedder = HttpEmbedder::new(
        api_key,
        &retrieval.embedding_base_url,
        retrieval.embedding_model.clone(),
        retrieval.embedding_dimensions,
        Duration::from_secs(config.openai.timeout_secs),
    )?;
    let index = SqliteVectorIndex::new(db);
    Ok(Some(Arc::new(VectorKnowledge::new(
        Arc::new(embedder),
        Arc::new(index),
    ))))
}

#[cfg(test)]
mod tests {
    use nimbus_memory::RetrievalMode;

    use super::*;

    fn config_in(dir: &tempfile::TempDir) -> NimbusConfig {
        let mut config = NimbusConfig::default();
        config.storage.database_path = dir.path().join("nimbus.db").to_string_lossy().into_owned();
        config
    }

    #[tokio::test]
    async fn defaults_build_a_lexical_agent() {
        let dir = tempfile::tempdir().unwrap();
        let agent = build_agent(&config_in(&dir)).await.unwrap();

        let health = agent.health().await;
        assert_eq!(health["storage"], nimbus_core::HealthStatus::Healthy);
        assert!(matches!(health["retrieval"], nimbus_core::HealthStatus::Degraded(_)));
    }

    #[tokio::test]
    async fn embedding_key_selects_vector_retrieval() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(&dir);
        config.retrieval.embedding_api_key = Some("sk-embed".into());

        let db = Database::open_in_memory().await.unwrap();
        let store = vector_store(&config, db).unwrap().unwrap();
        assert_eq!(store.mode(), RetrievalMode::Vector);
    }

    #[tokio::test]
    async fn placeholder_keys_leave_fallbacks_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(&dir);
        config.openai.api_key = Some("your_openai_api_key_here".into());
        config.weather.api_key = Some("your_weather_api_key_here".into());

        let db = Database::open_in_memory().await.unwrap();
        assert!(vector_store(&config, db).unwrap().is_none());
        let agent = build_agent(&config).await.unwrap();
        let health = agent.health().await;
        assert!(matches!(health["weather"], nimbus_core::HealthStatus::Degraded(_)));
        assert!(matches!(health["completion"], nimbus_core::HealthStatus::Degraded(_)));
    }

    #[tokio::test]
    async fn disabled_storage_runs_from_memory() {
        let mut config = NimbusConfig::default();
        config.storage.enabled = false;
        let agent = build_agent(&config).await.unwrap();

        let health = agent.health().await;
        assert!(matches!(health["storage"], nimbus_core::HealthStatus::Degraded(_)));
    }
}
