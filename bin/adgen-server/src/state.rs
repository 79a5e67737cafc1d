//! Shared application state injected into every Axum handler.

use std::sync::Arc;
use std::time::Duration;

use adgen_core::{
    ArtifactStorage, GenerationCapability, LocalDirStorage, Orchestrator, PlaceholderCapability,
    RemoteCapability,
};
use anyhow::Context;
use tracing::info;

use crate::config::{CapabilityKind, Config};

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Validates and dispatches generation requests.
    pub orchestrator: Orchestrator,
}

impl AppState {
    pub fn new(config: Config, orchestrator: Orchestrator) -> Self {
        Self {
            config: Arc::new(config),
            orchestrator,
        }
    }

    /// Build the collaborators described by `config` and wire them into an
    /// orchestrator. Creates the output directory if needed.
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let storage = LocalDirStorage::new(&config.output_dir, config.static_url_prefix());
        storage
            .ensure_root()
            .await
            .with_context(|| format!("creating output dir {}", config.output_dir.display()))?;

        let capability: Arc<dyn GenerationCapability> = match config.capability {
            CapabilityKind::Placeholder => {
                Arc::new(PlaceholderCapability::new(config.placeholder_count))
            }
            CapabilityKind::Remote => {
                let url = config
                    .capability_url
                    .clone()
                    .context("ADGEN_CAPABILITY=remote requires ADGEN_CAPABILITY_URL")?;
                Arc::new(RemoteCapability::new(
                    url,
                    Duration::from_secs(config.capability_timeout_secs),
                )?)
            }
        };
        let storage: Arc<dyn ArtifactStorage> = Arc::new(storage);

        info!(
            capability = capability.name(),
            storage = storage.name(),
            output_dir = %config.output_dir.display(),
            "generation collaborators ready"
        );

        Ok(Self::new(config, Orchestrator::new(capability, storage)))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn remote_without_url_is_a_startup_error() {
        let config = Config {
            capability: CapabilityKind::Remote,
            capability_url: None,
            output_dir: std::env::temp_dir().join(format!("adgen_state_{}", uuid::Uuid::new_v4())),
            ..Config::default()
        };
        let err = AppState::from_config(config.clone()).await.unwrap_err();
        assert!(err.to_string().contains("ADGEN_CAPABILITY_URL"));
        let _ = tokio::fs::remove_dir_all(&config.output_dir).await;
    }

    #[tokio::test]
    async fn placeholder_state_creates_output_dir() {
        let config = Config {
            output_dir: std::env::temp_dir().join(format!("adgen_state_{}", uuid::Uuid::new_v4())),
            ..Config::default()
        };
        let state = AppState::from_config(config.clone()).await.unwrap();
        assert_eq!(state.orchestrator.capability_name(), "placeholder");
        assert_eq!(state.orchestrator.storage_name(), "local");
        assert!(tokio::fs::metadata(&config.output_dir).await.unwrap().is_dir());
        let _ = tokio::fs::remove_dir_all(&config.output_dir).await;
    }
}
