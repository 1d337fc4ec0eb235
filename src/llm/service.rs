//! LLM service: holds the active chat provider and hot-swaps it on config
//! changes.

use crate::llm::llm_config::{LlmConfig, LlmProviderConfig};
use crate::llm::provider::{ChatProvider, OpenAIProvider};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Shared handle to the active provider and its config.
#[derive(Clone)]
pub struct LlmService {
    provider: Arc<RwLock<Arc<dyn ChatProvider>>>,
    config: Arc<RwLock<LlmConfig>>,
    config_path: Option<PathBuf>,
}

impl LlmService {
    /// Create a service from a persisted config.
    pub fn from_config(config: LlmConfig, config_path: PathBuf) -> Self {
        let provider = build_provider(&config);
        Self {
            provider: Arc::new(RwLock::new(provider)),
            config: Arc::new(RwLock::new(config)),
            config_path: Some(config_path),
        }
    }

    /// Wrap an existing provider directly (embedders and tests that manage
    /// their own configuration).
    pub fn with_provider(provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            provider: Arc::new(RwLock::new(provider)),
            config: Arc::new(RwLock::new(LlmConfig::default())),
            config_path: None,
        }
    }

    /// Get a clone of the active provider (Arc'd for async use).
    pub async fn provider(&self) -> Arc<dyn ChatProvider> {
        self.provider.read().await.clone()
    }

    /// Get a clone of the current config.
    pub async fn config(&self) -> LlmConfig {
        self.config.read().await.clone()
    }

    /// Update the config, persist it when a path is known, and hot-swap the
    /// active provider.
    pub async fn update_config(&self, new_config: LlmConfig) -> Result<(), String> {
        if let Some(path) = &self.config_path {
            crate::llm::llm_config::save_config(path, &new_config)?;
        }

        let new_provider = build_provider(&new_config);
        *self.provider.write().await = new_provider;
        *self.config.write().await = new_config;
        Ok(())
    }
}

/// Factory: build the active provider from config. Every configured entry is
/// treated as an OpenAI-compatible endpoint.
fn build_provider(config: &LlmConfig) -> Arc<dyn ChatProvider> {
    let active_id = &config.active_provider;

    let provider_cfg = config
        .providers
        .iter()
        .find(|p| p.id == *active_id)
        .or_else(|| config.providers.iter().find(|p| p.enabled))
        .or_else(|| config.providers.first());

    match provider_cfg {
        Some(cfg) => build_from_provider_config(cfg),
        None => {
            warn!("[LLM] no provider configured, falling back to OpenAI defaults");
            Arc::new(OpenAIProvider::new(
                String::new(),
                Some("https://api.openai.com/v1".to_string()),
                Some("gpt-4".to_string()),
            ))
        }
    }
}

fn build_from_provider_config(cfg: &LlmProviderConfig) -> Arc<dyn ChatProvider> {
    let api_key = cfg.resolve_api_key().unwrap_or_default();
    let model = cfg.model.clone().unwrap_or_else(|| "gpt-4".to_string());
    info!(
        "[LLM] initializing provider '{}': base_url={}, model={}",
        cfg.id,
        cfg.base_url
            .as_deref()
            .unwrap_or("https://api.openai.com/v1"),
        model
    );
    Arc::new(OpenAIProvider::new(api_key, cfg.base_url.clone(), Some(model)).with_id(cfg.id.clone()))
}
