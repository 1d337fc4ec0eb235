//! LLM configuration, persisted to `llm_config.json`.

use crate::config;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmProviderConfig {
    pub id: String,
    #[serde(default = "default_true")]
    pub enabled: bool,

    pub api_key: Option<String>,
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

impl LlmProviderConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        config::resolve_api_key(&self.api_key, &self.api_key_env)
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// ID of the active provider (must match one of `providers[].id`).
    #[serde(default = "default_active_provider")]
    pub active_provider: String,

    #[serde(default = "default_providers")]
    pub providers: Vec<LlmProviderConfig>,
}

fn default_active_provider() -> String {
    "openai".to_string()
}

fn default_providers() -> Vec<LlmProviderConfig> {
    vec![LlmProviderConfig {
        id: "openai".to_string(),
        enabled: true,
        api_key: None,
        api_key_env: Some("OPENAI_API_KEY".to_string()),
        base_url: Some("https://api.openai.com/v1".to_string()),
        model: Some("gpt-4".to_string()),
    }]
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            active_provider: default_active_provider(),
            providers: default_providers(),
        }
    }
}

pub fn load_config(path: &Path) -> LlmConfig {
    config::load_json_config(path, "LLM")
}

pub fn save_config(path: &Path, config: &LlmConfig) -> Result<(), String> {
    config::save_json_config(path, config, "LLM")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_an_openai_provider() {
        let config = LlmConfig::default();
        assert_eq!(config.active_provider, "openai");
        assert_eq!(config.providers.len(), 1);
        assert!(config.providers[0].enabled);
    }

    #[test]
    fn config_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("llm_config.json");

        let mut config = LlmConfig::default();
        config.providers[0].model = Some("my-model".to_string());
        save_config(&path, &config).unwrap();

        let loaded = load_config(&path);
        assert_eq!(loaded.providers[0].model.as_deref(), Some("my-model"));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let loaded = load_config(Path::new("/definitely/not/here.json"));
        assert_eq!(loaded.active_provider, "openai");
    }
}
