//! Persisted character state: conversation memory plus the externally
//! visible parameter values, saved as one JSON record per character.

use crate::llm::openai::Message;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{error, warn};

/// Everything the engine persists between sessions.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CharacterState {
    /// Ordered conversation memory, system prompt first.
    #[serde(default)]
    pub memory: Vec<Message>,
    /// Last target value written for each model parameter.
    #[serde(default)]
    pub parameter_values: HashMap<String, f32>,
    /// RFC 3339 timestamp of the last save. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read state: {0}")]
    Read(String),
    #[error("failed to write state: {0}")]
    Write(String),
}

/// Durable storage for [`CharacterState`]. The engine only needs load and
/// save; where and how the record lives is the embedder's business.
pub trait StateStore: Send + Sync {
    fn load(&self) -> Result<CharacterState, StoreError>;
    fn save(&self, state: &CharacterState) -> Result<(), StoreError>;
}

/// JSON-file-backed store, one file per character.
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default per-user state location, e.g. `~/.local/share/<app>/state.json`.
    pub fn default_path(app_name: &str) -> PathBuf {
        dirs_next::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(app_name)
            .join("state.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> Result<CharacterState, StoreError> {
        if !self.path.exists() {
            return Ok(CharacterState::default());
        }
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| StoreError::Read(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| StoreError::Read(e.to_string()))
    }

    fn save(&self, state: &CharacterState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Write(e.to_string()))?;
        }
        let json =
            serde_json::to_string_pretty(state).map_err(|e| StoreError::Write(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| StoreError::Write(e.to_string()))
    }
}

/// Live state plus its backing store.
///
/// Every component mutates persisted state through this handle. Flushing is
/// log-and-continue: a failed save must never take down the tick loop.
pub struct StateHandle {
    state: Mutex<CharacterState>,
    store: Arc<dyn StateStore>,
}

impl StateHandle {
    /// Load the persisted record, falling back to an empty state when the
    /// store cannot produce one.
    pub fn open(store: Arc<dyn StateStore>) -> Self {
        let state = match store.load() {
            Ok(state) => state,
            Err(e) => {
                warn!("could not load persisted state: {} (starting fresh)", e);
                CharacterState::default()
            }
        };
        Self {
            state: Mutex::new(state),
            store,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CharacterState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_parameter(&self, id: &str, value: f32) {
        self.lock().parameter_values.insert(id.to_string(), value);
    }

    pub fn parameter_values(&self) -> HashMap<String, f32> {
        self.lock().parameter_values.clone()
    }

    pub fn clear_parameters(&self) {
        self.lock().parameter_values.clear();
    }

    pub fn push_message(&self, message: Message) {
        self.lock().memory.push(message);
    }

    pub fn memory(&self) -> Vec<Message> {
        self.lock().memory.clone()
    }

    pub fn memory_is_empty(&self) -> bool {
        self.lock().memory.is_empty()
    }

    /// Drop all history and start over from the given system message.
    pub fn reset_memory(&self, system: Message) {
        let mut state = self.lock();
        state.memory.clear();
        state.memory.push(system);
    }

    /// Write the current state through to the store. Errors are logged,
    /// never propagated.
    pub fn flush(&self) {
        let snapshot = {
            let mut state = self.lock();
            state.saved_at = Some(chrono::Local::now().to_rfc3339());
            state.clone()
        };
        if let Err(e) = self.store.save(&snapshot) {
            error!("failed to persist character state: {}", e);
        }
    }
}
