//! Shared test doubles: a recording render surface, an in-memory state
//! store, a scripted chat provider, and a capturing display sink.

use crate::ai::engine::DisplaySink;
use crate::llm::openai::{ChatReply, Message, ToolCallRequest};
use crate::llm::provider::{ChatProvider, LlmParams};
use crate::renderer::{ParameterInfo, RenderError, RenderSurface};
use crate::store::{CharacterState, StateHandle, StateStore, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ── Render surface ─────────────────────────────────────

pub struct RecordingSurface {
    infos: Vec<ParameterInfo>,
    writes: Mutex<Vec<(String, f32)>>,
    fail_all: std::sync::atomic::AtomicBool,
    fail_ids: Mutex<HashSet<String>>,
}

pub fn param_info(id: &str, default: f32) -> ParameterInfo {
    ParameterInfo {
        id: id.to_string(),
        kind: 0,
        min: 0.0,
        max: 1.0,
        default,
        current: default,
    }
}

impl RecordingSurface {
    pub fn with_parameters(infos: Vec<ParameterInfo>) -> Self {
        Self {
            infos,
            writes: Mutex::new(Vec::new()),
            fail_all: std::sync::atomic::AtomicBool::new(false),
            fail_ids: Mutex::new(HashSet::new()),
        }
    }

    /// Parameters with `min 0, max 1, default 0`.
    pub fn simple(ids: &[&str]) -> Self {
        Self::with_parameters(ids.iter().map(|id| param_info(id, 0.0)).collect())
    }

    /// Make every subsequent write fail.
    pub fn set_failing(&self, on: bool) {
        self.fail_all.store(on, std::sync::atomic::Ordering::SeqCst);
    }

    /// Make writes to one parameter fail.
    pub fn fail_parameter(&self, id: &str) {
        self.fail_ids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.to_string());
    }

    pub fn last_value(&self, id: &str) -> Option<f32> {
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .rev()
            .find(|(wid, _)| wid == id)
            .map(|(_, v)| *v)
    }

    pub fn writes_for(&self, id: &str) -> Vec<f32> {
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|(wid, _)| wid == id)
            .map(|(_, v)| *v)
            .collect()
    }
}

impl RenderSurface for RecordingSurface {
    fn set_parameter_value(&self, id: &str, value: f32) -> Result<(), RenderError> {
        if self.fail_all.load(std::sync::atomic::Ordering::SeqCst)
            || self
                .fail_ids
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .contains(id)
        {
            return Err(RenderError::Surface(format!("injected failure for {}", id)));
        }
        if !self.infos.iter().any(|info| info.id == id) {
            return Err(RenderError::UnknownParameter(id.to_string()));
        }
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id.to_string(), value));
        Ok(())
    }

    fn parameters(&self) -> Vec<ParameterInfo> {
        self.infos.clone()
    }
}

// ── State store ────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStore {
    pub state: Mutex<CharacterState>,
}

impl MemoryStore {
    pub fn with_state(state: CharacterState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn snapshot(&self) -> CharacterState {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<CharacterState, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, state: &CharacterState) -> Result<(), StoreError> {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state.clone();
        Ok(())
    }
}

pub fn memory_state_handle() -> Arc<StateHandle> {
    Arc::new(StateHandle::open(Arc::new(MemoryStore::default())))
}

// ── Display sink ───────────────────────────────────────

#[derive(Default)]
pub struct CapturedDisplay {
    pub texts: Mutex<Vec<String>>,
}

impl CapturedDisplay {
    pub fn last(&self) -> Option<String> {
        self.texts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }
}

impl DisplaySink for CapturedDisplay {
    fn show_text(&self, text: &str) {
        self.texts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());
    }
}

// ── Chat provider ──────────────────────────────────────

/// Plays back a fixed sequence of replies; errors once the script runs out.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<ChatReply>>,
    delay: Duration,
    /// Tool-catalog size seen on each call.
    pub seen_tools: Mutex<Vec<usize>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<ChatReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            delay: Duration::ZERO,
            seen_tools: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    async fn chat(
        &self,
        _messages: Vec<Message>,
        tools: Vec<Value>,
        _options: Option<LlmParams>,
    ) -> Result<ChatReply, String> {
        self.seen_tools
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(tools.len());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        next.ok_or_else(|| "scripted provider has no reply left".to_string())
    }

    fn id(&self) -> &str {
        "scripted"
    }
}

pub fn tool_call(name: &str, arguments: &str) -> ToolCallRequest {
    ToolCallRequest {
        id: Some(format!("call_{}", name)),
        name: name.to_string(),
        arguments: arguments.to_string(),
    }
}

pub fn text_reply(content: &str) -> ChatReply {
    ChatReply {
        content: content.to_string(),
        tool_calls: Vec::new(),
    }
}
