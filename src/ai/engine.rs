//! The conversation engine: owns chat memory, runs the
//! request/response/tool-dispatch cycle off the tick thread, and presents
//! replies with a lip-synced progressive reveal.

use crate::ai::{prompts, reply};
use crate::body::BodyController;
use crate::engine::DeferredSlot;
use crate::llm::openai::{Message, MessageContent, ToolCallRequest};
use crate::llm::service::LlmService;
use crate::motion::parameter::Parameter;
use crate::store::StateHandle;
use crate::tools::ToolCatalog;
use rand::seq::SliceRandom;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Values the mouth parameter cycles through while a reply is revealed.
const MOUTH_STEPS: &[f32] = &[0.0, 0.1, 0.2, 0.3, 0.4];

/// Delay between reveal increments.
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(100);

/// Where revealed reply text goes. The embedder points this at its chat
/// display; the engine never formats or styles the text.
pub trait DisplaySink: Send + Sync {
    fn show_text(&self, text: &str);
}

pub struct ConversationEngine {
    state: Arc<StateHandle>,
    catalog: Arc<ToolCatalog>,
    llm: LlmService,
    body: Arc<BodyController>,
    mouth: Option<Arc<Parameter>>,
    display: Arc<dyn DisplaySink>,
    deferred: Arc<DeferredSlot>,
    persona: Mutex<String>,
    reveal_delay: Mutex<Duration>,
    /// Single-slot supervisor for the in-flight exchange. A request is
    /// accepted only when the slot is empty or its task has finished.
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ConversationEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        state: Arc<StateHandle>,
        catalog: Arc<ToolCatalog>,
        llm: LlmService,
        body: Arc<BodyController>,
        mouth: Option<Arc<Parameter>>,
        display: Arc<dyn DisplaySink>,
        deferred: Arc<DeferredSlot>,
        persona: impl Into<String>,
    ) -> Self {
        Self {
            state,
            catalog,
            llm,
            body,
            mouth,
            display,
            deferred,
            persona: Mutex::new(persona.into()),
            reveal_delay: Mutex::new(DEFAULT_REVEAL_DELAY),
            worker: Mutex::new(None),
        }
    }

    /// Adjust the per-character reveal delay (embedders with faster or
    /// slower displays).
    pub fn set_reveal_delay(&self, delay: Duration) {
        *self.reveal_delay.lock().unwrap_or_else(|e| e.into_inner()) = delay;
    }

    fn system_message(&self) -> Message {
        let persona = self.persona.lock().unwrap_or_else(|e| e.into_inner());
        Message::system(format!("{}{}", prompts::REPLY_FORMAT_PROMPT, persona))
    }

    /// Seed the system message when memory is empty (first run, or after the
    /// persisted record was lost).
    pub fn ensure_system_prompt(&self) {
        if self.state.memory_is_empty() {
            self.state.push_message(self.system_message());
        }
    }

    /// Replace the persona prompt. Memory restarts from the new system
    /// message; the old conversation no longer matches the new character.
    pub fn set_persona(&self, persona: impl Into<String>) {
        *self.persona.lock().unwrap_or_else(|e| e.into_inner()) = persona.into();
        self.state.reset_memory(self.system_message());
        self.state.flush();
    }

    /// Append a user turn. `images` are pre-encoded data-URL references.
    pub fn submit_user_turn(&self, text: &str, images: Vec<String>) {
        let content = if images.is_empty() {
            MessageContent::Text(text.to_string())
        } else {
            MessageContent::with_images(text.to_string(), images)
        };
        self.state.push_message(Message {
            role: "user".to_string(),
            content,
            tool_calls: None,
        });
    }

    /// Start one exchange on a background task. At most one exchange may be
    /// in flight; a request made while one is running is refused (not
    /// queued). Returns whether the request was accepted.
    pub fn request_completion(self: &Arc<Self>) -> bool {
        let mut slot = self.worker.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = slot.as_ref() {
            if !handle.is_finished() {
                debug!("chat request refused: an exchange is already in flight");
                return false;
            }
        }
        let engine = Arc::clone(self);
        *slot = Some(tokio::spawn(async move {
            engine.run_exchange().await;
        }));
        true
    }

    /// One full request/response/tool-dispatch cycle. Public so embedders
    /// (and tests) that manage their own task lifecycle can await it
    /// directly; [`Self::request_completion`] is the single-slot wrapper.
    pub async fn run_exchange(&self) {
        let provider = self.llm.provider().await;
        let messages = self.state.memory();
        let tools = self.catalog.schemas();

        let chat_reply = match provider.chat(messages, tools, None).await {
            Ok(r) => r,
            Err(e) => {
                // Memory is left untouched so the user can simply retry.
                error!("chat request failed: {}", e);
                return;
            }
        };

        self.apply_assistant_reply(&chat_reply.content, &chat_reply.tool_calls)
            .await;

        for call in &chat_reply.tool_calls {
            let Some(handler) = self.catalog.resolve(&call.name) else {
                warn!("model requested unknown tool '{}', skipping", call.name);
                continue;
            };
            let args: Value = match serde_json::from_str(&call.arguments) {
                Ok(v) => v,
                Err(e) => {
                    warn!("bad arguments for tool '{}': {}", call.name, e);
                    continue;
                }
            };
            match handler.invoke(&args) {
                Ok(outcome) => {
                    if let Some(message) = outcome.message_for_user {
                        self.apply_action_message(&message).await;
                    }
                }
                Err(e) => warn!("tool '{}' failed: {}", call.name, e),
            }
        }

        self.state.flush();
    }

    /// Append the assistant reply to memory and reveal its user-facing
    /// segment. A reply with no content and no tool calls is dropped.
    pub async fn apply_assistant_reply(&self, content: &str, tool_calls: &[ToolCallRequest]) {
        if content.is_empty() && tool_calls.is_empty() {
            return;
        }
        let tool_calls_value = if tool_calls.is_empty() {
            None
        } else {
            serde_json::to_value(tool_calls).ok()
        };
        self.state.push_message(Message {
            role: "assistant".to_string(),
            content: MessageContent::Text(content.to_string()),
            tool_calls: tool_calls_value,
        });
        self.reveal(&reply::display_model_reply(content)).await;
    }

    /// Apply a user-facing message supplied by an action: recorded as an
    /// assistant turn, revealed with wrapper tolerance.
    pub async fn apply_action_message(&self, message: &str) {
        if message.is_empty() {
            return;
        }
        self.state.push_message(Message::assistant(message));
        self.reveal(&reply::display_action_message(message)).await;
    }

    /// Progressive character-run exposure. Each prefix is published through
    /// the deferred-action slot (so the tick thread owns the actual display
    /// write); an accepted offer also nudges the mouth-open parameter by a
    /// small pseudo-random amount, and the mouth snaps shut when the reveal
    /// ends. Offers made while the slot is still occupied are skipped; the
    /// next accepted prefix covers the missed characters.
    async fn reveal(&self, text: &str) {
        let delay = *self.reveal_delay.lock().unwrap_or_else(|e| e.into_inner());
        let mut revealed = String::new();
        for ch in text.chars() {
            revealed.push(ch);
            let snapshot = revealed.clone();
            let display = Arc::clone(&self.display);
            if self
                .deferred
                .offer(Box::new(move || display.show_text(&snapshot)))
            {
                if let Some(mouth) = &self.mouth {
                    let step = MOUTH_STEPS
                        .choose(&mut rand::thread_rng())
                        .copied()
                        .unwrap_or(0.0);
                    if let Err(e) = mouth.set_immediate(step) {
                        warn!("mouth update failed: {}", e);
                    }
                }
            }
            tokio::time::sleep(delay).await;
        }
        if let Some(mouth) = &self.mouth {
            if let Err(e) = mouth.set_immediate(0.0) {
                warn!("mouth close failed: {}", e);
            }
        }
    }

    /// Snapshot of the conversation memory (embedders rendering history).
    pub fn memory(&self) -> Vec<Message> {
        self.state.memory()
    }

    /// The `<content>` segment of the most recent assistant message (empty
    /// when there is none, or when the last one had no usable tags). Used to
    /// restore the display at startup.
    pub fn last_reply(&self) -> String {
        let mut last = String::new();
        for message in self.state.memory() {
            if message.role == "assistant" {
                last = reply::extract_content(&message.content.text()).unwrap_or_default();
            }
        }
        last
    }

    /// Reset memory to just the system prompt, restore every animated
    /// parameter to its default, and clear the persisted parameter values.
    pub fn clear(&self) {
        self.state.reset_memory(self.system_message());
        self.body.reset_all();
        self.state.clear_parameters();
        self.state.flush();
    }
}
