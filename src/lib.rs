//! An LLM-driven virtual character engine.
//!
//! Drives an animated on-screen character whose pose parameters are exposed
//! as callable tools to a language model: a tick-driven scheduler
//! interpolates and chains parameter animations, body groups enforce
//! mutual-exclusion pose policies, and a declarative tool catalog turns the
//! poses into a chat-completion tool list and routes the model's tool calls
//! back onto the parameters. Rendering, the chat display, and persistence
//! stay outside the crate behind small traits.

pub mod ai;
pub mod body;
pub mod config;
pub mod engine;
pub mod llm;
pub mod motion;
pub mod renderer;
pub mod store;
pub mod tools;
pub mod utils;

#[cfg(test)]
pub(crate) mod testutil;

pub use ai::{ConversationEngine, DisplaySink};
pub use engine::{CharacterEngine, DeferredSlot, TICK_INTERVAL};
pub use llm::{LlmService, Message};
pub use renderer::{ParameterInfo, RenderError, RenderSurface};
pub use store::{CharacterState, JsonStateStore, StateStore};

/// Install the default tracing subscriber (fmt output, `RUST_LOG`
/// filtering). Embedders with their own subscriber skip this.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
