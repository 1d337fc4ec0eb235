//! Engine assembly: builds every registry once at startup, owns the
//! cooperative tick driver, and pumps deferred display actions.

use crate::ai::engine::{ConversationEngine, DisplaySink};
use crate::body::{builtin, BodyController};
use crate::llm::service::LlmService;
use crate::motion::parameter::ParameterTable;
use crate::motion::scheduler::AnimationScheduler;
use crate::renderer::RenderSurface;
use crate::store::{StateHandle, StateStore};
use crate::tools::ToolCatalog;
use anyhow::Result;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Default tick interval (matches a ~60 Hz render loop).
pub const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// How often the tick loop flushes persisted state, alongside the
/// per-exchange flushes.
const AUTOSAVE_EVERY: Duration = Duration::from_secs(20);

type DeferredAction = Box<dyn FnOnce() + Send>;

/// Single-slot storage for an action the tick thread should run.
///
/// Producers offer closures from any thread; the tick driver pumps at most
/// one per tick. An offer made while a closure is already waiting is
/// declined and the closure dropped, which is what lets the reveal path skip
/// frames instead of queueing unboundedly.
#[derive(Default)]
pub struct DeferredSlot {
    slot: Mutex<Option<DeferredAction>>,
}

impl DeferredSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `action` for the next tick. Returns false (dropping the
    /// action) when one is already waiting.
    pub fn offer(&self, action: DeferredAction) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_some() {
            return false;
        }
        *slot = Some(action);
        true
    }

    /// Run at most one stored action. Called exactly once per tick.
    pub fn pump(&self) {
        let action = self
            .slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(action) = action {
            action();
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

/// Everything wired together: the animation scheduler, the body groups, the
/// tool catalog, and the conversation engine, built once from the external
/// collaborators.
pub struct CharacterEngine {
    pub scheduler: Arc<AnimationScheduler>,
    pub parameters: Arc<ParameterTable>,
    pub body: Arc<BodyController>,
    pub catalog: Arc<ToolCatalog>,
    pub conversation: Arc<ConversationEngine>,
    pub deferred: Arc<DeferredSlot>,
    state: Arc<StateHandle>,
}

impl CharacterEngine {
    /// Startup sequence: load persisted state, restore parameter values to
    /// the surface, read the surface's parameter metadata once, bind the
    /// builtin body groups, build the tool catalog, and seed the system
    /// prompt. Catalog construction failures abort startup; they are
    /// developer errors, not runtime conditions.
    pub fn new(
        surface: Arc<dyn RenderSurface>,
        display: Arc<dyn DisplaySink>,
        store: Arc<dyn StateStore>,
        llm: LlmService,
        persona: &str,
    ) -> Result<Self> {
        let state = Arc::new(StateHandle::open(store));

        for (id, value) in state.parameter_values() {
            if let Err(e) = surface.set_parameter_value(&id, value) {
                warn!("could not restore parameter '{}': {}", id, e);
            }
        }

        let parameters = Arc::new(ParameterTable::from_surface(Arc::clone(&surface)));
        let scheduler = Arc::new(AnimationScheduler::new());
        let body = Arc::new(BodyController::from_specs(
            builtin::GROUPS,
            &parameters,
            Arc::clone(&scheduler),
            Arc::clone(&state),
        ));

        let mut catalog = ToolCatalog::new();
        body.register_tools(&mut catalog)?;
        let catalog = Arc::new(catalog);

        let deferred = Arc::new(DeferredSlot::new());
        let mouth = parameters.find(builtin::MOUTH_OPEN_ID);
        if mouth.is_none() {
            warn!(
                "model has no '{}' parameter, replies will not lip-sync",
                builtin::MOUTH_OPEN_ID
            );
        }

        let conversation = Arc::new(ConversationEngine::new(
            Arc::clone(&state),
            Arc::clone(&catalog),
            llm,
            Arc::clone(&body),
            mouth,
            Arc::clone(&display),
            Arc::clone(&deferred),
            persona,
        ));
        conversation.ensure_system_prompt();
        display.show_text(&conversation.last_reply());

        info!(
            "engine ready: {} parameters, {} tools",
            parameters.len(),
            catalog.len()
        );

        Ok(Self {
            scheduler,
            parameters,
            body,
            catalog,
            conversation,
            deferred,
            state,
        })
    }

    /// One cooperative tick: advance every in-flight animation, then pump at
    /// most one deferred display action.
    pub fn tick(&self) {
        self.scheduler.advance(Instant::now());
        self.deferred.pump();
    }

    /// Spawn the fixed-interval tick driver on the tokio runtime.
    pub fn start_ticking(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut last_save = Instant::now();
            loop {
                ticker.tick().await;
                engine.tick();
                if last_save.elapsed() >= AUTOSAVE_EVERY {
                    engine.state.flush();
                    last_save = Instant::now();
                }
            }
        })
    }
}
