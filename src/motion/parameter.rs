//! Animatable model parameters and the startup parameter table.

use crate::motion::animation::Animation;
use crate::renderer::{ParameterInfo, RenderError, RenderSurface};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A single named, bounded animatable value driving one aspect of the
/// character's pose or expression.
///
/// Values are NOT clamped to `[min, max]` on assignment; out-of-range
/// targets pass straight through to the render surface. Callers that need
/// clamping do it themselves before constructing an animation.
///
/// The tracked value may be written from the tick driver (interpolation) and
/// from the chat worker (tool calls); each assignment holds the value lock
/// for the duration of that single write.
pub struct Parameter {
    pub id: String,
    /// Renderer-defined category tag, carried verbatim from the metadata.
    pub kind: i32,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    value: Mutex<f32>,
    surface: Arc<dyn RenderSurface>,
}

impl Parameter {
    /// The tracked value starts at the parameter's default, not at whatever
    /// the surface currently shows.
    pub fn new(info: &ParameterInfo, surface: Arc<dyn RenderSurface>) -> Self {
        Self {
            id: info.id.clone(),
            kind: info.kind,
            min: info.min,
            max: info.max,
            default: info.default,
            value: Mutex::new(info.default),
            surface,
        }
    }

    /// Current tracked value (the last value this engine wrote).
    pub fn value(&self) -> f32 {
        *self.value.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Write a value to the surface and record it as current, bypassing
    /// animation. The tracked value is only updated once the surface write
    /// succeeded.
    pub fn set_immediate(&self, value: f32) -> Result<(), RenderError> {
        self.surface.set_parameter_value(&self.id, value)?;
        *self.value.lock().unwrap_or_else(|e| e.into_inner()) = value;
        Ok(())
    }

    /// Restore the stored default, bypassing animation.
    pub fn reset_to_default(&self) -> Result<(), RenderError> {
        self.set_immediate(self.default)
    }

    /// Build an animation from the current tracked value toward `target`.
    /// The animation is pure data until someone registers it with the
    /// scheduler; chain stages are attached with [`Animation::followed_by`]
    /// and [`Animation::followed_by_deferred`].
    pub fn animate_to(self: &Arc<Self>, target: f32, duration: Duration) -> Animation {
        Animation::new(Arc::clone(self), self.value(), target, duration)
    }
}

/// Ordered set of all parameters exposed by the render surface, built once
/// at startup from its metadata.
pub struct ParameterTable {
    parameters: Vec<Arc<Parameter>>,
}

impl ParameterTable {
    pub fn from_surface(surface: Arc<dyn RenderSurface>) -> Self {
        let infos = surface.parameters();
        let parameters = infos
            .iter()
            .map(|info| Arc::new(Parameter::new(info, Arc::clone(&surface))))
            .collect();
        Self { parameters }
    }

    /// Linear lookup by identifier.
    pub fn find(&self, id: &str) -> Option<Arc<Parameter>> {
        self.parameters.iter().find(|p| p.id == id).map(Arc::clone)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Parameter>> {
        self.parameters.iter()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}
