//! Render surface boundary.
//!
//! The engine drives an external model renderer through a single primitive,
//! `set_parameter_value`, and reads the model's parameter metadata once at
//! startup. Everything else about rendering (draw calls, windowing, the
//! event loop) lives outside this crate.

use thiserror::Error;

/// Metadata for one animatable model parameter, read once at startup to
/// populate the parameter table.
#[derive(Debug, Clone)]
pub struct ParameterInfo {
    pub id: String,
    /// Renderer-defined category tag. Opaque to the engine, carried verbatim.
    pub kind: i32,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    /// Value the surface currently shows.
    pub current: f32,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),
    #[error("render surface failure: {0}")]
    Surface(String),
}

/// The renderer as seen by the engine.
pub trait RenderSurface: Send + Sync {
    /// Apply one parameter value to the model. Called exactly once per
    /// parameter mutation; values are passed through unclamped.
    fn set_parameter_value(&self, id: &str, value: f32) -> Result<(), RenderError>;

    /// Snapshot of the model's parameter metadata.
    fn parameters(&self) -> Vec<ParameterInfo>;
}
