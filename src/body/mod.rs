//! Body capability groups.
//!
//! Each group owns a set of pose parameters sharing a mutual-exclusion
//! policy: activating one pose resets its siblings to their defaults, and a
//! group can declare other groups whose poses conflict with its own (raising
//! a hand resets the torso pose, and vice versa). Every pose is exposed to
//! the language model as one invocable tool.

pub mod builtin;

use crate::motion::parameter::{Parameter, ParameterTable};
use crate::motion::scheduler::AnimationScheduler;
use crate::store::StateHandle;
use crate::tools::{ArgSpec, CatalogError, ToolCatalog, ToolError, ToolHandler, ToolReply, ToolSpec};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// How long a pose activation takes to play.
pub const POSE_PLAY_TIME: Duration = Duration::from_millis(200);

/// Usage contract appended to every pose tool description.
pub const POSE_USAGE_SUFFIX: &str = "A value of 0 returns this pose to its default state, 1 plays it. \
     messageForUser is an optional message spoken to the user alongside the pose; when present it \
     must use the format <think>internal reasoning</think><content>what to say to the user</content>, \
     with exactly one pair of each tag.";

/// One invocable pose bound to a model parameter.
pub struct PoseAction {
    pub tool_name: String,
    pub description: String,
    pub parameter: Arc<Parameter>,
}

pub struct BodyGroup {
    pub id: String,
    /// Ids of groups whose poses conflict with this one.
    pub conflicts: Vec<String>,
    pub actions: Vec<PoseAction>,
}

impl BodyGroup {
    /// Immediately restore every parameter in the group to its default,
    /// except the one identified by `exclude`, writing each restored default
    /// back into persisted state. A failure on one parameter is logged and
    /// does not stop the rest.
    fn reset(&self, exclude: Option<&str>, state: &StateHandle) {
        for action in &self.actions {
            if exclude == Some(action.parameter.id.as_str()) {
                continue;
            }
            if let Err(e) = action.parameter.reset_to_default() {
                warn!("failed to reset '{}': {}", action.parameter.id, e);
                continue;
            }
            state.set_parameter(&action.parameter.id, action.parameter.default);
        }
    }
}

/// All body groups, wired to the scheduler and persisted state. Built once
/// at startup after the parameter table exists; lives for the session.
pub struct BodyController {
    groups: Vec<BodyGroup>,
    scheduler: Arc<AnimationScheduler>,
    state: Arc<StateHandle>,
}

impl BodyController {
    pub fn new(
        groups: Vec<BodyGroup>,
        scheduler: Arc<AnimationScheduler>,
        state: Arc<StateHandle>,
    ) -> Self {
        Self {
            groups,
            scheduler,
            state,
        }
    }

    /// Bind declarative group specs to the parameters the model actually
    /// has. Poses whose parameter is missing from the table are skipped.
    pub fn from_specs(
        specs: &[builtin::GroupSpec],
        table: &ParameterTable,
        scheduler: Arc<AnimationScheduler>,
        state: Arc<StateHandle>,
    ) -> Self {
        let mut groups = Vec::new();
        for spec in specs {
            let mut actions = Vec::new();
            for pose in spec.poses {
                match table.find(pose.parameter_id) {
                    Some(parameter) => actions.push(PoseAction {
                        tool_name: pose.tool_name.to_string(),
                        description: pose.description.to_string(),
                        parameter,
                    }),
                    None => info!(
                        "model has no parameter '{}', skipping pose '{}'",
                        pose.parameter_id, pose.tool_name
                    ),
                }
            }
            groups.push(BodyGroup {
                id: spec.id.to_string(),
                conflicts: spec.conflicts.iter().map(|s| s.to_string()).collect(),
                actions,
            });
        }
        Self::new(groups, scheduler, state)
    }

    pub fn groups(&self) -> &[BodyGroup] {
        &self.groups
    }

    /// Activate one pose: animate its parameter toward `value`, persist the
    /// target as the externally visible state, reset every conflicting
    /// group, then reset every sibling pose in the same group so at most one
    /// pose per group stays on.
    pub fn activate(&self, group_id: &str, parameter_id: &str, value: f32) -> Result<(), ToolError> {
        let group = self
            .groups
            .iter()
            .find(|g| g.id == group_id)
            .ok_or_else(|| ToolError::UnknownTarget(group_id.to_string()))?;
        let action = group
            .actions
            .iter()
            .find(|a| a.parameter.id == parameter_id)
            .ok_or_else(|| ToolError::UnknownTarget(parameter_id.to_string()))?;

        self.scheduler
            .register(action.parameter.animate_to(value, POSE_PLAY_TIME));
        self.state.set_parameter(parameter_id, value);

        for conflict_id in &group.conflicts {
            if let Some(other) = self.groups.iter().find(|g| g.id == *conflict_id) {
                other.reset(None, &self.state);
            }
        }
        group.reset(Some(parameter_id), &self.state);
        Ok(())
    }

    /// Restore every parameter of every group to its default (the
    /// conversation clear path).
    pub fn reset_all(&self) {
        for group in &self.groups {
            group.reset(None, &self.state);
        }
    }

    /// Register one catalog tool per pose. An unmapped argument type here
    /// aborts startup.
    pub fn register_tools(self: &Arc<Self>, catalog: &mut ToolCatalog) -> Result<(), CatalogError> {
        for group in &self.groups {
            for action in &group.actions {
                let spec = ToolSpec {
                    name: action.tool_name.clone(),
                    description: format!("{} {}", action.description, POSE_USAGE_SUFFIX),
                    args: vec![
                        ArgSpec::new("value", "float", ""),
                        ArgSpec::new("messageForUser", "str", ""),
                    ],
                };
                catalog.register(
                    spec,
                    Arc::new(PoseTool {
                        controller: Arc::clone(self),
                        group_id: group.id.clone(),
                        parameter_id: action.parameter.id.clone(),
                    }),
                )?;
            }
        }
        Ok(())
    }
}

/// Catalog handler for one pose action.
struct PoseTool {
    controller: Arc<BodyController>,
    group_id: String,
    parameter_id: String,
}

impl ToolHandler for PoseTool {
    fn invoke(&self, args: &Value) -> Result<ToolReply, ToolError> {
        let value = number_arg(args, "value")?;
        let message = args
            .get("messageForUser")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .filter(|s| !s.is_empty());

        self.controller
            .activate(&self.group_id, &self.parameter_id, value)?;
        Ok(ToolReply {
            message_for_user: message,
        })
    }
}

/// Pull a numeric argument out of a model-supplied argument object. Models
/// sometimes send numbers as strings, so those are accepted too.
fn number_arg(args: &Value, name: &str) -> Result<f32, ToolError> {
    let value = args
        .get(name)
        .ok_or_else(|| ToolError::BadArgument(name.to_string()))?;
    if let Some(n) = value.as_f64() {
        return Ok(n as f32);
    }
    if let Some(s) = value.as_str() {
        if let Ok(n) = s.trim().parse::<f32>() {
            return Ok(n);
        }
    }
    Err(ToolError::BadArgument(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{memory_state_handle, RecordingSurface};
    use serde_json::json;
    use std::time::Instant;

    fn controller_with(
        specs: &[builtin::GroupSpec],
        ids: &[&str],
    ) -> (
        Arc<BodyController>,
        Arc<RecordingSurface>,
        Arc<AnimationScheduler>,
        Arc<StateHandle>,
    ) {
        let surface = Arc::new(RecordingSurface::simple(ids));
        let table = ParameterTable::from_surface(surface.clone());
        let scheduler = Arc::new(AnimationScheduler::new());
        let state = memory_state_handle();
        let controller = Arc::new(BodyController::from_specs(
            specs,
            &table,
            Arc::clone(&scheduler),
            Arc::clone(&state),
        ));
        (controller, surface, scheduler, state)
    }

    const TEST_GROUPS: &[builtin::GroupSpec] = &[
        builtin::GroupSpec {
            id: "left_hand",
            conflicts: &["torso"],
            poses: &[
                builtin::PoseSpec {
                    parameter_id: "armA",
                    tool_name: "pose_a",
                    description: "Pose A.",
                },
                builtin::PoseSpec {
                    parameter_id: "armB",
                    tool_name: "pose_b",
                    description: "Pose B.",
                },
            ],
        },
        builtin::GroupSpec {
            id: "torso",
            conflicts: &["left_hand"],
            poses: &[builtin::PoseSpec {
                parameter_id: "bodyC",
                tool_name: "pose_c",
                description: "Pose C.",
            }],
        },
    ];

    #[test]
    fn activation_registers_animation_and_persists_target() {
        let (controller, surface, scheduler, state) =
            controller_with(TEST_GROUPS, &["armA", "armB", "bodyC"]);

        controller.activate("left_hand", "armA", 1.0).unwrap();
        assert_eq!(scheduler.pending_count(), 1);
        assert_eq!(state.parameter_values().get("armA"), Some(&1.0));

        // Merging tick, then a mid-flight tick: the parameter has moved
        // partway toward the target.
        scheduler.advance(Instant::now());
        scheduler.advance(Instant::now() + Duration::from_millis(100));
        let partway = surface.last_value("armA").unwrap();
        assert!(partway > 0.0 && partway < 1.0, "got {}", partway);

        // Past the play time it equals the target exactly and is reaped.
        scheduler.advance(Instant::now() + Duration::from_secs(1));
        assert_eq!(scheduler.active_count(), 0);
        assert_eq!(surface.last_value("armA"), Some(1.0));
        let persisted = state.parameter_values().get("armA").copied();
        assert_eq!(persisted, Some(1.0));
    }

    #[test]
    fn activation_resets_siblings_and_conflicting_groups() {
        let (controller, surface, _scheduler, state) =
            controller_with(TEST_GROUPS, &["armA", "armB", "bodyC"]);

        controller.activate("left_hand", "armA", 1.0).unwrap();

        // The sibling pose and the conflicting torso pose are snapped to
        // their defaults immediately, and the defaults are persisted.
        assert_eq!(surface.last_value("armB"), Some(0.0));
        assert_eq!(surface.last_value("bodyC"), Some(0.0));
        assert_eq!(state.parameter_values().get("armB"), Some(&0.0));
        assert_eq!(state.parameter_values().get("bodyC"), Some(&0.0));
        // The activated pose itself is excluded from the reset pass.
        assert_eq!(state.parameter_values().get("armA"), Some(&1.0));
    }

    #[test]
    fn reset_pass_survives_a_failing_parameter() {
        let (controller, surface, _scheduler, state) =
            controller_with(TEST_GROUPS, &["armA", "armB", "bodyC"]);

        surface.fail_parameter("armB");
        controller.activate("left_hand", "armA", 1.0).unwrap();

        // armB could not be restored, but the conflicting group still was.
        assert_eq!(state.parameter_values().get("armB"), None);
        assert_eq!(state.parameter_values().get("bodyC"), Some(&0.0));
    }

    #[test]
    fn missing_parameters_are_skipped_at_bind_time() {
        let (controller, _surface, _scheduler, _state) =
            controller_with(TEST_GROUPS, &["armA", "bodyC"]);

        let left = &controller.groups()[0];
        assert_eq!(left.actions.len(), 1, "armB is absent from this model");

        let mut catalog = ToolCatalog::new();
        controller.register_tools(&mut catalog).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.resolve("pose_b").is_none());
    }

    #[test]
    fn pose_tool_parses_value_and_forwards_message() {
        let (controller, _surface, scheduler, _state) =
            controller_with(TEST_GROUPS, &["armA", "armB", "bodyC"]);
        let mut catalog = ToolCatalog::new();
        controller.register_tools(&mut catalog).unwrap();

        let handler = catalog.resolve("pose_a").unwrap();
        let reply = handler
            .invoke(&json!({ "value": 1, "messageForUser": "<content>sure</content>" }))
            .unwrap();
        assert_eq!(reply.message_for_user.as_deref(), Some("<content>sure</content>"));
        assert_eq!(scheduler.pending_count(), 1);

        // Numeric strings are tolerated.
        let reply = handler.invoke(&json!({ "value": "0.5" })).unwrap();
        assert!(reply.message_for_user.is_none());
    }

    #[test]
    fn pose_tool_rejects_missing_or_malformed_value() {
        let (controller, _surface, _scheduler, _state) =
            controller_with(TEST_GROUPS, &["armA", "armB", "bodyC"]);
        let mut catalog = ToolCatalog::new();
        controller.register_tools(&mut catalog).unwrap();

        let handler = catalog.resolve("pose_a").unwrap();
        assert!(handler.invoke(&json!({})).is_err());
        assert!(handler.invoke(&json!({ "value": "loud" })).is_err());
    }

    #[test]
    fn builtin_groups_register_cleanly() {
        let ids: Vec<&str> = builtin::GROUPS
            .iter()
            .flat_map(|g| g.poses.iter().map(|p| p.parameter_id))
            .collect();
        let (controller, _surface, _scheduler, _state) = controller_with(builtin::GROUPS, &ids);

        let mut catalog = ToolCatalog::new();
        controller.register_tools(&mut catalog).unwrap();
        assert_eq!(catalog.len(), ids.len());
        assert!(catalog.resolve("left_hand_raise").is_some());
        assert!(catalog.resolve("mouth_open").is_some());
    }
}
