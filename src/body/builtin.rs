//! The stock body-group set for the bundled character model.
//!
//! Parameter ids follow the model's Live2D parameter table; tool names are
//! the stable public names the language model calls.

/// Parameter id of the mouth-open control, used for reply lip-sync.
pub const MOUTH_OPEN_ID: &str = "ParamMouthOpenY";

pub struct PoseSpec {
    pub parameter_id: &'static str,
    pub tool_name: &'static str,
    pub description: &'static str,
}

pub struct GroupSpec {
    pub id: &'static str,
    pub conflicts: &'static [&'static str],
    pub poses: &'static [PoseSpec],
}

pub const GROUPS: &[GroupSpec] = &[
    GroupSpec {
        id: "mouth",
        conflicts: &[],
        poses: &[
            PoseSpec {
                parameter_id: MOUTH_OPEN_ID,
                tool_name: "mouth_open",
                description: "Open the mouth.",
            },
            PoseSpec {
                parameter_id: "ParamMouthForm",
                tool_name: "mouth_controller",
                description: "Curve the mouth line; the expressed warmth grows with the value.",
            },
        ],
    },
    GroupSpec {
        id: "right_hand",
        conflicts: &["torso"],
        poses: &[
            PoseSpec {
                parameter_id: "arm09R",
                tool_name: "right_hand_up",
                description: "Clench the right fist and raise it to forehead height, as if shielding against something.",
            },
            PoseSpec {
                parameter_id: "arm008L",
                tool_name: "right_fist_up",
                description: "Clench the right fist and raise it to shoulder height, as if about to strike or to show strength.",
            },
            PoseSpec {
                parameter_id: "arm12L",
                tool_name: "right_hand_flat_and_raise_up",
                description: "Hold the right hand out flat at shoulder height; natural and relaxed.",
            },
        ],
    },
    GroupSpec {
        id: "left_hand",
        conflicts: &["torso"],
        poses: &[
            PoseSpec {
                parameter_id: "arm008R",
                tool_name: "left_fist",
                description: "Clench the left fist.",
            },
            PoseSpec {
                parameter_id: "arm09L",
                tool_name: "left_think_pose",
                description: "Rest the left hand under the chin, as if thinking.",
            },
            PoseSpec {
                parameter_id: "arm12R",
                tool_name: "left_hand_flat",
                description: "Hold the left hand out flat.",
            },
            PoseSpec {
                parameter_id: "arm07R",
                tool_name: "left_hand_behind_head",
                description: "Put the left hand behind the head (helpless or puzzled).",
            },
            PoseSpec {
                parameter_id: "arm10R",
                tool_name: "left_hand_down",
                description: "Lower the left hand to rest.",
            },
            PoseSpec {
                parameter_id: "arm13R",
                tool_name: "left_hand_point",
                description: "Point at the screen with the left index finger.",
            },
            PoseSpec {
                parameter_id: "arm14R",
                tool_name: "left_thumb_up",
                description: "Give a thumbs-up with the left hand.",
            },
            PoseSpec {
                parameter_id: "arm16R",
                tool_name: "left_hand_raise",
                description: "Raise the left hand, open.",
            },
        ],
    },
    GroupSpec {
        id: "torso",
        conflicts: &["right_hand", "left_hand"],
        poses: &[
            PoseSpec {
                parameter_id: "arm003",
                tool_name: "body_idea_pose",
                description: "Left hand on the hip, right index finger raised, as if saying 'I have an idea'; also works for the number one.",
            },
            PoseSpec {
                parameter_id: "armR02",
                tool_name: "body_think_pose",
                description: "Left hand propping the chin, right hand holding the left arm, deep in thought.",
            },
        ],
    },
    GroupSpec {
        id: "face",
        conflicts: &[],
        poses: &[
            PoseSpec {
                parameter_id: "Pale1",
                tool_name: "face_pale",
                description: "Darken the face (reads as ominous).",
            },
            PoseSpec {
                parameter_id: "Sweet",
                tool_name: "face_shy",
                description: "Flush the face (shy).",
            },
            PoseSpec {
                parameter_id: "Sweat001",
                tool_name: "face_sweat_01",
                description: "Show the first sweat drop.",
            },
            PoseSpec {
                parameter_id: "Sweat002",
                tool_name: "face_sweat_02",
                description: "Show the second sweat drop.",
            },
        ],
    },
    GroupSpec {
        id: "eyes",
        conflicts: &[],
        poses: &[
            PoseSpec {
                parameter_id: "ParamEyeLOpen",
                tool_name: "left_eye_open",
                description: "How far the left eye is open.",
            },
            PoseSpec {
                parameter_id: "ParamEyeROpen",
                tool_name: "right_eye_open",
                description: "How far the right eye is open.",
            },
            PoseSpec {
                parameter_id: "ParamEyeLSmile",
                tool_name: "left_eye_smile",
                description: "Smiling left eye.",
            },
            PoseSpec {
                parameter_id: "ParamEyeRSmile",
                tool_name: "right_eye_smile",
                description: "Smiling right eye.",
            },
        ],
    },
];
