// Data models for 2-D body keypoints, frames, and detected gestures

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Score a keypoint must exceed to count as present; the raised-hands and overlay default
pub const DEFAULT_MIN_SCORE: f32 = 0.3;

// ==============================================================================
// Body Keypoints (17-point MoveNet model)
// ==============================================================================

/// MoveNet body keypoint vocabulary (17 total)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKeypoint {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl BodyKeypoint {
    pub const ALL: [BodyKeypoint; 17] = [
        BodyKeypoint::Nose,
        BodyKeypoint::LeftEye,
        BodyKeypoint::RightEye,
        BodyKeypoint::LeftEar,
        BodyKeypoint::RightEar,
        BodyKeypoint::LeftShoulder,
        BodyKeypoint::RightShoulder,
        BodyKeypoint::LeftElbow,
        BodyKeypoint::RightElbow,
        BodyKeypoint::LeftWrist,
        BodyKeypoint::RightWrist,
        BodyKeypoint::LeftHip,
        BodyKeypoint::RightHip,
        BodyKeypoint::LeftKnee,
        BodyKeypoint::RightKnee,
        BodyKeypoint::LeftAnkle,
        BodyKeypoint::RightAnkle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BodyKeypoint::Nose => "nose",
            BodyKeypoint::LeftEye => "left_eye",
            BodyKeypoint::RightEye => "right_eye",
            BodyKeypoint::LeftEar => "left_ear",
            BodyKeypoint::RightEar => "right_ear",
            BodyKeypoint::LeftShoulder => "left_shoulder",
            BodyKeypoint::RightShoulder => "right_shoulder",
            BodyKeypoint::LeftElbow => "left_elbow",
            BodyKeypoint::RightElbow => "right_elbow",
            BodyKeypoint::LeftWrist => "left_wrist",
            BodyKeypoint::RightWrist => "right_wrist",
            BodyKeypoint::LeftHip => "left_hip",
            BodyKeypoint::RightHip => "right_hip",
            BodyKeypoint::LeftKnee => "left_knee",
            BodyKeypoint::RightKnee => "right_knee",
            BodyKeypoint::LeftAnkle => "left_ankle",
            BodyKeypoint::RightAnkle => "right_ankle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kp| kp.as_str() == name)
    }
}

/// Anatomically adjacent keypoint pairs drawn as bones
pub const SKELETON_CONNECTIONS: [(BodyKeypoint, BodyKeypoint); 16] = [
    (BodyKeypoint::Nose, BodyKeypoint::LeftEye),
    (BodyKeypoint::Nose, BodyKeypoint::RightEye),
    (BodyKeypoint::LeftEye, BodyKeypoint::LeftEar),
    (BodyKeypoint::RightEye, BodyKeypoint::RightEar),
    (BodyKeypoint::LeftShoulder, BodyKeypoint::RightShoulder),
    (BodyKeypoint::LeftShoulder, BodyKeypoint::LeftElbow),
    (BodyKeypoint::RightShoulder, BodyKeypoint::RightElbow),
    (BodyKeypoint::LeftElbow, BodyKeypoint::LeftWrist),
    (BodyKeypoint::RightElbow, BodyKeypoint::RightWrist),
    (BodyKeypoint::LeftShoulder, BodyKeypoint::LeftHip),
    (BodyKeypoint::RightShoulder, BodyKeypoint::RightHip),
    (BodyKeypoint::LeftHip, BodyKeypoint::RightHip),
    (BodyKeypoint::LeftHip, BodyKeypoint::LeftKnee),
    (BodyKeypoint::RightHip, BodyKeypoint::RightKnee),
    (BodyKeypoint::LeftKnee, BodyKeypoint::LeftAnkle),
    (BodyKeypoint::RightKnee, BodyKeypoint::RightAnkle),
];

// ==============================================================================
// Keypoint
// ==============================================================================

/// A named 2-D landmark in source-video pixel coordinates (y grows downward)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub name: String,
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>, // None when the model could not estimate the point
}

impl Keypoint {
    pub fn new(name: impl Into<String>, x: f32, y: f32, score: Option<f32>) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            score,
        }
    }

    pub fn scored(kind: BodyKeypoint, x: f32, y: f32, score: f32) -> Self {
        Self::new(kind.as_str(), x, y, Some(score))
    }
}

// ==============================================================================
// Frame
// ==============================================================================

/// All keypoints of a single person for one instant, indexed by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Keypoint>", into = "Vec<Keypoint>")]
pub struct Frame {
    keypoints: Vec<Keypoint>,
    index: HashMap<String, usize>,
}

impl Frame {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        let mut index = HashMap::with_capacity(keypoints.len());
        for (i, keypoint) in keypoints.iter().enumerate() {
            // First occurrence wins
            index.entry(keypoint.name.clone()).or_insert(i);
        }
        Self { keypoints, index }
    }

    /// Parse a frame from the JSON keypoint array a MoveNet pose carries
    pub fn from_json(json: &str) -> PoseResult<Self> {
        serde_json::from_str(json).map_err(|e| PoseError::InvalidFrame(e.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&Keypoint> {
        self.index.get(name).map(|&i| &self.keypoints[i])
    }

    pub fn keypoint(&self, kind: BodyKeypoint) -> Option<&Keypoint> {
        self.get(kind.as_str())
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

impl From<Vec<Keypoint>> for Frame {
    fn from(keypoints: Vec<Keypoint>) -> Self {
        Self::new(keypoints)
    }
}

impl From<Frame> for Vec<Keypoint> {
    fn from(frame: Frame) -> Self {
        frame.keypoints
    }
}

// ==============================================================================
// Gestures
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureLabel {
    RaisedHands,
    TPose,
    PointingRight,
    PointingLeft,
}

impl GestureLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureLabel::RaisedHands => "raised_hands",
            GestureLabel::TPose => "t_pose",
            GestureLabel::PointingRight => "pointing_right",
            GestureLabel::PointingLeft => "pointing_left",
        }
    }

    /// Human readable form, e.g. "raised hands"
    pub fn display_name(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl std::fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A gesture recognized in one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedGesture {
    pub name: GestureLabel,
    pub confidence: f32, // Mean score of the contributing keypoints
}

// ==============================================================================
// Configuration
// ==============================================================================

/// Per-detector gates and geometric limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub raised_hands_min_score: f32,   // default: 0.3
    pub t_pose_min_score: f32,         // default: 0.2
    pub t_pose_min_arm_angle: f32,     // default: 160 degrees
    pub t_pose_max_wrist_offset: f32,  // default: 30 px between wrist and shoulder height
    pub pointing_min_score: f32,       // default: 0.25
    pub pointing_min_arm_angle: f32,   // default: 150 degrees
    pub pointing_max_relaxed_angle: f32, // default: 120 degrees for the other arm
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            raised_hands_min_score: DEFAULT_MIN_SCORE,
            t_pose_min_score: 0.2,
            t_pose_min_arm_angle: 160.0,
            t_pose_max_wrist_offset: 30.0,
            pointing_min_score: 0.25,
            pointing_min_arm_angle: 150.0,
            pointing_max_relaxed_angle: 120.0,
        }
    }
}

impl GestureConfig {
    pub fn validate(&self) -> PoseResult<()> {
        let scores = [
            ("raised_hands_min_score", self.raised_hands_min_score),
            ("t_pose_min_score", self.t_pose_min_score),
            ("pointing_min_score", self.pointing_min_score),
        ];
        for (field, value) in scores {
            if !(0.0..=1.0).contains(&value) {
                return Err(PoseError::InvalidConfig(format!(
                    "{}: {}. Must be between 0.0 and 1.0",
                    field, value
                )));
            }
        }

        let angles = [
            ("t_pose_min_arm_angle", self.t_pose_min_arm_angle),
            ("pointing_min_arm_angle", self.pointing_min_arm_angle),
            ("pointing_max_relaxed_angle", self.pointing_max_relaxed_angle),
        ];
        for (field, value) in angles {
            if !(0.0..=180.0).contains(&value) {
                return Err(PoseError::InvalidConfig(format!(
                    "{}: {}. Must be between 0 and 180 degrees",
                    field, value
                )));
            }
        }

        if self.t_pose_max_wrist_offset.is_nan() || self.t_pose_max_wrist_offset < 0.0 {
            return Err(PoseError::InvalidConfig(format!(
                "t_pose_max_wrist_offset: {}. Must not be negative",
                self.t_pose_max_wrist_offset
            )));
        }

        Ok(())
    }
}

// ==============================================================================
// Error Types
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PoseError {
    #[error("Pose source not initialized")]
    NotInitialized,

    #[error("Gesture tracking already running")]
    AlreadyRunning,

    #[error("Pose source exhausted")]
    SourceExhausted,

    #[error("Pose source failed: {0}")]
    SourceFailed(String),

    #[error("Invalid frame data: {0}")]
    InvalidFrame(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type PoseResult<T> = Result<T, PoseError>;
