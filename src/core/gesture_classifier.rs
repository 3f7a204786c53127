// Gesture classification - fixed geometric rules applied to a single keypoint frame
//
// Keypoint coordinates come from the unmirrored camera image while the user
// sees a mirrored preview, so every left/right test is inverted: the user's
// right arm pointing to their right moves the wrist toward smaller x.

use crate::core::keypoint_query::{all_have_confidence, angle, by_name, is_above, is_left_of};
use crate::models::pose::{BodyKeypoint, DetectedGesture, Frame, GestureConfig, GestureLabel, Keypoint};
use tracing::debug;

/// A single gesture rule
pub type Detector = fn(&Frame, &GestureConfig) -> Option<DetectedGesture>;

/// Registered detectors, in output order
pub const DETECTORS: [(GestureLabel, Detector); 4] = [
    (GestureLabel::RaisedHands, detect_raised_hands as Detector),
    (GestureLabel::TPose, detect_t_pose as Detector),
    (GestureLabel::PointingRight, detect_pointing_right as Detector),
    (GestureLabel::PointingLeft, detect_pointing_left as Detector),
];

// ==============================================================================
// Arms
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Shoulder, elbow and wrist of one side, each possibly missing
struct Arm<'a> {
    shoulder: Option<&'a Keypoint>,
    elbow: Option<&'a Keypoint>,
    wrist: Option<&'a Keypoint>,
}

impl<'a> Arm<'a> {
    fn of(frame: &'a Frame, side: Side) -> Self {
        let (shoulder, elbow, wrist) = match side {
            Side::Left => (
                BodyKeypoint::LeftShoulder,
                BodyKeypoint::LeftElbow,
                BodyKeypoint::LeftWrist,
            ),
            Side::Right => (
                BodyKeypoint::RightShoulder,
                BodyKeypoint::RightElbow,
                BodyKeypoint::RightWrist,
            ),
        };
        Self {
            shoulder: joint(frame, shoulder),
            elbow: joint(frame, elbow),
            wrist: joint(frame, wrist),
        }
    }

    fn joints(&self) -> [Option<&'a Keypoint>; 3] {
        [self.shoulder, self.elbow, self.wrist]
    }

    /// Shoulder-elbow-wrist angle; 0 if any joint is missing
    fn angle(&self) -> f32 {
        angle(self.shoulder, self.elbow, self.wrist)
    }
}

fn joint(frame: &Frame, kind: BodyKeypoint) -> Option<&Keypoint> {
    by_name(frame, kind.as_str())
}

fn mean_score(keypoints: &[&Keypoint]) -> f32 {
    if keypoints.is_empty() {
        return 0.0;
    }
    let total: f32 = keypoints.iter().map(|kp| kp.score.unwrap_or(0.0)).sum();
    total / keypoints.len() as f32
}

// ==============================================================================
// Detectors
// ==============================================================================

/// Both wrists above their shoulders
pub fn detect_raised_hands(frame: &Frame, config: &GestureConfig) -> Option<DetectedGesture> {
    let left_shoulder = joint(frame, BodyKeypoint::LeftShoulder);
    let right_shoulder = joint(frame, BodyKeypoint::RightShoulder);
    let left_wrist = joint(frame, BodyKeypoint::LeftWrist);
    let right_wrist = joint(frame, BodyKeypoint::RightWrist);

    if !all_have_confidence(
        &[left_shoulder, right_shoulder, left_wrist, right_wrist],
        config.raised_hands_min_score,
    ) {
        return None;
    }
    let (left_shoulder, right_shoulder, left_wrist, right_wrist) =
        (left_shoulder?, right_shoulder?, left_wrist?, right_wrist?);

    let left_raised = is_above(left_wrist, left_shoulder);
    let right_raised = is_above(right_wrist, right_shoulder);

    if left_raised && right_raised {
        Some(DetectedGesture {
            name: GestureLabel::RaisedHands,
            confidence: mean_score(&[left_shoulder, right_shoulder, left_wrist, right_wrist]),
        })
    } else {
        None
    }
}

/// Both arms straight and held out at shoulder height
///
/// Uses a looser score gate than the other detectors because it needs six
/// joints at once.
pub fn detect_t_pose(frame: &Frame, config: &GestureConfig) -> Option<DetectedGesture> {
    let left = Arm::of(frame, Side::Left);
    let right = Arm::of(frame, Side::Right);

    let [ls, le, lw] = left.joints();
    let [rs, re, rw] = right.joints();
    if !all_have_confidence(&[ls, rs, le, re, lw, rw], config.t_pose_min_score) {
        return None;
    }
    let (ls, rs, le, re, lw, rw) = (ls?, rs?, le?, re?, lw?, rw?);

    let arms_extended = left.angle() > config.t_pose_min_arm_angle
        && right.angle() > config.t_pose_min_arm_angle;

    let left_at_shoulder_height = (lw.y - ls.y).abs() < config.t_pose_max_wrist_offset;
    let right_at_shoulder_height = (rw.y - rs.y).abs() < config.t_pose_max_wrist_offset;

    if arms_extended && left_at_shoulder_height && right_at_shoulder_height {
        Some(DetectedGesture {
            name: GestureLabel::TPose,
            confidence: mean_score(&[ls, rs, le, re, lw, rw]),
        })
    } else {
        None
    }
}

/// Right arm extended toward the user's right, left arm relaxed
pub fn detect_pointing_right(frame: &Frame, config: &GestureConfig) -> Option<DetectedGesture> {
    detect_pointing(frame, config, Side::Right)
}

/// Left arm extended toward the user's left, right arm relaxed
pub fn detect_pointing_left(frame: &Frame, config: &GestureConfig) -> Option<DetectedGesture> {
    detect_pointing(frame, config, Side::Left)
}

fn detect_pointing(frame: &Frame, config: &GestureConfig, side: Side) -> Option<DetectedGesture> {
    let arm = Arm::of(frame, side);
    if !all_have_confidence(&arm.joints(), config.pointing_min_score) {
        return None;
    }
    let (shoulder, elbow, wrist) = (arm.shoulder?, arm.elbow?, arm.wrist?);

    let arm_angle = arm.angle();
    let is_extended = arm_angle > config.pointing_min_arm_angle;

    // Mirrored preview: pointing right moves the wrist to smaller x, pointing left to larger x
    let is_pointing = match side {
        Side::Right => is_left_of(wrist, elbow),
        Side::Left => is_left_of(elbow, wrist),
    };

    // The other arm is not confidence gated; if it is missing its angle is 0 and counts as relaxed
    let other_angle = Arm::of(frame, side.opposite()).angle();
    let other_relaxed = other_angle < config.pointing_max_relaxed_angle;

    debug!(
        side = ?side,
        arm_angle,
        is_extended,
        is_pointing,
        other_angle,
        other_relaxed,
        elbow_x = elbow.x,
        wrist_x = wrist.x,
        "Pointing detection (mirrored)"
    );

    if is_extended && is_pointing && other_relaxed {
        let name = match side {
            Side::Right => GestureLabel::PointingRight,
            Side::Left => GestureLabel::PointingLeft,
        };
        Some(DetectedGesture {
            name,
            confidence: mean_score(&[shoulder, elbow, wrist]),
        })
    } else {
        None
    }
}

// ==============================================================================
// Classifier
// ==============================================================================

/// Runs every registered detector against a frame
#[derive(Debug, Clone, Default)]
pub struct GestureClassifier {
    config: GestureConfig,
}

impl GestureClassifier {
    pub fn new(config: GestureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Detect all gestures present in the frame, in registration order
    ///
    /// A missing or empty frame yields no gestures.
    pub fn classify(&self, frame: Option<&Frame>) -> Vec<DetectedGesture> {
        let frame = match frame {
            Some(frame) if !frame.is_empty() => frame,
            _ => return Vec::new(),
        };

        DETECTORS
            .iter()
            .filter_map(|(_, detector)| detector(frame, &self.config))
            .collect()
    }
}

/// Detect gestures with the default thresholds
pub fn detect_gestures(frame: Option<&Frame>) -> Vec<DetectedGesture> {
    GestureClassifier::default().classify(frame)
}

/// Highest-confidence gesture; on a tie the earlier one wins
pub fn primary_gesture(gestures: &[DetectedGesture]) -> Option<&DetectedGesture> {
    gestures.iter().fold(None, |best, current| match best {
        Some(best) if current.confidence <= best.confidence => Some(best),
        _ => Some(current),
    })
}
