// Gesture-controlled element - moves an on-screen marker from the primary gesture

use crate::models::pose::{DetectedGesture, GestureLabel};
use serde::{Deserialize, Serialize};

const STEP: f32 = 5.0;
const MIN_POSITION: f32 = 10.0;
const MAX_POSITION: f32 = 90.0;

pub const IDLE_COLOR: &str = "#3f51b5";

/// Position (percent of the playground) and color of the controlled element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlledElement {
    pub x: f32,
    pub y: f32,
    pub color: String,
}

impl Default for ControlledElement {
    fn default() -> Self {
        Self {
            x: 50.0,
            y: 50.0,
            color: IDLE_COLOR.to_string(),
        }
    }
}

impl ControlledElement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nudge the element one step for the primary gesture; no gesture leaves it unchanged
    pub fn apply(&mut self, primary: Option<&DetectedGesture>) {
        let Some(gesture) = primary else {
            return;
        };

        match gesture.name {
            GestureLabel::PointingRight => self.x = (self.x + STEP).min(MAX_POSITION),
            GestureLabel::PointingLeft => self.x = (self.x - STEP).max(MIN_POSITION),
            GestureLabel::RaisedHands => self.y = (self.y - STEP).max(MIN_POSITION),
            GestureLabel::TPose => self.y = (self.y + STEP).min(MAX_POSITION),
        }
        self.color = gesture_color(gesture.name).to_string();
    }
}

/// Element color shown while a gesture is active
pub fn gesture_color(label: GestureLabel) -> &'static str {
    match label {
        GestureLabel::PointingRight => "#4caf50",
        GestureLabel::PointingLeft => "#2196f3",
        GestureLabel::RaisedHands => "#ff9800",
        GestureLabel::TPose => "#e91e63",
    }
}
