pub mod config;

// Gesture classification
pub mod keypoint_query;
pub mod gesture_classifier;

// Consumers of the per-frame keypoints and gestures
pub mod skeleton_renderer;
pub mod gesture_controller;
pub mod gesture_session;
