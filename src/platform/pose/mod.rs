// Pose source integration
// Provides the frame-supplier trait and its replay/dummy implementations

pub mod pose_source;

pub use pose_source::{DummyPoseSource, PoseSource, ReplayPoseSource};
