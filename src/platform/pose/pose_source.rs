// Pose source abstraction
// Supplies one keypoint frame per tick to the gesture session. Live model
// backends implement `PoseSource`; recorded sessions replay through
// `ReplayPoseSource`.

use crate::models::pose::{Frame, PoseError, PoseResult};
use async_trait::async_trait;
use std::path::Path;
use tracing::info;

/// Produces keypoint frames on demand
#[async_trait]
pub trait PoseSource: Send {
    /// Next frame, or `None` when no pose is available this tick
    ///
    /// Returns `PoseError::SourceExhausted` once the source will never yield again.
    async fn next_frame(&mut self) -> PoseResult<Option<Frame>>;

    /// Check if the underlying model is loaded
    fn is_initialized(&self) -> bool;

    /// Get model info
    fn get_model_info(&self) -> String;
}

// ==============================================================================
// Replay (recorded MoveNet output)
// ==============================================================================

/// Replays recorded frames in order, optionally looping
pub struct ReplayPoseSource {
    frames: Vec<Frame>,
    position: usize,
    looped: bool,
}

impl ReplayPoseSource {
    pub fn new(frames: Vec<Frame>, looped: bool) -> Self {
        Self {
            frames,
            position: 0,
            looped,
        }
    }

    /// Parse a JSON array of frames, each an array of MoveNet keypoints
    pub fn from_json_str(json: &str, looped: bool) -> PoseResult<Self> {
        let frames: Vec<Frame> =
            serde_json::from_str(json).map_err(|e| PoseError::InvalidFrame(e.to_string()))?;
        Ok(Self::new(frames, looped))
    }

    pub async fn from_json_file(path: impl AsRef<Path>, looped: bool) -> PoseResult<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            PoseError::SourceFailed(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let source = Self::from_json_str(&contents, looped)?;
        info!(path = %path.display(), frames = source.len(), "Loaded pose recording");
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[async_trait]
impl PoseSource for ReplayPoseSource {
    async fn next_frame(&mut self) -> PoseResult<Option<Frame>> {
        if self.position >= self.frames.len() {
            if !self.looped || self.frames.is_empty() {
                return Err(PoseError::SourceExhausted);
            }
            self.position = 0;
        }

        let frame = self.frames[self.position].clone();
        self.position += 1;
        Ok(Some(frame))
    }

    fn is_initialized(&self) -> bool {
        true
    }

    fn get_model_info(&self) -> String {
        format!(
            "Replay pose source - {} frames, looped: {}",
            self.frames.len(),
            self.looped
        )
    }
}

// ==============================================================================
// Dummy Implementation (no inference backend)
// ==============================================================================

/// Never yields a pose
#[derive(Debug, Default)]
pub struct DummyPoseSource;

#[async_trait]
impl PoseSource for DummyPoseSource {
    async fn next_frame(&mut self) -> PoseResult<Option<Frame>> {
        Ok(None)
    }

    fn is_initialized(&self) -> bool {
        false
    }

    fn get_model_info(&self) -> String {
        "Dummy pose source (no inference)".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pose::{BodyKeypoint, Keypoint};

    fn frame(x: f32) -> Frame {
        Frame::new(vec![Keypoint::scored(BodyKeypoint::Nose, x, 0.0, 0.9)])
    }

    #[tokio::test]
    async fn test_replay_in_order_then_exhausted() {
        let mut source = ReplayPoseSource::new(vec![frame(1.0), frame(2.0)], false);

        let first = source.next_frame().await.unwrap().unwrap();
        let second = source.next_frame().await.unwrap().unwrap();
        assert_eq!(first.get("nose").unwrap().x, 1.0);
        assert_eq!(second.get("nose").unwrap().x, 2.0);
        assert!(matches!(source.next_frame().await, Err(PoseError::SourceExhausted)));
    }

    #[tokio::test]
    async fn test_replay_loops() {
        let mut source = ReplayPoseSource::new(vec![frame(1.0), frame(2.0)], true);
        for _ in 0..2 {
            source.next_frame().await.unwrap();
        }
        let wrapped = source.next_frame().await.unwrap().unwrap();
        assert_eq!(wrapped.get("nose").unwrap().x, 1.0);
    }

    #[tokio::test]
    async fn test_empty_looped_replay_is_exhausted() {
        let mut source = ReplayPoseSource::new(Vec::new(), true);
        assert!(source.is_empty());
        assert!(matches!(source.next_frame().await, Err(PoseError::SourceExhausted)));
    }

    #[tokio::test]
    async fn test_replay_from_json() {
        let json = r#"[
            [{"name": "nose", "x": 10, "y": 20, "score": 0.5}],
            []
        ]"#;
        let mut source = ReplayPoseSource::from_json_str(json, false).unwrap();
        assert_eq!(source.len(), 2);
        assert_eq!(source.next_frame().await.unwrap().unwrap().len(), 1);
        assert!(source.next_frame().await.unwrap().unwrap().is_empty());

        assert!(matches!(
            ReplayPoseSource::from_json_str("[1, 2]", false),
            Err(PoseError::InvalidFrame(_))
        ));
    }

    #[tokio::test]
    async fn test_replay_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recording.json");
        std::fs::write(&path, r#"[[{"name": "left_wrist", "x": 1, "y": 2}]]"#).unwrap();

        let source = ReplayPoseSource::from_json_file(&path, false).await.unwrap();
        assert_eq!(source.len(), 1);
        assert!(source.is_initialized());

        let missing = ReplayPoseSource::from_json_file(dir.path().join("nope.json"), false).await;
        assert!(matches!(missing, Err(PoseError::SourceFailed(_))));
    }

    #[tokio::test]
    async fn test_dummy_source() {
        let mut source = DummyPoseSource;
        assert!(source.next_frame().await.unwrap().is_none());
        assert!(!source.is_initialized());
        assert!(source.get_model_info().contains("Dummy"));
    }
}
