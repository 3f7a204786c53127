use crate::core::config::Config;
use crate::core::gesture_classifier::{primary_gesture, GestureClassifier};
use crate::models::pose::{DetectedGesture, Frame, PoseError, PoseResult};
use crate::platform::pose::PoseSource;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use uuid::Uuid;

const UPDATE_CHANNEL_CAPACITY: usize = 100;

// ==============================================================================
// Updates
// ==============================================================================

/// Gestures recognized in one tick of the detection loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureUpdate {
    pub session_id: String,
    pub timestamp_ms: i64, // Unix epoch
    pub keypoint_count: usize,
    pub gestures: Vec<DetectedGesture>,
    pub primary: Option<DetectedGesture>,
}

impl GestureUpdate {
    pub fn from_frame(session_id: &str, classifier: &GestureClassifier, frame: Option<&Frame>) -> Self {
        let gestures = classifier.classify(frame);
        let primary = primary_gesture(&gestures).copied();

        Self {
            session_id: session_id.to_string(),
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            keypoint_count: frame.map_or(0, Frame::len),
            gestures,
            primary,
        }
    }
}

// ==============================================================================
// Gesture Session
// ==============================================================================

/// Polls a pose source at a fixed rate and publishes classified gestures
pub struct GestureSession {
    classifier: Arc<GestureClassifier>,
    target_fps: u32,
    current_session_id: Arc<RwLock<Option<String>>>,
    is_tracking: Arc<RwLock<bool>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl GestureSession {
    pub fn new(classifier: GestureClassifier, target_fps: u32) -> Self {
        Self {
            classifier: Arc::new(classifier),
            target_fps: target_fps.max(1),
            current_session_id: Arc::new(RwLock::new(None)),
            is_tracking: Arc::new(RwLock::new(false)),
            worker: Mutex::new(None),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(GestureClassifier::new(config.gestures.clone()), config.target_fps)
    }

    pub fn classifier(&self) -> &GestureClassifier {
        &self.classifier
    }

    /// Start polling `source`; updates arrive on the returned channel
    ///
    /// The loop ends when the source is exhausted, the receiver is dropped,
    /// or `stop_tracking` is called.
    pub async fn start_tracking<S>(&self, source: S) -> PoseResult<mpsc::Receiver<GestureUpdate>>
    where
        S: PoseSource + 'static,
    {
        let mut is_tracking = self.is_tracking.write().await;
        if *is_tracking {
            return Err(PoseError::AlreadyRunning);
        }

        if !source.is_initialized() {
            warn!(model = %source.get_model_info(), "Pose source has no loaded model");
        }

        let session_id = Uuid::new_v4().to_string();
        *self.current_session_id.write().await = Some(session_id.clone());

        let (tx, rx) = mpsc::channel::<GestureUpdate>(UPDATE_CHANNEL_CAPACITY);
        *is_tracking = true;

        let period = Duration::from_secs_f64(1.0 / self.target_fps as f64);
        let handle = tokio::spawn(Self::run_detection_loop(
            source,
            self.classifier.clone(),
            session_id.clone(),
            period,
            tx,
            self.is_tracking.clone(),
            self.current_session_id.clone(),
        ));
        *self.worker.lock().await = Some(handle);

        info!(session_id = %session_id, fps = self.target_fps, "Started gesture tracking");
        Ok(rx)
    }

    /// Stop the detection loop; a no-op when idle
    pub async fn stop_tracking(&self) -> PoseResult<()> {
        let mut is_tracking = self.is_tracking.write().await;
        if !*is_tracking {
            return Ok(());
        }

        if let Some(handle) = self.worker.lock().await.take() {
            handle.abort();
        }

        *is_tracking = false;
        *self.current_session_id.write().await = None;

        info!("Stopped gesture tracking");
        Ok(())
    }

    pub async fn is_tracking(&self) -> bool {
        *self.is_tracking.read().await
    }

    pub async fn session_id(&self) -> Option<String> {
        self.current_session_id.read().await.clone()
    }

    /// Classify a single frame outside the loop
    pub async fn process_frame(&self, frame: Option<&Frame>) -> GestureUpdate {
        let session_id = self.session_id().await.unwrap_or_default();
        GestureUpdate::from_frame(&session_id, &self.classifier, frame)
    }

    async fn run_detection_loop<S: PoseSource>(
        mut source: S,
        classifier: Arc<GestureClassifier>,
        session_id: String,
        period: Duration,
        tx: mpsc::Sender<GestureUpdate>,
        is_tracking: Arc<RwLock<bool>>,
        current_session_id: Arc<RwLock<Option<String>>>,
    ) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut frames_processed: u64 = 0;

        loop {
            ticker.tick().await;

            let frame = match source.next_frame().await {
                Ok(frame) => frame,
                Err(PoseError::SourceExhausted) => {
                    info!(session_id = %session_id, frames_processed, "Pose source exhausted");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "Error during pose detection");
                    continue;
                }
            };

            let update = GestureUpdate::from_frame(&session_id, &classifier, frame.as_ref());
            if let Some(primary) = &update.primary {
                debug!(gesture = %primary.name, confidence = primary.confidence, "Primary gesture");
            }

            if tx.send(update).await.is_err() {
                debug!(session_id = %session_id, "Update receiver dropped");
                break;
            }
            frames_processed += 1;
        }

        // Only clear state that still belongs to this session
        let mut tracking = is_tracking.write().await;
        let mut current = current_session_id.write().await;
        if current.as_deref() == Some(session_id.as_str()) {
            *current = None;
            *tracking = false;
        }
    }
}
