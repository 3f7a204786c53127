// Replay a recorded keypoint stream and log the recognized gestures.
//
// Usage: cargo run --example replay_gestures -- recording.json [--loop]
//
// The recording is a JSON array of frames, each frame an array of
// `{ "name": "left_wrist", "x": 120.0, "y": 80.0, "score": 0.9 }` keypoints.

use pose_gestures_lib::core::config::Config;
use pose_gestures_lib::core::gesture_controller::ControlledElement;
use pose_gestures_lib::core::gesture_session::GestureSession;
use pose_gestures_lib::init_tracing;
use pose_gestures_lib::platform::pose::ReplayPoseSource;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or("usage: replay_gestures <recording.json> [--loop]")?;
    let looped = args.any(|arg| arg == "--loop");

    let config = Config::load().unwrap_or_else(|e| {
        info!(error = %e, "Using default configuration");
        Config::default()
    });

    let source = ReplayPoseSource::from_json_file(&path, looped).await?;

    let session = GestureSession::from_config(&config);
    let mut updates = session.start_tracking(source).await?;
    let mut element = ControlledElement::new();

    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(update) = update else { break };
                element.apply(update.primary.as_ref());
                match update.primary {
                    Some(primary) => info!(
                        gesture = %primary.name,
                        confidence = primary.confidence,
                        x = element.x,
                        y = element.y,
                        color = %element.color,
                        "Gesture"
                    ),
                    None => info!(keypoints = update.keypoint_count, "No gesture"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                session.stop_tracking().await?;
                break;
            }
        }
    }

    info!(x = element.x, y = element.y, "Replay finished");
    Ok(())
}
