pub mod core;
pub mod models;
pub mod platform;

use crate::core::config::{Config, ConfigResult};
use crate::core::gesture_classifier::{primary_gesture, GestureClassifier};
use crate::core::gesture_controller::ControlledElement;
use crate::core::skeleton_renderer::SkeletonRenderer;
use crate::models::pose::{DetectedGesture, Frame};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a tracing subscriber honouring `RUST_LOG` (default `info`)
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(env_filter)
        .try_init();
}

/// Result of feeding one frame through the application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameOutcome {
    pub gestures: Vec<DetectedGesture>,
    pub primary: Option<DetectedGesture>,
    pub element: ControlledElement,
}

// Application state
pub struct AppState {
    config: Mutex<Config>,
    config_path: PathBuf,
    element: Mutex<ControlledElement>,
}

impl AppState {
    pub fn new(config: Config, config_path: PathBuf) -> Self {
        Self {
            config: Mutex::new(config),
            config_path,
            element: Mutex::new(ControlledElement::new()),
        }
    }

    /// Build state from the configuration file in the user's home directory
    pub fn load() -> ConfigResult<Self> {
        let config_path = Config::get_config_path()?;
        let config = Config::load_from(&config_path)?;
        Ok(Self::new(config, config_path))
    }

    pub fn get_config(&self) -> Result<Config, String> {
        let config = self
            .config
            .lock()
            .map_err(|e| format!("Failed to lock config: {}", e))?;

        Ok(config.clone())
    }

    pub fn update_config(&self, config: Config) -> Result<(), String> {
        config
            .validate()
            .map_err(|e| format!("Invalid configuration: {}", e))?;

        config
            .save_to(&self.config_path)
            .map_err(|e| format!("Failed to save config: {}", e))?;

        let mut current_config = self
            .config
            .lock()
            .map_err(|e| format!("Failed to lock config: {}", e))?;

        *current_config = config;
        Ok(())
    }

    pub fn reset_config(&self) -> Result<Config, String> {
        let default_config = Config::default();
        self.update_config(default_config.clone())?;
        Ok(default_config)
    }

    /// Classify a frame and move the controlled element by its primary gesture
    pub fn handle_frame(&self, frame: Option<&Frame>) -> Result<FrameOutcome, String> {
        let classifier = GestureClassifier::new(self.get_config()?.gestures);
        let gestures = classifier.classify(frame);
        let primary = primary_gesture(&gestures).copied();

        let mut element = self
            .element
            .lock()
            .map_err(|e| format!("Failed to lock element: {}", e))?;
        element.apply(primary.as_ref());

        Ok(FrameOutcome {
            gestures,
            primary,
            element: element.clone(),
        })
    }

    /// Draw the skeleton overlay at the configured frame size
    pub fn render_overlay(&self, frame: &Frame) -> Result<RgbaImage, String> {
        let config = self.get_config()?;
        let renderer = SkeletonRenderer::new(config.render);
        Ok(renderer.render_overlay(frame, config.frame_width, config.frame_height))
    }
}
