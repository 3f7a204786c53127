use crate::core::skeleton_renderer::RenderConfig;
use crate::models::pose::GestureConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine home directory")]
    NoHomeDir,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Detector score gates and geometric limits
    pub gestures: GestureConfig,
    /// Skeleton overlay appearance
    pub render: RenderConfig,
    /// How often the detection loop polls the pose source
    pub target_fps: u32,
    /// Camera frame size in pixels
    pub frame_width: u32,
    pub frame_height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gestures: GestureConfig::default(),
            render: RenderConfig::default(),
            target_fps: 30,
            frame_width: 640,
            frame_height: 480,
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it with defaults if missing
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load configuration from `path`, creating it with defaults if missing
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::get_config_path()?)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        self.gestures
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        self.render.validate().map_err(ConfigError::Invalid)?;

        if self.target_fps == 0 || self.target_fps > 60 {
            return Err(ConfigError::Invalid(format!(
                "Invalid target FPS: {}. Must be between 1 and 60",
                self.target_fps
            )));
        }

        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "Invalid frame size: {}x{}",
                self.frame_width, self.frame_height
            )));
        }

        Ok(())
    }

    /// Reset to default configuration
    pub fn reset() -> ConfigResult<Self> {
        let config = Self::default();
        config.save()?;
        Ok(config)
    }

    /// Get the configuration file path
    pub fn get_config_path() -> ConfigResult<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| ConfigError::NoHomeDir)?;

        let mut path = PathBuf::from(home);
        path.push(".pose_gestures");
        path.push("config");
        path.push("settings.json");

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.target_fps, 30);
        assert_eq!(config.frame_width, 640);
        assert_eq!(config.frame_height, 480);
        assert_eq!(config.gestures, GestureConfig::default());
        assert_eq!(config.render.min_score, 0.3);
        assert!(config.render.mirror);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.target_fps = 0;
        assert!(config.validate().is_err());
        config.target_fps = 120;
        assert!(config.validate().is_err());
        config.target_fps = 30;

        config.frame_width = 0;
        assert!(config.validate().is_err());
        config.frame_width = 640;

        config.gestures.raised_hands_min_score = -0.1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        config.gestures.raised_hands_min_score = 0.3;

        config.render.line_width = 0;
        assert!(config.validate().is_err());
        config.render.line_width = 2;

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"target_fps": 15}"#).unwrap();
        assert_eq!(config.target_fps, 15);
        assert_eq!(config.gestures, GestureConfig::default());
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join("settings.json");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut config = Config::default();
        config.target_fps = 24;
        config.gestures.t_pose_max_wrist_offset = 45.0;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"target_fps": 0}"#).unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Invalid(_))));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_save_refuses_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut config = Config::default();
        config.target_fps = 0;
        assert!(config.save_to(&path).is_err());
        assert!(!path.exists());
    }
}
