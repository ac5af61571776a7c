//! Configuration management for the measurement pipeline

use crate::{
    calibration::ScaleMode,
    constants::{
        DEFAULT_DETECTION_TIMEOUT_SECS, DEFAULT_LANDMARK_INPUT_SIZE, DEFAULT_MIN_POSE_PRESENCE, DEFAULT_MODEL_PATH,
        MIN_BODY_HEIGHT_PIXELS,
    },
    measurement::RatioTable,
    model_asset::{CachedDownload, LocalModel, ModelSource},
    pose_detection::DetectionSettings,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model configuration
    pub model: ModelConfig,

    /// Pose detection configuration
    pub detection: DetectionConfig,

    /// Scale calibration configuration
    pub calibration: CalibrationConfig,

    /// Measurement ratio table
    pub ratios: RatioTable,
}

/// Pose model location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the pose landmark ONNX model
    pub path: PathBuf,

    /// Where to fetch the model from when it is missing
    pub url: Option<String>,

    /// Fetch the model on first use when `url` is set
    pub auto_download: bool,
}

/// Pose detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum pose presence probability (0.0-1.0)
    pub min_pose_presence: f32,

    /// Square input size used when the model does not declare one
    pub input_size: i32,

    /// Limit for detecting both photos, in seconds (0 disables)
    pub timeout_secs: f64,
}

/// Scale calibration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Smallest nose-to-ankle span, in pixels, accepted as a scale reference
    pub min_body_height_pixels: f64,

    /// Which detected height each image is measured against
    pub scale_mode: ScaleMode,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MODEL_PATH),
            url: None,
            auto_download: true,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_pose_presence: DEFAULT_MIN_POSE_PRESENCE,
            input_size: DEFAULT_LANDMARK_INPUT_SIZE,
            timeout_secs: DEFAULT_DETECTION_TIMEOUT_SECS,
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            min_body_height_pixels: MIN_BODY_HEIGHT_PIXELS,
            scale_mode: ScaleMode::default(),
        }
    }
}

impl ModelConfig {
    /// Build the model source this configuration describes
    #[must_use]
    pub fn source(&self) -> Box<dyn ModelSource> {
        match &self.url {
            Some(url) if self.auto_download => Box::new(CachedDownload::new(self.path.clone(), url.clone())),
            _ => Box::new(LocalModel::new(self.path.clone())),
        }
    }
}

impl DetectionConfig {
    #[must_use]
    pub fn settings(&self) -> DetectionSettings {
        DetectionSettings {
            input_size: self.input_size,
            min_pose_presence: self.min_pose_presence,
        }
    }

    /// Detection deadline, `None` when disabled
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0.0).then(|| Duration::from_secs_f64(self.timeout_secs))
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.detection.min_pose_presence) {
            return Err(Error::ConfigError(
                "Pose presence threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.detection.input_size <= 0 {
            return Err(Error::ConfigError("Model input size must be greater than 0".to_string()));
        }
        if !(self.detection.timeout_secs.is_finite() && self.detection.timeout_secs >= 0.0) {
            return Err(Error::ConfigError(
                "Detection timeout must be a non-negative number of seconds".to_string(),
            ));
        }

        if !(self.calibration.min_body_height_pixels.is_finite() && self.calibration.min_body_height_pixels >= 0.0) {
            return Err(Error::ConfigError(
                "Minimum body height must be a non-negative number of pixels".to_string(),
            ));
        }

        if let Some(url) = &self.model.url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::ConfigError(format!("Model URL must be http(s): {url}")));
            }
        }

        self.ratios.validate()
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Body Measurement Configuration

# Pose landmark model
model:
  path: "assets/pose_landmark.onnx"
  # url: "https://example.com/pose_landmark.onnx"
  auto_download: true

# Pose detection parameters
detection:
  min_pose_presence: 0.5
  input_size: 256
  timeout_secs: 30.0

# Scale calibration
calibration:
  min_body_height_pixels: 100.0
  scale_mode: shared_front

# Empirical ratios for circumferences
ratios:
  male:
    chest: 2.5
    waist: 2.3
    hip: 2.9
  female:
    chest: 2.4
    waist: 2.2
    hip: 3.0
  neck_from_head: 2.6
  bicep_from_shoulder: 0.45
  wrist_from_head: 0.8
  thigh_from_hip: 0.95
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let config: Config = serde_yaml::from_str(EXAMPLE_CONFIG).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.ratios, RatioTable::default());
        assert_eq!(config.calibration.scale_mode, ScaleMode::SharedFront);
        assert_eq!(config.model.path, PathBuf::from(DEFAULT_MODEL_PATH));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_yaml::from_str("calibration:\n  scale_mode: per_image\n").unwrap();
        assert_eq!(config.calibration.scale_mode, ScaleMode::PerImage);
        assert_eq!(config.calibration.min_body_height_pixels, MIN_BODY_HEIGHT_PIXELS);
        assert_eq!(config.detection.input_size, DEFAULT_LANDMARK_INPUT_SIZE);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = Config::default();
        config.detection.min_pose_presence = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.model.url = Some("ftp://models/pose.onnx".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.ratios.neck_from_head = -2.6;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.detection.timeout_secs = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_detection_timeout() {
        let mut detection = DetectionConfig::default();
        assert_eq!(detection.timeout(), Some(Duration::from_secs(30)));

        detection.timeout_secs = 0.0;
        assert_eq!(detection.timeout(), None);
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = Config::default();
        config.calibration.min_body_height_pixels = 150.0;
        config.to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.calibration.min_body_height_pixels, 150.0);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Config::from_file("no/such/config.yaml").is_err());
    }
}
