//! Configuration management for liveness sessions

use crate::constants::{
    DEFAULT_ARTIFACT_TIMEOUT_MILLIS, DEFAULT_CAPTURE_DELAY_MILLIS, DEFAULT_MAX_MISSED_FRAMES,
    DEFAULT_MIN_COMPLETION_TIME_MILLIS, DEFAULT_MIN_FACE_SIZE_RATIO, DEFAULT_MOVEMENT_THRESHOLD_DEGREES,
    DEFAULT_TARGET_SPAN_DEGREES, DEFAULT_TIMEOUT_MILLIS,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Liveness tracking and gating parameters
    pub liveness: LivenessConfig,

    /// Proof capture parameters
    pub capture: CaptureConfig,
}

/// Liveness tracking parameters, fixed for the lifetime of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivenessConfig {
    /// Combined span (degrees) mapped to 100 percent
    pub target_span_degrees: f64,

    /// Minimum elapsed time since session start before completion
    pub min_completion_time_millis: u64,

    /// Minimum face area as a fraction of the frame area (0.0-1.0)
    pub min_face_size_ratio: f64,

    /// Consecutive misses that raise a failure signal
    pub max_missed_frames: u32,

    /// Require both a left and a right turn before completing
    pub require_bidirectional_movement: bool,

    /// Track pitch and add its span to the progress
    pub enable_pitch_detection: bool,

    /// Deadzone for the directional movement flags (degrees)
    pub movement_threshold_degrees: f64,

    /// Delay between completion and capture
    pub capture_delay_millis: u64,

    /// Abandon the session after this long without completing, 0 disables
    pub timeout_millis: u64,
}

/// Proof capture parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Record video continuously from session start
    pub record_video: bool,

    /// Take a still photo at capture time
    pub capture_photo: bool,

    /// Upper bound on each capture request
    pub artifact_timeout_millis: u64,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            target_span_degrees: DEFAULT_TARGET_SPAN_DEGREES,
            min_completion_time_millis: DEFAULT_MIN_COMPLETION_TIME_MILLIS,
            min_face_size_ratio: DEFAULT_MIN_FACE_SIZE_RATIO,
            max_missed_frames: DEFAULT_MAX_MISSED_FRAMES,
            require_bidirectional_movement: true,
            enable_pitch_detection: true,
            movement_threshold_degrees: DEFAULT_MOVEMENT_THRESHOLD_DEGREES,
            capture_delay_millis: DEFAULT_CAPTURE_DELAY_MILLIS,
            timeout_millis: DEFAULT_TIMEOUT_MILLIS,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            record_video: true,
            capture_photo: true,
            artifact_timeout_millis: DEFAULT_ARTIFACT_TIMEOUT_MILLIS,
        }
    }
}

impl LivenessConfig {
    /// Delay before capture as a `Duration`
    #[must_use]
    pub fn capture_delay(&self) -> Duration {
        Duration::from_millis(self.capture_delay_millis)
    }

    /// Session timeout, `None` when disabled
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_millis > 0).then(|| Duration::from_millis(self.timeout_millis))
    }

    /// Validate liveness parameters
    pub fn validate(&self) -> Result<()> {
        if !self.target_span_degrees.is_finite() || self.target_span_degrees <= 0.0 {
            return Err(Error::ConfigError(
                "Target span must be a positive number of degrees".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_face_size_ratio) {
            return Err(Error::ConfigError(
                "Minimum face size ratio must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.max_missed_frames == 0 {
            return Err(Error::ConfigError(
                "Max missed frames must be greater than 0".to_string(),
            ));
        }
        if !self.movement_threshold_degrees.is_finite() || self.movement_threshold_degrees < 0.0 {
            return Err(Error::ConfigError(
                "Movement threshold must be a non-negative number of degrees".to_string(),
            ));
        }

        Ok(())
    }
}

impl CaptureConfig {
    /// Per-request capture bound as a `Duration`
    #[must_use]
    pub fn artifact_timeout(&self) -> Duration {
        Duration::from_millis(self.artifact_timeout_millis)
    }

    /// Validate capture parameters
    pub fn validate(&self) -> Result<()> {
        if self.artifact_timeout_millis == 0 {
            return Err(Error::ConfigError(
                "Artifact timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigError(e.to_string()))?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.liveness.validate()?;
        self.capture.validate()
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Head Pose Liveness Configuration

# Liveness tracking
liveness:
  target_span_degrees: 80.0
  min_completion_time_millis: 3000
  min_face_size_ratio: 0.15
  max_missed_frames: 10
  require_bidirectional_movement: true
  enable_pitch_detection: true
  movement_threshold_degrees: 10.0
  capture_delay_millis: 0
  timeout_millis: 15000

# Proof capture
capture:
  record_video: true
  capture_photo: true
  artifact_timeout_millis: 10000
"#;
