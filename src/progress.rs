//! Progress calculation from tracked head motion.
//!
//! Yaw and pitch spans are added together (not combined as a vector
//! magnitude) and measured against the target span.

use crate::config::LivenessConfig;
use crate::constants::MAX_PERCENT;
use crate::movement_tracker::MotionState;
use crate::utils::safe_cast::f64_to_u8_clamp;

/// Converts motion extremes into a 0-100 progress value
#[derive(Debug, Clone)]
pub struct ProgressCalculator {
    target_span_degrees: f64,
    pitch_enabled: bool,
}

impl ProgressCalculator {
    /// Create a new progress calculator
    #[must_use]
    pub fn new(target_span_degrees: f64, pitch_enabled: bool) -> Self {
        Self {
            target_span_degrees,
            pitch_enabled,
        }
    }

    /// Create a calculator from liveness configuration
    #[must_use]
    pub fn from_config(config: &LivenessConfig) -> Self {
        Self::new(config.target_span_degrees, config.enable_pitch_detection)
    }

    /// Combined yaw and pitch span in degrees
    #[must_use]
    pub fn total_movement(&self, state: &MotionState) -> f64 {
        let pitch_span = if self.pitch_enabled { state.pitch_span() } else { 0.0 };
        state.yaw_span() + pitch_span
    }

    /// Fraction of the target span covered, in [0, 1]
    #[must_use]
    pub fn progress(&self, state: &MotionState) -> f64 {
        let progress = self.total_movement(state) / self.target_span_degrees;
        if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Progress as a floored whole percent
    #[must_use]
    pub fn percent(&self, state: &MotionState) -> u8 {
        f64_to_u8_clamp((self.progress(state) * 100.0).floor(), 0, MAX_PERCENT)
    }
}
