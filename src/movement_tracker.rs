//! Movement tracking for head-turn gestures.
//!
//! This module keeps the running extremes of the head pose angles seen
//! during a session together with the directions the head has turned.
//! Both ranges start at the neutral (facing the camera) pose, so a single
//! turn away from centre already counts towards the span.

use crate::config::LivenessConfig;
use crate::observation::Observation;

/// Running minimum and maximum of one angle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisRange {
    /// Smallest angle seen
    pub min: f64,
    /// Largest angle seen
    pub max: f64,
}

impl AxisRange {
    /// Widen the range to include `angle`
    pub fn widen(&mut self, angle: f64) {
        self.min = self.min.min(angle);
        self.max = self.max.max(angle);
    }

    /// Covered span in degrees
    #[must_use]
    pub fn span(&self) -> f64 {
        (self.max - self.min).abs()
    }
}

/// Directions the head has turned past the deadzone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementFlags {
    /// Yaw went below the negative threshold
    pub left: bool,
    /// Yaw went above the positive threshold
    pub right: bool,
    /// Pitch went above the positive threshold
    pub up: bool,
    /// Pitch went below the negative threshold
    pub down: bool,
}

/// Session-scoped motion extremes and direction flags
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionState {
    /// Yaw extremes
    pub yaw: AxisRange,
    /// Pitch extremes
    pub pitch: AxisRange,
    /// Accumulated direction flags
    pub flags: MovementFlags,
}

impl MotionState {
    /// Covered yaw span
    #[must_use]
    pub fn yaw_span(&self) -> f64 {
        self.yaw.span()
    }

    /// Covered pitch span
    #[must_use]
    pub fn pitch_span(&self) -> f64 {
        self.pitch.span()
    }
}

/// Widens motion extremes and sets direction flags
#[derive(Debug, Clone)]
pub struct MovementTracker {
    threshold_degrees: f64,
    track_pitch: bool,
}

impl MovementTracker {
    /// Create a new movement tracker
    #[must_use]
    pub fn new(threshold_degrees: f64, track_pitch: bool) -> Self {
        Self {
            threshold_degrees,
            track_pitch,
        }
    }

    /// Create a tracker from liveness configuration
    #[must_use]
    pub fn from_config(config: &LivenessConfig) -> Self {
        Self::new(config.movement_threshold_degrees, config.enable_pitch_detection)
    }

    /// Fold one observation into the motion state.
    ///
    /// Ranges only widen and flags only get set.
    pub fn update(&self, state: &mut MotionState, observation: &Observation) {
        let yaw = observation.yaw_degrees;
        state.yaw.widen(yaw);
        if yaw < -self.threshold_degrees {
            state.flags.left = true;
        }
        if yaw > self.threshold_degrees {
            state.flags.right = true;
        }

        if !self.track_pitch {
            return;
        }
        if let Some(pitch) = observation.pitch_degrees {
            state.pitch.widen(pitch);
            if pitch > self.threshold_degrees {
                state.flags.up = true;
            }
            if pitch < -self.threshold_degrees {
                state.flags.down = true;
            }
        }
    }
}
