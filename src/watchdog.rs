//! Consecutive missed-frame counting.

use crate::config::LivenessConfig;
use log::warn;

/// Session-scoped miss counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MissState {
    /// Detection misses since the last face
    pub consecutive_missed: u32,
    /// Threshold breach already signalled for the current run of misses
    pub signalled: bool,
}

/// Signals when too many consecutive frames lack a face
#[derive(Debug, Clone)]
pub struct MissedFrameWatchdog {
    max_missed_frames: u32,
}

impl MissedFrameWatchdog {
    /// Create a new watchdog
    #[must_use]
    pub fn new(max_missed_frames: u32) -> Self {
        Self { max_missed_frames }
    }

    /// Create a watchdog from liveness configuration
    #[must_use]
    pub fn from_config(config: &LivenessConfig) -> Self {
        Self::new(config.max_missed_frames)
    }

    /// Count a missed frame.
    ///
    /// Returns the miss count the first time it reaches the threshold in a
    /// run of misses.
    pub fn record_miss(&self, state: &mut MissState) -> Option<u32> {
        state.consecutive_missed = state.consecutive_missed.saturating_add(1);

        if state.consecutive_missed >= self.max_missed_frames && !state.signalled {
            state.signalled = true;
            warn!("{} consecutive frames without a usable face", state.consecutive_missed);
            return Some(state.consecutive_missed);
        }

        None
    }

    /// A face was detected, re-arm the watchdog
    pub fn record_face(&self, state: &mut MissState) {
        *state = MissState::default();
    }
}
