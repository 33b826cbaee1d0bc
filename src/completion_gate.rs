//! Completion gating and the session latch.
//!
//! The latch is shared between the frame loop, the capture task and the
//! session timer. Every transition is a compare-and-set, so exactly one
//! caller wins each edge.

use crate::config::LivenessConfig;
use crate::constants::MAX_PERCENT;
use crate::movement_tracker::MovementFlags;
use log::{debug, info};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LatchState {
    /// Accepting observations
    Tracking = 0,
    /// Gate fired, capture not yet started
    ReadyPendingDelay = 1,
    /// Capture requests are outstanding
    CaptureInProgress = 2,
    /// Result emitted
    Completed = 3,
    /// Session timer elapsed before the gate fired
    TimedOut = 4,
}

impl LatchState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Tracking,
            1 => Self::ReadyPendingDelay,
            2 => Self::CaptureInProgress,
            3 => Self::Completed,
            _ => Self::TimedOut,
        }
    }

    /// Whether `next` is a legal successor of this state
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Tracking, Self::ReadyPendingDelay)
                | (Self::Tracking, Self::TimedOut)
                | (Self::ReadyPendingDelay, Self::CaptureInProgress)
                | (Self::CaptureInProgress, Self::Completed)
        )
    }

    /// No further transitions are possible
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::TimedOut)
    }
}

/// Shared, forward-only session state
#[derive(Debug, Clone)]
pub struct SessionLatch {
    state: Arc<AtomicU8>,
}

impl Default for SessionLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionLatch {
    /// Create a latch in the `Tracking` state
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(LatchState::Tracking as u8)),
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> LatchState {
        LatchState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Move from `from` to `to` if the latch is still in `from`.
    ///
    /// Returns `true` for the single caller that performed the transition.
    pub fn advance(&self, from: LatchState, to: LatchState) -> bool {
        if !from.can_advance_to(to) {
            debug!("Rejected latch transition {:?} -> {:?}", from, to);
            return false;
        }

        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Decides when the tracked motion is enough to complete the session
#[derive(Debug, Clone)]
pub struct CompletionGate {
    min_completion_time_millis: u64,
    require_bidirectional_movement: bool,
}

impl CompletionGate {
    /// Create a new completion gate
    #[must_use]
    pub fn new(min_completion_time_millis: u64, require_bidirectional_movement: bool) -> Self {
        Self {
            min_completion_time_millis,
            require_bidirectional_movement,
        }
    }

    /// Create a gate from liveness configuration
    #[must_use]
    pub fn from_config(config: &LivenessConfig) -> Self {
        Self::new(
            config.min_completion_time_millis,
            config.require_bidirectional_movement,
        )
    }

    /// All completion conditions hold.
    ///
    /// Only the yaw direction flags are considered, pitch directions never
    /// gate completion.
    #[must_use]
    pub fn conditions_met(&self, percent: u8, elapsed_millis: u64, flags: &MovementFlags) -> bool {
        if percent < MAX_PERCENT {
            return false;
        }
        if elapsed_millis < self.min_completion_time_millis {
            return false;
        }
        if self.require_bidirectional_movement && !(flags.left && flags.right) {
            return false;
        }

        true
    }

    /// Fire the `Tracking -> ReadyPendingDelay` transition if the
    /// conditions hold and nobody fired it yet
    pub fn try_complete(
        &self,
        latch: &SessionLatch,
        percent: u8,
        elapsed_millis: u64,
        flags: &MovementFlags,
    ) -> bool {
        if !self.conditions_met(percent, elapsed_millis, flags) {
            return false;
        }

        let fired = latch.advance(LatchState::Tracking, LatchState::ReadyPendingDelay);
        if fired {
            info!("Liveness gesture complete after {} ms", elapsed_millis);
        }
        fired
    }
}
