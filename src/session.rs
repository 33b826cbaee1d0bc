//! Liveness session: frame processing and the asynchronous session driver.
//!
//! [`LivenessSession`] owns the session's [`TrackingState`] and runs the
//! synchronous per-frame pipeline. [`SessionDriver`] feeds it from an
//! observation channel, enforces the session timeout and runs the delayed
//! capture once the gate fires.

use crate::capture::orchestrator::CaptureOrchestrator;
use crate::capture::SessionResult;
use crate::completion_gate::{CompletionGate, LatchState, SessionLatch};
use crate::config::LivenessConfig;
use crate::movement_tracker::{MotionState, MovementTracker};
use crate::observation::{DetectionFrame, FilterOutcome, PoseObservationFilter, RejectReason};
use crate::progress::ProgressCalculator;
use crate::watchdog::{MissState, MissedFrameWatchdog};
use crate::Result;
use log::{debug, info, warn};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// All mutable state of one liveness session
#[derive(Debug, Clone)]
pub struct TrackingState {
    /// Angle extremes and direction flags
    pub motion: MotionState,
    /// Consecutive detection misses
    pub misses: MissState,
    /// Session start on the frame timestamp clock
    pub start_time_millis: u64,
    /// Shared lifecycle latch
    pub latch: SessionLatch,
}

impl TrackingState {
    /// Fresh state for a session starting at `start_time_millis`
    #[must_use]
    pub fn new(start_time_millis: u64) -> Self {
        Self {
            motion: MotionState::default(),
            misses: MissState::default(),
            start_time_millis,
            latch: SessionLatch::new(),
        }
    }
}

/// What happened to one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Why the frame was rejected, if it was
    pub rejected: Option<RejectReason>,
    /// Progress after an accepted observation
    pub percent: Option<u8>,
    /// Miss count when the watchdog threshold was first reached
    pub missed_threshold: Option<u32>,
    /// This frame fired the completion gate
    pub completed: bool,
    /// The session no longer accepts frames
    pub ignored: bool,
}

/// Synchronous liveness state machine for one session
#[derive(Debug)]
pub struct LivenessSession {
    filter: PoseObservationFilter,
    tracker: MovementTracker,
    progress: ProgressCalculator,
    watchdog: MissedFrameWatchdog,
    gate: CompletionGate,
    state: TrackingState,
}

impl LivenessSession {
    /// Create a new session starting at `start_time_millis`
    pub fn new(config: &LivenessConfig, start_time_millis: u64) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            filter: PoseObservationFilter::from_config(config),
            tracker: MovementTracker::from_config(config),
            progress: ProgressCalculator::from_config(config),
            watchdog: MissedFrameWatchdog::from_config(config),
            gate: CompletionGate::from_config(config),
            state: TrackingState::new(start_time_millis),
        })
    }

    /// Session state
    #[must_use]
    pub fn state(&self) -> &TrackingState {
        &self.state
    }

    /// Handle to the session latch
    #[must_use]
    pub fn latch(&self) -> SessionLatch {
        self.state.latch.clone()
    }

    /// Current progress, recomputed from the extremes
    #[must_use]
    pub fn percent(&self) -> u8 {
        self.progress.percent(&self.state.motion)
    }

    /// Process one detection frame.
    ///
    /// Never fails: misses and undersized faces are folded into state.
    pub fn process(&mut self, frame: &DetectionFrame) -> FrameReport {
        if self.state.latch.state() != LatchState::Tracking {
            return FrameReport {
                ignored: true,
                ..FrameReport::default()
            };
        }

        let observation = match self.filter.classify(frame) {
            FilterOutcome::Accepted(observation) => observation,
            FilterOutcome::Rejected(reason) => {
                // Any detected face re-arms the watchdog, even one that is
                // too small or carries unusable angles
                let missed_threshold = if frame.has_faces() {
                    self.watchdog.record_face(&mut self.state.misses);
                    None
                } else {
                    self.watchdog.record_miss(&mut self.state.misses)
                };
                return FrameReport {
                    rejected: Some(reason),
                    missed_threshold,
                    ..FrameReport::default()
                };
            }
        };

        self.watchdog.record_face(&mut self.state.misses);
        self.tracker.update(&mut self.state.motion, &observation);

        let percent = self.progress.percent(&self.state.motion);
        let elapsed_millis = observation
            .timestamp_millis
            .saturating_sub(self.state.start_time_millis);
        let completed = self
            .gate
            .try_complete(&self.state.latch, percent, elapsed_millis, &self.state.motion.flags);

        debug!(
            "yaw {:.1} span {:.1} percent {} elapsed {} ms",
            observation.yaw_degrees,
            self.state.motion.yaw_span(),
            percent,
            elapsed_millis
        );

        FrameReport {
            percent: Some(percent),
            completed,
            ..FrameReport::default()
        }
    }
}

/// Output of a session to the presentation channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LivenessEvent {
    /// Progress after an accepted observation
    Progress {
        /// Whole percent, 0-100
        percent: u8,
    },
    /// Too many consecutive frames without a face
    FailureThresholdReached {
        /// Misses in the current run
        consecutive_missed: u32,
    },
    /// Gesture complete and proof captured
    Success(SessionResult),
    /// Session abandoned by the timer
    TimedOut {
        /// Configured timeout
        after_millis: u64,
    },
}

/// How a driven session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Gate fired and capture finished
    Completed(SessionResult),
    /// Timeout elapsed first
    TimedOut,
    /// Observation channel closed before completion
    Abandoned,
}

/// Runs a [`LivenessSession`] against an observation channel
pub struct SessionDriver {
    config: LivenessConfig,
    session: LivenessSession,
    orchestrator: CaptureOrchestrator,
    events: mpsc::UnboundedSender<LivenessEvent>,
}

impl SessionDriver {
    /// Create a driver for a new session
    pub fn new(
        config: &LivenessConfig,
        start_time_millis: u64,
        orchestrator: CaptureOrchestrator,
        events: mpsc::UnboundedSender<LivenessEvent>,
    ) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            session: LivenessSession::new(config, start_time_millis)?,
            orchestrator,
            events,
        })
    }

    /// Handle to the session latch
    #[must_use]
    pub fn latch(&self) -> SessionLatch {
        self.session.latch()
    }

    /// Run the driver on its own task, returning the frame sender
    pub fn spawn(self, capacity: usize) -> (mpsc::Sender<DetectionFrame>, JoinHandle<SessionOutcome>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, tokio::spawn(self.run(rx)))
    }

    /// Consume frames until the session completes, times out or the
    /// channel closes
    pub async fn run(mut self, mut frames: mpsc::Receiver<DetectionFrame>) -> SessionOutcome {
        let deadline = self.config.timeout().map(|timeout| Instant::now() + timeout);
        info!("Liveness session started, timeout {:?}", self.config.timeout());

        match deadline {
            Some(deadline) => {
                if tokio::time::timeout_at(deadline, self.orchestrator.start_recording())
                    .await
                    .is_err()
                {
                    return self.time_out().await;
                }
            }
            None => self.orchestrator.start_recording().await,
        }

        loop {
            let next = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, frames.recv()).await {
                    Ok(next) => next,
                    Err(_) => return self.time_out().await,
                },
                None => frames.recv().await,
            };

            let Some(frame) = next else {
                info!("Observation channel closed before completion");
                self.orchestrator.discard_recording().await;
                return SessionOutcome::Abandoned;
            };

            let report = self.session.process(&frame);
            if let Some(consecutive_missed) = report.missed_threshold {
                self.emit(LivenessEvent::FailureThresholdReached { consecutive_missed });
            }
            if let Some(percent) = report.percent {
                self.emit(LivenessEvent::Progress { percent });
            }
            if report.completed {
                break;
            }
        }

        // No further observations are accepted
        drop(frames);
        self.finish().await
    }

    async fn finish(mut self) -> SessionOutcome {
        let latch = self.session.latch();
        if !latch.advance(LatchState::ReadyPendingDelay, LatchState::CaptureInProgress) {
            warn!("Capture already started for this session");
        }

        let delay = self.config.capture_delay();
        if !delay.is_zero() {
            debug!("Waiting {:?} before capture", delay);
            tokio::time::sleep(delay).await;
        }

        let result = self.orchestrator.capture().await;
        if latch.advance(LatchState::CaptureInProgress, LatchState::Completed) {
            self.emit(LivenessEvent::Success(result.clone()));
        }

        SessionOutcome::Completed(result)
    }

    async fn time_out(mut self) -> SessionOutcome {
        if !self.session.latch().advance(LatchState::Tracking, LatchState::TimedOut) {
            return SessionOutcome::Abandoned;
        }

        warn!("Liveness session timed out after {} ms", self.config.timeout_millis);
        self.emit(LivenessEvent::TimedOut {
            after_millis: self.config.timeout_millis,
        });
        self.orchestrator.discard_recording().await;

        SessionOutcome::TimedOut
    }

    fn emit(&self, event: LivenessEvent) {
        if self.events.send(event).is_err() {
            debug!("Presentation channel closed, dropping event");
        }
    }
}
