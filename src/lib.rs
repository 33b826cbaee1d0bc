//! Head-turn liveness detection library.
//!
//! This library decides, from a stream of head pose samples, whether a real
//! person turned their head far enough in both directions, and then
//! captures proof artifacts (a session video and/or a still photo):
//! - Face detection results are validated for presence and size
//! - Yaw (and optionally pitch) extremes are tracked into a progress value
//! - A single-fire completion gate hands off to a delayed capture
//! - Capture completions are joined into one session result
//!
//! Pose estimation, camera hardware and media encoding are external
//! collaborators. Detections arrive as [`observation::DetectionFrame`]
//! values; capture goes through the [`capture::VideoRecorder`] and
//! [`capture::PhotoCapture`] traits.
//!
//! # Examples
//!
//! ## Processing frames synchronously
//!
//! ```no_run
//! use head_pose_liveness::{
//!     config::LivenessConfig,
//!     observation::{BoundingBox, DetectedFace, DetectionFrame},
//!     session::LivenessSession,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = LivenessConfig {
//!     target_span_degrees: 60.0,
//!     min_completion_time_millis: 0,
//!     ..LivenessConfig::default()
//! };
//! let mut session = LivenessSession::new(&config, 0)?;
//!
//! for (yaw, timestamp_millis) in [(-30.0, 0), (30.0, 10)] {
//!     let frame = DetectionFrame::Faces {
//!         faces: vec![DetectedFace {
//!             yaw_degrees: yaw,
//!             pitch_degrees: None,
//!             bbox: BoundingBox::new(100.0, 80.0, 300.0, 300.0),
//!         }],
//!         frame_width: 640,
//!         frame_height: 480,
//!         timestamp_millis,
//!     };
//!     let report = session.process(&frame);
//!     println!("progress {:?}, completed {}", report.percent, report.completed);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Driving a session with capture
//!
//! ```no_run
//! use head_pose_liveness::{
//!     capture::orchestrator::CaptureOrchestrator,
//!     config::Config,
//!     session::{SessionDriver, SessionOutcome},
//!     utils::unix_millis,
//! };
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let orchestrator = CaptureOrchestrator::from_config(&config.capture, None, None);
//! let (events_tx, mut events_rx) = mpsc::unbounded_channel();
//!
//! let driver = SessionDriver::new(&config.liveness, unix_millis(), orchestrator, events_tx)?;
//! let (frames_tx, session) = driver.spawn(32);
//!
//! // Feed frames from the detector through `frames_tx` ...
//! drop(frames_tx);
//!
//! while let Some(event) = events_rx.recv().await {
//!     println!("{:?}", event);
//! }
//! if let SessionOutcome::Completed(result) = session.await? {
//!     println!("video {:?}, image {:?}", result.video_path, result.image_path);
//! }
//! # Ok(())
//! # }
//! ```

/// Detection frame validation
pub mod observation;

/// Yaw and pitch extreme tracking
pub mod movement_tracker;

/// Progress calculation from tracked spans
pub mod progress;

/// Consecutive missed-frame watchdog
pub mod watchdog;

/// Completion gate and session latch
pub mod completion_gate;

/// Proof capture collaborators and the capture join
pub mod capture;

/// Session state machine and asynchronous driver
pub mod session;

/// Utility functions
pub mod utils;

/// Error types and result handling
pub mod error;

/// Trace replay application
pub mod app;

/// Constants used throughout the library
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
