//! Trace replay application.
//!
//! Replays a recorded sequence of detection frames through a full liveness
//! session. The replay recorder and photo collaborators report configured
//! output paths in place of real camera hardware.

use crate::{
    capture::{orchestrator::CaptureOrchestrator, CaptureOutcome, PhotoCapture, VideoRecorder},
    config::Config,
    error::{Error, Result},
    observation::DetectionFrame,
    session::{LivenessEvent, SessionDriver, SessionOutcome},
};
use async_trait::async_trait;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Frames buffered between the replay feeder and the session
const FRAME_CHANNEL_CAPACITY: usize = 32;

/// Replay application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// JSON-lines trace of detection frames
    pub trace: PathBuf,
    /// Session configuration
    pub config: Config,
    /// Path reported by the replay video recorder
    pub video_output: Option<PathBuf>,
    /// Path reported by the replay photo capture
    pub photo_output: Option<PathBuf>,
    /// Pace frames by their timestamps
    pub realtime: bool,
}

/// Load a JSON-lines trace of detection frames.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn load_trace<P: AsRef<Path>>(path: P) -> Result<Vec<DetectionFrame>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::TraceError(format!("Failed to read {}: {}", path.display(), e)))?;

    parse_trace(&content)
}

/// Parse JSON-lines trace text
pub fn parse_trace(content: &str) -> Result<Vec<DetectionFrame>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line)
                .map_err(|e| Error::TraceError(format!("Line {}: {}", index + 1, e)))
        })
        .collect()
}

/// Video recorder that reports a fixed output path
#[derive(Debug, Clone)]
pub struct ReplayVideoRecorder {
    output: Option<PathBuf>,
}

impl ReplayVideoRecorder {
    /// Create a recorder, starting fails when no output is configured
    #[must_use]
    pub fn new(output: Option<PathBuf>) -> Self {
        Self { output }
    }
}

#[async_trait]
impl VideoRecorder for ReplayVideoRecorder {
    async fn start(&self) -> Result<()> {
        match &self.output {
            Some(path) => {
                debug!("Replay recording to {}", path.display());
                Ok(())
            }
            None => Err(Error::Capture("no video output configured".to_string())),
        }
    }

    async fn stop(&self) -> CaptureOutcome {
        Ok(self.output.clone())
    }
}

/// Photo capture that reports a fixed output path
#[derive(Debug, Clone)]
pub struct ReplayPhotoCapture {
    output: PathBuf,
}

impl ReplayPhotoCapture {
    /// Create a photo capture reporting `output`
    #[must_use]
    pub fn new(output: PathBuf) -> Self {
        Self { output }
    }
}

#[async_trait]
impl PhotoCapture for ReplayPhotoCapture {
    async fn capture(&self) -> CaptureOutcome {
        Ok(Some(self.output.clone()))
    }
}

/// Main replay application struct
pub struct ReplayApp {
    config: AppConfig,
    frames: Vec<DetectionFrame>,
}

impl ReplayApp {
    /// Create a new replay application, loading the trace
    pub fn new(config: AppConfig) -> Result<Self> {
        info!("Initializing liveness trace replay");

        let frames = load_trace(&config.trace)?;
        info!("Loaded {} frames from {}", frames.len(), config.trace.display());

        Self::with_frames(config, frames)
    }

    /// Create a replay application from frames already in memory
    pub fn with_frames(config: AppConfig, frames: Vec<DetectionFrame>) -> Result<Self> {
        config.config.validate()?;
        if frames.is_empty() {
            return Err(Error::InvalidInput("Trace contains no frames".to_string()));
        }

        Ok(Self { config, frames })
    }

    /// Replay the trace, forwarding every session event to `events`
    pub async fn run(self, events: mpsc::UnboundedSender<LivenessEvent>) -> Result<SessionOutcome> {
        let video: Arc<dyn VideoRecorder> = Arc::new(ReplayVideoRecorder::new(self.config.video_output.clone()));
        let photo = self
            .config
            .photo_output
            .clone()
            .map(|path| Arc::new(ReplayPhotoCapture::new(path)) as Arc<dyn PhotoCapture>);
        let orchestrator = CaptureOrchestrator::from_config(&self.config.config.capture, Some(video), photo);

        let start_time_millis = self.frames.first().map_or(0, DetectionFrame::timestamp_millis);
        let driver = SessionDriver::new(&self.config.config.liveness, start_time_millis, orchestrator, events)?;
        let (tx, session) = driver.spawn(FRAME_CHANNEL_CAPACITY);

        let mut previous_timestamp = start_time_millis;
        for frame in self.frames {
            if self.config.realtime {
                let gap = frame.timestamp_millis().saturating_sub(previous_timestamp);
                tokio::time::sleep(Duration::from_millis(gap)).await;
                previous_timestamp = frame.timestamp_millis();
            }
            if tx.send(frame).await.is_err() {
                debug!("Session stopped accepting frames");
                break;
            }
        }
        drop(tx);

        let outcome = session
            .await
            .map_err(|e| Error::SessionClosed(format!("Session task failed: {}", e)))?;
        info!("Replay finished: {:?}", outcome);

        Ok(outcome)
    }
}
