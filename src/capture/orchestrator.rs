use super::barrier::CaptureBarrier;
use super::{ArtifactKind, CaptureOutcome, PhotoCapture, SessionResult, VideoRecorder};
use crate::config::CaptureConfig;
use crate::Error;
use log::{debug, info, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Issues capture requests and joins their completions.
///
/// Video is only required when a recording was successfully started at
/// session start. Every request runs on its own task and is bounded by the
/// artifact timeout.
pub struct CaptureOrchestrator {
    video: Option<Arc<dyn VideoRecorder>>,
    photo: Option<Arc<dyn PhotoCapture>>,
    artifact_timeout: Duration,
    recording: bool,
}

impl CaptureOrchestrator {
    /// Create a new orchestrator
    #[must_use]
    pub fn new(
        video: Option<Arc<dyn VideoRecorder>>,
        photo: Option<Arc<dyn PhotoCapture>>,
        artifact_timeout: Duration,
    ) -> Self {
        Self {
            video,
            photo,
            artifact_timeout,
            recording: false,
        }
    }

    /// Create an orchestrator, dropping collaborators the configuration
    /// disables
    #[must_use]
    pub fn from_config(
        config: &CaptureConfig,
        video: Option<Arc<dyn VideoRecorder>>,
        photo: Option<Arc<dyn PhotoCapture>>,
    ) -> Self {
        Self::new(
            video.filter(|_| config.record_video),
            photo.filter(|_| config.capture_photo),
            config.artifact_timeout(),
        )
    }

    /// A recording is running
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Start the continuous recording, if a recorder is configured.
    ///
    /// A failed or timed out start is logged and the video artifact is then
    /// not required.
    pub async fn start_recording(&mut self) {
        let Some(video) = &self.video else {
            return;
        };

        match tokio::time::timeout(self.artifact_timeout, video.start()).await {
            Ok(Ok(())) => {
                info!("Session recording started");
                self.recording = true;
            }
            Ok(Err(e)) => warn!("Failed to start session recording: {}", e),
            Err(_) => warn!("Starting session recording timed out after {:?}", self.artifact_timeout),
        }
    }

    /// Artifacts a capture would request right now
    #[must_use]
    pub fn required_artifacts(&self) -> Vec<ArtifactKind> {
        let mut required = Vec::with_capacity(2);
        if self.recording && self.video.is_some() {
            required.push(ArtifactKind::Video);
        }
        if self.photo.is_some() {
            required.push(ArtifactKind::Image);
        }
        required
    }

    /// Request every required artifact and wait for all of them
    pub async fn capture(&mut self) -> SessionResult {
        let required = self.required_artifacts();
        let mut barrier = CaptureBarrier::new(&required);
        if let Some(result) = barrier.try_release() {
            debug!("No capture artifacts required");
            return result;
        }

        let (tx, mut rx) = mpsc::channel::<(ArtifactKind, CaptureOutcome)>(required.len());

        if required.contains(&ArtifactKind::Video) {
            if let Some(video) = self.video.clone() {
                self.recording = false;
                spawn_request(tx.clone(), ArtifactKind::Video, self.artifact_timeout, async move {
                    video.stop().await
                });
            }
        }
        if required.contains(&ArtifactKind::Image) {
            if let Some(photo) = self.photo.clone() {
                spawn_request(tx.clone(), ArtifactKind::Image, self.artifact_timeout, async move {
                    photo.capture().await
                });
            }
        }
        drop(tx);

        while let Some((kind, outcome)) = rx.recv().await {
            if let Some(result) = barrier.complete(kind, outcome) {
                info!("Capture complete: {:?}", result);
                return result;
            }
        }

        // Every request task ended without reporting
        barrier.abandon_pending().unwrap_or_default()
    }

    /// Stop a running recording and throw the file away
    pub async fn discard_recording(&mut self) {
        if !self.recording {
            return;
        }
        self.recording = false;

        if let Some(video) = &self.video {
            match tokio::time::timeout(self.artifact_timeout, video.stop()).await {
                Ok(Ok(path)) => debug!("Discarded session recording {:?}", path),
                Ok(Err(e)) => warn!("Failed to stop session recording: {}", e),
                Err(_) => warn!("Stopping session recording timed out"),
            }
        }
    }
}

fn spawn_request<F>(
    tx: mpsc::Sender<(ArtifactKind, CaptureOutcome)>,
    kind: ArtifactKind,
    limit: Duration,
    request: F,
) where
    F: Future<Output = CaptureOutcome> + Send + 'static,
{
    tokio::spawn(async move {
        let outcome = match tokio::time::timeout(limit, request).await {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::Capture(format!("{} capture timed out after {:?}", kind, limit))),
        };
        if tx.send((kind, outcome)).await.is_err() {
            debug!("{} completion arrived after the join finished", kind);
        }
    });
}
