//! Proof capture after a successful liveness gesture.
//!
//! Capture collaborators (video recorder, still camera) are external and
//! asynchronous. Their completions are joined into a single
//! [`SessionResult`].

/// Order-independent join over required artifacts
pub mod barrier;

/// Drives capture requests and joins their completions
pub mod orchestrator;

use crate::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Result of one capture request: a file path, no file, or a failure
pub type CaptureOutcome = Result<Option<PathBuf>>;

/// Kind of proof artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    /// Continuous recording of the session
    Video,
    /// One-shot still image
    Image,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Image => write!(f, "image"),
        }
    }
}

/// Tracking record for one requested artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureArtifact {
    /// Artifact kind
    pub kind: ArtifactKind,
    /// Output path, absent on failure
    pub path: Option<PathBuf>,
    /// Completion callback has run
    pub completed: bool,
}

impl CaptureArtifact {
    /// A pending artifact of the given kind
    #[must_use]
    pub fn pending(kind: ArtifactKind) -> Self {
        Self {
            kind,
            path: None,
            completed: false,
        }
    }

    /// Record the completion. Only the first call has any effect.
    pub fn complete(&mut self, path: Option<PathBuf>) -> bool {
        if self.completed {
            return false;
        }
        self.path = path;
        self.completed = true;
        true
    }
}

/// Final proof paths for a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionResult {
    /// Recorded video, absent if not required or failed
    pub video_path: Option<PathBuf>,
    /// Captured still, absent if not required or failed
    pub image_path: Option<PathBuf>,
}

/// Continuous video recorder collaborator
#[async_trait]
pub trait VideoRecorder: Send + Sync {
    /// Begin recording at session start
    async fn start(&self) -> Result<()>;

    /// Stop recording and finalize the file
    async fn stop(&self) -> CaptureOutcome;
}

/// Still photo collaborator
#[async_trait]
pub trait PhotoCapture: Send + Sync {
    /// Take one still image
    async fn capture(&self) -> CaptureOutcome;
}
