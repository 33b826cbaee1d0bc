use super::{ArtifactKind, CaptureArtifact, CaptureOutcome, SessionResult};
use log::{debug, warn};
use std::collections::BTreeMap;

/// Countdown join keyed by required artifact kind.
///
/// Completions may arrive in any order. The result is released exactly
/// once, when every required artifact has completed. A failed capture
/// completes its artifact with no path.
#[derive(Debug)]
pub struct CaptureBarrier {
    artifacts: BTreeMap<ArtifactKind, CaptureArtifact>,
    released: bool,
}

impl CaptureBarrier {
    /// Create a barrier over the required kinds, duplicates are ignored
    #[must_use]
    pub fn new(required: &[ArtifactKind]) -> Self {
        let artifacts = required
            .iter()
            .map(|&kind| (kind, CaptureArtifact::pending(kind)))
            .collect();

        Self {
            artifacts,
            released: false,
        }
    }

    /// Kinds still waiting for a completion
    #[must_use]
    pub fn pending(&self) -> Vec<ArtifactKind> {
        self.artifacts
            .values()
            .filter(|artifact| !artifact.completed)
            .map(|artifact| artifact.kind)
            .collect()
    }

    /// The result has already been released
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Record one completion, returning the result if this was the last one
    pub fn complete(&mut self, kind: ArtifactKind, outcome: CaptureOutcome) -> Option<SessionResult> {
        let Some(artifact) = self.artifacts.get_mut(&kind) else {
            warn!("Ignoring completion for unrequested {} artifact", kind);
            return None;
        };

        let path = match outcome {
            Ok(path) => path,
            Err(e) => {
                warn!("{} capture failed: {}", kind, e);
                None
            }
        };

        if !artifact.complete(path) {
            debug!("Duplicate {} completion ignored", kind);
            return None;
        }

        self.try_release()
    }

    /// Complete every pending artifact with no path
    pub fn abandon_pending(&mut self) -> Option<SessionResult> {
        for artifact in self.artifacts.values_mut().filter(|artifact| !artifact.completed) {
            warn!("{} capture never reported back", artifact.kind);
            artifact.complete(None);
        }

        self.try_release()
    }

    /// Release the result if all artifacts are complete and it was not
    /// released before
    pub fn try_release(&mut self) -> Option<SessionResult> {
        if self.released || self.artifacts.values().any(|artifact| !artifact.completed) {
            return None;
        }
        self.released = true;

        let path_of = |kind: ArtifactKind| self.artifacts.get(&kind).and_then(|artifact| artifact.path.clone());
        Some(SessionResult {
            video_path: path_of(ArtifactKind::Video),
            image_path: path_of(ArtifactKind::Image),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::path::PathBuf;

    #[test]
    fn test_video_then_failed_image() {
        let mut barrier = CaptureBarrier::new(&[ArtifactKind::Video, ArtifactKind::Image]);

        assert_eq!(barrier.complete(ArtifactKind::Video, Ok(Some(PathBuf::from("/tmp/a.mov")))), None);
        assert_eq!(barrier.pending(), vec![ArtifactKind::Image]);

        let result = barrier
            .complete(ArtifactKind::Image, Err(Error::Capture("disk full".to_string())))
            .unwrap();
        assert_eq!(result.video_path, Some(PathBuf::from("/tmp/a.mov")));
        assert_eq!(result.image_path, None);
    }

    #[test]
    fn test_order_independent() {
        let mut barrier = CaptureBarrier::new(&[ArtifactKind::Video, ArtifactKind::Image]);

        assert_eq!(barrier.complete(ArtifactKind::Image, Ok(Some(PathBuf::from("/tmp/b.jpg")))), None);
        let result = barrier.complete(ArtifactKind::Video, Ok(Some(PathBuf::from("/tmp/a.mov")))).unwrap();
        assert_eq!(result.video_path, Some(PathBuf::from("/tmp/a.mov")));
        assert_eq!(result.image_path, Some(PathBuf::from("/tmp/b.jpg")));
    }

    #[test]
    fn test_released_once() {
        let mut barrier = CaptureBarrier::new(&[ArtifactKind::Image]);
        assert!(barrier.complete(ArtifactKind::Image, Ok(None)).is_some());
        assert!(barrier.complete(ArtifactKind::Image, Ok(Some(PathBuf::from("/x")))).is_none());
        assert!(barrier.try_release().is_none());
        assert!(barrier.abandon_pending().is_none());
        assert!(barrier.is_released());
    }

    #[test]
    fn test_unrequested_kind_ignored() {
        let mut barrier = CaptureBarrier::new(&[ArtifactKind::Image]);
        assert!(barrier.complete(ArtifactKind::Video, Ok(Some(PathBuf::from("/tmp/a.mov")))).is_none());
        assert_eq!(barrier.pending(), vec![ArtifactKind::Image]);
    }

    #[test]
    fn test_nothing_required_releases_immediately() {
        let mut barrier = CaptureBarrier::new(&[]);
        assert_eq!(barrier.try_release(), Some(SessionResult::default()));
    }

    #[test]
    fn test_abandon_pending() {
        let mut barrier = CaptureBarrier::new(&[ArtifactKind::Video, ArtifactKind::Image]);
        barrier.complete(ArtifactKind::Video, Ok(Some(PathBuf::from("/tmp/a.mov"))));
        let result = barrier.abandon_pending().unwrap();
        assert_eq!(result.video_path, Some(PathBuf::from("/tmp/a.mov")));
        assert_eq!(result.image_path, None);
    }
}
