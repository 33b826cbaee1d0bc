//! Per-frame validation of face detection results.
//!
//! The detection collaborator delivers one [`DetectionFrame`] per camera
//! frame. [`PoseObservationFilter`] turns it into either an accepted
//! [`Observation`] or a [`RejectReason`].

use crate::config::LivenessConfig;
use log::debug;
use serde::{Deserialize, Serialize};

/// Axis-aligned face bounding box in frame pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Box width
    pub width: f64,
    /// Box height
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Box area, degenerate or non-finite boxes have zero area
    #[must_use]
    pub fn area(&self) -> f64 {
        let area = self.width.max(0.0) * self.height.max(0.0);
        if area.is_finite() {
            area
        } else {
            0.0
        }
    }
}

/// One face reported by the detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedFace {
    /// Left-right rotation, negative is left
    pub yaw_degrees: f64,
    /// Up-down rotation, positive is up
    #[serde(default)]
    pub pitch_degrees: Option<f64>,
    /// Face location in the frame
    pub bbox: BoundingBox,
}

/// Detection collaborator output for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectionFrame {
    /// Detector ran, possibly finding no face
    Faces {
        /// Faces in provider order
        faces: Vec<DetectedFace>,
        /// Frame width in pixels
        frame_width: u32,
        /// Frame height in pixels
        frame_height: u32,
        /// Capture time of the frame
        timestamp_millis: u64,
    },
    /// Detector reported a failure instead of a result
    Failed {
        /// Failure description from the detector
        reason: String,
        /// Capture time of the frame
        timestamp_millis: u64,
    },
}

impl DetectionFrame {
    /// Capture time of the frame
    #[must_use]
    pub fn timestamp_millis(&self) -> u64 {
        match self {
            Self::Faces { timestamp_millis, .. } | Self::Failed { timestamp_millis, .. } => *timestamp_millis,
        }
    }

    /// The detector reported at least one face
    #[must_use]
    pub fn has_faces(&self) -> bool {
        matches!(self, Self::Faces { faces, .. } if !faces.is_empty())
    }
}

/// Accepted, size-valid head pose sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Left-right rotation, negative is left
    pub yaw_degrees: f64,
    /// Up-down rotation when the detector provides it
    pub pitch_degrees: Option<f64>,
    /// Face area over frame area, in [0, 1]
    pub face_area_ratio: f64,
    /// Capture time of the frame
    pub timestamp_millis: u64,
}

/// Why a frame did not produce an observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Detector ran and found no face
    NoFace,
    /// Detector failed or returned unusable angles
    DetectorError,
    /// A face was found but is below the minimum size
    TooSmall,
}

/// Classification of one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOutcome {
    /// Frame produced a usable observation
    Accepted(Observation),
    /// Frame was rejected
    Rejected(RejectReason),
}

/// Validates detection frames for presence and face size
#[derive(Debug, Clone)]
pub struct PoseObservationFilter {
    min_face_size_ratio: f64,
    frame_size: Option<(u32, u32)>,
}

impl PoseObservationFilter {
    /// Create a new filter
    #[must_use]
    pub fn new(min_face_size_ratio: f64) -> Self {
        Self {
            min_face_size_ratio,
            frame_size: None,
        }
    }

    /// Create a filter from liveness configuration
    #[must_use]
    pub fn from_config(config: &LivenessConfig) -> Self {
        Self::new(config.min_face_size_ratio)
    }

    /// Frame dimensions frozen from the first sized frame
    #[must_use]
    pub fn frame_size(&self) -> Option<(u32, u32)> {
        self.frame_size
    }

    /// Classify a detection frame.
    ///
    /// The first face in provider order is used. Frame dimensions are taken
    /// from the first frame with a non-zero area and kept for the session.
    pub fn classify(&mut self, frame: &DetectionFrame) -> FilterOutcome {
        let (faces, frame_width, frame_height, timestamp_millis) = match frame {
            DetectionFrame::Failed { reason, .. } => {
                debug!("Detector failure: {}", reason);
                return FilterOutcome::Rejected(RejectReason::DetectorError);
            }
            DetectionFrame::Faces {
                faces,
                frame_width,
                frame_height,
                timestamp_millis,
            } => (faces, *frame_width, *frame_height, *timestamp_millis),
        };

        if self.frame_size.is_none() && frame_width > 0 && frame_height > 0 {
            self.frame_size = Some((frame_width, frame_height));
        }

        let Some(face) = faces.first() else {
            return FilterOutcome::Rejected(RejectReason::NoFace);
        };

        if !face.yaw_degrees.is_finite() {
            debug!("Discarding face with non-finite yaw {}", face.yaw_degrees);
            return FilterOutcome::Rejected(RejectReason::DetectorError);
        }

        let face_area_ratio = self.face_area_ratio(&face.bbox);
        if face_area_ratio < self.min_face_size_ratio {
            debug!(
                "Face too small: ratio {:.3} < {:.3}",
                face_area_ratio, self.min_face_size_ratio
            );
            return FilterOutcome::Rejected(RejectReason::TooSmall);
        }

        FilterOutcome::Accepted(Observation {
            yaw_degrees: face.yaw_degrees,
            pitch_degrees: face.pitch_degrees.filter(|pitch| pitch.is_finite()),
            face_area_ratio,
            timestamp_millis,
        })
    }

    fn face_area_ratio(&self, bbox: &BoundingBox) -> f64 {
        let Some((width, height)) = self.frame_size else {
            return 0.0;
        };
        let frame_area = f64::from(width) * f64::from(height);

        (bbox.area() / frame_area).clamp(0.0, 1.0)
    }
}
