//! Constants used throughout the library

/// Head-turn span (degrees) that counts as 100 percent progress
pub const DEFAULT_TARGET_SPAN_DEGREES: f64 = 80.0;

/// Minimum session age before completion may fire
pub const DEFAULT_MIN_COMPLETION_TIME_MILLIS: u64 = 3000;

/// Minimum face bounding-box area as a fraction of the frame area
pub const DEFAULT_MIN_FACE_SIZE_RATIO: f64 = 0.15;

/// Consecutive detection misses before the watchdog signals
pub const DEFAULT_MAX_MISSED_FRAMES: u32 = 10;

/// Deadzone around the neutral pose for directional flags
pub const DEFAULT_MOVEMENT_THRESHOLD_DEGREES: f64 = 10.0;

/// Delay between the gate firing and the capture requests
pub const DEFAULT_CAPTURE_DELAY_MILLIS: u64 = 0;

/// Session abandonment timeout, 0 disables it
pub const DEFAULT_TIMEOUT_MILLIS: u64 = 15_000;

/// Upper bound on a single capture collaborator request
pub const DEFAULT_ARTIFACT_TIMEOUT_MILLIS: u64 = 10_000;

/// Largest progress value reported to the presentation channel
pub const MAX_PERCENT: u8 = 100;
