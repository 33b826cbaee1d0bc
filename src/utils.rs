//! Utility functions shared by the session and the replay application.

pub mod safe_cast;

use safe_cast::u128_to_u64_saturating;
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock milliseconds since the Unix epoch, for session start times
#[must_use]
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| u128_to_u64_saturating(elapsed.as_millis()))
}
