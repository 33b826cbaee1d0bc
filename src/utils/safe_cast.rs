//! Saturating numeric conversions used on the frame path

/// Clamp and convert f64 to u8, non-finite input maps to `min`
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Clamping ensures safe truncation
#[allow(clippy::cast_sign_loss)] // Clamped to a non-negative range first
pub fn f64_to_u8_clamp(value: f64, min: u8, max: u8) -> u8 {
    // Ensure min <= max
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    if !value.is_finite() {
        return min;
    }

    let clamped = value.clamp(f64::from(min), f64::from(max));

    (clamped as u8).clamp(min, max)
}

/// Convert a millisecond count to u64, saturating at `u64::MAX`
#[must_use]
pub fn u128_to_u64_saturating(value: u128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
