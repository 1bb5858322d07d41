//! Volume conversions
//!
//! Helpers between decibels and linear gain, independent of any resource.

/// Convert decibels to a linear gain factor (0 dB = 1.0)
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(0.05 * db)
}

/// Convert a linear gain factor to decibels
///
/// A gain of 0 yields negative infinity.
pub fn linear_to_db(volume: f32) -> f32 {
    20.0 * volume.log10()
}
