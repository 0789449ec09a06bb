//! Sample type definitions

/// Type alias for audio samples (always f64 for maximum precision)
pub type Sample = f64;

/// Number of channels the equalizer processes. Further channels pass through.
pub const EQ_CHANNELS: usize = 2;

/// Gains below this level are treated as silence
pub const MINUS_INFINITY_DB: f64 = -100.0;

/// Convert decibels to linear gain. Anything at or below
/// [`MINUS_INFINITY_DB`] maps to 0.0.
#[inline]
pub fn db_to_gain(db: f64) -> f64 {
    if db > MINUS_INFINITY_DB {
        10.0_f64.powf(db * 0.05)
    } else {
        0.0
    }
}

/// Convert linear gain to decibels, floored at [`MINUS_INFINITY_DB`]
#[inline]
pub fn gain_to_db(gain: f64) -> f64 {
    if gain > 0.0 {
        (20.0 * gain.log10()).max(MINUS_INFINITY_DB)
    } else {
        MINUS_INFINITY_DB
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_db_gain_conversion() {
        assert_relative_eq!(db_to_gain(0.0), 1.0);
        assert_relative_eq!(db_to_gain(20.0), 10.0, epsilon = 1e-12);
        assert_relative_eq!(db_to_gain(-6.0), 0.501187, epsilon = 1e-6);
        assert_eq!(db_to_gain(-120.0), 0.0);
        assert_relative_eq!(gain_to_db(db_to_gain(12.0)), 12.0, epsilon = 1e-12);
        assert_eq!(gain_to_db(0.0), MINUS_INFINITY_DB);
    }
}
