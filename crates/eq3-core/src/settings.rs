//! Per-block chain settings snapshot

use serde::{Deserialize, Serialize};

use crate::params::{ParameterSource, SLOPE_CHOICES, ids};

/// Cut filter slope
///
/// The discriminant is the number of cascaded second-order sections minus one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Slope {
    #[default]
    Db12 = 0,
    Db24 = 1,
    Db36 = 2,
    Db48 = 3,
}

impl Slope {
    pub const ALL: [Slope; SLOPE_CHOICES] = [Slope::Db12, Slope::Db24, Slope::Db36, Slope::Db48];

    /// Map a raw choice value (0..=3) to a slope, rounding and clamping
    pub fn from_index(raw: f64) -> Self {
        if !raw.is_finite() {
            return Self::default();
        }
        let index = raw.round().clamp(0.0, (SLOPE_CHOICES - 1) as f64) as usize;
        Self::ALL[index]
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Number of cascaded biquad sections
    #[inline]
    pub fn sections(self) -> usize {
        self.index() + 1
    }

    /// Butterworth filter order
    #[inline]
    pub fn order(self) -> usize {
        2 * self.sections()
    }

    #[inline]
    pub fn db_per_octave(self) -> u32 {
        12 * self.sections() as u32
    }

    pub fn label(self) -> &'static str {
        match self {
            Slope::Db12 => "12 db/Oct",
            Slope::Db24 => "24 db/Oct",
            Slope::Db36 => "36 db/Oct",
            Slope::Db48 => "48 db/Oct",
        }
    }
}

/// Parameter snapshot read at the start of every audio block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainSettings {
    pub low_cut_freq: f64,
    pub high_cut_freq: f64,
    pub peak_freq: f64,
    pub peak_gain_db: f64,
    pub peak_quality: f64,
    pub low_cut_slope: Slope,
    pub high_cut_slope: Slope,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            low_cut_freq: 20.0,
            high_cut_freq: 20000.0,
            peak_freq: 750.0,
            peak_gain_db: 0.0,
            peak_quality: 1.0,
            low_cut_slope: Slope::Db12,
            high_cut_slope: Slope::Db12,
        }
    }
}

/// Lowest frequency any band is designed at
pub const MIN_FREQ: f64 = 20.0;
/// Highest frequency any band is designed at, sample rate permitting
pub const MAX_FREQ: f64 = 20000.0;
/// Upper design limit as a fraction of the sample rate (just below Nyquist)
pub const MAX_FREQ_RATIO: f64 = 0.49;
/// Lowest peak quality
pub const MIN_QUALITY: f64 = 0.1;

impl ChainSettings {
    /// Limit every frequency to what can be designed at `sample_rate`
    ///
    /// At low sample rates the 20 kHz upper bound sits above Nyquist; the
    /// frequencies are pulled just under it instead.
    pub fn clamped(&self, sample_rate: f64) -> Self {
        let max_freq = MAX_FREQ.min(sample_rate * MAX_FREQ_RATIO).max(MIN_FREQ);
        let freq = |hz: f64| hz.clamp(MIN_FREQ, max_freq);

        Self {
            low_cut_freq: freq(self.low_cut_freq),
            high_cut_freq: freq(self.high_cut_freq),
            peak_freq: freq(self.peak_freq),
            peak_quality: self.peak_quality.max(MIN_QUALITY),
            ..*self
        }
    }

    /// Read every field from a parameter source
    ///
    /// Fields are loaded one by one; ids the source does not know keep their
    /// default value.
    pub fn from_source<S: ParameterSource + ?Sized>(source: &S) -> Self {
        let defaults = Self::default();
        let read = |id: &str, fallback: f64| source.raw_value(id).unwrap_or(fallback);

        Self {
            low_cut_freq: read(ids::LOW_CUT_FREQ, defaults.low_cut_freq),
            high_cut_freq: read(ids::HIGH_CUT_FREQ, defaults.high_cut_freq),
            peak_freq: read(ids::PEAK_FREQ, defaults.peak_freq),
            peak_gain_db: read(ids::PEAK_GAIN, defaults.peak_gain_db),
            peak_quality: read(ids::PEAK_QUALITY, defaults.peak_quality),
            low_cut_slope: Slope::from_index(read(ids::LOW_CUT_SLOPE, 0.0)),
            high_cut_slope: Slope::from_index(read(ids::HIGH_CUT_SLOPE, 0.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParamStore;
    use std::collections::HashMap;

    #[test]
    fn test_slope_sections() {
        let expected = [(1, 2, 12), (2, 4, 24), (3, 6, 36), (4, 8, 48)];
        for (slope, (sections, order, db)) in Slope::ALL.iter().zip(expected) {
            assert_eq!(slope.sections(), sections);
            assert_eq!(slope.order(), order);
            assert_eq!(slope.db_per_octave(), db);
        }
        assert_eq!(Slope::Db36.label(), "36 db/Oct");
    }

    #[test]
    fn test_slope_from_index() {
        assert_eq!(Slope::from_index(0.0), Slope::Db12);
        assert_eq!(Slope::from_index(2.0), Slope::Db36);
        assert_eq!(Slope::from_index(2.6), Slope::Db48);
        assert_eq!(Slope::from_index(9.0), Slope::Db48);
        assert_eq!(Slope::from_index(-1.0), Slope::Db12);
        assert_eq!(Slope::from_index(f64::NAN), Slope::Db12);
    }

    #[test]
    fn test_default_store_gives_default_settings() {
        let store = ParamStore::new();
        assert_eq!(ChainSettings::from_source(&store), ChainSettings::default());
    }

    #[test]
    fn test_from_source_reads_store() {
        let store = ParamStore::new();
        store.set(ids::PEAK_FREQ, 1000.0).unwrap();
        store.set(ids::PEAK_GAIN, 12.0).unwrap();
        store.set(ids::LOW_CUT_SLOPE, 3.0).unwrap();

        let settings = ChainSettings::from_source(&store);
        assert_eq!(settings.peak_freq, 1000.0);
        assert_eq!(settings.peak_gain_db, 12.0);
        assert_eq!(settings.low_cut_slope, Slope::Db48);
        assert_eq!(settings.high_cut_slope, Slope::Db12);
    }

    #[test]
    fn test_clamped_respects_nyquist() {
        let settings = ChainSettings {
            high_cut_freq: 20000.0,
            peak_freq: 15000.0,
            low_cut_freq: 5.0,
            peak_quality: 0.0,
            ..ChainSettings::default()
        };

        assert_eq!(settings.clamped(48000.0).high_cut_freq, 20000.0);

        let low_rate = settings.clamped(22050.0);
        assert_eq!(low_rate.high_cut_freq, 22050.0 * MAX_FREQ_RATIO);
        assert_eq!(low_rate.peak_freq, 22050.0 * MAX_FREQ_RATIO);
        assert_eq!(low_rate.low_cut_freq, MIN_FREQ);
        assert_eq!(low_rate.peak_quality, MIN_QUALITY);
        assert_eq!(low_rate.low_cut_slope, settings.low_cut_slope);
    }

    struct PartialSource(HashMap<&'static str, f64>);

    impl ParameterSource for PartialSource {
        fn raw_value(&self, id: &str) -> Option<f64> {
            self.0.get(id).copied()
        }
    }

    #[test]
    fn test_missing_ids_fall_back() {
        let source = PartialSource(HashMap::from([(ids::HIGH_CUT_FREQ, 8000.0)]));
        let settings = ChainSettings::from_source(&source);
        assert_eq!(settings.high_cut_freq, 8000.0);
        assert_eq!(settings.low_cut_freq, 20.0);
        assert_eq!(settings.peak_quality, 1.0);
    }
}
