//! Peak (bell) band
//!
//! Always active: at 0 dB the stage is unity, but it still runs.

use eq3_core::Sample;

use crate::biquad::{BiquadCoeffs, BiquadStage};
use crate::{MonoProcessor, Processor};

/// Single parametric bell filter
#[derive(Debug, Clone, Default)]
pub struct PeakStage {
    stage: BiquadStage,
}

impl PeakStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Design a peaking biquad and install it
    ///
    /// Returns false when the design was not finite and the previous
    /// coefficients were retained.
    pub fn configure(&mut self, freq_hz: f64, gain_db: f64, q: f64, sample_rate: f64) -> bool {
        let coeffs = design(freq_hz, gain_db, q, sample_rate);
        self.install(&coeffs)
    }

    /// Install already designed coefficients
    #[inline]
    pub fn install(&mut self, coeffs: &BiquadCoeffs) -> bool {
        self.stage.replace_coeffs(coeffs)
    }

    #[inline]
    pub fn coeffs(&self) -> &BiquadCoeffs {
        self.stage.coeffs()
    }

    #[inline]
    pub fn magnitude_at(&self, freq: f64, sample_rate: f64) -> f64 {
        self.stage.coeffs().magnitude_at(freq, sample_rate)
    }
}

/// Peaking design shared by both channels
#[inline]
pub fn design(freq_hz: f64, gain_db: f64, q: f64, sample_rate: f64) -> BiquadCoeffs {
    debug_assert!(q > 0.0, "peak quality must be positive, got {q}");
    debug_assert!(
        freq_hz > 0.0 && freq_hz < sample_rate * 0.5,
        "peak frequency {freq_hz} Hz outside (0, nyquist) at {sample_rate} Hz"
    );
    BiquadCoeffs::peaking(freq_hz, q, gain_db, sample_rate)
}

impl Processor for PeakStage {
    fn reset(&mut self) {
        self.stage.reset();
    }
}

impl MonoProcessor for PeakStage {
    #[inline]
    fn process_sample(&mut self, input: Sample) -> Sample {
        self.stage.process_sample(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eq3_core::db_to_gain;

    const SAMPLE_RATE: f64 = 44100.0;

    #[test]
    fn test_zero_gain_is_unity() {
        for &(freq, q) in &[(20.0, 0.1), (750.0, 1.0), (5000.0, 4.0), (19000.0, 10.0)] {
            let mut peak = PeakStage::new();
            peak.configure(freq, 0.0, q, SAMPLE_RATE);
            for i in 0..2048 {
                let x = ((i * 7919) % 2001) as f64 / 1000.0 - 1.0;
                let y = peak.process_sample(x);
                assert!((y - x).abs() < 1e-12, "freq {freq} q {q}: {y} != {x}");
            }
        }
    }

    #[test]
    fn test_boost_at_center() {
        let mut peak = PeakStage::new();
        peak.configure(1000.0, 12.0, 1.0, SAMPLE_RATE);
        let center = peak.magnitude_at(1000.0, SAMPLE_RATE);
        assert!((center - db_to_gain(12.0)).abs() < 1e-9);
        assert!(peak.magnitude_at(100.0, SAMPLE_RATE) < db_to_gain(1.0));
        assert!(peak.magnitude_at(10000.0, SAMPLE_RATE) < db_to_gain(1.0));
    }

    #[test]
    fn test_cut_at_center() {
        let mut peak = PeakStage::new();
        peak.configure(2000.0, -24.0, 2.0, SAMPLE_RATE);
        let center = peak.magnitude_at(2000.0, SAMPLE_RATE);
        assert!((center - db_to_gain(-24.0)).abs() < 1e-9);
    }

    #[test]
    fn test_reconfigure_is_idempotent() {
        let mut peak = PeakStage::new();
        peak.configure(750.0, 6.0, 1.0, SAMPLE_RATE);
        let first = *peak.coeffs();
        peak.configure(750.0, 6.0, 1.0, SAMPLE_RATE);
        assert_eq!(*peak.coeffs(), first);
    }
}
