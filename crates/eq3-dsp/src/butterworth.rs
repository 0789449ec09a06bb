//! High-order Butterworth design as cascaded second-order sections
//!
//! An even order N Butterworth response factors into N/2 biquads sharing the
//! cutoff frequency, section k having
//! `Q = 1 / (2 cos((2k + 1) * pi / (2N)))`.
//! Sections come out in ascending Q, the one nearest the signal input first.
//! That ordering keeps the high-Q section last and must be preserved when
//! installing them.

use eq3_core::Slope;
use std::f64::consts::PI;

use crate::biquad::BiquadCoeffs;

/// Maximum number of cascaded sections (48 dB/oct)
pub const MAX_SECTIONS: usize = 4;

/// Response of a cut filter design
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButterworthType {
    Lowpass,
    Highpass,
}

/// Q of section `k` of an order `order` Butterworth filter
#[inline]
pub fn section_q(order: usize, k: usize) -> f64 {
    debug_assert!(order % 2 == 0 && k < order / 2);
    1.0 / (2.0 * ((2 * k + 1) as f64 * PI / (2 * order) as f64).cos())
}

/// Fixed-capacity set of designed sections (no heap allocation)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutCoefficients {
    sections: [BiquadCoeffs; MAX_SECTIONS],
    count: usize,
}

impl CutCoefficients {
    /// Designed sections, input side first
    #[inline]
    pub fn sections(&self) -> &[BiquadCoeffs] {
        &self.sections[..self.count]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&BiquadCoeffs> {
        self.sections().get(index)
    }

    pub fn is_finite(&self) -> bool {
        self.sections().iter().all(BiquadCoeffs::is_finite)
    }
}

/// Design a Butterworth filter of order `2 * slope.sections()`
pub fn design(
    filter_type: ButterworthType,
    cutoff: f64,
    sample_rate: f64,
    slope: Slope,
) -> CutCoefficients {
    debug_assert!(
        cutoff > 0.0 && cutoff < sample_rate * 0.5,
        "cutoff {cutoff} Hz outside (0, nyquist) at {sample_rate} Hz"
    );

    let order = slope.order();
    let count = slope.sections();
    let mut sections = [BiquadCoeffs::bypass(); MAX_SECTIONS];

    for (k, section) in sections.iter_mut().enumerate().take(count) {
        let q = section_q(order, k);
        *section = match filter_type {
            ButterworthType::Lowpass => BiquadCoeffs::lowpass(cutoff, q, sample_rate),
            ButterworthType::Highpass => BiquadCoeffs::highpass(cutoff, q, sample_rate),
        };
    }

    CutCoefficients { sections, count }
}

/// Highpass design used by the low-cut band
#[inline]
pub fn design_highpass(cutoff: f64, sample_rate: f64, slope: Slope) -> CutCoefficients {
    design(ButterworthType::Highpass, cutoff, sample_rate, slope)
}

/// Lowpass design used by the high-cut band
#[inline]
pub fn design_lowpass(cutoff: f64, sample_rate: f64, slope: Slope) -> CutCoefficients {
    design(ButterworthType::Lowpass, cutoff, sample_rate, slope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLE_RATE: f64 = 48000.0;

    #[test]
    fn test_section_qs() {
        assert_relative_eq!(section_q(2, 0), std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);

        assert_relative_eq!(section_q(4, 0), 0.5411961001461969, epsilon = 1e-12);
        assert_relative_eq!(section_q(4, 1), 1.3065629648763764, epsilon = 1e-12);

        assert_relative_eq!(section_q(6, 0), 0.5176380902050415, epsilon = 1e-12);
        assert_relative_eq!(section_q(6, 1), std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_relative_eq!(section_q(6, 2), 1.9318516525781366, epsilon = 1e-12);

        assert_relative_eq!(section_q(8, 0), 0.5097955791041592, epsilon = 1e-12);
        assert_relative_eq!(section_q(8, 1), 0.6013448869350453, epsilon = 1e-12);
        assert_relative_eq!(section_q(8, 2), 0.8999762231364156, epsilon = 1e-12);
        assert_relative_eq!(section_q(8, 3), 2.5629154477415055, epsilon = 1e-12);
    }

    #[test]
    fn test_section_count_follows_slope() {
        for slope in Slope::ALL {
            let coeffs = design_highpass(100.0, SAMPLE_RATE, slope);
            assert_eq!(coeffs.len(), slope.sections());
            assert!(coeffs.get(slope.sections()).is_none());
            assert!(coeffs.is_finite());
        }
    }

    #[test]
    fn test_design_is_pure() {
        for slope in Slope::ALL {
            let a = design_lowpass(5000.0, 44100.0, slope);
            let b = design_lowpass(5000.0, 44100.0, slope);
            for (x, y) in a.sections().iter().zip(b.sections()) {
                assert_eq!(x.b0.to_bits(), y.b0.to_bits());
                assert_eq!(x.b1.to_bits(), y.b1.to_bits());
                assert_eq!(x.b2.to_bits(), y.b2.to_bits());
                assert_eq!(x.a1.to_bits(), y.a1.to_bits());
                assert_eq!(x.a2.to_bits(), y.a2.to_bits());
            }
        }
    }

    fn cascade_magnitude(coeffs: &CutCoefficients, freq: f64) -> f64 {
        coeffs
            .sections()
            .iter()
            .map(|c| c.magnitude_at(freq, SAMPLE_RATE))
            .product()
    }

    #[test]
    fn test_cascade_is_minus_3db_at_cutoff() {
        for slope in Slope::ALL {
            let lowpass = design_lowpass(1000.0, SAMPLE_RATE, slope);
            let highpass = design_highpass(1000.0, SAMPLE_RATE, slope);
            assert_relative_eq!(
                cascade_magnitude(&lowpass, 1000.0),
                std::f64::consts::FRAC_1_SQRT_2,
                epsilon = 1e-9
            );
            assert_relative_eq!(
                cascade_magnitude(&highpass, 1000.0),
                std::f64::consts::FRAC_1_SQRT_2,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_steeper_slope_attenuates_more() {
        let mut previous = f64::INFINITY;
        for slope in Slope::ALL {
            let coeffs = design_lowpass(1000.0, SAMPLE_RATE, slope);
            let magnitude = cascade_magnitude(&coeffs, 4000.0);
            assert!(magnitude < previous);
            previous = magnitude;
        }
        // 48 dB/oct: two octaves above cutoff is roughly -96 dB
        let db = 20.0 * previous.log10();
        assert!(db < -85.0, "got {db} dB");
    }
}
