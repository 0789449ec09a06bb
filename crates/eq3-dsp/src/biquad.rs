//! Biquad filter implementation using Transposed Direct Form II
//!
//! TDF-II is numerically optimal for floating-point arithmetic,
//! minimizing quantization noise and ensuring stability.
//!
//! A [`BiquadStage`] can be bypassed without leaving the chain it sits in.
//! Replacing its coefficients keeps the filter history, so coefficient
//! changes between blocks do not restart the filter.

use eq3_core::Sample;
use rustfft::num_complex::Complex;
use std::f64::consts::PI;

use crate::{MonoProcessor, Processor};

/// Biquad coefficients, normalized so that a0 = 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl Default for BiquadCoeffs {
    fn default() -> Self {
        Self::bypass()
    }
}

impl BiquadCoeffs {
    /// Calculate lowpass filter coefficients
    pub fn lowpass(freq: f64, q: f64, sample_rate: f64) -> Self {
        let omega = 2.0 * PI * freq / sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / (2.0 * q);

        let b0 = (1.0 - cos_omega) / 2.0;
        let b1 = 1.0 - cos_omega;
        let b2 = (1.0 - cos_omega) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        Self::normalized(b0, b1, b2, a0, a1, a2)
    }

    /// Calculate highpass filter coefficients
    pub fn highpass(freq: f64, q: f64, sample_rate: f64) -> Self {
        let omega = 2.0 * PI * freq / sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / (2.0 * q);

        let b0 = (1.0 + cos_omega) / 2.0;
        let b1 = -(1.0 + cos_omega);
        let b2 = (1.0 + cos_omega) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        Self::normalized(b0, b1, b2, a0, a1, a2)
    }

    /// Calculate peaking EQ filter coefficients
    /// gain_db: gain in decibels at the center frequency
    pub fn peaking(freq: f64, q: f64, gain_db: f64, sample_rate: f64) -> Self {
        // A is the square root of the linear gain
        let a = 10.0_f64.powf(gain_db / 40.0);
        let omega = 2.0 * PI * freq / sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / (2.0 * q);

        let b0 = 1.0 + alpha * a;
        let b1 = -2.0 * cos_omega;
        let b2 = 1.0 - alpha * a;
        let a0 = 1.0 + alpha / a;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha / a;

        Self::normalized(b0, b1, b2, a0, a1, a2)
    }

    /// Bypass (unity gain, no filtering)
    pub const fn bypass() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }

    #[inline]
    fn normalized(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    /// True when every coefficient is a finite number
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.b0.is_finite()
            && self.b1.is_finite()
            && self.b2.is_finite()
            && self.a1.is_finite()
            && self.a2.is_finite()
    }

    /// Linear magnitude of the transfer function at `freq`
    pub fn magnitude_at(&self, freq: f64, sample_rate: f64) -> f64 {
        let omega = 2.0 * PI * freq / sample_rate;
        // z^-1 on the unit circle
        let z1 = Complex::from_polar(1.0, -omega);
        let z2 = z1 * z1;

        let numerator = Complex::new(self.b0, 0.0) + z1 * self.b1 + z2 * self.b2;
        let denominator = Complex::new(1.0, 0.0) + z1 * self.a1 + z2 * self.a2;
        numerator.norm() / denominator.norm()
    }
}

/// Single second-order section with its own history and a bypass switch
#[derive(Debug, Clone)]
pub struct BiquadStage {
    coeffs: BiquadCoeffs,
    z1: f64,
    z2: f64,
    bypassed: bool,
}

impl Default for BiquadStage {
    fn default() -> Self {
        Self::new()
    }
}

impl BiquadStage {
    pub fn new() -> Self {
        Self::with_coeffs(BiquadCoeffs::bypass())
    }

    pub fn with_coeffs(coeffs: BiquadCoeffs) -> Self {
        Self {
            coeffs,
            z1: 0.0,
            z2: 0.0,
            bypassed: false,
        }
    }

    /// Replace the coefficients. History is kept.
    #[inline]
    pub fn set_coeffs(&mut self, coeffs: BiquadCoeffs) {
        self.coeffs = coeffs;
    }

    #[inline]
    pub fn coeffs(&self) -> &BiquadCoeffs {
        &self.coeffs
    }

    /// Install `coeffs` unless they are already there or not finite.
    ///
    /// Returns false when a non-finite set was refused; the stage keeps its
    /// previous coefficients in that case.
    #[inline]
    pub fn replace_coeffs(&mut self, coeffs: &BiquadCoeffs) -> bool {
        debug_assert!(coeffs.is_finite(), "non-finite coefficients {coeffs:?}");
        if !coeffs.is_finite() {
            return false;
        }
        if self.coeffs != *coeffs {
            self.coeffs = *coeffs;
        }
        true
    }

    /// Switch the stage in or out. Changing the state clears the history so a
    /// reactivated stage starts from silence.
    #[inline]
    pub fn set_bypassed(&mut self, bypassed: bool) {
        if self.bypassed != bypassed {
            self.bypassed = bypassed;
            self.reset();
        }
    }

    #[inline]
    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }
}

impl Processor for BiquadStage {
    fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}

impl MonoProcessor for BiquadStage {
    #[inline(always)]
    fn process_sample(&mut self, input: Sample) -> Sample {
        if self.bypassed {
            return input;
        }
        let output = self.coeffs.b0 * input + self.z1;
        self.z1 = self.coeffs.b1 * input - self.coeffs.a1 * output + self.z2;
        self.z2 = self.coeffs.b2 * input - self.coeffs.a2 * output;
        output
    }
}
