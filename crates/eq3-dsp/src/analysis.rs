//! Response measurement for channel chains
//!
//! Runs off the audio thread: everything here allocates.

use eq3_core::{Eq3Error, Eq3Result, Sample, gain_to_db};
use realfft::RealFftPlanner;
use rustfft::num_complex::Complex;
use std::f64::consts::PI;

use crate::chain::ChannelChain;
use crate::{MonoProcessor, Processor};

/// Minimum FFT size
const MIN_FFT_SIZE: usize = 64;
/// Maximum FFT size
const MAX_FFT_SIZE: usize = 1 << 20;

/// Clear the chain's history and record its response to a unit impulse
pub fn impulse_response(chain: &mut ChannelChain, len: usize) -> Vec<Sample> {
    chain.reset();
    (0..len)
        .map(|i| chain.process_sample(if i == 0 { 1.0 } else { 0.0 }))
        .collect()
}

/// Magnitude spectrum of an impulse response
#[derive(Debug, Clone)]
pub struct FrequencyResponse {
    sample_rate: f64,
    fft_size: usize,
    magnitudes: Vec<f64>,
}

impl FrequencyResponse {
    /// FFT the impulse response, zero padded to a power of two
    pub fn from_impulse(impulse: &[Sample], sample_rate: f64) -> Eq3Result<Self> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(Eq3Error::InvalidSampleRate(sample_rate));
        }
        if impulse.is_empty() || impulse.len() > MAX_FFT_SIZE {
            return Err(Eq3Error::InvalidBlockSize(impulse.len()));
        }

        let fft_size = impulse.len().next_power_of_two().max(MIN_FFT_SIZE);
        let mut planner = RealFftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(fft_size);

        let mut input = fft.make_input_vec();
        input[..impulse.len()].copy_from_slice(impulse);
        let mut spectrum: Vec<Complex<f64>> = fft.make_output_vec();

        fft.process(&mut input, &mut spectrum)
            .map_err(|e| Eq3Error::Dsp(e.to_string()))?;

        Ok(Self {
            sample_rate,
            fft_size,
            magnitudes: spectrum.iter().map(|c| c.norm()).collect(),
        })
    }

    #[inline]
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Center frequency of `bin`
    #[inline]
    pub fn bin_frequency(&self, bin: usize) -> f64 {
        bin as f64 * self.sample_rate / self.fft_size as f64
    }

    /// Linear magnitude of the bin nearest `freq`
    pub fn magnitude_at(&self, freq: f64) -> f64 {
        let bin = (freq * self.fft_size as f64 / self.sample_rate).round() as usize;
        self.magnitudes[bin.min(self.magnitudes.len() - 1)]
    }

    #[inline]
    pub fn magnitude_db_at(&self, freq: f64) -> f64 {
        gain_to_db(self.magnitude_at(freq))
    }

    /// `(frequency, linear magnitude)` for every bin from DC to Nyquist
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.magnitudes
            .iter()
            .enumerate()
            .map(|(bin, &magnitude)| (self.bin_frequency(bin), magnitude))
    }
}

/// Steady-state gain of a sine at `freq` through the chain, in dB
///
/// Clears the chain's history first. The first half of `len` samples is
/// discarded as settling time.
pub fn sine_gain_db(chain: &mut ChannelChain, freq: f64, sample_rate: f64, len: usize) -> f64 {
    chain.reset();
    let settle = len / 2;
    let mut input_energy = 0.0;
    let mut output_energy = 0.0;

    for i in 0..len {
        let x = (2.0 * PI * freq * i as f64 / sample_rate).sin();
        let y = chain.process_sample(x);
        if i >= settle {
            input_energy += x * x;
            output_energy += y * y;
        }
    }

    if input_energy <= 0.0 {
        return 0.0;
    }
    gain_to_db((output_energy / input_energy).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use eq3_core::Slope;

    const SAMPLE_RATE: f64 = 48000.0;

    #[test]
    fn test_impulse_of_transparent_chain() {
        let mut chain = ChannelChain::new();
        let ir = impulse_response(&mut chain, 8);
        assert_eq!(ir, vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

        let response = FrequencyResponse::from_impulse(&ir, SAMPLE_RATE).unwrap();
        assert_eq!(response.fft_size(), MIN_FFT_SIZE);
        for (_, magnitude) in response.bins() {
            assert_abs_diff_eq!(magnitude, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_measured_response_matches_analytic() {
        let mut chain = ChannelChain::new();
        chain.peak_mut().configure(2000.0, 9.0, 2.0, SAMPLE_RATE);
        chain.high_cut_mut().configure(8000.0, Slope::Db24, SAMPLE_RATE);

        let ir = impulse_response(&mut chain, 8192);
        let response = FrequencyResponse::from_impulse(&ir, SAMPLE_RATE).unwrap();

        for bin in [43, 341, 683, 1365] {
            let freq = response.bin_frequency(bin);
            let expected = chain.magnitude_for_frequency(freq, SAMPLE_RATE);
            assert_abs_diff_eq!(response.magnitude_at(freq), expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_sine_gain_at_peak() {
        let mut chain = ChannelChain::new();
        chain.peak_mut().configure(1000.0, 12.0, 1.0, SAMPLE_RATE);
        let gain = sine_gain_db(&mut chain, 1000.0, SAMPLE_RATE, 48000);
        assert_abs_diff_eq!(gain, 12.0, epsilon = 0.05);
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            FrequencyResponse::from_impulse(&[], SAMPLE_RATE),
            Err(Eq3Error::InvalidBlockSize(0))
        ));
        assert!(matches!(
            FrequencyResponse::from_impulse(&[1.0], 0.0),
            Err(Eq3Error::InvalidSampleRate(_))
        ));
    }
}
