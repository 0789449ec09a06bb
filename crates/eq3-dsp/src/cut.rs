//! Low-cut / high-cut filter banks
//!
//! A bank owns four biquad slots for the steepest slope (48 dB/oct) and
//! activates a prefix of them: slot `i` runs when `i < slope.sections()`,
//! every slot after it is bypassed. Steeper slopes therefore always switch on
//! a strictly larger prefix, never an arbitrary subset.

use eq3_core::{Sample, Slope};

use crate::biquad::BiquadStage;
use crate::butterworth::{self, ButterworthType, CutCoefficients, MAX_SECTIONS};
use crate::{MonoProcessor, Processor};

/// Which side of the spectrum a bank removes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutKind {
    /// Removes lows (Butterworth highpass)
    LowCut,
    /// Removes highs (Butterworth lowpass)
    HighCut,
}

impl CutKind {
    #[inline]
    pub fn response(self) -> ButterworthType {
        match self {
            CutKind::LowCut => ButterworthType::Highpass,
            CutKind::HighCut => ButterworthType::Lowpass,
        }
    }

    /// Design the sections for this kind of cut
    #[inline]
    pub fn design(self, cutoff: f64, sample_rate: f64, slope: Slope) -> CutCoefficients {
        butterworth::design(self.response(), cutoff, sample_rate, slope)
    }
}

/// Fixed four-slot cascade for one cut band of one channel
#[derive(Debug, Clone)]
pub struct CascadedBank {
    kind: CutKind,
    stages: [BiquadStage; MAX_SECTIONS],
    slope: Slope,
}

impl CascadedBank {
    /// New bank with one active unity stage, matching the 12 dB/oct default
    pub fn new(kind: CutKind) -> Self {
        let mut bank = Self {
            kind,
            stages: std::array::from_fn(|_| BiquadStage::new()),
            slope: Slope::Db12,
        };
        bank.set_active_prefix(Slope::Db12.sections());
        bank
    }

    #[inline]
    pub fn kind(&self) -> CutKind {
        self.kind
    }

    /// Design for `cutoff_hz` at `slope` and install the result
    ///
    /// The cutoff must already be clamped to the audible range and below
    /// Nyquist. Returns false when the design was not finite and the previous
    /// coefficients were retained.
    pub fn configure(&mut self, cutoff_hz: f64, slope: Slope, sample_rate: f64) -> bool {
        let coeffs = self.kind.design(cutoff_hz, sample_rate, slope);
        self.install(&coeffs, slope)
    }

    /// Install designed sections and update the bypass mask for `slope`
    ///
    /// Stale coefficients stay in bypassed slots; they are never run. A slot
    /// is only activated when `coeffs` carries a section for it, so a design
    /// shorter than `slope` leaves the remaining slots bypassed.
    pub fn install(&mut self, coeffs: &CutCoefficients, slope: Slope) -> bool {
        let active = slope.sections();

        debug_assert!(coeffs.is_finite(), "non-finite cut design {coeffs:?}");
        if !coeffs.is_finite() {
            return false;
        }

        for (index, stage) in self.stages.iter_mut().enumerate() {
            match coeffs.get(index) {
                Some(section) if index < active => {
                    stage.replace_coeffs(section);
                    stage.set_bypassed(false);
                }
                _ => stage.set_bypassed(true),
            }
        }
        self.slope = slope;
        true
    }

    fn set_active_prefix(&mut self, active: usize) {
        for (index, stage) in self.stages.iter_mut().enumerate() {
            stage.set_bypassed(index >= active);
        }
    }

    /// Slope last installed
    #[inline]
    pub fn slope(&self) -> Slope {
        self.slope
    }

    /// Number of stages currently running
    pub fn active_stages(&self) -> usize {
        self.stages.iter().filter(|stage| !stage.is_bypassed()).count()
    }

    #[inline]
    pub fn is_bypassed(&self, index: usize) -> bool {
        self.stages[index].is_bypassed()
    }

    #[inline]
    pub fn stage(&self, index: usize) -> &BiquadStage {
        &self.stages[index]
    }

    #[inline]
    pub fn stages(&self) -> &[BiquadStage; MAX_SECTIONS] {
        &self.stages
    }

    /// Linear magnitude of the active stages at `freq`
    pub fn magnitude_at(&self, freq: f64, sample_rate: f64) -> f64 {
        self.stages
            .iter()
            .filter(|stage| !stage.is_bypassed())
            .map(|stage| stage.coeffs().magnitude_at(freq, sample_rate))
            .product()
    }
}

impl Processor for CascadedBank {
    fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }
}

impl MonoProcessor for CascadedBank {
    #[inline]
    fn process_sample(&mut self, input: Sample) -> Sample {
        self.stages
            .iter_mut()
            .fold(input, |sample, stage| stage.process_sample(sample))
    }
}
