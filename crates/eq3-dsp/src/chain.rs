//! Mono channel chain: low cut → peak → high cut
//!
//! The series order is fixed. Each channel of the equalizer owns one chain
//! and every coefficient inside it.

use eq3_core::Sample;

use crate::cut::{CascadedBank, CutKind};
use crate::peak::PeakStage;
use crate::{MonoProcessor, Processor};

/// Position of a band in the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainPosition {
    LowCut,
    Peak,
    HighCut,
}

impl ChainPosition {
    /// Processing order
    pub const ORDER: [ChainPosition; 3] = [
        ChainPosition::LowCut,
        ChainPosition::Peak,
        ChainPosition::HighCut,
    ];
}

/// Processing spec handed to `prepare`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
    pub sample_rate: f64,
    pub max_block_size: usize,
}

/// One channel's filter chain
#[derive(Debug, Clone)]
pub struct ChannelChain {
    low_cut: CascadedBank,
    peak: PeakStage,
    high_cut: CascadedBank,
    spec: Option<ProcessSpec>,
}

impl Default for ChannelChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelChain {
    pub fn new() -> Self {
        Self {
            low_cut: CascadedBank::new(CutKind::LowCut),
            peak: PeakStage::new(),
            high_cut: CascadedBank::new(CutKind::HighCut),
            spec: None,
        }
    }

    /// Record the processing spec and clear all filter history.
    /// Installed coefficients are kept.
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize) {
        self.spec = Some(ProcessSpec {
            sample_rate,
            max_block_size,
        });
        self.reset();
    }

    #[inline]
    pub fn spec(&self) -> Option<ProcessSpec> {
        self.spec
    }

    /// Run every sample of `samples` through the chain
    #[inline]
    pub fn process_in_place(&mut self, samples: &mut [Sample]) {
        debug_assert!(
            self.spec.is_none_or(|spec| samples.len() <= spec.max_block_size),
            "block of {} samples exceeds prepared size",
            samples.len()
        );
        self.process_block(samples);
    }

    #[inline]
    pub fn low_cut(&self) -> &CascadedBank {
        &self.low_cut
    }

    #[inline]
    pub fn low_cut_mut(&mut self) -> &mut CascadedBank {
        &mut self.low_cut
    }

    #[inline]
    pub fn peak(&self) -> &PeakStage {
        &self.peak
    }

    #[inline]
    pub fn peak_mut(&mut self) -> &mut PeakStage {
        &mut self.peak
    }

    #[inline]
    pub fn high_cut(&self) -> &CascadedBank {
        &self.high_cut
    }

    #[inline]
    pub fn high_cut_mut(&mut self) -> &mut CascadedBank {
        &mut self.high_cut
    }

    /// Linear magnitude of one band at `freq`
    pub fn band_magnitude(&self, position: ChainPosition, freq: f64, sample_rate: f64) -> f64 {
        match position {
            ChainPosition::LowCut => self.low_cut.magnitude_at(freq, sample_rate),
            ChainPosition::Peak => self.peak.magnitude_at(freq, sample_rate),
            ChainPosition::HighCut => self.high_cut.magnitude_at(freq, sample_rate),
        }
    }

    /// Linear magnitude of the whole chain at `freq`
    pub fn magnitude_for_frequency(&self, freq: f64, sample_rate: f64) -> f64 {
        ChainPosition::ORDER
            .iter()
            .map(|&position| self.band_magnitude(position, freq, sample_rate))
            .product()
    }
}

impl Processor for ChannelChain {
    fn reset(&mut self) {
        self.low_cut.reset();
        self.peak.reset();
        self.high_cut.reset();
    }
}

impl MonoProcessor for ChannelChain {
    #[inline]
    fn process_sample(&mut self, input: Sample) -> Sample {
        let sample = self.low_cut.process_sample(input);
        let sample = self.peak.process_sample(sample);
        self.high_cut.process_sample(sample)
    }
}
