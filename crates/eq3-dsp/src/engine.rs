//! Stereo three-band equalizer engine
//!
//! Owns the left and right chains and the last parameter snapshot. Each call
//! to [`EqualizerEngine::process_block`] first reads a fresh snapshot from the
//! shared [`ParamStore`], installs coefficients, then filters channel 0 with
//! the left chain and channel 1 with the right chain. Further channels are
//! left untouched.
//!
//! Nothing on the block path allocates, locks or returns an error; a block
//! that arrives before [`EqualizerEngine::prepare`] is rejected and the buffer
//! is left as it was.

use std::sync::Arc;

use eq3_core::{
    ChainSettings, EQ_CHANNELS, Eq3Error, Eq3Result, MAX_FREQ_RATIO, MIN_FREQ, ParamStore, Sample,
};

use crate::chain::{ChannelChain, ProcessSpec};
use crate::controller::FilterChainController;
use crate::Processor;

/// Outcome of a block call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// Channels 0 and 1 were filtered
    Processed,
    /// `prepare` has not been called; the buffer was not touched
    NotPrepared,
}

/// Two-channel low cut / peak / high cut equalizer
#[derive(Debug)]
pub struct EqualizerEngine {
    params: Arc<ParamStore>,
    settings: ChainSettings,
    controller: FilterChainController,
    left: ChannelChain,
    right: ChannelChain,
    spec: Option<ProcessSpec>,
    warned_unprepared: bool,
}

impl Default for EqualizerEngine {
    fn default() -> Self {
        Self::new(Arc::new(ParamStore::new()))
    }
}

impl EqualizerEngine {
    pub fn new(params: Arc<ParamStore>) -> Self {
        Self {
            params,
            settings: ChainSettings::default(),
            controller: FilterChainController::new(),
            left: ChannelChain::new(),
            right: ChannelChain::new(),
            spec: None,
            warned_unprepared: false,
        }
    }

    /// Configure for playback. Must be called before any block.
    ///
    /// Clears filter history but keeps installed coefficients, then installs
    /// coefficients for the current parameters at the new rate. Rates too low
    /// to place the lowest band frequency under Nyquist are refused.
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize) -> Eq3Result<()> {
        if !sample_rate.is_finite() || sample_rate * MAX_FREQ_RATIO < MIN_FREQ {
            return Err(Eq3Error::InvalidSampleRate(sample_rate));
        }
        if max_block_size == 0 {
            return Err(Eq3Error::InvalidBlockSize(max_block_size));
        }

        self.spec = Some(ProcessSpec {
            sample_rate,
            max_block_size,
        });
        self.left.prepare(sample_rate, max_block_size);
        self.right.prepare(sample_rate, max_block_size);
        self.warned_unprepared = false;

        log::debug!(
            "Equalizer prepared: {} Hz, max block {} samples",
            sample_rate,
            max_block_size
        );

        self.update_from_parameters();
        Ok(())
    }

    /// Read a fresh snapshot from the parameter store and install it
    ///
    /// Before `prepare` only the snapshot is taken; there is no rate to
    /// design at.
    pub fn update_from_parameters(&mut self) {
        self.settings = ChainSettings::from_source(self.params.as_ref());

        if let Some(spec) = self.spec {
            let settings = self.settings.clamped(spec.sample_rate);
            self.controller
                .update(&settings, spec.sample_rate, &mut self.left, &mut self.right);
        }
    }

    /// Filter one block given as per-channel slices
    pub fn process_block(&mut self, channels: &mut [&mut [Sample]]) -> ProcessStatus {
        if self.spec.is_none() {
            return self.reject();
        }

        self.update_from_parameters();

        let mut channels = channels.iter_mut();
        if let Some(left) = channels.next() {
            self.left.process_in_place(left);
        }
        if let Some(right) = channels.next() {
            self.right.process_in_place(right);
        }
        ProcessStatus::Processed
    }

    /// Filter one block stored channel after channel in `data`
    ///
    /// Only whole channels of `num_samples` that fit in `data` are processed.
    pub fn process_planar(
        &mut self,
        data: &mut [Sample],
        num_channels: usize,
        num_samples: usize,
    ) -> ProcessStatus {
        if self.spec.is_none() {
            return self.reject();
        }
        debug_assert!(data.len() >= num_channels * num_samples);

        self.update_from_parameters();

        if num_samples == 0 {
            return ProcessStatus::Processed;
        }

        let mut channels = data
            .chunks_exact_mut(num_samples)
            .take(num_channels.min(EQ_CHANNELS));
        if let Some(left) = channels.next() {
            self.left.process_in_place(left);
        }
        if let Some(right) = channels.next() {
            self.right.process_in_place(right);
        }
        ProcessStatus::Processed
    }

    fn reject(&mut self) -> ProcessStatus {
        if !self.warned_unprepared {
            log::warn!("Block received before prepare, leaving buffer untouched");
            self.warned_unprepared = true;
        }
        ProcessStatus::NotPrepared
    }

    /// Linear magnitude of the equalizer curve at `freq`, `None` before
    /// `prepare`
    pub fn magnitude_for_frequency(&self, freq: f64) -> Option<f64> {
        self.spec
            .map(|spec| self.left.magnitude_for_frequency(freq, spec.sample_rate))
    }

    #[inline]
    pub fn is_prepared(&self) -> bool {
        self.spec.is_some()
    }

    #[inline]
    pub fn sample_rate(&self) -> Option<f64> {
        self.spec.map(|spec| spec.sample_rate)
    }

    #[inline]
    pub fn max_block_size(&self) -> Option<usize> {
        self.spec.map(|spec| spec.max_block_size)
    }

    /// Last snapshot read from the parameter store
    #[inline]
    pub fn settings(&self) -> &ChainSettings {
        &self.settings
    }

    #[inline]
    pub fn params(&self) -> &Arc<ParamStore> {
        &self.params
    }

    #[inline]
    pub fn left(&self) -> &ChannelChain {
        &self.left
    }

    #[inline]
    pub fn right(&self) -> &ChannelChain {
        &self.right
    }

    /// Number of band designs refused because they were not finite
    #[inline]
    pub fn rejected_designs(&self) -> u64 {
        self.controller.rejected_designs()
    }
}

impl Processor for EqualizerEngine {
    fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }
}
