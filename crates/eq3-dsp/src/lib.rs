//! eq3-dsp: three-band equalizer signal path
//!
//! ## Modules
//! - `biquad` - TDF-II biquad stage with bypass, RBJ coefficient designs
//! - `butterworth` - even-order Butterworth split into second-order sections
//! - `cut` - four-slot low-cut / high-cut banks (12 to 48 dB/oct)
//! - `peak` - parametric bell band
//! - `chain` - per-channel low cut → peak → high cut chain
//! - `controller` - snapshot to coefficients, installed into both channels
//! - `engine` - stereo engine driven by the host's prepare / process calls
//! - `analysis` - impulse and frequency response measurement

pub mod analysis;
pub mod biquad;
pub mod butterworth;
pub mod chain;
pub mod controller;
pub mod cut;
pub mod engine;
pub mod peak;

pub use chain::{ChainPosition, ChannelChain, ProcessSpec};
pub use controller::FilterChainController;
pub use cut::{CascadedBank, CutKind};
pub use engine::{EqualizerEngine, ProcessStatus};
pub use peak::PeakStage;

use eq3_core::Sample;

/// Trait for all DSP processors
pub trait Processor: Send + Sync {
    /// Reset processor state
    fn reset(&mut self);
}

/// Mono processor trait
pub trait MonoProcessor: Processor {
    /// Process a single sample
    fn process_sample(&mut self, input: Sample) -> Sample;

    /// Process a block of samples
    fn process_block(&mut self, buffer: &mut [Sample]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}
