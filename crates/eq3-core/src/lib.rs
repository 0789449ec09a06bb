//! eq3-core: Shared types for the eq3 equalizer
//!
//! Sample type, error type, the lock-free parameter store the audio thread
//! reads from, and the per-block chain settings snapshot.

mod error;
mod params;
mod sample;
mod settings;

pub use error::*;
pub use params::*;
pub use sample::*;
pub use settings::*;
