//! Error types for eq3

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Eq3Error {
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f64),

    #[error("Invalid block size: {0}")]
    InvalidBlockSize(usize),

    #[error("Unknown parameter: {0}")]
    UnknownParam(String),

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("DSP error: {0}")]
    Dsp(String),
}

/// Result type alias
pub type Eq3Result<T> = Result<T, Eq3Error>;
