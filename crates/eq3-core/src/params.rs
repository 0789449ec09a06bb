//! Parameter types and the lock-free parameter store
//!
//! The store is written from control threads and read from the audio thread
//! once per block. Each parameter is an independent atomic cell: a reader sees
//! every field's latest published value, but no snapshot across fields is
//! guaranteed.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{Eq3Error, Eq3Result};

/// Parameter identifiers, as exposed to the host
pub mod ids {
    pub const LOW_CUT_FREQ: &str = "LowCut Freq";
    pub const HIGH_CUT_FREQ: &str = "HighCut Freq";
    pub const PEAK_FREQ: &str = "Peak Freq";
    pub const PEAK_GAIN: &str = "Peak Gain";
    pub const PEAK_QUALITY: &str = "Peak Quality";
    pub const LOW_CUT_SLOPE: &str = "LowCut Slope";
    pub const HIGH_CUT_SLOPE: &str = "HighCut Slope";
}

/// Atomic parameter for lock-free access
///
/// Stores publish with `Release`, loads observe with `Acquire`.
pub struct AtomicParam {
    bits: AtomicU64,
}

impl AtomicParam {
    pub fn new(value: f64) -> Self {
        Self {
            bits: AtomicU64::new(value.to_bits()),
        }
    }

    #[inline]
    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Release);
    }
}

impl Default for AtomicParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl std::fmt::Debug for AtomicParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AtomicParam").field(&self.get()).finish()
    }
}

/// Parameter skew type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParamSkew {
    Linear,
    /// `value = min + normalized^exp * (max - min)`
    Exponential(f64),
}

/// Parameter range specification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
    /// Snapping interval, 0.0 for continuous
    pub step: f64,
    pub skew: ParamSkew,
}

impl ParamRange {
    pub fn linear(min: f64, max: f64, default: f64, step: f64) -> Self {
        Self {
            min,
            max,
            default,
            step,
            skew: ParamSkew::Linear,
        }
    }

    pub fn skewed(min: f64, max: f64, default: f64, step: f64, exponent: f64) -> Self {
        Self {
            min,
            max,
            default,
            step,
            skew: ParamSkew::Exponential(exponent),
        }
    }

    /// Clamp into `[min, max]`
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Clamp, then round to the nearest legal step
    pub fn snap(&self, value: f64) -> f64 {
        let clamped = self.clamp(value);
        if self.step <= 0.0 {
            return clamped;
        }
        let steps = ((clamped - self.min) / self.step).round();
        self.clamp(self.min + steps * self.step)
    }

    /// Denormalize a 0-1 value to actual value
    pub fn denormalize(&self, normalized: f64) -> f64 {
        let normalized = normalized.clamp(0.0, 1.0);
        let value = match self.skew {
            ParamSkew::Linear => self.min + normalized * (self.max - self.min),
            ParamSkew::Exponential(exp) => self.min + normalized.powf(exp) * (self.max - self.min),
        };
        self.snap(value)
    }

    /// Normalize an actual value to 0-1
    pub fn normalize(&self, value: f64) -> f64 {
        let clamped = self.clamp(value);
        let proportion = (clamped - self.min) / (self.max - self.min);
        match self.skew {
            ParamSkew::Linear => proportion,
            ParamSkew::Exponential(exp) => proportion.powf(1.0 / exp),
        }
    }
}

/// One entry of the parameter layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    pub id: &'static str,
    pub range: ParamRange,
}

/// Skew exponent shared by the continuous parameters
const CONTROL_SKEW: f64 = 4.0;

/// Number of cut slope choices (12/24/36/48 dB/oct)
pub const SLOPE_CHOICES: usize = 4;

/// The equalizer's parameter layout
pub fn parameter_layout() -> [ParamSpec; 7] {
    let slope_range = ParamRange::linear(0.0, (SLOPE_CHOICES - 1) as f64, 0.0, 1.0);
    [
        ParamSpec {
            id: ids::LOW_CUT_FREQ,
            range: ParamRange::skewed(20.0, 20000.0, 20.0, 1.0, CONTROL_SKEW),
        },
        ParamSpec {
            id: ids::HIGH_CUT_FREQ,
            range: ParamRange::skewed(20.0, 20000.0, 20000.0, 1.0, CONTROL_SKEW),
        },
        ParamSpec {
            id: ids::PEAK_FREQ,
            range: ParamRange::skewed(20.0, 20000.0, 750.0, 1.0, CONTROL_SKEW),
        },
        ParamSpec {
            id: ids::PEAK_GAIN,
            range: ParamRange::skewed(-24.0, 24.0, 0.0, 0.5, CONTROL_SKEW),
        },
        ParamSpec {
            id: ids::PEAK_QUALITY,
            range: ParamRange::skewed(0.1, 10.0, 1.0, 0.05, CONTROL_SKEW),
        },
        ParamSpec {
            id: ids::LOW_CUT_SLOPE,
            range: slope_range,
        },
        ParamSpec {
            id: ids::HIGH_CUT_SLOPE,
            range: slope_range,
        },
    ]
}

/// Query-by-name access to current parameter values
pub trait ParameterSource {
    /// Current plain (denormalized) value, `None` for an unknown id
    fn raw_value(&self, id: &str) -> Option<f64>;
}

/// Lock-free store holding the current value of every parameter
///
/// Shared between threads as `Arc<ParamStore>`. Lookups walk a fixed slice
/// and never allocate, so reading from the audio thread is safe.
#[derive(Debug)]
pub struct ParamStore {
    specs: [ParamSpec; 7],
    values: [AtomicParam; 7],
}

impl ParamStore {
    pub fn new() -> Self {
        let specs = parameter_layout();
        let values = std::array::from_fn(|i| AtomicParam::new(specs[i].range.default));
        Self { specs, values }
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.specs.iter().position(|spec| spec.id == id)
    }

    fn lookup(&self, id: &str) -> Eq3Result<usize> {
        self.index_of(id)
            .ok_or_else(|| Eq3Error::UnknownParam(id.to_string()))
    }

    /// Set a plain value; it is clamped and snapped to the parameter's range.
    /// Returns the value actually stored.
    pub fn set(&self, id: &str, value: f64) -> Eq3Result<f64> {
        let index = self.lookup(id)?;
        if !value.is_finite() {
            return Err(Eq3Error::InvalidParam(format!("{id} = {value}")));
        }
        let stored = self.specs[index].range.snap(value);
        self.values[index].set(stored);
        Ok(stored)
    }

    /// Set from a normalized 0-1 control value
    pub fn set_normalized(&self, id: &str, normalized: f64) -> Eq3Result<f64> {
        let index = self.lookup(id)?;
        if !normalized.is_finite() {
            return Err(Eq3Error::InvalidParam(format!("{id} = {normalized}")));
        }
        let stored = self.specs[index].range.denormalize(normalized);
        self.values[index].set(stored);
        Ok(stored)
    }

    /// Current value as a normalized 0-1 control value
    pub fn normalized(&self, id: &str) -> Option<f64> {
        let index = self.index_of(id)?;
        Some(self.specs[index].range.normalize(self.values[index].get()))
    }

    pub fn range(&self, id: &str) -> Option<ParamRange> {
        self.index_of(id).map(|index| self.specs[index].range)
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.iter().map(|spec| spec.id)
    }

    pub fn reset_to_defaults(&self) {
        for (spec, value) in self.specs.iter().zip(self.values.iter()) {
            value.set(spec.range.default);
        }
        log::debug!("Parameters reset to defaults");
    }
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterSource for ParamStore {
    #[inline]
    fn raw_value(&self, id: &str) -> Option<f64> {
        self.index_of(id).map(|index| self.values[index].get())
    }
}
