//! Frequency bands for binning STFT harmonics

pub mod band;
pub mod collection;

pub use band::{AverageType, Closed, FrequencyBand};
pub use collection::FrequencyBands;
