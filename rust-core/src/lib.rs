//! STFT Windowing Core - sliding windows, tapers and spectra
//!
//! Cuts sampled time series into overlapping windows, applies an apodization
//! taper with calibrated statistics, and produces one-sided spectra, with
//! frequency bands for grouping the resulting harmonics.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![allow(non_local_definitions)]

pub mod bands;
pub mod error;
pub mod preprocess;
pub mod spectrum;
pub mod striding;
pub mod windows;

#[cfg(feature = "python")]
pub mod python_bindings;

pub use bands::{FrequencyBand, FrequencyBands};
pub use error::{Result, WindowingError};
pub use preprocess::DetrendType;
pub use spectrum::{Spectrogram, WindowedSeries, WindowingScheme, WindowingSchemeConfig};
pub use striding::StridingFunctionLabel;
pub use windows::{ApodizationWindow, TaperFamily};
