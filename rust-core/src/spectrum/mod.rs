//! Short-time Fourier transform of windowed series

pub mod fft;
pub mod scheme;
pub mod series;

pub use fft::FftEngine;
pub use scheme::{WindowingScheme, WindowingSchemeConfig};
pub use series::{
    Channel, LabeledArray, MultiChannelSeries, SeriesInput, SeriesLayout, Spectrogram, WindowedSeries,
};
