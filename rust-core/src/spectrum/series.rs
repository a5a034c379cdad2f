//! Inputs and outputs of the windowing pipeline
//!
//! A series reaches the pipeline as a bare array, one labeled channel, or a
//! labeled multi-channel collection. Outputs remember which of these they came
//! from and keep channel labels in their original order.

use crate::error::{Result, WindowingError};
use ndarray::{Array1, Array2, ArrayView1, ArrayViewD, ArrayViewMut1};
use num_complex::Complex64;

/// One named channel of samples on a regular time grid
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub name: String,

    /// Time of the first sample, in seconds
    pub start_time: f64,

    pub samples: Array1<f64>,
}

impl Channel {
    pub fn new(name: impl Into<String>, samples: Array1<f64>) -> Self {
        Self {
            name: name.into(),
            start_time: 0.0,
            samples,
        }
    }

    pub fn with_start_time(mut self, start_time: f64) -> Self {
        self.start_time = start_time;
        self
    }
}

/// Named channels sharing one time grid
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiChannelSeries {
    start_time: f64,
    names: Vec<String>,
    samples: Vec<Array1<f64>>,
}

impl MultiChannelSeries {
    pub fn new(start_time: f64) -> Self {
        Self {
            start_time,
            ..Self::default()
        }
    }

    /// Add a channel; every channel must have the same number of samples
    pub fn push(&mut self, name: impl Into<String>, samples: Array1<f64>) -> Result<()> {
        let name = name.into();
        if let Some(first) = self.samples.first() {
            if first.len() != samples.len() {
                return Err(WindowingError::ChannelLengthMismatch {
                    name,
                    expected: first.len(),
                    found: samples.len(),
                });
            }
        }
        self.names.push(name);
        self.samples.push(samples);
        Ok(())
    }

    pub fn with_channel(mut self, name: impl Into<String>, samples: Array1<f64>) -> Result<Self> {
        self.push(name, samples)?;
        Ok(self)
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Samples per channel
    pub fn len(&self) -> usize {
        self.samples.first().map_or(0, Array1::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_channels(&self) -> usize {
        self.names.len()
    }

    pub fn channel_names(&self) -> &[String] {
        &self.names
    }

    pub fn channel(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.samples[i].view())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ArrayView1<'_, f64>)> {
        self.names
            .iter()
            .zip(&self.samples)
            .map(|(name, samples)| (name.as_str(), samples.view()))
    }

    /// Mutable access to the samples; channel lengths cannot change through it
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, ArrayViewMut1<'_, f64>)> {
        self.names
            .iter()
            .zip(self.samples.iter_mut())
            .map(|(name, samples)| (name.as_str(), samples.view_mut()))
    }
}

/// Input accepted by the sliding window
#[derive(Debug, Clone)]
pub enum SeriesInput<'a> {
    /// Unlabeled samples; must be one-dimensional
    Array(ArrayViewD<'a, f64>),

    Channel(&'a Channel),

    MultiChannel(&'a MultiChannelSeries),
}

impl<'a> From<ArrayViewD<'a, f64>> for SeriesInput<'a> {
    fn from(values: ArrayViewD<'a, f64>) -> Self {
        SeriesInput::Array(values)
    }
}

impl<'a> From<ArrayView1<'a, f64>> for SeriesInput<'a> {
    fn from(values: ArrayView1<'a, f64>) -> Self {
        SeriesInput::Array(values.into_dyn())
    }
}

impl<'a> From<&'a Array1<f64>> for SeriesInput<'a> {
    fn from(values: &'a Array1<f64>) -> Self {
        SeriesInput::Array(values.view().into_dyn())
    }
}

impl<'a> From<&'a [f64]> for SeriesInput<'a> {
    fn from(values: &'a [f64]) -> Self {
        SeriesInput::Array(ArrayView1::from(values).into_dyn())
    }
}

impl<'a> From<&'a Channel> for SeriesInput<'a> {
    fn from(channel: &'a Channel) -> Self {
        SeriesInput::Channel(channel)
    }
}

impl<'a> From<&'a MultiChannelSeries> for SeriesInput<'a> {
    fn from(series: &'a MultiChannelSeries) -> Self {
        SeriesInput::MultiChannel(series)
    }
}

/// Which input variant an output was produced from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesLayout {
    Array,
    Channel,
    MultiChannel,
}

/// Per-channel 2-D result indexed `[window, sample or frequency]`
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledArray<T> {
    /// Channel name; `None` for unlabeled array input
    pub label: Option<String>,
    pub values: Array2<T>,
}

/// Windowed time-domain data
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedSeries {
    pub layout: SeriesLayout,

    /// Time of the first sample of each window
    pub window_start_times: Array1<f64>,

    /// Offset of each sample from the start of its window: [0, dt, 2dt, ...]
    pub within_window_time: Array1<f64>,

    pub channels: Vec<LabeledArray<f64>>,
}

impl WindowedSeries {
    pub fn num_windows(&self) -> usize {
        self.window_start_times.len()
    }

    pub fn channel(&self, name: &str) -> Option<&Array2<f64>> {
        find_channel(&self.channels, name)
    }

    /// Values of the first (for array and single-channel input, only) channel
    pub fn values(&self) -> Option<&Array2<f64>> {
        self.channels.first().map(|c| &c.values)
    }
}

/// One-sided spectra of every window
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    pub layout: SeriesLayout,

    /// Time of the first sample of each window
    pub window_start_times: Array1<f64>,

    /// Harmonic frequencies, DC included, Nyquist excluded
    pub frequencies: Array1<f64>,

    pub channels: Vec<LabeledArray<Complex64>>,
}

impl Spectrogram {
    pub fn num_windows(&self) -> usize {
        self.window_start_times.len()
    }

    pub fn channel(&self, name: &str) -> Option<&Array2<Complex64>> {
        find_channel(&self.channels, name)
    }

    pub fn values(&self) -> Option<&Array2<Complex64>> {
        self.channels.first().map(|c| &c.values)
    }
}

fn find_channel<'a, T>(channels: &'a [LabeledArray<T>], name: &str) -> Option<&'a Array2<T>> {
    channels
        .iter()
        .find(|c| c.label.as_deref() == Some(name))
        .map(|c| &c.values)
}
