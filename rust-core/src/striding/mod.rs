//! Segmenting a series into overlapping windows
//!
//! Row i of a windowed array is `data[i*advance .. i*advance + window]`.

pub mod strategies;

pub use strategies::{strided_view, Accelerated, Crude, StridedView};

use crate::error::{Result, WindowingError};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of whole windows that fit in `num_samples`
///
/// A window longer than the series yields 0 windows, which is a valid result.
/// An advance of 0 samples is a usage error.
pub fn available_number_of_windows(num_samples: usize, window: usize, advance: usize) -> Result<usize> {
    if advance == 0 {
        return Err(WindowingError::NonPositiveAdvance { window, overlap: window });
    }
    if num_samples < window {
        log::error!(
            "window of {window} samples is longer than the series ({num_samples} samples); no windows available"
        );
        return Ok(0);
    }
    Ok((num_samples - window) / advance + 1)
}

/// Index of the first sample of each window
pub fn left_hand_window_edge_indices(num_samples: usize, window: usize, advance: usize) -> Result<Array1<usize>> {
    let num_windows = available_number_of_windows(num_samples, window, advance)?;
    Ok(Array1::from_iter((0..num_windows).map(|i| i * advance)))
}

/// Check that `num_windows` windows can be read from `num_samples` samples
pub(crate) fn check_bounds(num_samples: usize, window: usize, advance: usize, num_windows: usize) -> Result<()> {
    if window == 0 {
        return Err(WindowingError::EmptyWindow);
    }
    if advance == 0 {
        return Err(WindowingError::NonPositiveAdvance { window, overlap: window });
    }
    // one past the last sample read; None on overflow
    let end = match num_windows.checked_sub(1) {
        None => Some(0),
        Some(last) => last.checked_mul(advance).and_then(|start| start.checked_add(window)),
    };
    match end {
        Some(end) if end <= num_samples => Ok(()),
        _ => Err(WindowingError::WindowsOutOfBounds {
            num_samples,
            window,
            advance,
            num_windows,
        }),
    }
}

/// Strategy for extracting windows from a 1-D series
///
/// All implementations must return identical arrays for the same arguments.
pub trait StridingFunction {
    /// Extract `num_windows` windows into a `(num_windows, window)` array
    fn extract_windows(
        &self,
        data: ArrayView1<f64>,
        window: usize,
        advance: usize,
        num_windows: usize,
    ) -> Result<Array2<f64>>;
}

/// Name of a striding strategy, as carried in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StridingFunctionLabel {
    /// Index loop, one element at a time
    #[default]
    Crude,

    /// Row-wise block copies
    Accelerated,

    /// Zero-copy overlapping view
    StridedView,
}

impl StridingFunctionLabel {
    pub fn striding_function(self) -> &'static dyn StridingFunction {
        match self {
            StridingFunctionLabel::Crude => &Crude,
            StridingFunctionLabel::Accelerated => &Accelerated,
            StridingFunctionLabel::StridedView => &StridedView,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StridingFunctionLabel::Crude => "crude",
            StridingFunctionLabel::Accelerated => "accelerated",
            StridingFunctionLabel::StridedView => "strided-view",
        }
    }
}

impl fmt::Display for StridingFunctionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StridingFunctionLabel {
    type Err = WindowingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "crude" => Ok(StridingFunctionLabel::Crude),
            "accelerated" | "numba" => Ok(StridingFunctionLabel::Accelerated),
            "strided-view" | "stride_tricks" => Ok(StridingFunctionLabel::StridedView),
            other => Err(WindowingError::UnsupportedStridingFunction(other.to_string())),
        }
    }
}
