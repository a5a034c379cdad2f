//! Ordered collection of frequency bands

use super::band::{AverageType, Closed, FrequencyBand};
use crate::error::{Result, WindowingError};
use ndarray::{Array1, Array2, ArrayView2};

/// Bands kept in ascending order of center frequency
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrequencyBands {
    bands: Vec<FrequencyBand>,
}

impl FrequencyBands {
    pub fn new(bands: Vec<FrequencyBand>) -> Self {
        Self { bands }
    }

    /// Build from an `(n, 2)` table of `[lower_bound, upper_bound]` rows
    pub fn from_band_edges(
        band_edges: ArrayView2<f64>,
        closed: Closed,
        average_type: AverageType,
    ) -> Result<Self> {
        if band_edges.ncols() != 2 {
            return Err(WindowingError::InvalidBandEdges(band_edges.ncols()));
        }

        let bands = band_edges
            .outer_iter()
            .map(|row| FrequencyBand::with_options(row[0], row[1], closed, average_type))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { bands })
    }

    /// Bands spanning whole FFT harmonics
    ///
    /// Each `(lower_index, upper_index)` pair covers harmonics
    /// `lower_index..=upper_index`; edges sit half a bin outside them.
    /// A band starting at harmonic 0 therefore has a lower edge of -df/2, and
    /// its geometric center is NaN.
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate of the decimation level in Hz
    /// * `window_length` - FFT window length in samples
    /// * `integer_bin_bounds` - Harmonic index range of each band
    pub fn from_decimation_config(
        sample_rate: f64,
        window_length: usize,
        integer_bin_bounds: &[(usize, usize)],
    ) -> Result<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(WindowingError::InvalidSampleRate(sample_rate));
        }
        if window_length == 0 {
            return Err(WindowingError::EmptyWindow);
        }

        let df = sample_rate / window_length as f64;
        let half_bin = df / 2.0;
        let bands = integer_bin_bounds
            .iter()
            .map(|&(lower_index, upper_index)| {
                FrequencyBand::new(
                    lower_index as f64 * df - half_bin,
                    upper_index as f64 * df + half_bin,
                )
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { bands })
    }

    pub fn number_of_bands(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn band(&self, index: usize) -> Option<&FrequencyBand> {
        self.bands.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FrequencyBand> {
        self.bands.iter()
    }

    /// `(n, 2)` table of `[lower_bound, upper_bound]`
    pub fn band_edges(&self) -> Array2<f64> {
        let mut edges = Array2::zeros((self.bands.len(), 2));
        for (mut row, band) in edges.outer_iter_mut().zip(&self.bands) {
            row[0] = band.lower_bound();
            row[1] = band.upper_bound();
        }
        edges
    }

    pub fn band_centers(&self) -> Array1<f64> {
        self.bands.iter().map(FrequencyBand::center_frequency).collect()
    }

    pub fn is_strictly_increasing(&self) -> bool {
        let centers = self.band_centers();
        centers
            .iter()
            .zip(centers.iter().skip(1))
            .all(|(a, b)| a < b)
    }

    /// Reorder bands by ascending center if they are out of order
    ///
    /// Out-of-order bands are not an error: the collection warns and re-sorts
    /// itself (stable sort, ties keep their original order).
    pub fn validate(&mut self) {
        if self.is_strictly_increasing() {
            return;
        }

        log::warn!("frequency band centers are not strictly increasing; sorting bands by center frequency");
        self.bands
            .sort_by(|a, b| a.center_frequency().total_cmp(&b.center_frequency()));

        if !self.is_strictly_increasing() {
            log::warn!("frequency bands share a center frequency after sorting");
        }
    }

    /// Coefficient indices of every band, in band order
    pub fn fourier_coefficient_indices(&self, frequencies: &[f64]) -> Vec<Vec<usize>> {
        self.bands
            .iter()
            .map(|band| band.fourier_coefficient_indices(frequencies))
            .collect()
    }
}

impl<'a> IntoIterator for &'a FrequencyBands {
    type Item = &'a FrequencyBand;
    type IntoIter = std::slice::Iter<'a, FrequencyBand>;

    fn into_iter(self) -> Self::IntoIter {
        self.bands.iter()
    }
}
