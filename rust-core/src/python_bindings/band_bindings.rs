//! Python bindings for frequency bands

use pyo3::prelude::*;
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray2};
use crate::bands::{AverageType, Closed, FrequencyBands};
use crate::error::WindowingError;

fn parse_closed(closed: &str) -> PyResult<Closed> {
    match closed {
        "left" => Ok(Closed::Left),
        "right" => Ok(Closed::Right),
        "both" => Ok(Closed::Both),
        other => Err(WindowingError::UnsupportedInputType(format!("closed={other}")).into()),
    }
}

fn parse_average(average_type: &str) -> PyResult<AverageType> {
    match average_type {
        "geometric" => Ok(AverageType::Geometric),
        "arithmetic" => Ok(AverageType::Arithmetic),
        other => Err(WindowingError::UnsupportedInputType(format!("average_type={other}")).into()),
    }
}

/// Frequency band collection exposed to Python
#[pyclass(name = "FrequencyBands")]
pub struct PyFrequencyBands {
    bands: FrequencyBands,
}

#[pymethods]
impl PyFrequencyBands {
    /// Create bands from an (n, 2) array of [lower, upper] edges
    ///
    /// Args:
    ///     band_edges: Band edges in Hz
    ///     closed: "left", "right" or "both"
    ///     average_type: "geometric" or "arithmetic"
    #[new]
    #[pyo3(signature = (band_edges, closed="left", average_type="geometric"))]
    fn new(band_edges: PyReadonlyArray2<f64>, closed: &str, average_type: &str) -> PyResult<Self> {
        let bands = FrequencyBands::from_band_edges(
            band_edges.as_array(),
            parse_closed(closed)?,
            parse_average(average_type)?,
        )?;
        Ok(Self { bands })
    }

    /// Bands spanning whole FFT harmonics
    #[staticmethod]
    fn from_decimation_config(
        sample_rate: f64,
        window_length: usize,
        integer_bin_bounds: Vec<(usize, usize)>,
    ) -> PyResult<Self> {
        let bands = FrequencyBands::from_decimation_config(sample_rate, window_length, &integer_bin_bounds)?;
        Ok(Self { bands })
    }

    fn number_of_bands(&self) -> usize {
        self.bands.number_of_bands()
    }

    /// Re-sort bands by center frequency if needed
    fn validate(&mut self) {
        self.bands.validate();
    }

    fn band_edges<'py>(&self, py: Python<'py>) -> &'py PyArray2<f64> {
        self.bands.band_edges().into_pyarray(py)
    }

    fn band_centers<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        self.bands.band_centers().into_pyarray(py)
    }

    /// Indices of the given frequencies that fall in each band
    fn fourier_coefficient_indices(&self, frequencies: Vec<f64>) -> Vec<Vec<usize>> {
        self.bands.fourier_coefficient_indices(&frequencies)
    }
}
