//! Python bindings for the windowing scheme

use pyo3::prelude::*;
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArrayDyn};
use num_complex::Complex64;
use crate::error::WindowingError;
use crate::preprocess::DetrendType;
use crate::spectrum::{MultiChannelSeries, WindowingScheme, WindowingSchemeConfig};

/// Windowing scheme exposed to Python
#[pyclass(name = "WindowingScheme")]
pub struct PyWindowingScheme {
    scheme: WindowingScheme,
}

fn parse_detrend(detrend_type: Option<&str>) -> PyResult<Option<DetrendType>> {
    Ok(detrend_type.map(str::parse).transpose()?)
}

fn first_channel<T>(channels: Vec<crate::spectrum::LabeledArray<T>>) -> PyResult<ndarray::Array2<T>> {
    channels
        .into_iter()
        .next()
        .map(|c| c.values)
        .ok_or_else(|| WindowingError::UnsupportedInputType("empty input".to_string()).into())
}

#[pymethods]
impl PyWindowingScheme {
    /// Create a new windowing scheme
    ///
    /// Args:
    ///     num_samples_window: Window length in samples
    ///     num_samples_overlap: Samples shared by consecutive windows
    ///     taper_family: Taper family name
    ///     taper_additional_args: List of (name, value) shape arguments
    ///     periodic: Use the DFT-even taper
    ///     striding_function_label: "crude", "accelerated" or "strided-view"
    ///     sample_rate: Sample rate in Hz
    #[new]
    #[pyo3(signature = (
        num_samples_window=128,
        num_samples_overlap=32,
        taper_family="hamming",
        taper_additional_args=Vec::new(),
        periodic=true,
        striding_function_label="crude",
        sample_rate=1.0
    ))]
    fn new(
        num_samples_window: usize,
        num_samples_overlap: usize,
        taper_family: &str,
        taper_additional_args: Vec<(String, f64)>,
        periodic: bool,
        striding_function_label: &str,
        sample_rate: f64,
    ) -> PyResult<Self> {
        let config = WindowingSchemeConfig {
            num_samples_window,
            num_samples_overlap,
            taper_family: taper_family.to_string(),
            taper_additional_args,
            periodic,
            striding_function_label: striding_function_label.parse()?,
            sample_rate,
        };

        Ok(Self {
            scheme: WindowingScheme::new(config)?,
        })
    }

    #[getter]
    fn num_samples_window(&self) -> usize {
        self.scheme.num_samples_window()
    }

    #[getter]
    fn num_samples_overlap(&self) -> usize {
        self.scheme.num_samples_overlap()
    }

    #[getter]
    fn num_samples_advance(&self) -> usize {
        self.scheme.num_samples_advance()
    }

    #[getter]
    fn sample_rate(&self) -> f64 {
        self.scheme.sample_rate()
    }

    /// Taper samples
    #[getter]
    fn taper<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        self.scheme.apodization_window().taper().to_owned().into_pyarray(py)
    }

    #[getter]
    fn coherent_gain(&self) -> f64 {
        self.scheme.apodization_window().coherent_gain()
    }

    #[getter]
    fn nenbw(&self) -> f64 {
        self.scheme.apodization_window().nenbw()
    }

    #[getter]
    fn apodization_factor(&self) -> f64 {
        self.scheme.apodization_window().apodization_factor()
    }

    #[getter]
    fn linear_spectral_density_calibration_factor(&self) -> f64 {
        self.scheme.linear_spectral_density_calibration_factor()
    }

    fn available_number_of_windows(&self, num_samples: usize) -> PyResult<usize> {
        Ok(self.scheme.available_number_of_windows(num_samples)?)
    }

    fn left_hand_window_edge_indices<'py>(
        &self,
        py: Python<'py>,
        num_samples: usize,
    ) -> PyResult<&'py PyArray1<usize>> {
        Ok(self.scheme.left_hand_window_edge_indices(num_samples)?.into_pyarray(py))
    }

    /// Harmonic frequencies in Hz (DC included, Nyquist excluded)
    fn frequency_axis<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        self.scheme.frequency_axis().into_pyarray(py)
    }

    /// Cut a 1-D series into windows
    ///
    /// Returns:
    ///     Array of shape (num_windows, num_samples_window)
    fn apply_sliding_window<'py>(
        &self,
        py: Python<'py>,
        data: PyReadonlyArrayDyn<f64>,
    ) -> PyResult<&'py PyArray2<f64>> {
        let windowed = self.scheme.apply_sliding_window(data.as_array())?;
        Ok(first_channel(windowed.channels)?.into_pyarray(py))
    }

    /// Window, taper and FFT a 1-D series
    ///
    /// Args:
    ///     data: Samples as numpy array
    ///     detrend_type: None, "linear" or "constant"
    ///     spectral_density_correction: Scale to a linear spectral density
    ///
    /// Returns:
    ///     Complex array of shape (num_windows, num_samples_window // 2)
    #[pyo3(signature = (data, detrend_type=None, spectral_density_correction=true))]
    fn stft<'py>(
        &self,
        py: Python<'py>,
        data: PyReadonlyArrayDyn<f64>,
        detrend_type: Option<&str>,
        spectral_density_correction: bool,
    ) -> PyResult<&'py PyArray2<Complex64>> {
        let detrend_type = parse_detrend(detrend_type)?;
        let spectrogram = self
            .scheme
            .stft(data.as_array(), detrend_type, spectral_density_correction)?;
        Ok(first_channel(spectrogram.channels)?.into_pyarray(py))
    }

    /// STFT of several named channels sharing one time grid
    ///
    /// Returns:
    ///     List of (name, spectra) tuples in input order
    #[pyo3(signature = (channels, detrend_type=None, spectral_density_correction=true))]
    fn stft_channels<'py>(
        &self,
        py: Python<'py>,
        channels: Vec<(String, PyReadonlyArray1<f64>)>,
        detrend_type: Option<&str>,
        spectral_density_correction: bool,
    ) -> PyResult<Vec<(String, &'py PyArray2<Complex64>)>> {
        let detrend_type = parse_detrend(detrend_type)?;
        let mut series = MultiChannelSeries::new(0.0);
        for (name, samples) in &channels {
            series.push(name.clone(), samples.as_array().to_owned())?;
        }

        let spectrogram = self
            .scheme
            .stft(&series, detrend_type, spectral_density_correction)?;
        Ok(spectrogram
            .channels
            .into_iter()
            .map(|c| (c.label.unwrap_or_default(), c.values.into_pyarray(py)))
            .collect())
    }

    fn __repr__(&self) -> String {
        self.scheme.to_string()
    }
}
