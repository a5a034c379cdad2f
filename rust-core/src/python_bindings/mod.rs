//! PyO3 bindings for Python integration

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use crate::error::WindowingError;

mod band_bindings;
mod scheme_bindings;

impl From<WindowingError> for PyErr {
    fn from(err: WindowingError) -> Self {
        match err {
            WindowingError::SpectralCalibrationInconsistency { .. } | WindowingError::Fft(_) => {
                PyRuntimeError::new_err(err.to_string())
            }
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

/// Python module definition
#[pymodule]
fn stft_windowing(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<scheme_bindings::PyWindowingScheme>()?;
    m.add_class::<band_bindings::PyFrequencyBands>()?;

    Ok(())
}
