//! FFT engine using realfft for real-valued windows
//!
//! Only the one-sided half of the spectrum is kept: harmonics 0..N/2, DC
//! included and the Nyquist bin dropped.

use crate::error::{Result, WindowingError};
use ndarray::{Array1, Array2, ArrayView2};
use num_complex::Complex64;
use realfft::{RealFftPlanner, RealToComplex};
use std::fmt;
use std::sync::Arc;

/// Planned forward FFT for one window length
#[derive(Clone)]
pub struct FftEngine {
    /// FFT size (number of samples)
    fft_size: usize,

    /// Real FFT processor
    r2c: Arc<dyn RealToComplex<f64>>,
}

impl fmt::Debug for FftEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftEngine")
            .field("fft_size", &self.fft_size)
            .finish_non_exhaustive()
    }
}

impl FftEngine {
    /// Create new FFT engine
    ///
    /// # Arguments
    /// * `fft_size` - FFT size (number of samples)
    pub fn new(fft_size: usize) -> Self {
        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(fft_size);

        Self { fft_size, r2c }
    }

    /// Get FFT size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of harmonics kept: fft_size/2
    pub fn num_harmonics(&self) -> usize {
        self.fft_size / 2
    }

    /// Harmonic frequencies k*fs/N in Hz for k = 0..N/2
    pub fn harmonic_frequencies(&self, sample_rate: f64) -> Array1<f64> {
        let df = sample_rate / self.fft_size as f64;
        Array1::from_iter((0..self.num_harmonics()).map(|k| k as f64 * df))
    }

    /// Transform every row of a `(num_windows, fft_size)` array
    ///
    /// # Returns
    /// `(num_windows, fft_size/2)` array of complex Fourier coefficients
    pub fn transform_rows(&self, windows: ArrayView2<f64>) -> Result<Array2<Complex64>> {
        if windows.ncols() != self.fft_size {
            return Err(WindowingError::WindowLengthMismatch {
                found: windows.ncols(),
                expected: self.fft_size,
            });
        }

        let num_harmonics = self.num_harmonics();
        let mut spectra = Array2::zeros((windows.nrows(), num_harmonics));
        let mut input = self.r2c.make_input_vec();
        let mut output = self.r2c.make_output_vec();

        for (row, mut spectrum) in windows.outer_iter().zip(spectra.outer_iter_mut()) {
            // process() uses the input as scratch, so refill it every row
            for (dst, &src) in input.iter_mut().zip(row.iter()) {
                *dst = src;
            }
            self.r2c.process(&mut input, &mut output)?;
            for (dst, &src) in spectrum.iter_mut().zip(&output[..num_harmonics]) {
                *dst = src;
            }
        }

        Ok(spectra)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_fft_dc_signal() {
        let fft = FftEngine::new(64);
        let windows = Array2::from_elem((2, 64), 1.0);
        let spectra = fft.transform_rows(windows.view()).unwrap();

        assert_eq!(spectra.dim(), (2, 32));
        for row in spectra.outer_iter() {
            assert_abs_diff_eq!(row[0].re, 64.0, epsilon = 1e-9);
            assert!(row.iter().skip(1).all(|c| c.norm() < 1e-9));
        }
    }

    #[test]
    fn test_fft_sine_wave() {
        let fft = FftEngine::new(128);
        // exactly 10 cycles per window
        let windows = Array2::from_shape_fn((1, 128), |(_, n)| (2.0 * PI * 10.0 * n as f64 / 128.0).sin());
        let spectra = fft.transform_rows(windows.view()).unwrap();

        let (peak_bin, peak) = spectra
            .row(0)
            .iter()
            .enumerate()
            .map(|(k, c)| (k, c.norm()))
            .fold((0, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });
        assert_eq!(peak_bin, 10);
        assert_abs_diff_eq!(peak, 64.0, epsilon = 1e-9);
    }

    #[test]
    fn test_harmonic_frequencies() {
        let fft = FftEngine::new(8);
        let freqs = fft.harmonic_frequencies(16.0);
        // Nyquist (8 Hz) excluded
        assert_eq!(freqs.to_vec(), vec![0.0, 2.0, 4.0, 6.0]);

        let odd = FftEngine::new(7);
        assert_eq!(odd.num_harmonics(), 3);
    }

    #[test]
    fn test_wrong_width_is_rejected() {
        let fft = FftEngine::new(16);
        let windows = Array2::<f64>::zeros((3, 8));
        assert!(matches!(
            fft.transform_rows(windows.view()),
            Err(WindowingError::WindowLengthMismatch { found: 8, expected: 16 })
        ));
    }

    #[test]
    fn test_no_windows() {
        let fft = FftEngine::new(16);
        let windows = Array2::<f64>::zeros((0, 16));
        assert_eq!(fft.transform_rows(windows.view()).unwrap().dim(), (0, 8));
    }
}
