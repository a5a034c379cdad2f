//! Apodization window and its derived statistics
//!
//! The sums S1 = Σw and S2 = Σw² are computed on first use and kept until the
//! taper is replaced.

use super::families::{generate_taper, TaperFamily};
use crate::error::{Result, WindowingError};
use ndarray::{Array1, ArrayView1};
use std::cell::OnceCell;
use std::fmt;

/// Relative tolerance of the spectral calibration self-check
pub const CALIBRATION_RTOL: f64 = 1e-9;

/// Cached taper sums
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaperSums {
    /// S1 = Σw[n]
    pub s1: f64,

    /// S2 = Σw[n]²
    pub s2: f64,
}

impl TaperSums {
    fn of(taper: ArrayView1<f64>) -> Self {
        Self {
            s1: taper.sum(),
            s2: taper.dot(&taper),
        }
    }
}

/// Taper plus lazily computed statistics
#[derive(Debug, Clone)]
pub struct ApodizationWindow {
    family: TaperFamily,
    num_samples_window: usize,
    periodic: bool,
    taper: Array1<f64>,
    sums: OnceCell<TaperSums>,
}

impl ApodizationWindow {
    /// Generate a taper of the given family and length
    ///
    /// # Arguments
    /// * `family` - Taper family and shape parameters
    /// * `num_samples_window` - Taper length
    /// * `periodic` - DFT-even taper (symmetric M+1 taper without its last sample)
    pub fn new(family: TaperFamily, num_samples_window: usize, periodic: bool) -> Self {
        let taper = Array1::from(generate_taper(family, num_samples_window, periodic));
        log::debug!("generated {family} taper of {num_samples_window} samples");

        Self {
            family,
            num_samples_window,
            periodic,
            taper,
            sums: OnceCell::new(),
        }
    }

    /// Generate a taper from a family name and ordered shape arguments
    pub fn from_name(
        taper_family: &str,
        num_samples_window: usize,
        additional_args: &[(String, f64)],
        periodic: bool,
    ) -> Result<Self> {
        let family = TaperFamily::from_name_and_args(taper_family, additional_args)?;
        Ok(Self::new(family, num_samples_window, periodic))
    }

    /// Wrap an existing taper; the window length is taken from the taper
    pub fn from_taper(family: TaperFamily, taper: Array1<f64>, periodic: bool) -> Self {
        Self {
            family,
            num_samples_window: taper.len(),
            periodic,
            taper,
            sums: OnceCell::new(),
        }
    }

    /// Replace the taper and its description, invalidating the cached statistics
    pub fn set_taper(&mut self, family: TaperFamily, taper: Array1<f64>, periodic: bool) {
        *self = Self::from_taper(family, taper, periodic);
    }

    pub fn taper(&self) -> ArrayView1<'_, f64> {
        self.taper.view()
    }

    pub fn family(&self) -> TaperFamily {
        self.family
    }

    pub fn taper_family(&self) -> &'static str {
        self.family.name()
    }

    pub fn additional_args(&self) -> Vec<(String, f64)> {
        self.family.additional_args()
    }

    pub fn num_samples_window(&self) -> usize {
        self.num_samples_window
    }

    pub fn is_periodic(&self) -> bool {
        self.periodic
    }

    fn sums(&self) -> TaperSums {
        *self.sums.get_or_init(|| TaperSums::of(self.taper.view()))
    }

    /// S1 = Σw[n]
    pub fn s1(&self) -> f64 {
        self.sums().s1
    }

    /// S2 = Σw[n]²
    pub fn s2(&self) -> f64 {
        self.sums().s2
    }

    /// DC gain normalized by length: S1/N
    pub fn coherent_gain(&self) -> f64 {
        self.s1() / self.num_samples_window as f64
    }

    /// Normalized equivalent noise bandwidth: N*S2/S1²
    pub fn nenbw(&self) -> f64 {
        let sums = self.sums();
        self.num_samples_window as f64 * sums.s2 / (sums.s1 * sums.s1)
    }

    /// √NENBW * coherent gain
    pub fn apodization_factor(&self) -> f64 {
        self.nenbw().sqrt() * self.coherent_gain()
    }

    /// Equivalent noise bandwidth in Hz: fs*S2/S1²
    pub fn effective_noise_bandwidth(&self, sample_rate: f64) -> f64 {
        let sums = self.sums();
        sample_rate * sums.s2 / (sums.s1 * sums.s1)
    }

    /// Amplitude calibration to a linear spectral density: √(2/(fs*S2))
    pub fn linear_spectral_density_calibration_factor(&self, sample_rate: f64) -> f64 {
        (2.0 / (sample_rate * self.s2())).sqrt()
    }

    /// Cross-check the two derivations of the spectral density calibration factor
    ///
    /// The statistics form uses the cached sums through NENBW and the taper mean
    /// as coherent gain; the energy form sums the taper afresh.
    pub fn check_calibration(&self, sample_rate: f64) -> Result<f64> {
        let n = self.num_samples_window as f64;
        let shared = (2.0 / sample_rate).sqrt();

        let coherent_gain = self.taper.mean().unwrap_or(0.0);
        let from_statistics = shared * (1.0 / coherent_gain) * (1.0 / (self.nenbw() * n)).sqrt();
        let from_taper = shared * (1.0 / self.taper.dot(&self.taper)).sqrt();

        let mismatch = (from_statistics - from_taper).abs();
        let scale = from_statistics.abs().max(from_taper.abs());
        if mismatch.is_nan() || mismatch > CALIBRATION_RTOL * scale {
            log::error!("spectral calibration mismatch: {from_statistics} vs {from_taper}");
            return Err(WindowingError::SpectralCalibrationInconsistency {
                from_statistics,
                from_taper,
            });
        }

        Ok(from_taper)
    }
}

impl fmt::Display for ApodizationWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} taper, {} samples", self.family, self.num_samples_window)?;
        writeln!(f, "  S1 = {:.6}, S2 = {:.6}", self.s1(), self.s2())?;
        writeln!(f, "  coherent gain = {:.6}", self.coherent_gain())?;
        writeln!(f, "  NENBW = {:.6}", self.nenbw())?;
        write!(f, "  apodization factor = {:.6}", self.apodization_factor())
    }
}
