//! Windowing scheme: sliding window, taper and FFT in one configuration
//!
//! Ties the striding strategies, the apodization window and the FFT engine
//! together. Every method is a pure function of the configuration and its
//! arguments; the only internal state is a cache of window edge indices.

use super::fft::FftEngine;
use super::series::{LabeledArray, SeriesInput, SeriesLayout, Spectrogram, WindowedSeries};
use crate::error::{Result, WindowingError};
use crate::preprocess::detrend::{detrend_rows, DetrendType};
use crate::striding::{self, StridingFunctionLabel};
use crate::windows::ApodizationWindow;
use ndarray::{Array1, Array2, ArrayView1, Ix1};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;

/// Windowing scheme configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowingSchemeConfig {
    /// Window length in samples
    pub num_samples_window: usize,

    /// Samples shared by consecutive windows; must be less than the window
    pub num_samples_overlap: usize,

    /// Taper family name, e.g. "hamming" or "kaiser"
    pub taper_family: String,

    /// Ordered shape arguments for the taper family
    pub taper_additional_args: Vec<(String, f64)>,

    /// Use the DFT-even form of the taper
    pub periodic: bool,

    pub striding_function_label: StridingFunctionLabel,

    /// Sample rate in Hz
    pub sample_rate: f64,
}

impl Default for WindowingSchemeConfig {
    fn default() -> Self {
        Self {
            num_samples_window: 128,
            num_samples_overlap: 32,
            taper_family: "hamming".to_string(),
            taper_additional_args: Vec::new(),
            periodic: true,
            striding_function_label: StridingFunctionLabel::Crude,
            sample_rate: 1.0,
        }
    }
}

/// Validated windowing scheme
#[derive(Debug, Clone)]
pub struct WindowingScheme {
    config: WindowingSchemeConfig,
    window: ApodizationWindow,
    fft: FftEngine,

    /// Edge indices of the last series length seen
    edge_cache: RefCell<Option<(usize, Array1<usize>)>>,
}

impl WindowingScheme {
    /// Validate a configuration and build its taper and FFT plan
    pub fn new(config: WindowingSchemeConfig) -> Result<Self> {
        if config.num_samples_window == 0 {
            return Err(WindowingError::EmptyWindow);
        }
        if config.num_samples_overlap >= config.num_samples_window {
            return Err(WindowingError::NonPositiveAdvance {
                window: config.num_samples_window,
                overlap: config.num_samples_overlap,
            });
        }
        if !(config.sample_rate.is_finite() && config.sample_rate > 0.0) {
            return Err(WindowingError::InvalidSampleRate(config.sample_rate));
        }

        let window = ApodizationWindow::from_name(
            &config.taper_family,
            config.num_samples_window,
            &config.taper_additional_args,
            config.periodic,
        )?;
        let fft = FftEngine::new(config.num_samples_window);

        Ok(Self {
            config,
            window,
            fft,
            edge_cache: RefCell::new(None),
        })
    }

    pub fn config(&self) -> &WindowingSchemeConfig {
        &self.config
    }

    pub fn num_samples_window(&self) -> usize {
        self.config.num_samples_window
    }

    pub fn num_samples_overlap(&self) -> usize {
        self.config.num_samples_overlap
    }

    /// Samples between the starts of consecutive windows
    pub fn num_samples_advance(&self) -> usize {
        self.config.num_samples_window - self.config.num_samples_overlap
    }

    pub fn sample_rate(&self) -> f64 {
        self.config.sample_rate
    }

    /// Sample interval in seconds
    pub fn dt(&self) -> f64 {
        1.0 / self.config.sample_rate
    }

    pub fn window_duration(&self) -> f64 {
        self.num_samples_window() as f64 * self.dt()
    }

    pub fn duration_advance(&self) -> f64 {
        self.num_samples_advance() as f64 * self.dt()
    }

    pub fn striding_function_label(&self) -> StridingFunctionLabel {
        self.config.striding_function_label
    }

    pub fn apodization_window(&self) -> &ApodizationWindow {
        &self.window
    }

    pub fn available_number_of_windows(&self, num_samples: usize) -> Result<usize> {
        striding::available_number_of_windows(num_samples, self.num_samples_window(), self.num_samples_advance())
    }

    /// Start index of every window for a series of `num_samples`
    pub fn left_hand_window_edge_indices(&self, num_samples: usize) -> Result<Array1<usize>> {
        let mut cache = self.edge_cache.borrow_mut();
        if let Some((cached_len, edges)) = cache.as_ref() {
            if *cached_len == num_samples {
                return Ok(edges.clone());
            }
        }

        let edges = striding::left_hand_window_edge_indices(
            num_samples,
            self.num_samples_window(),
            self.num_samples_advance(),
        )?;
        *cache = Some((num_samples, edges.clone()));
        Ok(edges)
    }

    /// One-sided harmonic frequencies of the FFT, in Hz
    pub fn frequency_axis(&self) -> Array1<f64> {
        self.fft.harmonic_frequencies(self.config.sample_rate)
    }

    /// √(2/(fs*S2))
    pub fn linear_spectral_density_calibration_factor(&self) -> f64 {
        self.window
            .linear_spectral_density_calibration_factor(self.config.sample_rate)
    }

    /// Cut a series into overlapping windows
    ///
    /// # Arguments
    /// * `input` - 1-D array, labeled channel, or multi-channel collection
    ///
    /// # Returns
    /// One `(num_windows, num_samples_window)` array per channel, in input order
    pub fn apply_sliding_window<'a>(&self, input: impl Into<SeriesInput<'a>>) -> Result<WindowedSeries> {
        match input.into() {
            SeriesInput::Array(values) => {
                let ndim = values.ndim();
                let samples = values.into_dimensionality::<Ix1>().map_err(|_| {
                    WindowingError::UnsupportedInputType(format!("{ndim}-dimensional array"))
                })?;
                let windows = self.window_channel(samples)?;
                self.windowed(SeriesLayout::Array, 0.0, samples.len(), vec![LabeledArray {
                    label: None,
                    values: windows,
                }])
            }
            SeriesInput::Channel(channel) => {
                log::debug!("windowing channel {}", channel.name);
                let windows = self.window_channel(channel.samples.view())?;
                self.windowed(SeriesLayout::Channel, channel.start_time, channel.samples.len(), vec![
                    LabeledArray {
                        label: Some(channel.name.clone()),
                        values: windows,
                    },
                ])
            }
            SeriesInput::MultiChannel(series) => {
                let channels = series
                    .iter()
                    .map(|(name, samples)| {
                        log::debug!("windowing channel {name}");
                        Ok(LabeledArray {
                            label: Some(name.to_string()),
                            values: self.window_channel(samples)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                self.windowed(SeriesLayout::MultiChannel, series.start_time(), series.len(), channels)
            }
        }
    }

    /// Multiply every window by the taper
    pub fn apply_taper(&self, mut windowed: WindowedSeries) -> Result<WindowedSeries> {
        let taper = self.window.taper();
        for channel in &mut windowed.channels {
            self.check_width(channel.values.ncols())?;
            channel.values *= &taper;
        }
        Ok(windowed)
    }

    /// One-sided FFT of every window
    ///
    /// # Arguments
    /// * `windowed` - Windowed (normally tapered) series
    /// * `detrend_type` - Optional per-window detrend applied before the FFT
    /// * `spectral_density_correction` - Scale to a linear spectral density
    pub fn apply_fft(
        &self,
        windowed: &WindowedSeries,
        detrend_type: Option<DetrendType>,
        spectral_density_correction: bool,
    ) -> Result<Spectrogram> {
        let calibration = if spectral_density_correction {
            Some(self.window.check_calibration(self.config.sample_rate)?)
        } else {
            None
        };

        let channels = windowed
            .channels
            .iter()
            .map(|channel| {
                self.check_width(channel.values.ncols())?;
                let mut spectra = match detrend_type {
                    Some(kind) => self.fft.transform_rows(detrend_rows(channel.values.view(), kind).view())?,
                    None => self.fft.transform_rows(channel.values.view())?,
                };
                if let Some(factor) = calibration {
                    spectra.mapv_inplace(|c| c * factor);
                }
                Ok(LabeledArray {
                    label: channel.label.clone(),
                    values: spectra,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Spectrogram {
            layout: windowed.layout,
            window_start_times: windowed.window_start_times.clone(),
            frequencies: self.frequency_axis(),
            channels,
        })
    }

    /// Sliding window, taper and FFT in one call
    pub fn stft<'a>(
        &self,
        input: impl Into<SeriesInput<'a>>,
        detrend_type: Option<DetrendType>,
        spectral_density_correction: bool,
    ) -> Result<Spectrogram> {
        let windowed = self.apply_sliding_window(input)?;
        let tapered = self.apply_taper(windowed)?;
        self.apply_fft(&tapered, detrend_type, spectral_density_correction)
    }

    fn window_channel(&self, samples: ArrayView1<f64>) -> Result<Array2<f64>> {
        let num_windows = self.available_number_of_windows(samples.len())?;
        self.config.striding_function_label.striding_function().extract_windows(
            samples,
            self.num_samples_window(),
            self.num_samples_advance(),
            num_windows,
        )
    }

    fn windowed(
        &self,
        layout: SeriesLayout,
        start_time: f64,
        num_samples: usize,
        channels: Vec<LabeledArray<f64>>,
    ) -> Result<WindowedSeries> {
        let dt = self.dt();
        let window_start_times = self
            .left_hand_window_edge_indices(num_samples)?
            .mapv(|i| start_time + i as f64 * dt);
        let within_window_time = Array1::from_iter((0..self.num_samples_window()).map(|i| i as f64 * dt));

        Ok(WindowedSeries {
            layout,
            window_start_times,
            within_window_time,
            channels,
        })
    }

    fn check_width(&self, width: usize) -> Result<()> {
        if width != self.num_samples_window() {
            return Err(WindowingError::WindowLengthMismatch {
                found: width,
                expected: self.num_samples_window(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for WindowingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Windowing scheme: {} samples, overlap {}, advance {}",
            self.num_samples_window(),
            self.num_samples_overlap(),
            self.num_samples_advance()
        )?;
        writeln!(
            f,
            "  sample rate = {} Hz, window duration = {} s, striding = {}",
            self.sample_rate(),
            self.window_duration(),
            self.striding_function_label()
        )?;
        write!(f, "{}", self.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::series::{Channel, MultiChannelSeries};
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::{array, s, Array3};
    use std::f64::consts::PI;

    fn scheme(window: usize, overlap: usize, taper: &str) -> WindowingScheme {
        WindowingScheme::new(WindowingSchemeConfig {
            num_samples_window: window,
            num_samples_overlap: overlap,
            taper_family: taper.to_string(),
            ..WindowingSchemeConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let scheme = WindowingScheme::new(WindowingSchemeConfig::default()).unwrap();
        assert_eq!(scheme.num_samples_advance(), 96);
        assert_eq!(scheme.apodization_window().taper_family(), "hamming");
        assert_eq!(scheme.frequency_axis().len(), 64);
        assert_eq!(scheme.dt(), 1.0);
    }

    #[test]
    fn test_invalid_config() {
        let overlapping = WindowingSchemeConfig {
            num_samples_window: 16,
            num_samples_overlap: 16,
            ..WindowingSchemeConfig::default()
        };
        assert!(matches!(
            WindowingScheme::new(overlapping),
            Err(WindowingError::NonPositiveAdvance { window: 16, overlap: 16 })
        ));

        let unknown = WindowingSchemeConfig {
            taper_family: "nuttall".to_string(),
            ..WindowingSchemeConfig::default()
        };
        assert!(matches!(
            WindowingScheme::new(unknown),
            Err(WindowingError::UnsupportedWindowFamily(_))
        ));

        let zero_rate = WindowingSchemeConfig {
            sample_rate: 0.0,
            ..WindowingSchemeConfig::default()
        };
        assert!(WindowingScheme::new(zero_rate).is_err());
    }

    #[test]
    fn test_sliding_window_of_array() {
        let scheme = scheme(4, 1, "boxcar");
        let data = Array1::from_iter((0..15).map(|i| i as f64));
        let windowed = scheme.apply_sliding_window(&data).unwrap();

        assert_eq!(windowed.layout, SeriesLayout::Array);
        assert_eq!(
            windowed.values().unwrap(),
            &array![[0.0, 1.0, 2.0, 3.0], [3.0, 4.0, 5.0, 6.0], [6.0, 7.0, 8.0, 9.0], [9.0, 10.0, 11.0, 12.0]]
        );
        assert_eq!(windowed.window_start_times, array![0.0, 3.0, 6.0, 9.0]);
        assert_eq!(windowed.within_window_time, array![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_window_longer_than_series() {
        let scheme = scheme(32, 8, "hann");
        let data = Array1::<f64>::ones(10);
        let windowed = scheme.apply_sliding_window(&data).unwrap();
        assert_eq!(windowed.num_windows(), 0);
        assert_eq!(windowed.values().unwrap().dim(), (0, 32));

        let spectrogram = scheme.apply_fft(&windowed, None, true).unwrap();
        assert_eq!(spectrogram.values().unwrap().dim(), (0, 16));
    }

    #[test]
    fn test_multichannel_keeps_names_and_order() {
        let scheme = scheme(8, 4, "hamming");
        let ex = Array1::from_iter((0..40).map(|i| (i as f64 * 0.3).sin()));
        let hy = Array1::from_iter((0..40).map(|i| (i as f64 * 0.7).cos()));
        let series = MultiChannelSeries::new(100.0)
            .with_channel("hy", hy.clone())
            .unwrap()
            .with_channel("ex", ex.clone())
            .unwrap();

        let windowed = scheme.apply_sliding_window(&series).unwrap();
        assert_eq!(windowed.layout, SeriesLayout::MultiChannel);
        let labels: Vec<_> = windowed.channels.iter().map(|c| c.label.clone().unwrap()).collect();
        assert_eq!(labels, vec!["hy", "ex"]);
        assert_eq!(windowed.window_start_times[0], 100.0);
        assert_eq!(windowed.window_start_times[1], 104.0);

        // each channel matches windowing it alone
        let alone = scheme.apply_sliding_window(&ex).unwrap();
        assert_eq!(windowed.channel("ex").unwrap(), alone.values().unwrap());
    }

    #[test]
    fn test_single_channel_input() {
        let scheme = scheme(4, 0, "boxcar");
        let channel = Channel::new("hz", Array1::from_iter((0..8).map(|i| i as f64))).with_start_time(2.0);
        let windowed = scheme.apply_sliding_window(&channel).unwrap();
        assert_eq!(windowed.layout, SeriesLayout::Channel);
        assert_eq!(windowed.channels[0].label.as_deref(), Some("hz"));
        assert_eq!(windowed.window_start_times, array![2.0, 6.0]);
    }

    #[test]
    fn test_multidimensional_array_rejected() {
        let scheme = scheme(4, 1, "boxcar");
        let cube = Array3::<f64>::zeros((2, 3, 4));
        assert!(matches!(
            scheme.apply_sliding_window(cube.view().into_dyn()),
            Err(WindowingError::UnsupportedInputType(_))
        ));
    }

    #[test]
    fn test_non_overlapping_windows_reassemble_series() {
        let scheme = scheme(5, 0, "boxcar");
        let data = Array1::from_iter((0..23).map(|i| (i * i) as f64));
        let windowed = scheme.apply_sliding_window(&data).unwrap();
        let flat: Vec<f64> = windowed.values().unwrap().iter().copied().collect();
        assert_eq!(flat, data.slice(s![..20]).to_vec());
    }

    #[test]
    fn test_apply_taper() {
        let scheme = scheme(8, 0, "hann");
        let data = Array1::<f64>::ones(16);
        let tapered = scheme
            .apply_taper(scheme.apply_sliding_window(&data).unwrap())
            .unwrap();
        for row in tapered.values().unwrap().outer_iter() {
            assert_eq!(row, scheme.apodization_window().taper());
        }
    }

    #[test]
    fn test_sine_amplitude_with_boxcar() {
        let scheme = scheme(64, 0, "boxcar");
        let data = Array1::from_iter((0..128).map(|n| 3.0 * (2.0 * PI * 8.0 * n as f64 / 64.0).cos()));
        let spectrogram = scheme.stft(&data, None, false).unwrap();

        assert_eq!(spectrogram.frequencies.len(), 32);
        for row in spectrogram.values().unwrap().outer_iter() {
            // A*N/2 at the tone harmonic
            assert_abs_diff_eq!(row[8].norm(), 96.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_spectral_density_correction_scale() {
        let scheme = scheme(32, 16, "hamming");
        let data = Array1::from_iter((0..200).map(|n| (n as f64 * 0.37).sin()));
        let windowed = scheme
            .apply_taper(scheme.apply_sliding_window(&data).unwrap())
            .unwrap();

        let raw = scheme.apply_fft(&windowed, None, false).unwrap();
        let calibrated = scheme.apply_fft(&windowed, None, true).unwrap();
        let factor = scheme.linear_spectral_density_calibration_factor();
        for (r, c) in raw.values().unwrap().iter().zip(calibrated.values().unwrap()) {
            assert_relative_eq!(c.re, r.re * factor, max_relative = 1e-12);
            assert_relative_eq!(c.im, r.im * factor, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_detrend_removes_dc() {
        let scheme = scheme(16, 0, "boxcar");
        let data = Array1::from_iter((0..32).map(|n| 5.0 + 0.5 * n as f64));
        let spectrogram = scheme.stft(&data, Some(DetrendType::Linear), false).unwrap();
        assert!(spectrogram.values().unwrap().iter().all(|c| c.norm() < 1e-9));
    }

    #[test]
    fn test_idempotent() {
        let scheme = WindowingScheme::new(WindowingSchemeConfig {
            num_samples_window: 16,
            num_samples_overlap: 4,
            taper_family: "kaiser".to_string(),
            taper_additional_args: vec![("beta".to_string(), 4.0)],
            ..WindowingSchemeConfig::default()
        })
        .unwrap();
        let data = Array1::from_iter((0..100).map(|n| (n as f64).sqrt()));
        let first = scheme.stft(&data, Some(DetrendType::Constant), true).unwrap();
        let second = scheme.stft(&data, Some(DetrendType::Constant), true).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_edge_cache_follows_series_length() {
        let scheme = scheme(4, 2, "boxcar");
        assert_eq!(scheme.left_hand_window_edge_indices(8).unwrap(), array![0usize, 2, 4]);
        assert_eq!(scheme.left_hand_window_edge_indices(10).unwrap(), array![0usize, 2, 4, 6]);
        assert_eq!(scheme.left_hand_window_edge_indices(8).unwrap(), array![0usize, 2, 4]);
    }

    #[test]
    fn test_strategies_give_identical_spectra() {
        let data = Array1::from_iter((0..301).map(|n| (n as f64 * 0.11).sin() + 0.01 * n as f64));
        let spectra: Vec<_> = [
            StridingFunctionLabel::Crude,
            StridingFunctionLabel::Accelerated,
            StridingFunctionLabel::StridedView,
        ]
        .into_iter()
        .map(|label| {
            let scheme = WindowingScheme::new(WindowingSchemeConfig {
                num_samples_window: 32,
                num_samples_overlap: 8,
                striding_function_label: label,
                ..WindowingSchemeConfig::default()
            })
            .unwrap();
            scheme.stft(&data, Some(DetrendType::Linear), true).unwrap()
        })
        .collect();
        assert_eq!(spectra[0], spectra[1]);
        assert_eq!(spectra[1], spectra[2]);
    }

    #[test]
    fn test_config_json() {
        let config: WindowingSchemeConfig = serde_json::from_str(
            r#"{
                "num_samples_window": 256,
                "taper_family": "kaiser",
                "taper_additional_args": [["beta", 8.0]],
                "striding_function_label": "strided-view",
                "sample_rate": 50.0
            }"#,
        )
        .unwrap();
        assert_eq!(config.num_samples_overlap, 32);
        assert!(config.periodic);
        assert_eq!(config.striding_function_label, StridingFunctionLabel::StridedView);

        let scheme = WindowingScheme::new(config.clone()).unwrap();
        assert_relative_eq!(scheme.window_duration(), 256.0 / 50.0);

        let round_trip: WindowingSchemeConfig =
            serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();
        assert_eq!(round_trip, config);
    }

    #[test]
    fn test_display() {
        let scheme = scheme(16, 4, "hann");
        let text = scheme.to_string();
        assert!(text.contains("16 samples, overlap 4, advance 12"));
        assert!(text.contains("hann"));
    }
}
