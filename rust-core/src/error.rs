//! Error type shared by every stage of the windowing pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WindowingError {
    #[error("Unsupported window family: {0}")]
    UnsupportedWindowFamily(String),

    #[error("Taper family '{family}' requires argument '{argument}'")]
    MissingTaperArgument {
        family: &'static str,
        argument: &'static str,
    },

    #[error("Taper family '{family}' does not take argument '{argument}'")]
    UnexpectedTaperArgument {
        family: &'static str,
        argument: String,
    },

    #[error(
        "Spectral calibration factors disagree: {from_statistics} (window statistics) vs {from_taper} (taper energy)"
    )]
    SpectralCalibrationInconsistency { from_statistics: f64, from_taper: f64 },

    #[error("Windows have {found} samples, expected {expected}")]
    WindowLengthMismatch { found: usize, expected: usize },

    #[error("Unsupported input type: {0}")]
    UnsupportedInputType(String),

    #[error("Number of samples to advance must be positive (window {window}, overlap {overlap})")]
    NonPositiveAdvance { window: usize, overlap: usize },

    #[error("Window length must be positive")]
    EmptyWindow,

    #[error(
        "{num_windows} windows of {window} samples advancing by {advance} do not fit in {num_samples} samples"
    )]
    WindowsOutOfBounds {
        num_samples: usize,
        window: usize,
        advance: usize,
        num_windows: usize,
    },

    #[error("Sample rate must be positive and finite (found: {0})")]
    InvalidSampleRate(f64),

    #[error("Invalid frequency band: lower bound {lower} exceeds upper bound {upper}")]
    InvalidFrequencyBand { lower: f64, upper: f64 },

    #[error("Band edge table must have 2 columns (found: {0})")]
    InvalidBandEdges(usize),

    #[error("Unsupported striding function: {0}")]
    UnsupportedStridingFunction(String),

    #[error("Unsupported detrend type: {0}")]
    UnsupportedDetrendType(String),

    #[error("Channel '{name}' has {found} samples, expected {expected}")]
    ChannelLengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("FFT processing failed: {0}")]
    Fft(#[from] realfft::FftError),
}

pub type Result<T> = std::result::Result<T, WindowingError>;
