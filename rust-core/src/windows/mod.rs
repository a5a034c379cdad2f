//! Taper generation and window statistics

pub mod families;
pub mod apodization;

pub use families::{TaperFamily, generate_taper};
pub use apodization::{ApodizationWindow, TaperSums, CALIBRATION_RTOL};
