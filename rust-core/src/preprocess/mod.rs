//! Conditioning applied to series before or inside the STFT

pub mod delay;
pub mod detrend;

pub use delay::{delay_correct_channels, delay_correction};
pub use detrend::{detrend, detrend_channels, detrend_rows, DetrendType};
