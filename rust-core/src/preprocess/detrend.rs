//! Trend removal with missing-sample support
//!
//! Missing samples (NaN) are dropped before fitting and come back as NaN at
//! their original positions. Data that cannot be detrended is returned as is.

use crate::error::WindowingError;
use crate::spectrum::series::MultiChannelSeries;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetrendType {
    /// Remove the least-squares line
    Linear,

    /// Remove the mean
    Constant,
}

impl DetrendType {
    fn min_samples(self) -> usize {
        match self {
            DetrendType::Linear => 2,
            DetrendType::Constant => 1,
        }
    }
}

impl fmt::Display for DetrendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetrendType::Linear => f.write_str("linear"),
            DetrendType::Constant => f.write_str("constant"),
        }
    }
}

impl FromStr for DetrendType {
    type Err = WindowingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(DetrendType::Linear),
            "constant" => Ok(DetrendType::Constant),
            other => Err(WindowingError::UnsupportedDetrendType(other.to_string())),
        }
    }
}

/// Detrend one channel
///
/// # Arguments
/// * `samples` - Channel data, NaN marking missing samples
/// * `detrend_type` - Linear or constant
///
/// # Returns
/// Detrended copy, or an unmodified copy if there were too few valid samples
pub fn detrend(samples: ArrayView1<f64>, detrend_type: DetrendType) -> Array1<f64> {
    let present: Vec<(usize, f64)> = samples
        .iter()
        .enumerate()
        .filter(|&(_, &v)| !v.is_nan())
        .map(|(i, &v)| (i, v))
        .collect();

    if present.len() < detrend_type.min_samples() {
        log::warn!(
            "{detrend_type} detrend skipped: {} valid samples out of {}",
            present.len(),
            samples.len()
        );
        return samples.to_owned();
    }

    // Fit against positions in the compacted (gap-free) sequence
    let m = present.len() as f64;
    let mean = present.iter().map(|&(_, v)| v).sum::<f64>() / m;
    let slope = match detrend_type {
        DetrendType::Constant => 0.0,
        DetrendType::Linear => {
            let x_mean = (m - 1.0) / 2.0;
            let (num, den) = present
                .iter()
                .enumerate()
                .fold((0.0, 0.0), |(num, den), (k, &(_, v))| {
                    let dx = k as f64 - x_mean;
                    (num + dx * (v - mean), den + dx * dx)
                });
            num / den
        }
    };
    let intercept = mean - slope * (m - 1.0) / 2.0;

    let mut detrended = samples.to_owned();
    for (k, &(i, v)) in present.iter().enumerate() {
        detrended[i] = v - (intercept + slope * k as f64);
    }
    detrended
}

/// Detrend every row of a windowed array
pub fn detrend_rows(windows: ArrayView2<f64>, detrend_type: DetrendType) -> Array2<f64> {
    let mut detrended = Array2::zeros(windows.raw_dim());
    for (row, mut out) in windows.outer_iter().zip(detrended.outer_iter_mut()) {
        out.assign(&detrend(row, detrend_type));
    }
    detrended
}

/// Detrend each channel of a collection in place
pub fn detrend_channels(series: &mut MultiChannelSeries, detrend_type: DetrendType) {
    for (name, mut samples) in series.iter_mut() {
        log::debug!("{detrend_type} detrend of channel {name}");
        let detrended = detrend(samples.view(), detrend_type);
        samples.assign(&detrended);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_linear_trend_removed() {
        let samples = Array1::from_iter((0..50).map(|i| 3.0 + 0.25 * i as f64));
        let detrended = detrend(samples.view(), DetrendType::Linear);
        assert!(detrended.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_constant_removes_mean() {
        let detrended = detrend(array![1.0, 2.0, 3.0, 6.0].view(), DetrendType::Constant);
        assert_eq!(detrended, array![-2.0, -1.0, 0.0, 3.0]);
    }

    #[test]
    fn test_missing_samples_are_restored() {
        let samples = array![1.0, f64::NAN, 3.0, 4.0, f64::NAN, 6.0];
        let detrended = detrend(samples.view(), DetrendType::Linear);

        assert!(detrended[1].is_nan());
        assert!(detrended[4].is_nan());
        // compacted series [1, 3, 4, 6] has slope 1.6 and intercept 1.1
        let expected = [1.0 - 1.1, 3.0 - 2.7, 4.0 - 4.3, 6.0 - 5.9];
        for (got, want) in [0, 2, 3, 5].iter().map(|&i| detrended[i]).zip(expected) {
            assert_abs_diff_eq!(got, want, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_degenerate_input_passes_through() {
        let empty = Array1::<f64>::zeros(0);
        assert_eq!(detrend(empty.view(), DetrendType::Constant).len(), 0);

        let single = array![7.0];
        assert_eq!(detrend(single.view(), DetrendType::Linear), array![7.0]);

        let all_missing = array![f64::NAN, f64::NAN];
        let out = detrend(all_missing.view(), DetrendType::Constant);
        assert!(out.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_detrend_rows() {
        let windows = array![[1.0, 2.0, 3.0], [5.0, 5.0, 5.0]];
        let detrended = detrend_rows(windows.view(), DetrendType::Linear);
        assert!(detrended.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_detrend_channels() {
        let mut series = MultiChannelSeries::new(0.0)
            .with_channel("ex", array![1.0, 3.0])
            .unwrap()
            .with_channel("ey", array![10.0, 20.0])
            .unwrap();
        detrend_channels(&mut series, DetrendType::Constant);
        assert_eq!(series.channel("ex").unwrap(), array![-1.0, 1.0]);
        assert_eq!(series.channel("ey").unwrap(), array![-5.0, 5.0]);
    }

    #[test]
    fn test_parse() {
        assert_eq!("linear".parse::<DetrendType>().unwrap(), DetrendType::Linear);
        assert!(matches!(
            "quadratic".parse::<DetrendType>(),
            Err(WindowingError::UnsupportedDetrendType(_))
        ));
    }
}
