//! Time-delay correction
//!
//! A channel recorded `delay` seconds late is shifted back onto the common
//! time grid. Sample `j` of the corrected channel is the original signal at
//! time `t_j + delay`, linearly interpolated between neighbouring samples.
//! Grid points that fall outside the recorded span become NaN.

use crate::error::{Result, WindowingError};
use crate::spectrum::series::MultiChannelSeries;
use ndarray::{Array1, ArrayView1};

/// Shift one channel by `delay_seconds`
///
/// # Arguments
/// * `samples` - Channel data on a regular grid
/// * `sample_rate` - Sample rate in Hz
/// * `delay_seconds` - Delay of this channel relative to the common time base
pub fn delay_correction(
    samples: ArrayView1<f64>,
    sample_rate: f64,
    delay_seconds: f64,
) -> Result<Array1<f64>> {
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(WindowingError::InvalidSampleRate(sample_rate));
    }
    if delay_seconds == 0.0 {
        return Ok(samples.to_owned());
    }

    let shift = delay_seconds * sample_rate;
    let n = samples.len();
    let last = n as f64 - 1.0;

    let corrected = (0..n)
        .map(|j| {
            let position = j as f64 + shift;
            if !(0.0..=last).contains(&position) {
                return f64::NAN;
            }
            let lower = position.floor();
            let fraction = position - lower;
            let i = lower as usize;
            if fraction == 0.0 || i + 1 >= n {
                samples[i]
            } else {
                samples[i] * (1.0 - fraction) + samples[i + 1] * fraction
            }
        })
        .collect();
    Ok(corrected)
}

/// Apply per-channel delays in place
///
/// Channels without an entry in `delays` are left unchanged; entries naming
/// an unknown channel are ignored with a warning.
pub fn delay_correct_channels<S: AsRef<str>>(
    series: &mut MultiChannelSeries,
    sample_rate: f64,
    delays: &[(S, f64)],
) -> Result<()> {
    for (name, _) in delays {
        if series.channel(name.as_ref()).is_none() {
            log::warn!("no channel named {} to delay-correct", name.as_ref());
        }
    }

    for (name, mut samples) in series.iter_mut() {
        let Some(&(_, delay)) = delays.iter().find(|(n, _)| n.as_ref() == name) else {
            continue;
        };
        log::debug!("shifting channel {name} by {delay} s");
        let corrected = delay_correction(samples.view(), sample_rate, delay)?;
        samples.assign(&corrected);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_integral_delay_is_exact_shift() {
        let samples = array![0.0, 1.0, 2.0, 3.0, 4.0];
        // two samples late at 10 Hz
        let corrected = delay_correction(samples.view(), 10.0, 0.2).unwrap();
        assert_eq!(&corrected.to_vec()[..3], &[2.0, 3.0, 4.0]);
        assert!(corrected[3].is_nan() && corrected[4].is_nan());
    }

    #[test]
    fn test_negative_delay_pads_start() {
        let samples = array![5.0, 6.0, 7.0];
        let corrected = delay_correction(samples.view(), 1.0, -1.0).unwrap();
        assert!(corrected[0].is_nan());
        assert_eq!(corrected[1], 5.0);
        assert_eq!(corrected[2], 6.0);
    }

    #[test]
    fn test_fractional_delay_interpolates() {
        let samples = Array1::from_iter((0..8).map(|i| 2.0 * i as f64));
        let corrected = delay_correction(samples.view(), 4.0, 0.125).unwrap();
        // half-sample shift of a ramp
        for j in 0..7 {
            assert_abs_diff_eq!(corrected[j], 2.0 * j as f64 + 1.0, epsilon = 1e-12);
        }
        assert!(corrected[7].is_nan());
    }

    #[test]
    fn test_zero_delay_is_identity() {
        let samples = array![1.0, f64::NAN, 3.0];
        let corrected = delay_correction(samples.view(), 1.0, 0.0).unwrap();
        assert_eq!(corrected[0], 1.0);
        assert!(corrected[1].is_nan());
        assert_eq!(corrected[2], 3.0);
    }

    #[test]
    fn test_bad_sample_rate() {
        let samples = array![1.0, 2.0];
        assert!(matches!(
            delay_correction(samples.view(), 0.0, 1.0),
            Err(WindowingError::InvalidSampleRate(_))
        ));
    }

    #[test]
    fn test_channels_without_delay_unchanged() {
        let mut series = MultiChannelSeries::new(0.0)
            .with_channel("ex", array![0.0, 1.0, 2.0])
            .unwrap()
            .with_channel("hz", array![9.0, 8.0, 7.0])
            .unwrap();
        delay_correct_channels(&mut series, 1.0, &[("ex", 1.0), ("missing", 3.0)]).unwrap();

        let ex = series.channel("ex").unwrap();
        assert_eq!(ex[0], 1.0);
        assert_eq!(ex[1], 2.0);
        assert!(ex[2].is_nan());
        assert_eq!(series.channel("hz").unwrap(), array![9.0, 8.0, 7.0]);
    }
}
