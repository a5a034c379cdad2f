//! Interchangeable window extraction strategies

use super::{check_bounds, StridingFunction};
use crate::error::Result;
use ndarray::{s, Array2, ArrayView1, ArrayView2, ShapeBuilder};

/// Element-by-element index loop
#[derive(Debug, Clone, Copy, Default)]
pub struct Crude;

impl StridingFunction for Crude {
    fn extract_windows(
        &self,
        data: ArrayView1<f64>,
        window: usize,
        advance: usize,
        num_windows: usize,
    ) -> Result<Array2<f64>> {
        check_bounds(data.len(), window, advance, num_windows)?;

        let mut windowed = Array2::zeros((num_windows, window));
        for i in 0..num_windows {
            let start = i * advance;
            for j in 0..window {
                windowed[[i, j]] = data[start + j];
            }
        }
        Ok(windowed)
    }
}

/// Whole-row slice assignment, one per window
#[derive(Debug, Clone, Copy, Default)]
pub struct Accelerated;

impl StridingFunction for Accelerated {
    fn extract_windows(
        &self,
        data: ArrayView1<f64>,
        window: usize,
        advance: usize,
        num_windows: usize,
    ) -> Result<Array2<f64>> {
        check_bounds(data.len(), window, advance, num_windows)?;

        let mut windowed = Array2::zeros((num_windows, window));
        for (i, mut row) in windowed.outer_iter_mut().enumerate() {
            let start = i * advance;
            row.assign(&data.slice(s![start..start + window]));
        }
        Ok(windowed)
    }
}

/// Copy out of an overlapping strided view
#[derive(Debug, Clone, Copy, Default)]
pub struct StridedView;

impl StridingFunction for StridedView {
    fn extract_windows(
        &self,
        data: ArrayView1<f64>,
        window: usize,
        advance: usize,
        num_windows: usize,
    ) -> Result<Array2<f64>> {
        check_bounds(data.len(), window, advance, num_windows)?;

        match data.as_slice() {
            Some(samples) => Ok(strided_view(samples, window, advance, num_windows)?.to_owned()),
            None => {
                let contiguous = data.to_vec();
                Ok(strided_view(&contiguous, window, advance, num_windows)?.to_owned())
            }
        }
    }
}

/// Zero-copy `(num_windows, window)` view whose rows overlap in memory
///
/// Consecutive rows start `advance` samples apart, so no data is copied.
pub fn strided_view(
    samples: &[f64],
    window: usize,
    advance: usize,
    num_windows: usize,
) -> Result<ArrayView2<'_, f64>> {
    check_bounds(samples.len(), window, advance, num_windows)?;

    // SAFETY: check_bounds guarantees the largest offset,
    // (num_windows - 1) * advance + window - 1, lies inside `samples`.
    // The view is read-only, so overlapping rows never alias a mutable borrow,
    // and the lifetime is tied to `samples`.
    let view = unsafe {
        ArrayView2::from_shape_ptr(
            (num_windows, window).strides((advance, 1)),
            samples.as_ptr(),
        )
    };
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1, Axis};

    #[test]
    fn test_strided_view_shares_memory() {
        let samples: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let view = strided_view(&samples, 4, 2, 4).unwrap();

        assert_eq!(view.dim(), (4, 4));
        assert_eq!(view.row(1), array![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(view.row(3), array![6.0, 7.0, 8.0, 9.0]);
        // row 1 starts at sample 2 in the original buffer
        assert_eq!(view.row(1).as_ptr(), samples[2..].as_ptr());
    }

    #[test]
    fn test_non_contiguous_input() {
        let data = Array1::from_iter((0..20).map(|i| i as f64));
        let every_other = data.slice(s![..;2]);
        assert!(every_other.as_slice().is_none());

        let expected = array![[0.0, 2.0, 4.0], [6.0, 8.0, 10.0], [12.0, 14.0, 16.0]];
        assert_eq!(Crude.extract_windows(every_other, 3, 3, 3).unwrap(), expected);
        assert_eq!(Accelerated.extract_windows(every_other, 3, 3, 3).unwrap(), expected);
        assert_eq!(StridedView.extract_windows(every_other, 3, 3, 3).unwrap(), expected);
    }

    #[test]
    fn test_rows_sum() {
        let samples = vec![1.0; 12];
        let view = strided_view(&samples, 5, 1, 8).unwrap();
        let sums = view.sum_axis(Axis(1));
        assert!(sums.iter().all(|&s| s == 5.0));
    }
}
