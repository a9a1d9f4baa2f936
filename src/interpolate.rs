//! Binary search and linear interpolation over sorted sample arrays.

use crate::error::{ChartError, Result};

/// Find the index of the first element greater than or equal to `threshold`.
///
/// `values` must be sorted in ascending order. Runs in O(log n).
///
/// * An empty slice always yields `None`.
/// * Without `enforce_bounding` the result is clamped into `0..=values.len()`:
///   a threshold below every value gives `0`, one above every value gives
///   `values.len()`.
/// * With `enforce_bounding`, a threshold outside `[first, last]` (or NaN) gives `None`.
#[must_use]
pub fn fast_find_first_greater(values: &[f64], threshold: f64, enforce_bounding: bool) -> Option<usize> {
    let (first, last) = (values.first()?, values.last()?);

    if enforce_bounding && !(*first..=*last).contains(&threshold) {
        return None;
    }

    Some(values.partition_point(|v| *v < threshold))
}

/// Linear interpolation of `y` at `x` on the line through `(a_x, a_y)` and `(b_x, b_y)`.
/// Returns `a_y` when both abscissas are equal.
#[must_use]
pub fn linear_interpolate(a_x: f64, b_x: f64, a_y: f64, b_y: f64, x: f64) -> f64 {
    if a_x == b_x {
        return a_y;
    }
    a_y + (x - a_x) / (b_x - a_x) * (b_y - a_y)
}

/// Interpolate the value at `position` from parallel `positions` / `values` samples.
///
/// `positions` must be sorted in ascending order. When `position` matches a
/// sample exactly, that sample's value is returned untouched.
///
/// # Errors
///
/// * [`ChartError::EmptySamples`] if there are no samples
/// * [`ChartError::LengthMismatch`] if the arrays differ in length
/// * [`ChartError::PositionOutOfRange`] if `position` is outside `[min, max]` or is not finite
pub fn interpolate_value(positions: &[f64], values: &[f64], position: f64) -> Result<f64> {
    if positions.is_empty() {
        return Err(ChartError::EmptySamples);
    }
    if positions.len() != values.len() {
        return Err(ChartError::LengthMismatch {
            positions: positions.len(),
            values: values.len(),
        });
    }

    let index = if position.is_finite() {
        fast_find_first_greater(positions, position, true)
    } else {
        None
    };
    let Some(index) = index else {
        return Err(ChartError::PositionOutOfRange {
            position,
            positions: positions.to_vec(),
        });
    };

    if positions[index] == position || index == 0 {
        return Ok(values[index]);
    }

    Ok(linear_interpolate(
        positions[index - 1],
        positions[index],
        values[index - 1],
        values[index],
        position,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [f64; 6] = [0.0, 10.0, 20.0, 20.0, 35.0, 50.0];

    fn assert_lower_bound(values: &[f64], threshold: f64) {
        let i = fast_find_first_greater(values, threshold, false).expect("non-empty input");
        if i < values.len() {
            assert!(values[i] >= threshold);
        }
        if i > 0 {
            assert!(values[i - 1] < threshold);
        }
    }

    #[test]
    fn test_find_empty() {
        assert_eq!(fast_find_first_greater(&[], 3.0, false), None);
        assert_eq!(fast_find_first_greater(&[], 3.0, true), None);
    }

    #[test]
    fn test_find_exact_match_returns_that_index() {
        assert_eq!(fast_find_first_greater(&SAMPLES, 10.0, false), Some(1));
        assert_eq!(fast_find_first_greater(&SAMPLES, 0.0, true), Some(0));
        assert_eq!(fast_find_first_greater(&SAMPLES, 50.0, true), Some(5));
    }

    #[test]
    fn test_find_duplicates_returns_first() {
        assert_eq!(fast_find_first_greater(&SAMPLES, 20.0, false), Some(2));
    }

    #[test]
    fn test_find_between_values() {
        assert_eq!(fast_find_first_greater(&SAMPLES, 12.5, false), Some(2));
        assert_eq!(fast_find_first_greater(&SAMPLES, 36.0, true), Some(5));
    }

    #[test]
    fn test_find_clamps_without_bounding() {
        assert_eq!(fast_find_first_greater(&SAMPLES, -5.0, false), Some(0));
        assert_eq!(fast_find_first_greater(&SAMPLES, 60.0, false), Some(SAMPLES.len()));
    }

    #[test]
    fn test_find_bounding_rejects_out_of_range() {
        assert_eq!(fast_find_first_greater(&SAMPLES, -5.0, true), None);
        assert_eq!(fast_find_first_greater(&SAMPLES, 60.0, true), None);
    }

    #[test]
    fn test_find_lower_bound_property() {
        let mut t = -3.0;
        while t < 55.0 {
            assert_lower_bound(&SAMPLES, t);
            t += 0.5;
        }
    }

    #[test]
    fn test_interpolate_exact_samples() {
        let positions = [0.0, 100.0, 250.0, 400.0];
        let speeds = [0.0, 13.37, 27.1, 0.3];
        for (p, v) in positions.iter().zip(speeds) {
            let value = interpolate_value(&positions, &speeds, *p).expect("in range");
            assert_eq!(value, v);
        }
    }

    #[test]
    fn test_interpolate_between_samples() {
        let positions = [0.0, 100.0, 200.0];
        let times = [0.0, 1000.0, 5000.0];
        let value = interpolate_value(&positions, &times, 150.0).expect("in range");
        assert!((value - 3000.0).abs() < 1e-9);

        let value = interpolate_value(&positions, &times, 25.0).expect("in range");
        assert!((value - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_interpolate_decreasing_values() {
        let positions = [0.0, 10.0];
        let speeds = [20.0, 10.0];
        let value = interpolate_value(&positions, &speeds, 4.0).expect("in range");
        assert!((value - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_interpolate_out_of_range() {
        let positions = [10.0, 20.0];
        let values = [1.0, 2.0];
        let err = interpolate_value(&positions, &values, 25.0).expect_err("out of range");
        let message = err.to_string();
        assert!(message.contains("25"));
        assert!(message.contains("[10.0, 20.0]"));
        assert!(interpolate_value(&positions, &values, 9.9).is_err());
    }

    #[test]
    fn test_nan_position_is_rejected() {
        assert_eq!(fast_find_first_greater(&SAMPLES, f64::NAN, true), None);

        let err = interpolate_value(&[0.0, 10.0], &[5.0, 7.0], f64::NAN).expect_err("NaN position");
        assert!(matches!(err, ChartError::PositionOutOfRange { ref positions, .. } if positions == &[0.0, 10.0]));
        assert!(interpolate_value(&[0.0, 10.0], &[5.0, 7.0], f64::INFINITY).is_err());
    }

    #[test]
    fn test_interpolate_invalid_inputs() {
        assert!(matches!(interpolate_value(&[], &[], 0.0), Err(ChartError::EmptySamples)));
        assert!(matches!(
            interpolate_value(&[0.0, 1.0], &[0.0], 0.5),
            Err(ChartError::LengthMismatch { positions: 2, values: 1 })
        ));
    }

    #[test]
    fn test_linear_interpolate_degenerate() {
        assert_eq!(linear_interpolate(3.0, 3.0, 7.0, 9.0, 3.0), 7.0);
    }
}
