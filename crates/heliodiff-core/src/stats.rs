use ndarray::ArrayView2;

/// Percentile of the finite values in `data`, linearly interpolated
/// between order statistics. `p` in [0, 100]. Returns `None` when the
/// array has no finite values.
pub fn finite_percentile(data: &ArrayView2<f32>, p: f64) -> Option<f32> {
    let mut finite: Vec<f32> = data.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    finite.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let rank = p.clamp(0.0, 100.0) / 100.0 * (finite.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(finite[lo]);
    }
    let frac = (rank - lo as f64) as f32;
    Some(finite[lo] * (1.0 - frac) + finite[hi] * frac)
}

/// Median of the finite values in `data`.
pub fn finite_median(data: &ArrayView2<f32>) -> Option<f32> {
    finite_percentile(data, 50.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn percentile_ignores_nan() {
        let mut data = Array2::<f32>::zeros((2, 3));
        data[[0, 0]] = 1.0;
        data[[0, 1]] = 2.0;
        data[[0, 2]] = 3.0;
        data[[1, 0]] = 4.0;
        data[[1, 1]] = 5.0;
        data[[1, 2]] = f32::NAN;

        assert_eq!(finite_percentile(&data.view(), 0.0), Some(1.0));
        assert_eq!(finite_percentile(&data.view(), 100.0), Some(5.0));
        assert_eq!(finite_median(&data.view()), Some(3.0));
    }

    #[test]
    fn percentile_interpolates() {
        let data = Array2::from_shape_vec((1, 4), vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        // Rank 2.25 between 2.0 and 3.0
        let p = finite_percentile(&data.view(), 75.0).unwrap();
        assert!((p - 2.25).abs() < 1e-6);
    }

    #[test]
    fn all_nan_is_none() {
        let data = Array2::<f32>::from_elem((3, 3), f32::NAN);
        assert_eq!(finite_percentile(&data.view(), 50.0), None);
    }
}
