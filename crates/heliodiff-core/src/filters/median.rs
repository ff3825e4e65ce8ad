use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// NaN-aware square-window median filter.
///
/// The window is clipped at the image edges. Non-finite samples are
/// excluded from each window's median; a window with no finite sample
/// yields NaN. Even sizes are widened to the next odd size so the window
/// stays centered.
pub fn median_filter(data: &Array2<f32>, size: usize) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = (size.max(1) | 1) / 2;

    let filter_row = |row: usize| -> Vec<f32> {
        let r0 = row.saturating_sub(radius);
        let r1 = (row + radius + 1).min(h);
        let mut window = Vec::with_capacity((2 * radius + 1).pow(2));
        (0..w)
            .map(|col| {
                let c0 = col.saturating_sub(radius);
                let c1 = (col + radius + 1).min(w);
                window.clear();
                for r in r0..r1 {
                    for c in c0..c1 {
                        let v = data[[r, c]];
                        if v.is_finite() {
                            window.push(v);
                        }
                    }
                }
                window_median(&mut window)
            })
            .collect()
    };

    let rows: Vec<Vec<f32>> = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        (0..h).into_par_iter().map(filter_row).collect()
    } else {
        (0..h).map(filter_row).collect()
    };

    let mut result = Array2::<f32>::zeros((h, w));
    for (row, row_data) in rows.into_iter().enumerate() {
        for (col, val) in row_data.into_iter().enumerate() {
            result[[row, col]] = val;
        }
    }
    result
}

fn window_median(window: &mut [f32]) -> f32 {
    if window.is_empty() {
        return f32::NAN;
    }
    window.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = window.len() / 2;
    if window.len() % 2 == 1 {
        window[mid]
    } else {
        0.5 * (window[mid - 1] + window[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_field_is_unchanged() {
        let data = Array2::<f32>::from_elem((16, 16), 3.25);
        let filtered = median_filter(&data, 5);
        assert!(filtered.iter().all(|&v| (v - 3.25).abs() < 1e-6));
    }

    #[test]
    fn single_outlier_is_removed() {
        let mut data = Array2::<f32>::zeros((11, 11));
        data[[5, 5]] = 100.0;
        let filtered = median_filter(&data, 5);
        assert_eq!(filtered[[5, 5]], 0.0);
    }

    #[test]
    fn nan_excluded_from_window() {
        let mut data = Array2::<f32>::from_elem((7, 7), 1.0);
        data[[3, 3]] = f32::NAN;
        let filtered = median_filter(&data, 3);
        assert_eq!(filtered[[3, 3]], 1.0);
    }

    #[test]
    fn all_nan_window_stays_nan() {
        let data = Array2::<f32>::from_elem((5, 5), f32::NAN);
        let filtered = median_filter(&data, 5);
        assert!(filtered.iter().all(|v| v.is_nan()));
    }
}
