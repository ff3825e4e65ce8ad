use ndarray::{Array2, ArrayView2};
use tracing::debug;

use crate::stats::finite_percentile;

/// Binary star-field approximation: 1.0 where a pixel is finite and at or
/// above the `thresh` percentile of the array's finite values, 0.0
/// everywhere else (NaN included).
///
/// This is a coarse statistical proxy for the bright stellar sources, used
/// only to drive the alignment correlation. The suppressor classifies star
/// pixels by curvature instead and never consults this mask.
pub fn star_mask(data: &ArrayView2<f32>, thresh: f64) -> Array2<f32> {
    let cutoff = match finite_percentile(data, thresh) {
        Some(c) => c,
        None => {
            debug!("star mask over all-invalid data, returning empty mask");
            return Array2::zeros(data.dim());
        }
    };

    data.mapv(|v| if v.is_finite() && v >= cutoff { 1.0 } else { 0.0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn mask_is_binary_and_deterministic() {
        let mut data = Array2::<f32>::zeros((8, 8));
        data[[2, 3]] = 10.0;
        data[[5, 5]] = 8.0;
        data[[0, 0]] = f32::NAN;

        let mask = star_mask(&data.view(), 97.5);
        assert!(mask.iter().all(|&v| v == 0.0 || v == 1.0));
        assert_eq!(mask, star_mask(&data.view(), 97.5));
        assert_eq!(mask[[2, 3]], 1.0);
        assert_eq!(mask[[0, 0]], 0.0);
    }

    #[test]
    fn all_nan_gives_empty_mask() {
        let data = Array2::<f32>::from_elem((4, 4), f32::NAN);
        let mask = star_mask(&data.view(), 97.5);
        assert!(mask.iter().all(|&v| v == 0.0));
    }
}
