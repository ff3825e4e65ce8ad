use ndarray::Array2;

use crate::consts::EPSILON;

/// Refine peak location using paraboloid fitting on the 3x3 neighborhood.
///
/// Returns (delta_row, delta_col) as fractional pixel offsets from the
/// integer peak, each clamped to +/- 0.5 pixel. A peak on the array edge is
/// left unrefined; for circular correlation surfaces the peak wraps rather
/// than sits on an edge, so this only triggers on degenerate input.
pub fn refine_peak_paraboloid(
    correlation: &Array2<f64>,
    peak_row: usize,
    peak_col: usize,
) -> (f64, f64) {
    let (h, w) = correlation.dim();

    if peak_row == 0 || peak_row >= h - 1 || peak_col == 0 || peak_col >= w - 1 {
        return (0.0, 0.0);
    }

    let y_prev = correlation[[peak_row - 1, peak_col]];
    let y_curr = correlation[[peak_row, peak_col]];
    let y_next = correlation[[peak_row + 1, peak_col]];

    let delta_row = if (y_prev - 2.0 * y_curr + y_next).abs() > EPSILON {
        (y_prev - y_next) / (2.0 * (y_prev - 2.0 * y_curr + y_next))
    } else {
        0.0
    };

    let x_prev = correlation[[peak_row, peak_col - 1]];
    let x_curr = correlation[[peak_row, peak_col]];
    let x_next = correlation[[peak_row, peak_col + 1]];

    let delta_col = if (x_prev - 2.0 * x_curr + x_next).abs() > EPSILON {
        (x_prev - x_next) / (2.0 * (x_prev - 2.0 * x_curr + x_next))
    } else {
        0.0
    };

    (delta_row.clamp(-0.5, 0.5), delta_col.clamp(-0.5, 0.5))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_peak_needs_no_refinement() {
        let mut surface = Array2::<f64>::zeros((5, 5));
        surface[[2, 2]] = 1.0;
        surface[[1, 2]] = 0.5;
        surface[[3, 2]] = 0.5;
        surface[[2, 1]] = 0.5;
        surface[[2, 3]] = 0.5;
        let (dr, dc) = refine_peak_paraboloid(&surface, 2, 2);
        assert!(dr.abs() < 1e-9);
        assert!(dc.abs() < 1e-9);
    }

    #[test]
    fn skewed_peak_shifts_toward_heavier_neighbor() {
        let mut surface = Array2::<f64>::zeros((5, 5));
        surface[[2, 2]] = 1.0;
        surface[[2, 3]] = 0.8;
        surface[[2, 1]] = 0.2;
        let (_, dc) = refine_peak_paraboloid(&surface, 2, 2);
        assert!(dc > 0.0 && dc <= 0.5);
    }

    #[test]
    fn edge_peak_is_unrefined() {
        let surface = Array2::<f64>::zeros((4, 4));
        assert_eq!(refine_peak_paraboloid(&surface, 0, 0), (0.0, 0.0));
    }
}
