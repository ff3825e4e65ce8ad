use ndarray::Array2;
use num_complex::Complex;
use rustfft::FftPlanner;

use crate::error::{HelioError, Result};

use super::subpixel::refine_peak_paraboloid;

/// Raw correlation-peak displacement, in pixels on the shared mask grid.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawShift {
    pub dx: f64,
    pub dy: f64,
}

/// Cross-correlate two binary star masks and return the displacement of
/// `source` relative to `dest`: positive components mean the source's
/// star field sits at larger row/column indices than the destination's.
///
/// Circular FFT correlation; the peak position is unwrapped into a signed
/// offset and refined to sub-pixel precision with a paraboloid fit.
pub fn mask_cross_correlation(
    source: &Array2<f32>,
    dest: &Array2<f32>,
) -> Result<RawShift> {
    let (h, w) = dest.dim();
    let (sh, sw) = source.dim();
    if h != sh || w != sw {
        return Err(HelioError::Pipeline(format!(
            "mask size mismatch: {}x{} vs {}x{}",
            sw, sh, w, h
        )));
    }

    let src_fft = fft2d(source);
    let dest_fft = fft2d(dest);

    // Cross spectrum: source against conjugated destination, so the
    // correlation surface peaks at the source's displacement.
    let mut cross = Array2::<Complex<f64>>::zeros((h, w));
    for row in 0..h {
        for col in 0..w {
            cross[[row, col]] = src_fft[[row, col]] * dest_fft[[row, col]].conj();
        }
    }

    let correlation = ifft2d(&cross);
    let (peak_row, peak_col, _peak_val) = find_peak(&correlation);

    // Unwrap the circular peak position into a signed offset.
    let dy = if peak_row > h / 2 {
        peak_row as f64 - h as f64
    } else {
        peak_row as f64
    };
    let dx = if peak_col > w / 2 {
        peak_col as f64 - w as f64
    } else {
        peak_col as f64
    };

    let (sub_dy, sub_dx) = refine_peak_paraboloid(&correlation, peak_row, peak_col);

    Ok(RawShift {
        dx: dx + sub_dx,
        dy: dy + sub_dy,
    })
}

/// 2D FFT: row-wise FFT, then column-wise FFT.
fn fft2d(data: &Array2<f32>) -> Array2<Complex<f64>> {
    let (h, w) = data.dim();
    let mut planner = FftPlanner::new();
    let fft_row = planner.plan_fft_forward(w);
    let fft_col = planner.plan_fft_forward(h);

    let mut result = Array2::<Complex<f64>>::zeros((h, w));
    for row in 0..h {
        for col in 0..w {
            result[[row, col]] = Complex::new(data[[row, col]] as f64, 0.0);
        }
    }

    for row in 0..h {
        let mut row_data: Vec<Complex<f64>> = (0..w).map(|c| result[[row, c]]).collect();
        fft_row.process(&mut row_data);
        for col in 0..w {
            result[[row, col]] = row_data[col];
        }
    }

    for col in 0..w {
        let mut col_data: Vec<Complex<f64>> = (0..h).map(|r| result[[r, col]]).collect();
        fft_col.process(&mut col_data);
        for row in 0..h {
            result[[row, col]] = col_data[row];
        }
    }

    result
}

/// Inverse 2D FFT, real part, normalized.
fn ifft2d(data: &Array2<Complex<f64>>) -> Array2<f64> {
    let (h, w) = data.dim();
    let mut planner = FftPlanner::new();
    let ifft_row = planner.plan_fft_inverse(w);
    let ifft_col = planner.plan_fft_inverse(h);

    let mut work = data.clone();

    for col in 0..w {
        let mut col_data: Vec<Complex<f64>> = (0..h).map(|r| work[[r, col]]).collect();
        ifft_col.process(&mut col_data);
        for row in 0..h {
            work[[row, col]] = col_data[row];
        }
    }

    for row in 0..h {
        let mut row_data: Vec<Complex<f64>> = (0..w).map(|c| work[[row, c]]).collect();
        ifft_row.process(&mut row_data);
        for col in 0..w {
            work[[row, col]] = row_data[col];
        }
    }

    let scale = 1.0 / (h * w) as f64;
    let mut result = Array2::<f64>::zeros((h, w));
    for row in 0..h {
        for col in 0..w {
            result[[row, col]] = work[[row, col]].re * scale;
        }
    }

    result
}

fn find_peak(data: &Array2<f64>) -> (usize, usize, f64) {
    let (h, w) = data.dim();
    let mut best_row = 0;
    let mut best_col = 0;
    let mut best_val = f64::NEG_INFINITY;

    for row in 0..h {
        for col in 0..w {
            if data[[row, col]] > best_val {
                best_val = data[[row, col]];
                best_row = row;
                best_col = col;
            }
        }
    }

    (best_row, best_col, best_val)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_mask(h: usize, w: usize, r0: usize, c0: usize, side: usize) -> Array2<f32> {
        let mut mask = Array2::<f32>::zeros((h, w));
        for r in r0..r0 + side {
            for c in c0..c0 + side {
                mask[[r, c]] = 1.0;
            }
        }
        mask
    }

    #[test]
    fn identical_masks_correlate_at_zero() {
        let mask = square_mask(32, 32, 10, 12, 6);
        let shift = mask_cross_correlation(&mask, &mask).unwrap();
        assert!(shift.dx.abs() < 0.5, "dx={}", shift.dx);
        assert!(shift.dy.abs() < 0.5, "dy={}", shift.dy);
    }

    #[test]
    fn displaced_mask_yields_signed_offset() {
        let dest = square_mask(64, 64, 20, 20, 8);
        // Source features 3 rows down, 5 columns right of the destination's.
        let source = square_mask(64, 64, 23, 25, 8);
        let shift = mask_cross_correlation(&source, &dest).unwrap();
        assert!((shift.dy - 3.0).abs() < 0.75, "dy={}", shift.dy);
        assert!((shift.dx - 5.0).abs() < 0.75, "dx={}", shift.dx);
    }

    #[test]
    fn size_mismatch_is_an_error() {
        let a = Array2::<f32>::zeros((16, 16));
        let b = Array2::<f32>::zeros((16, 17));
        assert!(mask_cross_correlation(&a, &b).is_err());
    }
}
