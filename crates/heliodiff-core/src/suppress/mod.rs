pub mod blocks;
pub mod surface;

use ndarray::{Array2, ArrayView2};
use tracing::{debug, warn};

use crate::consts::{DEFAULT_BLOCK_RES, DEFAULT_STAR_PERCENTILE};
use crate::frame::Frame;
use crate::stats::finite_percentile;

use blocks::BlockGrid;
use surface::BicubicSurface;

/// Star-suppression parameters.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct SuppressConfig {
    /// Percentile of the curvature distribution above which a pixel is a
    /// star candidate. Domain [0, 100].
    pub thresh: f64,
    /// Side length of the square fitting blocks, pixels.
    pub res: usize,
}

impl Default for SuppressConfig {
    fn default() -> Self {
        Self {
            thresh: DEFAULT_STAR_PERCENTILE,
            res: DEFAULT_BLOCK_RES,
        }
    }
}

impl SuppressConfig {
    /// Normalize the parameters for an image of the given shape. Out-of-
    /// domain values are substituted with a warning, never rejected:
    /// downstream batch processing depends on this staying non-fatal.
    pub fn normalized_for(&self, height: usize, width: usize) -> Self {
        let thresh = if (0.0..=100.0).contains(&self.thresh) {
            self.thresh
        } else {
            warn!(
                "thresh {} outside [0, 100], substituting {}",
                self.thresh, DEFAULT_STAR_PERCENTILE
            );
            DEFAULT_STAR_PERCENTILE
        };

        let max_res = height.min(width);
        let res = if self.res == 0 || self.res > max_res {
            let clamped = DEFAULT_BLOCK_RES.min(max_res).max(1);
            warn!(
                "res {} invalid for {}x{} image, substituting {}",
                self.res, width, height, clamped
            );
            clamped
        } else {
            self.res
        };

        Self { thresh, res }
    }
}

/// Remove bright point-like stellar contamination from a frame.
///
/// Pixels whose absolute Laplacian exceeds the `thresh` percentile of the
/// curvature distribution are replaced with a bicubic background surface
/// fitted per block over the remaining pixels; background pixels pass
/// through untouched. A frame with no above-threshold pixel is returned
/// unchanged.
pub fn suppress_stars(frame: &Frame, config: &SuppressConfig) -> Frame {
    let data = suppress_stars_array(&frame.data.view(), config);
    Frame::new(data, frame.meta.clone())
}

pub fn suppress_stars_array(data: &ArrayView2<f32>, config: &SuppressConfig) -> Array2<f32> {
    let (height, width) = data.dim();
    let config = config.normalized_for(height, width);
    let curvature = abs_laplacian(data);

    let cutoff = match finite_percentile(&curvature.view(), config.thresh) {
        Some(c) => c,
        None => {
            debug!("no finite curvature values, frame left unchanged");
            return data.to_owned();
        }
    };

    let star = curvature.mapv(|c| c.is_finite() && c > cutoff);
    let n_stars = star.iter().filter(|&&s| s).count();
    if n_stars == 0 {
        debug!("no pixel exceeds curvature threshold {}, frame left unchanged", cutoff);
        return data.to_owned();
    }
    debug!("classified {} star pixels at curvature > {}", n_stars, cutoff);

    let grid = BlockGrid::new(height, width, config.res);
    let mut out = data.to_owned();

    for block in grid.iter() {
        // Background samples over the padded window: finite and not star.
        let mut samples = Vec::new();
        for row in block.fit_rows.start..block.fit_rows.end {
            for col in block.fit_cols.start..block.fit_cols.end {
                let v = data[[row, col]];
                if v.is_finite() && !star[[row, col]] {
                    samples.push((row, col, v));
                }
            }
        }

        let surface = match BicubicSurface::fit(&block, &samples) {
            Some(s) => s,
            None => {
                // Pathological block with no usable background. Skip the
                // replacement and leave its star pixels as they are.
                warn!(
                    "block rows {}..{} cols {}..{} has {} background pixels, skipping surface fit",
                    block.replace_rows.start,
                    block.replace_rows.end,
                    block.replace_cols.start,
                    block.replace_cols.end,
                    samples.len()
                );
                continue;
            }
        };

        for row in block.replace_rows.start..block.replace_rows.end {
            for col in block.replace_cols.start..block.replace_cols.end {
                if star[[row, col]] {
                    out[[row, col]] = surface.eval(row, col);
                }
            }
        }
    }

    out
}

/// Absolute discrete Laplacian (3x3 kernel 0 1 0 / 1 -4 1 / 0 1 0). The
/// one-pixel border has no full neighborhood; it is left at zero and is
/// therefore never classified as star. Any non-finite tap makes the
/// result non-finite, so pixels bordering invalid data are excluded from
/// classification.
pub fn abs_laplacian(data: &ArrayView2<f32>) -> Array2<f32> {
    let (h, w) = data.dim();
    let mut result = Array2::<f32>::zeros((h, w));
    if h < 3 || w < 3 {
        return result;
    }

    for row in 1..h - 1 {
        for col in 1..w - 1 {
            let lap = -4.0 * data[[row, col]]
                + data[[row - 1, col]]
                + data[[row + 1, col]]
                + data[[row, col - 1]]
                + data[[row, col + 1]];
            result[[row, col]] = lap.abs();
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn laplacian_flags_point_sources() {
        let mut data = Array2::<f32>::zeros((9, 9));
        data[[4, 4]] = 10.0;
        let lap = abs_laplacian(&data.view());
        assert!((lap[[4, 4]] - 40.0).abs() < 1e-6);
        assert!((lap[[4, 5]] - 10.0).abs() < 1e-6);
        assert_eq!(lap[[0, 0]], 0.0);
    }

    #[test]
    fn laplacian_propagates_nan() {
        let mut data = Array2::<f32>::zeros((5, 5));
        data[[2, 2]] = f32::NAN;
        let lap = abs_laplacian(&data.view());
        assert!(lap[[2, 2]].is_nan());
        assert!(lap[[2, 3]].is_nan());
        assert!(!lap[[0, 4]].is_nan());
    }

    #[test]
    fn border_pixels_are_never_classified() {
        let mut data = Array2::<f32>::from_elem((32, 32), 2.0);
        data[[0, 16]] = 50.0;
        let config = SuppressConfig {
            thresh: 97.5,
            res: 32,
        };
        let out = suppress_stars_array(&data.view(), &config);
        // Zero border curvature keeps the edge spike out of the star set.
        assert_eq!(out[[0, 16]], 50.0);
    }

    #[test]
    fn oversized_res_is_normalized_not_asserted() {
        let mut data = Array2::<f32>::from_elem((16, 16), 1.0);
        data[[8, 8]] = 30.0;
        let config = SuppressConfig {
            thresh: 97.5,
            res: 4096,
        };
        let out = suppress_stars_array(&data.view(), &config);
        assert!((out[[8, 8]] - 1.0).abs() < 1e-2);
    }

    #[test]
    fn config_normalization_substitutes() {
        let bad = SuppressConfig {
            thresh: 250.0,
            res: 4096,
        };
        let fixed = bad.normalized_for(256, 256);
        assert_eq!(fixed.thresh, DEFAULT_STAR_PERCENTILE);
        assert_eq!(fixed.res, 256);
    }
}
