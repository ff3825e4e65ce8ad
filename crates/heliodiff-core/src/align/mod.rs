pub mod correlation;
pub mod resample;
pub mod subpixel;

use ndarray::Array2;
use tracing::debug;

use crate::error::Result;
use crate::frame::{AlignmentShift, AngularShift, Frame};
use crate::starfield::star_mask;

pub use correlation::mask_cross_correlation;
pub use resample::{cubic_sample, shift_image};

/// Estimate the translation that registers `source` onto `dest`'s pixel
/// grid, as a shift in destination-grid pixels ready to apply to the
/// source.
///
/// Both frames are reduced to binary star masks (`thresh` percentile) and
/// cross-correlated with the destination fixed as the reference. The raw
/// peak is the source's displacement on its own grid; it is expressed in
/// angular units via the source pixel scale, converted to destination
/// pixels via the destination pixel scale, then negated so that applying
/// the result moves the source's star field onto the destination's.
pub fn estimate_shift(source: &Frame, dest: &Frame, thresh: f64) -> Result<AlignmentShift> {
    let source_mask = star_mask(&source.data.view(), thresh);
    let dest_mask = star_mask(&dest.data.view(), thresh);

    let raw = mask_cross_correlation(&source_mask, &dest_mask)?;

    let angular = AngularShift {
        dx: raw.dx * source.meta.pixel_scale.x,
        dy: raw.dy * source.meta.pixel_scale.y,
    };
    let shift = angular.to_pixels(&dest.meta.pixel_scale).negated();

    debug!(
        "alignment shift: raw ({:.3}, {:.3}) px -> apply ({:.3}, {:.3}) px",
        raw.dx, raw.dy, shift.dx, shift.dy
    );
    Ok(shift)
}

/// Register `source` onto `dest`'s pixel grid via a rigid sub-pixel
/// translation.
///
/// Cubic resampling cannot carry NaN sentinels, so invalid source pixels
/// are first repaired with the frame's finite median and tracked in a
/// companion mask; the mask is shifted alongside the image and every pixel
/// it still covers is re-invalidated afterwards. Pixels shifted in from
/// outside the source extent are NaN.
///
/// The result keeps the source frame's metadata: the destination's spatial
/// reference is authoritative for the registered data, and the source
/// header is deliberately not rewritten to claim it.
pub fn align_frame(source: &Frame, dest: &Frame, thresh: f64) -> Result<Frame> {
    let shift = estimate_shift(source, dest, thresh)?;
    Ok(apply_shift(source, &shift))
}

/// Apply a known shift to a frame, with NaN repair and reinstatement.
pub fn apply_shift(source: &Frame, shift: &AlignmentShift) -> Frame {
    let median = source.finite_median().unwrap_or(0.0);

    let repaired = source.data.mapv(|v| if v.is_finite() { v } else { median });
    let bad: Array2<f32> = source
        .data
        .mapv(|v| if v.is_finite() { 0.0 } else { 1.0 });

    let shifted = shift_image(&repaired, shift);
    let shifted_bad = shift_image(&bad, shift);

    let mut out = shifted;
    for ((row, col), flag) in shifted_bad.indexed_iter() {
        // The shifted mask rounds back to a boolean: anything past half
        // coverage invalidates the pixel again.
        if !flag.is_finite() || *flag > 0.5 {
            out[[row, col]] = f32::NAN;
        }
    }

    Frame::new(out, source.meta.clone())
}
