/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Default percentile used to classify star-candidate pixels, both in the
/// star-field mask and the curvature threshold of the suppressor.
pub const DEFAULT_STAR_PERCENTILE: f64 = 97.5;

/// Default side length (pixels) of the square blocks the suppressor fits
/// its background surfaces over.
pub const DEFAULT_BLOCK_RES: usize = 512;

/// Padding added to a block's fitting window on sides interior to the image.
pub const BLOCK_INTERIOR_MARGIN: usize = 10;

/// Inset applied to a block's fitting window at a true image boundary, so
/// fitting neighborhoods never reach outside the image.
pub const BLOCK_EDGE_INSET: usize = 5;

/// Nominal cadence of the near-field (HI1) detector, minutes.
pub const HI1_CADENCE_MIN: i64 = 40;

/// Nominal cadence of the far-field (HI2) detector, minutes.
pub const HI2_CADENCE_MIN: i64 = 120;

/// Allowed deviation from the nominal cadence when validating a frame pair.
pub const CADENCE_TOLERANCE_MIN: i64 = 5;

/// Nominal HI1 plate scale, arcsec per pixel (2x2 binned science product).
pub const HI1_PIXEL_SCALE_ARCSEC: f64 = 71.9;

/// Nominal HI2 plate scale, arcsec per pixel (2x2 binned science product).
pub const HI2_PIXEL_SCALE_ARCSEC: f64 = 130.0;

/// Side of the square median-filter window applied to difference images.
pub const MEDIAN_FILTER_SIZE: usize = 5;

/// Small epsilon guarding divisions in peak refinement.
pub const EPSILON: f64 = 1e-12;
