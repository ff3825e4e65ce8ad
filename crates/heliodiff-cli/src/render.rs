use std::path::Path;

use anyhow::{Context, Result};
use image::GrayImage;
use ndarray::Array2;

/// Normalization window for plain frame renderings.
pub const PLAIN_WINDOW: (f32, f32) = (0.0, 0.5);

/// Normalization window for difference frame renderings.
pub const DIFF_WINDOW: (f32, f32) = (-0.05, 0.05);

/// Render pixel data to an 8-bit grayscale image.
///
/// Values are linearly mapped from [vmin, vmax] and clamped; NaN renders
/// black. Rows are flipped so the image follows the origin-lower display
/// convention of the review assets.
pub fn render_grayscale(data: &Array2<f32>, window: (f32, f32)) -> GrayImage {
    let (h, w) = data.dim();
    let (vmin, vmax) = window;
    let span = vmax - vmin;

    let mut img = GrayImage::new(w as u32, h as u32);
    for ((row, col), &v) in data.indexed_iter() {
        let level = if v.is_finite() {
            (((v - vmin) / span).clamp(0.0, 1.0) * 255.0).round() as u8
        } else {
            0
        };
        img.put_pixel(col as u32, (h - 1 - row) as u32, image::Luma([level]));
    }
    img
}

/// Render and save in one step; format follows the output extension.
pub fn save_rendering(data: &Array2<f32>, window: (f32, f32), path: &Path) -> Result<()> {
    render_grayscale(data, window)
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}
