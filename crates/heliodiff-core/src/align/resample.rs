use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::frame::AlignmentShift;

/// Translate an image by a sub-pixel offset with bicubic (Catmull-Rom)
/// resampling. Positive `dx`/`dy` move content toward larger column/row
/// indices. Output pixels whose interpolation support reaches outside the
/// input extent are NaN, matching constant-NaN padding of the source data.
pub fn shift_image(data: &Array2<f32>, shift: &AlignmentShift) -> Array2<f32> {
    let (h, w) = data.dim();

    let sample_row = |row: usize| -> Vec<f32> {
        (0..w)
            .map(|col| {
                let src_y = row as f64 - shift.dy;
                let src_x = col as f64 - shift.dx;
                cubic_sample(data, src_y, src_x)
            })
            .collect()
    };

    let rows: Vec<Vec<f32>> = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        (0..h).into_par_iter().map(sample_row).collect()
    } else {
        (0..h).map(sample_row).collect()
    };

    let mut result = Array2::<f32>::zeros((h, w));
    for (row, row_data) in rows.into_iter().enumerate() {
        for (col, val) in row_data.into_iter().enumerate() {
            result[[row, col]] = val;
        }
    }
    result
}

/// Catmull-Rom bicubic sample at fractional coordinates. Returns NaN when
/// the 4x4 support is not fully inside the image.
pub fn cubic_sample(data: &Array2<f32>, y: f64, x: f64) -> f32 {
    let (h, w) = data.dim();

    let y0 = y.floor() as i64;
    let x0 = x.floor() as i64;

    if y0 - 1 < 0 || y0 + 2 >= h as i64 || x0 - 1 < 0 || x0 + 2 >= w as i64 {
        return f32::NAN;
    }

    let fy = (y - y0 as f64) as f32;
    let fx = (x - x0 as f64) as f32;

    let wy = catmull_rom_weights(fy);
    let wx = catmull_rom_weights(fx);

    let mut acc = 0.0f32;
    for (i, &wyi) in wy.iter().enumerate() {
        let row = (y0 - 1 + i as i64) as usize;
        let mut row_acc = 0.0f32;
        for (j, &wxj) in wx.iter().enumerate() {
            let col = (x0 - 1 + j as i64) as usize;
            row_acc += data[[row, col]] * wxj;
        }
        acc += row_acc * wyi;
    }
    acc
}

/// Catmull-Rom kernel weights for the four taps around a fractional
/// position t in [0, 1).
fn catmull_rom_weights(t: f32) -> [f32; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        0.5 * (-t3 + 2.0 * t2 - t),
        0.5 * (3.0 * t3 - 5.0 * t2 + 2.0),
        0.5 * (-3.0 * t3 + 4.0 * t2 + t),
        0.5 * (t3 - t2),
    ]
}
