use std::path::Path;

use crate::diff::{difference, DiffConfig};
use crate::error::Result;
use crate::frame::Frame;
use crate::io::fits::load_frame;
use crate::suppress::{suppress_stars, SuppressConfig};

/// Load one frame, optionally star-suppressed.
pub fn image_plain(path: &Path, star_suppress: bool, config: &SuppressConfig) -> Result<Frame> {
    let frame = load_frame(path)?;
    if star_suppress {
        Ok(suppress_stars(&frame, config))
    } else {
        Ok(frame)
    }
}

/// Load an adjacent pair of frames and produce their difference product:
/// either current minus previous on the current frame's grid, or the
/// all-NaN sentinel when the pair is not comparable.
pub fn image_diff(path_current: &Path, path_previous: &Path, config: &DiffConfig) -> Result<Frame> {
    let current = load_frame(path_current)?;
    let previous = load_frame(path_previous)?;
    difference(&current, &previous, config)
}
