use tracing::{debug, warn};

use crate::align::align_frame;
use crate::consts::MEDIAN_FILTER_SIZE;
use crate::error::Result;
use crate::filters::median_filter;
use crate::frame::Frame;
use crate::suppress::{suppress_stars, SuppressConfig};

/// Differencing parameters.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct DiffConfig {
    /// Run star suppression on both frames before subtracting.
    pub star_suppress: bool,
    /// Register the previous frame onto the current frame's grid.
    pub align: bool,
    /// Apply the 5x5 median filter to the difference.
    pub smoothing: bool,
    /// Suppressor parameters, also supplying the star-mask percentile used
    /// by the alignment correlation.
    pub suppress: SuppressConfig,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            star_suppress: false,
            align: true,
            smoothing: true,
            suppress: SuppressConfig::default(),
        }
    }
}

/// Produce current minus previous, photometrically, when the two frames
/// are validly comparable.
///
/// Frames from different detectors, of different pixel dimensions, or
/// spaced away from the detector's nominal cadence by more than the
/// tolerance, are not comparable: the
/// result is then an all-NaN frame carrying the current frame's metadata,
/// with a diagnostic naming the failed check. That outcome is expected and
/// recoverable, never an error.
pub fn difference(current: &Frame, previous: &Frame, config: &DiffConfig) -> Result<Frame> {
    if current.meta.detector != previous.meta.detector {
        warn!(
            "detector mismatch: current {} vs previous {}, returning blank frame",
            current.meta.detector.as_str(),
            previous.meta.detector.as_str()
        );
        return Ok(Frame::blank_like(current));
    }

    let cadence = current.meta.detector.cadence();
    let separation = current.meta.timestamp - previous.meta.timestamp;
    let deviation = (separation - cadence).abs();
    if deviation > current.meta.detector.cadence_tolerance() {
        warn!(
            "cadence violation for {}: frames {} apart, expected {} +/- {}, returning blank frame",
            current.meta.detector.as_str(),
            format_minutes(separation),
            format_minutes(cadence),
            format_minutes(current.meta.detector.cadence_tolerance())
        );
        return Ok(Frame::blank_like(current));
    }

    if current.data.dim() != previous.data.dim() {
        warn!(
            "shape mismatch: current {}x{} vs previous {}x{}, returning blank frame",
            current.width(),
            current.height(),
            previous.width(),
            previous.height()
        );
        return Ok(Frame::blank_like(current));
    }

    let previous = if config.align {
        align_frame(previous, current, config.suppress.thresh)?
    } else {
        previous.clone()
    };

    let (current_data, previous_data) = if config.star_suppress {
        debug!("suppressing stars in both frames before differencing");
        let c = suppress_stars(current, &config.suppress);
        let p = suppress_stars(&previous, &config.suppress);
        (c.data, p.data)
    } else {
        (current.data.clone(), previous.data)
    };

    let mut diff = &current_data - &previous_data;

    if config.smoothing {
        diff = median_filter(&diff, MEDIAN_FILTER_SIZE);
    }

    Ok(Frame::new(diff, current.meta.clone()))
}

fn format_minutes(d: chrono::Duration) -> String {
    format!("{:.1} min", d.num_seconds() as f64 / 60.0)
}
