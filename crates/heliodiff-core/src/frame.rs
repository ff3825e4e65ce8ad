use std::path::PathBuf;

use chrono::{Duration, NaiveDateTime};
use ndarray::Array2;
use tracing::warn;

use crate::consts::{
    CADENCE_TOLERANCE_MIN, HI1_CADENCE_MIN, HI1_PIXEL_SCALE_ARCSEC, HI2_CADENCE_MIN,
    HI2_PIXEL_SCALE_ARCSEC,
};
use crate::stats;

/// A single calibrated heliospheric-imager frame.
/// Pixel values are f32; NaN marks missing or invalid pixels and is
/// excluded from every statistic computed over the frame.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
    /// Capture metadata
    pub meta: FrameMeta,
}

impl Frame {
    pub fn new(data: Array2<f32>, meta: FrameMeta) -> Self {
        Self { data, meta }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// All-NaN frame of the same shape, carrying the given metadata.
    /// This is the sentinel outcome for incomparable frame pairs.
    pub fn blank_like(other: &Frame) -> Self {
        Self {
            data: Array2::from_elem(other.data.dim(), f32::NAN),
            meta: other.meta.clone(),
        }
    }

    /// Median of the finite pixels, if any exist.
    pub fn finite_median(&self) -> Option<f32> {
        stats::finite_median(&self.data.view())
    }
}

/// Capture metadata for one frame.
#[derive(Clone, Debug)]
pub struct FrameMeta {
    /// Capture timestamp (UTC, naive)
    pub timestamp: NaiveDateTime,
    /// Detector that produced the frame
    pub detector: Detector,
    /// Angular size of one pixel
    pub pixel_scale: PixelScale,
    /// File the frame was loaded from, when applicable
    pub source: Option<PathBuf>,
}

/// The closed set of HI detectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Detector {
    /// Near-field imager
    Hi1,
    /// Far-field imager
    Hi2,
}

impl Detector {
    /// Nominal time spacing between consecutive frames.
    pub fn cadence(&self) -> Duration {
        match self {
            Detector::Hi1 => Duration::minutes(HI1_CADENCE_MIN),
            Detector::Hi2 => Duration::minutes(HI2_CADENCE_MIN),
        }
    }

    /// Allowed deviation from the nominal cadence.
    pub fn cadence_tolerance(&self) -> Duration {
        Duration::minutes(CADENCE_TOLERANCE_MIN)
    }

    /// Nominal plate scale for the detector's standard science binning.
    pub fn nominal_pixel_scale(&self) -> PixelScale {
        match self {
            Detector::Hi1 => PixelScale::square(HI1_PIXEL_SCALE_ARCSEC),
            Detector::Hi2 => PixelScale::square(HI2_PIXEL_SCALE_ARCSEC),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Detector::Hi1 => "HI1",
            Detector::Hi2 => "HI2",
        }
    }

    /// Parse a detector name, warning and substituting HI1 on anything
    /// unrecognized. Invalid selector input is never fatal.
    pub fn parse_lossy(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "HI1" | "HI-1" | "HI_1" => Detector::Hi1,
            "HI2" | "HI-2" | "HI_2" => Detector::Hi2,
            other => {
                warn!("unrecognized detector {:?}, defaulting to HI1", other);
                Detector::Hi1
            }
        }
    }
}

/// Angular pixel size, arcsec per pixel, per axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelScale {
    pub x: f64,
    pub y: f64,
}

impl PixelScale {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn square(s: f64) -> Self {
        Self { x: s, y: s }
    }
}

/// Sub-pixel translation expressed in angular units (arcsec).
#[derive(Clone, Copy, Debug, Default)]
pub struct AngularShift {
    pub dx: f64,
    pub dy: f64,
}

impl AngularShift {
    /// Convert to pixel units on the grid described by `scale`.
    pub fn to_pixels(&self, scale: &PixelScale) -> AlignmentShift {
        AlignmentShift {
            dx: self.dx / scale.x,
            dy: self.dy / scale.y,
        }
    }
}

/// Sub-pixel translation in pixels on a destination frame's grid.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlignmentShift {
    pub dx: f64,
    pub dy: f64,
}

impl AlignmentShift {
    pub fn negated(&self) -> Self {
        Self {
            dx: -self.dx,
            dy: -self.dy,
        }
    }
}
