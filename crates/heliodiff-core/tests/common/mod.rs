// Not every test binary uses every helper.
#![allow(dead_code)]

use chrono::NaiveDateTime;
use ndarray::Array2;

use heliodiff_core::frame::{Detector, Frame, FrameMeta};

/// Parse a `yyyy-mm-ddThh:mm:ss` timestamp for test fixtures.
pub fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
}

/// Build a frame around raw pixel data with the detector's nominal scale.
pub fn frame_with(data: Array2<f32>, detector: Detector, stamp: &str) -> Frame {
    Frame::new(
        data,
        FrameMeta {
            timestamp: ts(stamp),
            detector,
            pixel_scale: detector.nominal_pixel_scale(),
            source: None,
        },
    )
}

/// Constant-valued frame.
pub fn constant_frame(h: usize, w: usize, value: f32, detector: Detector, stamp: &str) -> Frame {
    frame_with(Array2::from_elem((h, w), value), detector, stamp)
}

/// Zero background with a bright square, the standard alignment fixture.
/// The square is sized to clear the 97.5th-percentile mask cutoff on a
/// 64x64 frame.
pub fn square_frame(
    h: usize,
    w: usize,
    r0: usize,
    c0: usize,
    side: usize,
    detector: Detector,
    stamp: &str,
) -> Frame {
    let mut data = Array2::<f32>::zeros((h, w));
    for r in r0..r0 + side {
        for c in c0..c0 + side {
            data[[r, c]] = 1.0;
        }
    }
    frame_with(data, detector, stamp)
}
