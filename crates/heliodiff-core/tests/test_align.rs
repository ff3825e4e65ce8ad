mod common;

use common::square_frame;
use heliodiff_core::align::{align_frame, apply_shift, estimate_shift};
use heliodiff_core::frame::{AlignmentShift, Detector};

const THRESH: f64 = 97.5;

#[test]
fn self_alignment_estimates_zero_shift() {
    let frame = square_frame(64, 64, 20, 20, 12, Detector::Hi1, "2008-01-01T12:00:00");
    let shift = estimate_shift(&frame, &frame, THRESH).unwrap();
    assert!(shift.dx.abs() < 0.05, "dx={}", shift.dx);
    assert!(shift.dy.abs() < 0.05, "dy={}", shift.dy);
}

#[test]
fn self_alignment_preserves_interior_pixels() {
    let frame = square_frame(64, 64, 20, 20, 12, Detector::Hi1, "2008-01-01T12:00:00");
    let aligned = align_frame(&frame, &frame, THRESH).unwrap();

    for r in 4..60 {
        for c in 4..60 {
            let got = aligned.data[[r, c]];
            let want = frame.data[[r, c]];
            assert!(
                (got - want).abs() < 0.05,
                "pixel ({}, {}): {} vs {}",
                r,
                c,
                got,
                want
            );
        }
    }
}

#[test]
fn known_shift_is_recovered_and_undone() {
    let dest = square_frame(64, 64, 20, 20, 12, Detector::Hi1, "2008-01-01T12:40:00");
    // Source star field sits 3 rows down, 5 columns right of the destination's.
    let source = square_frame(64, 64, 23, 25, 12, Detector::Hi1, "2008-01-01T12:00:00");

    let shift = estimate_shift(&source, &dest, THRESH).unwrap();
    assert!((shift.dy + 3.0).abs() < 0.25, "dy={}", shift.dy);
    assert!((shift.dx + 5.0).abs() < 0.25, "dx={}", shift.dx);

    let aligned = align_frame(&source, &dest, THRESH).unwrap();
    // After registration the source square lands on the destination's.
    assert!((aligned.data[[25, 25]] - 1.0).abs() < 0.15);
    assert!((aligned.data[[21, 21]] - 1.0).abs() < 0.15);
    assert!(aligned.data[[40, 40]].abs() < 0.15);
}

#[test]
fn aligned_frame_keeps_source_metadata() {
    let dest = square_frame(64, 64, 20, 20, 12, Detector::Hi1, "2008-01-01T12:40:00");
    let source = square_frame(64, 64, 23, 25, 12, Detector::Hi1, "2008-01-01T12:00:00");
    let aligned = align_frame(&source, &dest, THRESH).unwrap();
    // The spatial reference of the result is the destination's, but the
    // source header is deliberately left as it was.
    assert_eq!(aligned.meta.timestamp, source.meta.timestamp);
}

#[test]
fn invalid_pixels_are_repaired_then_reinstated() {
    let mut source = square_frame(64, 64, 20, 20, 12, Detector::Hi1, "2008-01-01T12:00:00");
    source.data[[40, 40]] = f32::NAN;
    source.data[[41, 40]] = f32::NAN;

    let shifted = apply_shift(&source, &AlignmentShift { dx: 2.0, dy: 0.0 });

    // Bad pixels travel with the shift.
    assert!(shifted.data[[40, 42]].is_nan());
    assert!(shifted.data[[41, 42]].is_nan());
    // The square is intact away from the repair.
    assert!((shifted.data[[25, 27]] - 1.0).abs() < 0.05);
    // Pixels shifted in from outside the extent are invalid.
    assert!(shifted.data[[25, 0]].is_nan());
}
