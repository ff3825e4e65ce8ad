mod common;

use ndarray::Array2;
use tempfile::tempdir;

use common::{frame_with, ts};
use heliodiff_core::error::HelioError;
use heliodiff_core::frame::Detector;
use heliodiff_core::io::fits::{filename_timestamp, load_frame, load_header, write_frame};

#[test]
fn round_trip_preserves_data_and_metadata() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("20080101_124001_24h1A.fts");

    let mut data = Array2::<f32>::zeros((16, 24));
    data[[3, 5]] = 1.5;
    data[[10, 20]] = -0.25;
    data[[7, 7]] = f32::NAN;
    let frame = frame_with(data, Detector::Hi1, "2008-01-01T12:40:01");

    write_frame(&path, &frame).unwrap();
    let loaded = load_frame(&path).unwrap();

    assert_eq!(loaded.height(), 16);
    assert_eq!(loaded.width(), 24);
    assert_eq!(loaded.meta.detector, Detector::Hi1);
    assert_eq!(loaded.meta.timestamp, ts("2008-01-01T12:40:01"));
    assert!((loaded.meta.pixel_scale.x - frame.meta.pixel_scale.x).abs() < 1e-3);

    for ((r, c), &v) in frame.data.indexed_iter() {
        let got = loaded.data[[r, c]];
        if v.is_nan() {
            assert!(got.is_nan(), "({}, {}) lost its NaN sentinel", r, c);
        } else {
            assert_eq!(got, v, "({}, {}) changed in round trip", r, c);
        }
    }
}

#[test]
fn missing_file_fails_fast() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("20080101_120001_24h1A.fts");
    match load_frame(&path) {
        Err(HelioError::MissingFile(p)) => assert_eq!(p, path),
        other => panic!("expected MissingFile, got {:?}", other.map(|f| f.meta)),
    }
}

#[test]
fn header_by_itself_is_readable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("20080101_124001_24h1A.fts");
    let frame = frame_with(
        Array2::<f32>::zeros((8, 8)),
        Detector::Hi2,
        "2008-01-01T12:40:01",
    );
    write_frame(&path, &frame).unwrap();

    let header = load_header(&path).unwrap();
    assert_eq!(header.bitpix, -32);
    assert_eq!((header.width, header.height), (8, 8));
    assert_eq!(header.detector.as_deref(), Some("HI2"));
}

#[test]
fn non_ascii_header_card_is_skipped_not_fatal() {
    // A COMMENT card carrying UTF-8 text whose first multi-byte character
    // straddles the 8-byte keyword field boundary. Calibration pipelines
    // do write free-text cards like this; the reader must pass over them.
    let dir = tempdir().unwrap();
    let path = dir.path().join("20080101_124001_24h1A.fts");
    let frame = frame_with(
        Array2::<f32>::zeros((8, 8)),
        Detector::Hi1,
        "2008-01-01T12:40:01",
    );
    write_frame(&path, &frame).unwrap();

    let mut bytes = std::fs::read(&path).unwrap();
    // Overwrite the CDELT2 card (card index 8) in place; "COMMENT" plus a
    // two-byte e-acute occupies bytes 0..9 of the card.
    let card = format!("{:<80}", "COMMENT\u{e9} processed at site");
    assert_eq!(card.len(), 81);
    bytes[8 * 80..8 * 80 + 80].copy_from_slice(&card.as_bytes()[..80]);
    std::fs::write(&path, &bytes).unwrap();

    let header = load_header(&path).unwrap();
    assert_eq!((header.width, header.height), (8, 8));
    assert!(header.cdelt2.is_none());
}

#[test]
fn filename_stamp_parses_fixed_width_prefix() {
    let stamp = filename_timestamp(std::path::Path::new("20111022_172901_14h1B.fts")).unwrap();
    assert_eq!(stamp, ts("2011-10-22T17:29:01"));

    assert!(filename_timestamp(std::path::Path::new("short.fts")).is_none());
    assert!(filename_timestamp(std::path::Path::new("notadate_badtime_x.fts")).is_none());
}
