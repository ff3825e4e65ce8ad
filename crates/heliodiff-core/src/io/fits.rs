use std::fs::File;
use std::io::Write;
use std::path::Path;

use byteorder::{BigEndian, ByteOrder};
use chrono::NaiveDateTime;
use memmap2::Mmap;
use ndarray::Array2;
use tracing::debug;

use crate::error::{HelioError, Result};
use crate::frame::{Detector, Frame, FrameMeta, PixelScale};

/// FITS blocks are fixed at 2880 bytes: 36 cards of 80 ASCII characters.
const BLOCK_SIZE: usize = 2880;
const CARD_SIZE: usize = 80;

/// Parsed subset of a FITS primary header: the keywords the calibrated HI
/// products carry that this pipeline consumes.
#[derive(Clone, Debug)]
pub struct FitsHeader {
    pub bitpix: i32,
    pub width: usize,
    pub height: usize,
    pub bscale: f64,
    pub bzero: f64,
    pub date_obs: Option<NaiveDateTime>,
    pub detector: Option<String>,
    pub cdelt1: Option<f64>,
    pub cdelt2: Option<f64>,
    /// All keyword/value pairs in header order, for display.
    pub cards: Vec<(String, String)>,
    /// Byte length of the header including padding.
    header_len: usize,
}

/// Load a calibrated frame from a FITS file.
///
/// A missing path is a hard error up front rather than a deferred open
/// failure. Metadata falls back gracefully: a missing DATE-OBS is read
/// from the filename's leading `yyyymmdd_hhmmss` stamp, a missing CDELT
/// pair from the detector's nominal plate scale.
pub fn load_frame(path: &Path) -> Result<Frame> {
    if !path.exists() {
        return Err(HelioError::MissingFile(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };

    let header = parse_header(&mmap)?;
    let data = decode_data(&mmap, &header)?;

    let timestamp = header
        .date_obs
        .or_else(|| filename_timestamp(path))
        .ok_or_else(|| {
            HelioError::InvalidFits(format!(
                "{}: no DATE-OBS and no filename timestamp",
                path.display()
            ))
        })?;

    let detector = match &header.detector {
        Some(name) => Detector::parse_lossy(name),
        None => {
            debug!("{}: no DETECTOR keyword, assuming HI1", path.display());
            Detector::Hi1
        }
    };

    let pixel_scale = match (header.cdelt1, header.cdelt2) {
        (Some(x), Some(y)) => PixelScale::new(x.abs(), y.abs()),
        _ => detector.nominal_pixel_scale(),
    };

    Ok(Frame::new(
        data,
        FrameMeta {
            timestamp,
            detector,
            pixel_scale,
            source: Some(path.to_path_buf()),
        },
    ))
}

/// Read only the header of a FITS file.
pub fn load_header(path: &Path) -> Result<FitsHeader> {
    if !path.exists() {
        return Err(HelioError::MissingFile(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    parse_header(&mmap)
}

/// Timestamp embedded in the first 15 characters of an HI filename,
/// `yyyymmdd_hhmmss`.
pub fn filename_timestamp(path: &Path) -> Option<NaiveDateTime> {
    let name = path.file_name()?.to_str()?;
    if name.len() < 15 {
        return None;
    }
    NaiveDateTime::parse_from_str(&name[..15], "%Y%m%d_%H%M%S").ok()
}

fn parse_header(bytes: &[u8]) -> Result<FitsHeader> {
    if bytes.len() < BLOCK_SIZE {
        return Err(HelioError::InvalidFits("file shorter than one header block".into()));
    }

    let mut cards = Vec::new();
    let mut header_len = None;

    'blocks: for block_start in (0..bytes.len()).step_by(BLOCK_SIZE) {
        let block_end = block_start + BLOCK_SIZE;
        if block_end > bytes.len() {
            break;
        }
        for card_start in (block_start..block_end).step_by(CARD_SIZE) {
            let card = &bytes[card_start..card_start + CARD_SIZE];
            // The keyword field is the first 8 bytes; the standard keeps
            // it ASCII, so anything else is not a card we read.
            let Ok(keyword_field) = std::str::from_utf8(&card[..8]) else {
                continue;
            };
            let keyword = keyword_field.trim().to_string();
            if keyword == "END" {
                header_len = Some(block_end);
                break 'blocks;
            }
            if keyword.is_empty() || keyword == "COMMENT" || keyword == "HISTORY" {
                continue;
            }
            let value_field = String::from_utf8_lossy(&card[8..]);
            if let Some(rest) = value_field.trim_start().strip_prefix('=') {
                let raw = rest.split('/').next().unwrap_or("").trim();
                cards.push((keyword, unquote(raw)));
            }
        }
    }

    let header_len =
        header_len.ok_or_else(|| HelioError::InvalidFits("no END card found".into()))?;

    let get = |key: &str| cards.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str());

    let simple = get("SIMPLE").unwrap_or("F");
    if simple != "T" {
        return Err(HelioError::InvalidFits("SIMPLE is not T".into()));
    }

    let bitpix: i32 = get("BITPIX")
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| HelioError::InvalidFits("missing or invalid BITPIX".into()))?;
    let naxis: usize = get("NAXIS").and_then(|v| v.parse().ok()).unwrap_or(0);
    if naxis != 2 {
        return Err(HelioError::InvalidFits(format!("NAXIS {} unsupported, need 2", naxis)));
    }
    let width: usize = get("NAXIS1")
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| HelioError::InvalidFits("missing NAXIS1".into()))?;
    let height: usize = get("NAXIS2")
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| HelioError::InvalidFits("missing NAXIS2".into()))?;
    if width == 0 || height == 0 {
        return Err(HelioError::InvalidDimensions { width, height });
    }

    let date_obs = get("DATE-OBS").and_then(parse_fits_datetime);

    Ok(FitsHeader {
        bitpix,
        width,
        height,
        bscale: get("BSCALE").and_then(|v| v.parse().ok()).unwrap_or(1.0),
        bzero: get("BZERO").and_then(|v| v.parse().ok()).unwrap_or(0.0),
        date_obs,
        detector: get("DETECTOR").map(str::to_string),
        cdelt1: get("CDELT1").and_then(|v| v.parse().ok()),
        cdelt2: get("CDELT2").and_then(|v| v.parse().ok()),
        cards,
        header_len,
    })
}

fn parse_fits_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

fn unquote(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

fn decode_data(bytes: &[u8], header: &FitsHeader) -> Result<Array2<f32>> {
    let n = header.width * header.height;
    let bytes_per_value = (header.bitpix.unsigned_abs() / 8) as usize;
    let data_end = header.header_len + n * bytes_per_value;
    if bytes.len() < data_end {
        return Err(HelioError::InvalidFits(format!(
            "file truncated: expected at least {} bytes, got {}",
            data_end,
            bytes.len()
        )));
    }
    let raw = &bytes[header.header_len..data_end];

    let mut values = Vec::with_capacity(n);
    match header.bitpix {
        8 => values.extend(raw.iter().map(|&b| b as f64)),
        16 => {
            for chunk in raw.chunks_exact(2) {
                values.push(BigEndian::read_i16(chunk) as f64);
            }
        }
        32 => {
            for chunk in raw.chunks_exact(4) {
                values.push(BigEndian::read_i32(chunk) as f64);
            }
        }
        -32 => {
            for chunk in raw.chunks_exact(4) {
                values.push(BigEndian::read_f32(chunk) as f64);
            }
        }
        -64 => {
            for chunk in raw.chunks_exact(8) {
                values.push(BigEndian::read_f64(chunk));
            }
        }
        other => {
            return Err(HelioError::InvalidFits(format!("unsupported BITPIX {}", other)));
        }
    }

    let scaled: Vec<f32> = values
        .into_iter()
        .map(|v| (header.bzero + header.bscale * v) as f32)
        .collect();

    Array2::from_shape_vec((header.height, header.width), scaled)
        .map_err(|e| HelioError::InvalidFits(format!("data shape error: {}", e)))
}

/// Write a frame as a minimal BITPIX=-32 FITS file. Used by tests and for
/// persisting intermediate products.
pub fn write_frame(path: &Path, frame: &Frame) -> Result<()> {
    let mut header = Vec::with_capacity(BLOCK_SIZE);
    push_card(&mut header, "SIMPLE", "T");
    push_card(&mut header, "BITPIX", "-32");
    push_card(&mut header, "NAXIS", "2");
    push_card(&mut header, "NAXIS1", &frame.width().to_string());
    push_card(&mut header, "NAXIS2", &frame.height().to_string());
    push_card(
        &mut header,
        "DATE-OBS",
        &format!("'{}'", frame.meta.timestamp.format("%Y-%m-%dT%H:%M:%S")),
    );
    push_card(
        &mut header,
        "DETECTOR",
        &format!("'{}'", frame.meta.detector.as_str()),
    );
    push_card(&mut header, "CDELT1", &format!("{:.6}", frame.meta.pixel_scale.x));
    push_card(&mut header, "CDELT2", &format!("{:.6}", frame.meta.pixel_scale.y));
    header.extend_from_slice(format!("{:<80}", "END").as_bytes());
    pad_to_block(&mut header);

    let mut data = Vec::with_capacity(frame.data.len() * 4);
    for &v in frame.data.iter() {
        let mut buf = [0u8; 4];
        BigEndian::write_f32(&mut buf, v);
        data.extend_from_slice(&buf);
    }
    let rem = data.len() % BLOCK_SIZE;
    if rem != 0 {
        data.resize(data.len() + BLOCK_SIZE - rem, 0u8);
    }

    let mut file = File::create(path)?;
    file.write_all(&header)?;
    file.write_all(&data)?;
    Ok(())
}

fn push_card(buf: &mut Vec<u8>, keyword: &str, value: &str) {
    buf.extend_from_slice(format!("{:<8}= {:<70}", keyword, value).as_bytes());
}

fn pad_to_block(buf: &mut Vec<u8>) {
    let rem = buf.len() % BLOCK_SIZE;
    if rem != 0 {
        buf.resize(buf.len() + BLOCK_SIZE - rem, b' ');
    }
}
