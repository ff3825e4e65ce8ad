use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDateTime};
use tracing::{debug, warn};

use crate::error::Result;
use crate::io::fits::filename_timestamp;

/// Spacecraft selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Craft {
    Sta,
    Stb,
}

impl Craft {
    pub fn parse_lossy(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "sta" => Craft::Sta,
            "stb" => Craft::Stb,
            other => {
                warn!("craft should be 'sta' or 'stb', got {:?}; defaulting to sta", other);
                Craft::Sta
            }
        }
    }

    fn dir_tag(&self) -> &'static str {
        match self {
            Craft::Sta => "a",
            Craft::Stb => "b",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Craft::Sta => "sta",
            Craft::Stb => "stb",
        }
    }
}

/// Camera selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Camera {
    Hi1,
    Hi2,
}

impl Camera {
    pub fn parse_lossy(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "hi1" => Camera::Hi1,
            "hi2" => Camera::Hi2,
            other => {
                warn!("camera should be 'hi1' or 'hi2', got {:?}; defaulting to hi1", other);
                Camera::Hi1
            }
        }
    }

    fn dir_tag(&self) -> &'static str {
        match self {
            Camera::Hi1 => "hi_1",
            Camera::Hi2 => "hi_2",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Camera::Hi1 => "hi1",
            Camera::Hi2 => "hi2",
        }
    }
}

/// Background-subtraction variant applied upstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Background {
    OneDay,
    ElevenDay,
}

impl Background {
    pub fn parse_lossy(days: i64) -> Self {
        match days {
            1 => Background::OneDay,
            11 => Background::ElevenDay,
            other => {
                warn!("background_type should be 1 or 11, got {}; defaulting to 1", other);
                Background::OneDay
            }
        }
    }

    fn dir_tag(&self) -> &'static str {
        match self {
            Background::OneDay => "L2_1_25",
            Background::ElevenDay => "L2_11_25",
        }
    }
}

/// Selection of one spacecraft/camera/background stream over a time window.
#[derive(Clone, Debug)]
pub struct FrameQuery {
    pub craft: Craft,
    pub camera: Camera,
    pub background: Background,
    pub t_start: NaiveDateTime,
    pub t_stop: NaiveDateTime,
}

/// Locate the frame files for a query under the HI data tree
/// `root/L2_{1|11}_25/{a|b}/img/hi_{1|2}/{yyyymmdd}/*.fts`.
///
/// Files are kept when the timestamp embedded in the first 15 filename
/// characters lies within [t_start, t_stop] inclusive, and returned sorted
/// ascending by that timestamp.
pub fn find_frames(root: &Path, query: &FrameQuery) -> Result<Vec<PathBuf>> {
    let stream_dir = root
        .join(query.background.dir_tag())
        .join(query.craft.dir_tag())
        .join("img")
        .join(query.camera.dir_tag());

    let mut found: Vec<(NaiveDateTime, PathBuf)> = Vec::new();

    let mut day = query.t_start.date();
    let last_day = query.t_stop.date();
    while day <= last_day {
        let day_dir = stream_dir.join(day.format("%Y%m%d").to_string());
        if day_dir.is_dir() {
            for entry in std::fs::read_dir(&day_dir)? {
                let path = entry?.path();
                if path.extension().and_then(|e| e.to_str()) != Some("fts") {
                    continue;
                }
                let Some(stamp) = filename_timestamp(&path) else {
                    debug!("skipping {}: no parsable timestamp", path.display());
                    continue;
                };
                // Inclusive on both bounds.
                if stamp >= query.t_start && stamp <= query.t_stop {
                    found.push((stamp, path));
                }
            }
        }
        day = day + Duration::days(1);
    }

    found.sort_by_key(|(stamp, _)| *stamp);
    Ok(found.into_iter().map(|(_, path)| path).collect())
}
