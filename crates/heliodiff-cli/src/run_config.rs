use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use heliodiff_core::suppress::SuppressConfig;

/// One event-production run: which stream, which window, which outputs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    /// Root of the HI data tree.
    pub data_root: PathBuf,
    /// Root of the output tree; assets land in `<out>/<event>/<craft>/assets`.
    pub out_root: PathBuf,
    /// Event label, e.g. `ssw_007_swpc_042`.
    pub event: String,
    /// Spacecraft selector: sta or stb.
    pub craft: String,
    /// Camera selector: hi1 or hi2.
    pub camera: String,
    /// Background-subtraction variant: 1 or 11 days.
    pub background: i64,
    /// Window start, `yyyy-mm-ddThh:mm:ss`.
    pub t_start: NaiveDateTime,
    /// Window stop, inclusive.
    pub t_stop: NaiveDateTime,
    #[serde(default)]
    pub processing: ProcessingConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Star-suppress both frames before differencing.
    #[serde(default)]
    pub star_suppress: bool,
    /// Register the previous frame onto the current one.
    #[serde(default = "default_true")]
    pub align: bool,
    /// Median-smooth the difference.
    #[serde(default = "default_true")]
    pub smoothing: bool,
    /// Suppressor parameters.
    #[serde(default)]
    pub suppress: SuppressConfig,
}

fn default_true() -> bool {
    true
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            star_suppress: false,
            align: true,
            smoothing: true,
            suppress: SuppressConfig::default(),
        }
    }
}

impl RunConfig {
    /// A filled-in example, printed by `heliodiff config`.
    pub fn example() -> Self {
        Self {
            data_root: PathBuf::from("/data/stereo/hi"),
            out_root: PathBuf::from("out"),
            event: "ssw_000_swpc_000".into(),
            craft: "sta".into(),
            camera: "hi1".into(),
            background: 1,
            t_start: NaiveDateTime::parse_from_str("2008-01-01T00:00:00", "%Y-%m-%dT%H:%M:%S")
                .unwrap(),
            t_stop: NaiveDateTime::parse_from_str("2008-01-04T00:00:00", "%Y-%m-%dT%H:%M:%S")
                .unwrap(),
            processing: ProcessingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_round_trips_through_toml() {
        let text = toml::to_string_pretty(&RunConfig::example()).unwrap();
        let parsed: RunConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.event, "ssw_000_swpc_000");
        assert!(parsed.processing.align);
        assert_eq!(parsed.processing.suppress.res, 512);
    }

    #[test]
    fn processing_section_is_optional() {
        let text = r#"
data_root = "/data"
out_root = "out"
event = "ev"
craft = "stb"
camera = "hi1"
background = 1
t_start = "2008-01-01T00:00:00"
t_stop = "2008-01-02T00:00:00"
"#;
        let parsed: RunConfig = toml::from_str(text).unwrap();
        assert!(parsed.processing.smoothing);
        assert!(!parsed.processing.star_suppress);
    }
}
