use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

/// Number of consecutive images linked per manifest row.
const ASSETS_PER_SUBJECT: usize = 3;

/// Write `manifest.csv` into the assets directory.
///
/// Header: `subject_id,subject_name,img_type,asset_0,asset_1,asset_2`.
/// For each image type, time-sorted files are grouped in threes; a subject
/// name carries the timestamps of the group's first and last image.
/// A trailing remainder smaller than a full group is left out.
pub fn write_manifest(assets_dir: &Path, event: &str, craft: &str, img_types: &[&str]) -> Result<()> {
    let manifest_path = assets_dir.join("manifest.csv");
    let mut manifest = fs::File::create(&manifest_path)
        .with_context(|| format!("Failed to create {}", manifest_path.display()))?;

    writeln!(manifest, "subject_id,subject_name,img_type,asset_0,asset_1,asset_2")?;

    let mut subject_id = 0usize;
    for img_type in img_types {
        let mut files: Vec<String> = fs::read_dir(assets_dir)?
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|name| {
                name.ends_with(".jpg") && name.contains(&format!("_{}_", img_type))
            })
            .collect();
        files.sort();

        for group in files.chunks_exact(ASSETS_PER_SUBJECT) {
            let t_first = file_time_tag(&group[0]);
            let t_last = file_time_tag(&group[ASSETS_PER_SUBJECT - 1]);
            let subject_name =
                format!("{}_{}_{}_{}_{}", event, craft, img_type, t_first, t_last);

            write!(manifest, "{},{},{}", subject_id, subject_name, img_type)?;
            for file in group {
                write!(manifest, ",{}", file)?;
            }
            writeln!(manifest)?;
            subject_id += 1;
        }
    }

    Ok(())
}

/// Asset file names end in `_yyyymmdd_hhmmss.jpg`; pull the two stamp
/// segments back out as `yyyymmddThhmmss`.
fn file_time_tag(name: &str) -> String {
    let stem = name.strip_suffix(".jpg").unwrap_or(name);
    let parts: Vec<&str> = stem.split('_').collect();
    if parts.len() >= 2 {
        format!("{}T{}", parts[parts.len() - 2], parts[parts.len() - 1])
    } else {
        stem.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn groups_of_three_with_remainder_dropped() {
        let dir = tempdir().unwrap();
        for stamp in [
            "20080101_120001",
            "20080101_124001",
            "20080101_130001",
            "20080101_134001",
        ] {
            fs::write(
                dir.path().join(format!("ev_sta_diff_{}.jpg", stamp)),
                b"",
            )
            .unwrap();
        }

        write_manifest(dir.path(), "ev", "sta", &["norm", "diff"]).unwrap();

        let text = fs::read_to_string(dir.path().join("manifest.csv")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "subject_id,subject_name,img_type,asset_0,asset_1,asset_2"
        );
        // Four diff files yield one full group; the remainder is dropped.
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("0,ev_sta_diff_20080101T120001_20080101T130001,diff"));
        assert!(lines[1].ends_with("ev_sta_diff_20080101_130001.jpg"));
    }

    #[test]
    fn time_tag_extraction() {
        assert_eq!(
            file_time_tag("ev_sta_norm_20080101_120001.jpg"),
            "20080101T120001"
        );
    }
}
