use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use heliodiff_core::diff::DiffConfig;
use heliodiff_core::locate::{find_frames, Background, Camera, Craft, FrameQuery};
use heliodiff_core::pipeline::{image_diff, image_plain};

use crate::manifest::write_manifest;
use crate::render::{save_rendering, DIFF_WINDOW, PLAIN_WINDOW};
use crate::run_config::RunConfig;
use crate::summary::print_run_summary;

#[derive(Args)]
pub struct RunArgs {
    /// Run configuration TOML
    #[arg(short, long)]
    pub config: PathBuf,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let text = fs::read_to_string(&args.config)
        .with_context(|| format!("Failed to read {}", args.config.display()))?;
    let config: RunConfig = toml::from_str(&text)
        .with_context(|| format!("Failed to parse {}", args.config.display()))?;

    let craft = Craft::parse_lossy(&config.craft);
    let query = FrameQuery {
        craft,
        camera: Camera::parse_lossy(&config.camera),
        background: Background::parse_lossy(config.background),
        t_start: config.t_start,
        t_stop: config.t_stop,
    };

    let files = find_frames(&config.data_root, &query)?;
    print_run_summary(&config, files.len());

    if files.len() < 2 {
        println!("Fewer than two frames in the window, nothing to difference.");
        return Ok(());
    }

    let assets_dir = config
        .out_root
        .join(&config.event)
        .join(craft.as_str())
        .join("assets");
    fs::create_dir_all(&assets_dir)
        .with_context(|| format!("Failed to create {}", assets_dir.display()))?;

    let diff_config = DiffConfig {
        star_suppress: config.processing.star_suppress,
        align: config.processing.align,
        smoothing: config.processing.smoothing,
        suppress: config.processing.suppress,
    };
    let suppress_config = config.processing.suppress;

    // Consecutive pairs: current from the second file onward, previous
    // trailing by one.
    let pairs: Vec<(&PathBuf, &PathBuf)> =
        files[1..].iter().zip(files[..files.len() - 1].iter()).collect();

    let bar = ProgressBar::new(pairs.len() as u64 * 2);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
            .expect("static template"),
    );

    let mut written = 0usize;
    for (file_c, file_p) in &pairs {
        bar.set_message("norm");
        match image_plain(file_c, false, &suppress_config) {
            Ok(frame) => {
                let name = asset_name(&config.event, craft.as_str(), "norm", &frame.meta.timestamp);
                save_rendering(&frame.data, PLAIN_WINDOW, &assets_dir.join(name))?;
                written += 1;
            }
            Err(e) => warn!("skipping plain rendering of {}: {}", file_c.display(), e),
        }
        bar.inc(1);

        bar.set_message("diff");
        match image_diff(file_c, file_p, &diff_config) {
            Ok(frame) => {
                let name = asset_name(&config.event, craft.as_str(), "diff", &frame.meta.timestamp);
                save_rendering(&frame.data, DIFF_WINDOW, &assets_dir.join(name))?;
                written += 1;
            }
            Err(e) => warn!(
                "skipping difference {} - {}: {}",
                file_c.display(),
                file_p.display(),
                e
            ),
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    write_manifest(&assets_dir, &config.event, craft.as_str(), &["norm", "diff"])?;

    println!(
        "Wrote {} assets and manifest.csv to {}",
        written,
        assets_dir.display()
    );
    Ok(())
}

fn asset_name(
    event: &str,
    craft: &str,
    img_type: &str,
    stamp: &chrono::NaiveDateTime,
) -> String {
    format!(
        "{}_{}_{}_{}.jpg",
        event,
        craft,
        img_type,
        stamp.format("%Y%m%d_%H%M%S")
    )
}
