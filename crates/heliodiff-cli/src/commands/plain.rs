use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use heliodiff_core::pipeline::image_plain;
use heliodiff_core::suppress::SuppressConfig;

use crate::render::{save_rendering, PLAIN_WINDOW};

#[derive(Args)]
pub struct PlainArgs {
    /// Input FITS file
    pub file: PathBuf,

    /// Interpolate over bright stellar sources first
    #[arg(long)]
    pub star_suppress: bool,

    /// Star-classification percentile
    #[arg(long, default_value = "97.5")]
    pub thresh: f64,

    /// Suppressor block size in pixels
    #[arg(long, default_value = "512")]
    pub res: usize,

    /// Output image path
    #[arg(short, long, default_value = "plain.png")]
    pub output: PathBuf,
}

pub fn run(args: &PlainArgs) -> Result<()> {
    let config = SuppressConfig {
        thresh: args.thresh,
        res: args.res,
    };
    let frame = image_plain(&args.file, args.star_suppress, &config)
        .with_context(|| format!("Failed to process {}", args.file.display()))?;

    save_rendering(&frame.data, PLAIN_WINDOW, &args.output)?;
    println!(
        "{} ({} {})  ->  {}",
        frame.meta.detector.as_str(),
        frame.meta.timestamp,
        if args.star_suppress {
            "star-suppressed"
        } else {
            "plain"
        },
        args.output.display()
    );
    Ok(())
}
