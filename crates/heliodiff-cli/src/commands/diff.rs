use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use heliodiff_core::diff::DiffConfig;
use heliodiff_core::pipeline::image_diff;
use heliodiff_core::suppress::SuppressConfig;

use crate::render::{save_rendering, DIFF_WINDOW};

#[derive(Args)]
pub struct DiffArgs {
    /// Current frame (minuend)
    pub current: PathBuf,

    /// Previous frame (subtrahend)
    pub previous: PathBuf,

    /// Star-suppress both frames before subtracting
    #[arg(long)]
    pub star_suppress: bool,

    /// Skip registration of the previous frame
    #[arg(long)]
    pub no_align: bool,

    /// Skip the median smoothing pass
    #[arg(long)]
    pub no_smoothing: bool,

    /// Star-classification percentile
    #[arg(long, default_value = "97.5")]
    pub thresh: f64,

    /// Suppressor block size in pixels
    #[arg(long, default_value = "512")]
    pub res: usize,

    /// Output image path
    #[arg(short, long, default_value = "diff.png")]
    pub output: PathBuf,
}

pub fn run(args: &DiffArgs) -> Result<()> {
    let config = DiffConfig {
        star_suppress: args.star_suppress,
        align: !args.no_align,
        smoothing: !args.no_smoothing,
        suppress: SuppressConfig {
            thresh: args.thresh,
            res: args.res,
        },
    };

    let frame = image_diff(&args.current, &args.previous, &config)
        .with_context(|| {
            format!(
                "Failed to difference {} - {}",
                args.current.display(),
                args.previous.display()
            )
        })?;

    let n_valid = frame.data.iter().filter(|v| v.is_finite()).count();
    if n_valid == 0 {
        println!("frames not comparable, rendered blank difference");
    }

    save_rendering(&frame.data, DIFF_WINDOW, &args.output)?;
    println!(
        "{} diff at {}  ->  {}",
        frame.meta.detector.as_str(),
        frame.meta.timestamp,
        args.output.display()
    );
    Ok(())
}
