use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use heliodiff_core::io::fits::load_header;

#[derive(Args)]
pub struct InfoArgs {
    /// FITS file to inspect
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let header = load_header(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    println!("{}", args.file.display());
    println!(
        "  {}x{} pixels, BITPIX {}",
        header.width, header.height, header.bitpix
    );
    if let Some(stamp) = header.date_obs {
        println!("  DATE-OBS  {}", stamp);
    }
    if let Some(ref detector) = header.detector {
        println!("  DETECTOR  {}", detector);
    }
    if let (Some(x), Some(y)) = (header.cdelt1, header.cdelt2) {
        println!("  CDELT     {} x {} arcsec/px", x, y);
    }

    println!();
    for (keyword, value) in &header.cards {
        println!("  {:<8} = {}", keyword, value);
    }

    Ok(())
}
