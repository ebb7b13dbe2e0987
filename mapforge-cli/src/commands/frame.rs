//! `mapforge frame` - compute and report the map frame.

use std::path::PathBuf;

use clap::Args;

use crate::commands::common;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct FrameArgs {
    /// Configuration file (YAML)
    pub config: PathBuf,

    /// Points file (one "longitude latitude" per line) to auto-fit the
    /// frame to
    #[arg(long)]
    pub points: Option<PathBuf>,

    /// Write a world file for the frame at the configured ppi
    #[arg(long, value_name = "PATH")]
    pub world_file: Option<PathBuf>,
}

pub fn run(args: FrameArgs) -> Result<(), CliError> {
    let config = common::load_config(&args.config)?;
    let frame = common::build_frame(&config, args.points.as_deref())?;

    let (width_px, height_px) = frame.pixel_dimensions_at(config.ppi);
    let (width_mm, height_mm) = frame.extents_mm();
    let bounds = frame.bounds();

    println!("{} (1:{})", frame.name(), frame.scale());
    println!("  projection: {}", frame.projection());
    println!(
        "  centre:     {:.1}, {:.1}",
        frame.centre().x,
        frame.centre().y
    );
    println!(
        "  extents:    {:.1} x {:.1} (projected units), {:.0} x {:.0} mm on paper",
        frame.extents().0,
        frame.extents().1,
        width_mm,
        height_mm
    );
    println!("  rotation:   {:.2} deg", frame.rotation_deg());
    println!(
        "  bounds:     [{:.1}, {:.1}] - [{:.1}, {:.1}]",
        bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y
    );
    println!(
        "  raster:     {} x {} px at {} ppi ({:.3} units/px)",
        width_px,
        height_px,
        config.ppi,
        frame.resolution_at(config.ppi)
    );

    if let Some(path) = args.world_file {
        frame.write_world_file(&path, frame.resolution_at(config.ppi))?;
        println!("  world file: {}", path.display());
    }

    Ok(())
}
