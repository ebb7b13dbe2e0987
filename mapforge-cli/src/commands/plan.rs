//! `mapforge plan` - plan a tile grid against the map frame.

use std::path::PathBuf;

use clap::Args;
use mapforge::proj::{Crs, KrugerReprojector};
use mapforge::tile::{plan_grid, GridConstraints, ZoomLadder};

use crate::commands::common;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Configuration file (YAML)
    pub config: PathBuf,

    /// Points file to auto-fit the frame to
    #[arg(long)]
    pub points: Option<PathBuf>,

    /// Maximum tile size as WIDTHxHEIGHT pixels
    #[arg(long, default_value = "2048x2048", value_parser = parse_tile_size)]
    pub tile_size: (u32, u32),

    /// Crop margins as LEFT,RIGHT,TOP,BOTTOM pixels
    #[arg(long, value_parser = parse_margins)]
    pub crop: Option<((u32, u32), (u32, u32))>,

    /// Plan against the web Mercator pyramid instead of a fixed grid
    #[arg(long)]
    pub pyramid: bool,

    /// Tile-count budget for pyramid planning
    #[arg(long, default_value_t = 1000)]
    pub budget: u32,

    /// Ground resolution in projected units per pixel (defaults to the
    /// frame resolution at the configured ppi)
    #[arg(long)]
    pub resolution: Option<f64>,
}

fn parse_tile_size(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .split_once(['x', ','])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value:?}"))?;
    Ok((
        width.parse().map_err(|e| format!("bad width: {e}"))?,
        height.parse().map_err(|e| format!("bad height: {e}"))?,
    ))
}

fn parse_margins(value: &str) -> Result<((u32, u32), (u32, u32)), String> {
    let fields: Vec<u32> = value
        .split(',')
        .map(|f| f.trim().parse().map_err(|e| format!("bad margin: {e}")))
        .collect::<Result<_, _>>()?;
    match fields[..] {
        [left, right, top, bottom] => Ok(((left, right), (top, bottom))),
        _ => Err(format!("expected LEFT,RIGHT,TOP,BOTTOM, got {value:?}")),
    }
}

pub fn run(args: PlanArgs) -> Result<(), CliError> {
    let config = common::load_config(&args.config)?;
    let frame = common::build_frame(&config, args.points.as_deref())?;
    let reprojector = KrugerReprojector::new();

    let resolution = args
        .resolution
        .unwrap_or_else(|| frame.resolution_at(config.ppi));

    let (constraints, bounds) = if args.pyramid {
        let constraints = GridConstraints::pyramid(ZoomLadder::web_mercator(), args.budget);
        let bounds = frame.bounds_in(&reprojector, &Crs::web_mercator())?;
        (constraints, bounds)
    } else {
        let mut constraints = GridConstraints::fixed(args.tile_size);
        if let Some(margins) = args.crop {
            constraints = constraints.with_crop_margins(margins);
        }
        (constraints, frame.bounds())
    };

    let plan = plan_grid(&bounds, resolution, &constraints)?;

    println!(
        "{}: {} tiles, {}x{} px canvas at {:.3} units/px",
        frame.name(),
        plan.tile_count(),
        plan.canvas_size.0,
        plan.canvas_size.1,
        plan.resolution
    );
    if let Some(zoom) = plan.zoom {
        println!("  zoom: {zoom}{}", if plan.over_budget { " (over budget, coarsest available)" } else { "" });
    }
    for (index, tile) in plan.tiles.iter().enumerate() {
        println!(
            "  tile {:>3}: {:>5}x{:<5} @ ({:>6}, {:>6})  [{:.1}, {:.1}] - [{:.1}, {:.1}]",
            index,
            tile.pixel_size.0,
            tile.pixel_size.1,
            tile.pixel_offset.0,
            tile.pixel_offset.1,
            tile.geo_bounds.min.x,
            tile.geo_bounds.min.y,
            tile.geo_bounds.max.x,
            tile.geo_bounds.max.y
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tile_size() {
        assert_eq!(parse_tile_size("2048x2048").unwrap(), (2048, 2048));
        assert_eq!(parse_tile_size("512,256").unwrap(), (512, 256));
        assert!(parse_tile_size("2048").is_err());
    }

    #[test]
    fn test_parse_margins() {
        assert_eq!(parse_margins("8,8,4,4").unwrap(), ((8, 8), (4, 4)));
        assert!(parse_margins("8,8").is_err());
        assert!(parse_margins("a,b,c,d").is_err());
    }
}
