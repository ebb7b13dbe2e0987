//! Discrete zoom-ladder selection for pyramid-tiled services.

use tracing::warn;

use crate::geometry::{GeoBounds, Point};
use crate::proj::EARTH_RADIUS;

use super::{PlanError, TileDescriptor, TileGridPlan};

/// A resolution pyramid where each zoom step halves the ground resolution
/// per pixel, with cells anchored to a fixed global grid origin.
#[derive(Clone, Debug, PartialEq)]
pub struct ZoomLadder {
    /// Resolution at zoom 0, projected units per pixel.
    pub base_resolution: f64,
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// Tile size in pixels.
    pub tile_size: (u32, u32),
    /// Projected coordinate of the grid's north-west origin.
    pub origin: Point,
}

impl ZoomLadder {
    /// The standard web Mercator pyramid: 256-px tiles, zoom 0 covering
    /// the world in one tile, origin at the north-west corner of the
    /// projection square.
    pub fn web_mercator() -> Self {
        use std::f64::consts::PI;
        Self {
            base_resolution: 2.0 * PI * EARTH_RADIUS / 256.0,
            min_zoom: 1,
            max_zoom: 19,
            tile_size: (256, 256),
            origin: Point::new(-PI * EARTH_RADIUS, PI * EARTH_RADIUS),
        }
    }

    /// Projected units per pixel at `zoom`.
    pub fn resolution(&self, zoom: u8) -> f64 {
        self.base_resolution / f64::from(1u32 << zoom)
    }

    /// The finest zoom whose resolution is at or below (at least as fine
    /// as) the requested resolution, clamped to the ladder's range.
    pub fn finest_zoom_for(&self, resolution: f64) -> u8 {
        let exact = (self.base_resolution / resolution).log2().ceil();
        (exact.max(0.0) as u32).clamp(self.min_zoom as u32, self.max_zoom as u32) as u8
    }

    /// Cell size in projected units at `zoom`.
    fn cell_size(&self, zoom: u8) -> (f64, f64) {
        let resolution = self.resolution(zoom);
        (
            resolution * self.tile_size.0 as f64,
            resolution * self.tile_size.1 as f64,
        )
    }

    /// Index ranges (columns, rows) of the grid cells covering `bounds`
    /// at `zoom`, end-exclusive.
    fn cell_range(&self, bounds: &GeoBounds, zoom: u8) -> ((i64, i64), (i64, i64)) {
        let (cell_width, cell_height) = self.cell_size(zoom);
        let column_start = ((bounds.min.x - self.origin.x) / cell_width).floor() as i64;
        let column_end = ((bounds.max.x - self.origin.x) / cell_width).ceil() as i64;
        let row_start = ((self.origin.y - bounds.max.y) / cell_height).floor() as i64;
        let row_end = ((self.origin.y - bounds.min.y) / cell_height).ceil() as i64;
        (
            (column_start, column_end.max(column_start + 1)),
            (row_start, row_end.max(row_start + 1)),
        )
    }

    fn cell_count(&self, bounds: &GeoBounds, zoom: u8) -> u64 {
        let ((column_start, column_end), (row_start, row_end)) = self.cell_range(bounds, zoom);
        (column_end - column_start) as u64 * (row_end - row_start) as u64
    }
}

/// Selects a zoom level and lays out the covering grid cells.
///
/// Selection starts from the finest zoom whose resolution is at least as
/// fine as the requested one and walks coarser; the finest zoom whose tile
/// count is strictly under the budget wins. When even the coarsest zoom
/// exceeds the budget the plan proceeds at the coarsest zoom with
/// `over_budget` set: a warning for the caller, not a failure.
pub fn plan_zoom_grid(
    bounds: &GeoBounds,
    resolution: f64,
    ladder: &ZoomLadder,
    tile_budget: Option<u32>,
) -> Result<TileGridPlan, PlanError> {
    if !(resolution > 0.0) {
        return Err(PlanError::InvalidResolution(resolution));
    }
    if !(bounds.width() > 0.0 && bounds.height() > 0.0) {
        return Err(PlanError::EmptyBounds);
    }

    let finest = ladder.finest_zoom_for(resolution);
    let (zoom, over_budget) = match tile_budget {
        None => (finest, false),
        Some(budget) => {
            let chosen = (ladder.min_zoom..=finest)
                .rev()
                .find(|&zoom| ladder.cell_count(bounds, zoom) < u64::from(budget));
            match chosen {
                Some(zoom) => (zoom, false),
                None => {
                    warn!(
                        budget,
                        coarsest_tiles = ladder.cell_count(bounds, ladder.min_zoom),
                        "no zoom level satisfies the tile budget; using coarsest"
                    );
                    (ladder.min_zoom, true)
                }
            }
        }
    };

    let chosen_resolution = ladder.resolution(zoom);
    let (cell_width, cell_height) = ladder.cell_size(zoom);
    let ((column_start, column_end), (row_start, row_end)) = ladder.cell_range(bounds, zoom);

    let mut tiles = Vec::with_capacity(
        ((column_end - column_start) * (row_end - row_start)) as usize,
    );
    for row in row_start..row_end {
        for column in column_start..column_end {
            let west = ladder.origin.x + column as f64 * cell_width;
            let north = ladder.origin.y - row as f64 * cell_height;
            tiles.push(TileDescriptor {
                geo_bounds: GeoBounds::new(
                    Point::new(west, north - cell_height),
                    Point::new(west + cell_width, north),
                ),
                pixel_size: ladder.tile_size,
                pixel_offset: (
                    ((column - column_start) as u32) * ladder.tile_size.0,
                    ((row - row_start) as u32) * ladder.tile_size.1,
                ),
                crop: ((0, 0), (0, 0)),
                resolution: chosen_resolution,
            });
        }
    }

    Ok(TileGridPlan {
        tiles,
        canvas_size: (
            (column_end - column_start) as u32 * ladder.tile_size.0,
            (row_end - row_start) as u32 * ladder.tile_size.1,
        ),
        canvas_origin: Point::new(
            ladder.origin.x + column_start as f64 * cell_width,
            ladder.origin.y - row_start as f64 * cell_height,
        ),
        resolution: chosen_resolution,
        zoom: Some(zoom),
        over_budget,
    })
}
