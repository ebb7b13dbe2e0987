//! Tile grid planning
//!
//! Partitions a geographic rectangle into a grid of fetchable image tiles,
//! honouring per-service constraints: maximum tile pixel size with crop
//! margins (REST export services), or a discrete zoom/resolution ladder
//! with a tile-count budget (slippy tile pyramids). Planning is pure and
//! synchronous; the resulting [`TileGridPlan`] is consumed immediately by
//! the retrieval and assembly pipeline and never persisted.

mod grid;
mod zoom;

pub use grid::plan_fixed_grid;
pub use zoom::{plan_zoom_grid, ZoomLadder};

use thiserror::Error;

use crate::frame::WorldFileParams;
use crate::geometry::{GeoBounds, Point};

/// Errors constructing a tile grid plan.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Crop margins consume the whole tile along an axis.
    #[error("crop margins leave no usable tile pixels along the {0} axis")]
    NoUsableTileSize(&'static str),

    /// The requested bounds have no area.
    #[error("requested bounds are empty")]
    EmptyBounds,

    #[error("resolution must be positive, got {0}")]
    InvalidResolution(f64),
}

/// Per-service tiling constraints, supplied per layer as configuration.
///
/// Which planning strategy runs is selected by `ladder`: present means
/// zoom-ladder selection, absent means fixed-size partition.
#[derive(Clone, Debug)]
pub struct GridConstraints {
    /// Maximum tile size in pixels (width, height).
    pub max_tile_size: (u32, u32),
    /// Crop margins in pixels: ((left, right), (top, bottom)). Adjacent
    /// tiles overlap only within these margins, which are discarded at
    /// assembly.
    pub crop_margins: ((u32, u32), (u32, u32)),
    /// Upper bound on the number of tiles a plan may request.
    pub tile_budget: Option<u32>,
    /// Discrete resolution ladder for pyramid-tiled services.
    pub ladder: Option<ZoomLadder>,
}

impl GridConstraints {
    /// Fixed-size partition with no margins.
    pub fn fixed(max_tile_size: (u32, u32)) -> Self {
        Self {
            max_tile_size,
            crop_margins: ((0, 0), (0, 0)),
            tile_budget: None,
            ladder: None,
        }
    }

    /// Zoom-ladder selection under a tile budget.
    pub fn pyramid(ladder: ZoomLadder, tile_budget: u32) -> Self {
        Self {
            max_tile_size: ladder.tile_size,
            crop_margins: ((0, 0), (0, 0)),
            tile_budget: Some(tile_budget),
            ladder: Some(ladder),
        }
    }

    pub fn with_crop_margins(mut self, margins: ((u32, u32), (u32, u32))) -> Self {
        self.crop_margins = margins;
        self
    }

    pub fn with_tile_budget(mut self, budget: u32) -> Self {
        self.tile_budget = Some(budget);
        self
    }
}

/// One fetchable tile: what to request and where its usable pixels land.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileDescriptor {
    /// Requested bounds in the planning CRS, margins included.
    pub geo_bounds: GeoBounds,
    /// Requested pixel size, margins included.
    pub pixel_size: (u32, u32),
    /// Placement of the usable (post-crop) region on the destination
    /// canvas.
    pub pixel_offset: (u32, u32),
    /// Margin pixels to discard per edge: ((left, right), (top, bottom)).
    pub crop: ((u32, u32), (u32, u32)),
    /// Projected units per pixel.
    pub resolution: f64,
}

impl TileDescriptor {
    /// Pixel size after margins are cropped away.
    pub fn usable_size(&self) -> (u32, u32) {
        (
            self.pixel_size.0 - self.crop.0 .0 - self.crop.0 .1,
            self.pixel_size.1 - self.crop.1 .0 - self.crop.1 .1,
        )
    }

    /// World-file parameters registering this tile on its own, unrotated.
    /// Used when tiles are handed individually to an external warp.
    pub fn world_file_params(&self) -> WorldFileParams {
        WorldFileParams::new(
            Point::new(self.geo_bounds.min.x, self.geo_bounds.max.y),
            self.resolution,
            0.0,
        )
    }
}

/// An ordered set of tile descriptors covering one layer's bounds.
#[derive(Clone, Debug)]
pub struct TileGridPlan {
    pub tiles: Vec<TileDescriptor>,
    /// Destination canvas size in pixels.
    pub canvas_size: (u32, u32),
    /// Projected coordinate of the canvas's top-left corner.
    pub canvas_origin: Point,
    /// Projected units per pixel.
    pub resolution: f64,
    /// Chosen pyramid zoom, when strategy (b) planned this grid.
    pub zoom: Option<u8>,
    /// Set when no zoom satisfied the tile budget and the plan fell back
    /// to the coarsest available level. A warning, not an error.
    pub over_budget: bool,
}

impl TileGridPlan {
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// The union of the requested tile bounds. Always a superset of the
    /// planned-for bounds.
    pub fn coverage(&self) -> Option<GeoBounds> {
        let mut tiles = self.tiles.iter();
        let first = tiles.next()?.geo_bounds;
        Some(tiles.fold(first, |acc, tile| acc.merge(&tile.geo_bounds)))
    }
}

/// Plans a tile grid for `bounds` under the given constraints, dispatching
/// on which strategy the constraints describe.
pub fn plan_grid(
    bounds: &GeoBounds,
    resolution: f64,
    constraints: &GridConstraints,
) -> Result<TileGridPlan, PlanError> {
    match &constraints.ladder {
        Some(ladder) => plan_zoom_grid(bounds, resolution, ladder, constraints.tile_budget),
        None => plan_fixed_grid(
            bounds,
            resolution,
            constraints.max_tile_size,
            constraints.crop_margins,
        ),
    }
}
