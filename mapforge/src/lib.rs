//! Mapforge - georeferenced composite map engine
//!
//! Mapforge builds printable topographic-style maps from remote imagery
//! and vector sources. The library owns the geometric core: fitting a map
//! frame to point data (convex hull and rotating calipers), the frame's
//! coordinate model (projected centre, extents, rotation, derived bounds,
//! world-file and drawing-space transforms), partitioning the frame's
//! bounds into fetchable tile grids under per-service constraints, and
//! reassembling fetched tiles into georegistered mosaics.
//!
//! Parsing of track files, provider URL templating, SVG generation, and
//! raster warping are external collaborators: the core consumes a point
//! set, a [`proj::Reproject`] implementation, and a
//! [`fetch::TileFetcher`], and produces tile descriptors, placement
//! instructions, and assembled canvases.

pub mod config;
pub mod fetch;
pub mod frame;
pub mod geometry;
pub mod layer;
pub mod mosaic;
pub mod proj;
pub mod tile;

pub use config::MapConfig;
pub use fetch::{FetchOptions, RetryPolicy, TileFetcher};
pub use frame::{FrameBuilder, MapFrame};
pub use geometry::{convex_hull, minimum_bounding_box, GeoBounds, OrientedRect, Point};
pub use layer::{render_layers, LayerReport, LayerSpec};
pub use mosaic::MosaicAssembler;
pub use proj::{Crs, KrugerReprojector, Reproject};
pub use tile::{plan_grid, GridConstraints, TileDescriptor, TileGridPlan, ZoomLadder};
