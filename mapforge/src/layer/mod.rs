//! Per-layer pipeline
//!
//! Each map layer declares what it is through a capability tag
//! ([`LayerContent`]) and the pipeline dispatches on that tag: raster
//! layers are planned, fetched, and assembled here; vector and embedded
//! layers are delegated to external renderers with the placement data they
//! need. Layer failures are collected, never fatal to the run: one broken
//! layer does not prevent the rest of the map from being produced.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{info, warn};

use crate::fetch::{retrieve, FetchOptions, RetrieveError, TileFetcher};
use crate::frame::MapFrame;
use crate::mosaic::{Mosaic, MosaicAssembler, MosaicError, TileRegistration};
use crate::proj::{Crs, ProjError, Reproject};
use crate::tile::{plan_grid, GridConstraints, PlanError, TileDescriptor, TileGridPlan};

/// Layer resolution default: the original services deliver usable imagery
/// at about scale/12500 metres per pixel.
const RESOLUTION_SCALE_DIVISOR: f64 = 12_500.0;

/// What a layer is, as an explicit capability tag.
///
/// The pipeline dispatches on this tag; a layer supports exactly the
/// operations its variant names.
#[derive(Clone, Debug)]
pub enum LayerContent {
    /// Tiled raster imagery fetched through the retrieval collaborator.
    TiledRaster { constraints: GridConstraints },

    /// Vector data rendered by an external step; the pipeline supplies
    /// placement only.
    Vector,

    /// An image embedded directly by an external step.
    Embedded,
}

/// One layer of the map, as configured.
#[derive(Clone, Debug)]
pub struct LayerSpec {
    pub name: String,
    /// The CRS the layer's source service serves in; tile grids are
    /// planned in this CRS.
    pub crs: Crs,
    /// Ground resolution override, projected units per pixel.
    pub resolution: Option<f64>,
    pub content: LayerContent,
}

impl LayerSpec {
    pub fn tiled_raster(name: impl Into<String>, crs: Crs, constraints: GridConstraints) -> Self {
        Self {
            name: name.into(),
            crs,
            resolution: None,
            content: LayerContent::TiledRaster { constraints },
        }
    }

    pub fn vector(name: impl Into<String>, crs: Crs) -> Self {
        Self {
            name: name.into(),
            crs,
            resolution: None,
            content: LayerContent::Vector,
        }
    }

    pub fn embedded(name: impl Into<String>, crs: Crs) -> Self {
        Self {
            name: name.into(),
            crs,
            resolution: None,
            content: LayerContent::Embedded,
        }
    }

    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = Some(resolution);
        self
    }
}

/// Why a layer failed.
#[derive(Debug, Error)]
pub enum LayerError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Fetch(#[from] RetrieveError),

    #[error(transparent)]
    Assembly(#[from] MosaicError),

    #[error(transparent)]
    Proj(#[from] ProjError),
}

/// A failed layer, kept alongside the layers that succeeded.
#[derive(Debug)]
pub struct LayerFailure {
    pub layer: String,
    pub error: LayerError,
}

/// Delegated (non-raster) rendering work, with the placement data the
/// external renderer needs.
#[derive(Clone, Debug)]
pub enum ExternalKind {
    Vector,
    Embedded,
}

/// What the pipeline produced for one layer.
pub enum LayerOutput {
    /// Assembled, georegistered mosaic (unrotated frame, same CRS).
    Raster { layer: String, mosaic: Mosaic },

    /// Fetched tiles with per-tile registrations, for the external warp
    /// (rotated frame or cross-CRS source).
    Warp {
        layer: String,
        plan: TileGridPlan,
        tiles: Vec<(TileDescriptor, Bytes)>,
        registrations: Vec<TileRegistration>,
    },

    /// Rendering delegated to an external collaborator.
    External {
        layer: String,
        kind: ExternalKind,
        pixel_dimensions: (u32, u32),
        resolution: f64,
    },
}

impl LayerOutput {
    pub fn layer(&self) -> &str {
        match self {
            LayerOutput::Raster { layer, .. }
            | LayerOutput::Warp { layer, .. }
            | LayerOutput::External { layer, .. } => layer,
        }
    }
}

/// Outcome of a whole run: completed outputs and collected failures.
pub struct LayerReport {
    pub outputs: Vec<LayerOutput>,
    pub failures: Vec<LayerFailure>,
}

impl LayerReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs every layer against the frame, dispatching on each layer's
/// capability tag and collecting failures instead of aborting.
pub async fn render_layers(
    frame: &MapFrame,
    layers: &[LayerSpec],
    fetcher: Arc<dyn TileFetcher>,
    reprojector: &dyn Reproject,
    options: &FetchOptions,
) -> LayerReport {
    let mut outputs = Vec::with_capacity(layers.len());
    let mut failures = Vec::new();

    for layer in layers {
        let resolution = layer
            .resolution
            .unwrap_or(frame.scale() / RESOLUTION_SCALE_DIVISOR);

        match &layer.content {
            LayerContent::TiledRaster { constraints } => {
                match raster_layer(
                    frame,
                    layer,
                    constraints,
                    resolution,
                    Arc::clone(&fetcher),
                    reprojector,
                    options,
                )
                .await
                {
                    Ok(output) => outputs.push(output),
                    Err(error) => {
                        warn!(layer = %layer.name, %error, "layer failed; continuing with remaining layers");
                        failures.push(LayerFailure {
                            layer: layer.name.clone(),
                            error,
                        });
                    }
                }
            }
            LayerContent::Vector => outputs.push(LayerOutput::External {
                layer: layer.name.clone(),
                kind: ExternalKind::Vector,
                pixel_dimensions: frame.pixel_dimensions_for(resolution),
                resolution,
            }),
            LayerContent::Embedded => outputs.push(LayerOutput::External {
                layer: layer.name.clone(),
                kind: ExternalKind::Embedded,
                pixel_dimensions: frame.pixel_dimensions_for(resolution),
                resolution,
            }),
        }
    }

    LayerReport { outputs, failures }
}

async fn raster_layer(
    frame: &MapFrame,
    layer: &LayerSpec,
    constraints: &GridConstraints,
    resolution: f64,
    fetcher: Arc<dyn TileFetcher>,
    reprojector: &dyn Reproject,
    options: &FetchOptions,
) -> Result<LayerOutput, LayerError> {
    let bounds = frame.bounds_in(reprojector, &layer.crs)?;
    let plan = plan_grid(&bounds, resolution, constraints)?;
    info!(
        layer = %layer.name,
        tiles = plan.tile_count(),
        zoom = ?plan.zoom,
        resolution = plan.resolution,
        "downloading layer"
    );

    let tiles = retrieve(&plan, fetcher, options).await?;

    // Direct compositing is only geo-correct when nothing needs warping:
    // an unrotated frame fed from a same-CRS service. Everything else
    // hands individually registered tiles to the external warp.
    if frame.rotation_deg() == 0.0 && layer.crs == *frame.projection() {
        let mosaic = MosaicAssembler::new(&plan).assemble(&tiles)?;
        Ok(LayerOutput::Raster {
            layer: layer.name.clone(),
            mosaic,
        })
    } else {
        let registrations = MosaicAssembler::new(&plan).georegister();
        Ok(LayerOutput::Warp {
            layer: layer.name.clone(),
            plan,
            tiles,
            registrations,
        })
    }
}
