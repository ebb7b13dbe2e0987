//! Mosaic assembly
//!
//! Combines fetched tile images into one correctly registered raster.
//! For an unrotated frame the tiles are decoded, margin-cropped, and
//! composited directly onto a canvas; for a rotated frame each tile is
//! geo-registered individually and the set is handed to an external
//! resampling/warp step, so the assembler's only job there is to make
//! every tile's affine placement internally consistent.

use bytes::Bytes;
use image::RgbaImage;
use thiserror::Error;
use tracing::debug;

use crate::frame::WorldFileParams;
use crate::tile::{TileDescriptor, TileGridPlan};

/// Errors assembling a mosaic.
#[derive(Debug, Error)]
pub enum MosaicError {
    /// A tile's decoded pixel dimensions do not match its descriptor.
    /// Fatal for the layer: placing it anyway would silently corrupt the
    /// mosaic's georeferencing.
    #[error(
        "tile at offset ({0}, {1}) decoded to {2}x{3} pixels, descriptor says {4}x{5}",
        .offset.0, .offset.1, .actual.0, .actual.1, .expected.0, .expected.1
    )]
    SizeMismatch {
        offset: (u32, u32),
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// A tile buffer could not be decoded as an image.
    #[error("tile image could not be decoded: {0}")]
    Decode(#[from] image::ImageError),

    /// A descriptor that does not belong to the plan being assembled.
    #[error("tile at offset ({}, {}) is not part of this plan", .0.0, .0.1)]
    UnknownTile((u32, u32)),
}

/// Where a tile's usable pixels land on the destination canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Top-left corner on the canvas.
    pub offset: (u32, u32),
    /// Size after margins are cropped away.
    pub size: (u32, u32),
}

/// A tile paired with its standalone georeferencing, for the external
/// warp used when the frame is rotated.
#[derive(Clone, Debug)]
pub struct TileRegistration {
    pub descriptor: TileDescriptor,
    pub world_file: WorldFileParams,
}

/// The assembled raster with its georeferencing.
pub struct Mosaic {
    pub canvas: RgbaImage,
    pub world_file: WorldFileParams,
}

/// Assembles fetched tiles against a [`TileGridPlan`].
pub struct MosaicAssembler<'a> {
    plan: &'a TileGridPlan,
}

impl<'a> MosaicAssembler<'a> {
    pub fn new(plan: &'a TileGridPlan) -> Self {
        Self { plan }
    }

    /// Placement rectangle for every descriptor in the plan.
    pub fn placements(&self) -> Vec<Placement> {
        self.plan
            .tiles
            .iter()
            .map(|tile| Placement {
                offset: tile.pixel_offset,
                size: tile.usable_size(),
            })
            .collect()
    }

    /// Per-tile georeferencing for the rotated path: each tile gets its
    /// own world file (top-left pixel centre plus resolution), consistent
    /// with its descriptor, so the external warp needs no additional
    /// geometric reasoning.
    pub fn georegister(&self) -> Vec<TileRegistration> {
        self.plan
            .tiles
            .iter()
            .map(|&descriptor| TileRegistration {
                descriptor,
                world_file: descriptor.world_file_params(),
            })
            .collect()
    }

    /// Composites fetched tiles onto a canvas of the plan's dimensions.
    ///
    /// Tiles may arrive in any order and are keyed by descriptor, not by
    /// sequence. Each tile is decoded, its dimensions are checked against
    /// the descriptor, margins are cropped away, and the usable region is
    /// placed at its pixel offset. Within any overlap the first tile wins:
    /// a descriptor already placed is skipped. Tiles missing from `tiles`
    /// leave their region transparent.
    pub fn assemble(
        &self,
        tiles: &[(TileDescriptor, Bytes)],
    ) -> Result<Mosaic, MosaicError> {
        let (width, height) = self.plan.canvas_size;
        let mut canvas = RgbaImage::new(width, height);
        let mut placed: Vec<(u32, u32)> = Vec::with_capacity(tiles.len());

        for (descriptor, data) in tiles {
            if !self.plan.tiles.iter().any(|t| t == descriptor) {
                return Err(MosaicError::UnknownTile(descriptor.pixel_offset));
            }
            if placed.contains(&descriptor.pixel_offset) {
                continue;
            }

            let decoded = image::load_from_memory(data)?.to_rgba8();
            if decoded.dimensions() != descriptor.pixel_size {
                return Err(MosaicError::SizeMismatch {
                    offset: descriptor.pixel_offset,
                    expected: descriptor.pixel_size,
                    actual: decoded.dimensions(),
                });
            }

            let ((left, _), (top, _)) = descriptor.crop;
            let (usable_width, usable_height) = descriptor.usable_size();
            let usable =
                image::imageops::crop_imm(&decoded, left, top, usable_width, usable_height)
                    .to_image();
            image::imageops::replace(
                &mut canvas,
                &usable,
                descriptor.pixel_offset.0 as i64,
                descriptor.pixel_offset.1 as i64,
            );
            placed.push(descriptor.pixel_offset);
        }

        debug!(
            placed = placed.len(),
            planned = self.plan.tile_count(),
            "mosaic assembled"
        );

        Ok(Mosaic {
            canvas,
            world_file: WorldFileParams::new(
                self.plan.canvas_origin,
                self.plan.resolution,
                0.0,
            ),
        })
    }
}
