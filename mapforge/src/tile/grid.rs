//! Fixed-tile-size partition with crop margins.
//!
//! The scheme used by REST image-export services with maximum-request-size
//! limits: the canvas is partitioned into usable spans of at most
//! `max_tile_size − margins` pixels, and each request is expanded by the
//! margins so that adjacent tiles overlap only within pixels that are
//! cropped away after download.

use crate::geometry::{GeoBounds, Point};

use super::{PlanError, TileDescriptor, TileGridPlan};

/// Usable pixel spans along one axis: every span is the full usable tile
/// size except the last, which absorbs the remainder.
fn usable_spans(total: u64, usable: u64) -> Vec<u64> {
    let full = ((total - 1) / usable) as usize;
    let mut spans = vec![usable; full];
    spans.push(1 + (total - 1) % usable);
    spans
}

/// Offsets of each span: cumulative sum of the preceding spans.
fn span_offsets(spans: &[u64]) -> Vec<u64> {
    let mut offsets = Vec::with_capacity(spans.len());
    let mut acc = 0;
    for span in spans {
        offsets.push(acc);
        acc += span;
    }
    offsets
}

/// Partitions `bounds` at `resolution` into tiles no larger than
/// `max_tile_size`, with `crop_margins` of overlap per axis
/// (((left, right), (top, bottom)), in pixels).
///
/// Tiles are emitted row-major from the north-west corner. Margin
/// expansion is clamped at the grid's outer edges so no request exceeds
/// the full bounds.
pub fn plan_fixed_grid(
    bounds: &GeoBounds,
    resolution: f64,
    max_tile_size: (u32, u32),
    crop_margins: ((u32, u32), (u32, u32)),
) -> Result<TileGridPlan, PlanError> {
    if !(resolution > 0.0) {
        return Err(PlanError::InvalidResolution(resolution));
    }
    if !(bounds.width() > 0.0 && bounds.height() > 0.0) {
        return Err(PlanError::EmptyBounds);
    }

    let ((left, right), (top, bottom)) = crop_margins;
    let usable_width = max_tile_size.0 as i64 - left as i64 - right as i64;
    let usable_height = max_tile_size.1 as i64 - top as i64 - bottom as i64;
    if usable_width <= 0 {
        return Err(PlanError::NoUsableTileSize("x"));
    }
    if usable_height <= 0 {
        return Err(PlanError::NoUsableTileSize("y"));
    }

    let canvas_width = (bounds.width() / resolution).ceil() as u64;
    let canvas_height = (bounds.height() / resolution).ceil() as u64;

    let column_spans = usable_spans(canvas_width, usable_width as u64);
    let row_spans = usable_spans(canvas_height, usable_height as u64);
    let column_offsets = span_offsets(&column_spans);
    let row_offsets = span_offsets(&row_spans);

    let mut tiles = Vec::with_capacity(column_spans.len() * row_spans.len());
    for (row, (&row_span, &row_offset)) in row_spans.iter().zip(&row_offsets).enumerate() {
        for (column, (&column_span, &column_offset)) in
            column_spans.iter().zip(&column_offsets).enumerate()
        {
            // Margins apply between tiles only; the outer edges of the
            // grid stay clamped to the requested bounds.
            let crop_left = if column == 0 { 0 } else { left };
            let crop_right = if column == column_spans.len() - 1 { 0 } else { right };
            let crop_top = if row == 0 { 0 } else { top };
            let crop_bottom = if row == row_spans.len() - 1 { 0 } else { bottom };

            let west = bounds.min.x + (column_offset as f64 - crop_left as f64) * resolution;
            let east = bounds.min.x
                + ((column_offset + column_span) as f64 + crop_right as f64) * resolution;
            let north = bounds.max.y - (row_offset as f64 - crop_top as f64) * resolution;
            let south = bounds.max.y
                - ((row_offset + row_span) as f64 + crop_bottom as f64) * resolution;

            tiles.push(TileDescriptor {
                geo_bounds: GeoBounds::new(Point::new(west, south), Point::new(east, north)),
                pixel_size: (
                    column_span as u32 + crop_left + crop_right,
                    row_span as u32 + crop_top + crop_bottom,
                ),
                pixel_offset: (column_offset as u32, row_offset as u32),
                crop: ((crop_left, crop_right), (crop_top, crop_bottom)),
                resolution,
            });
        }
    }

    Ok(TileGridPlan {
        tiles,
        canvas_size: (canvas_width as u32, canvas_height as u32),
        canvas_origin: Point::new(bounds.min.x, bounds.max.y),
        resolution,
        zoom: None,
        over_budget: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bounds_for_pixels(width: u64, height: u64, resolution: f64) -> GeoBounds {
        GeoBounds::new(
            Point::new(0.0, 0.0),
            Point::new(width as f64 * resolution, height as f64 * resolution),
        )
    }

    #[test]
    fn test_export_service_partition() {
        // 5000x3000 canvas under a 2048-px request limit: 3x2 tiles, the
        // last column and row absorbing the remainders.
        let bounds = bounds_for_pixels(5000, 3000, 2.0);
        let plan = plan_fixed_grid(&bounds, 2.0, (2048, 2048), ((0, 0), (0, 0))).unwrap();

        assert_eq!(plan.tile_count(), 6);
        assert_eq!(plan.canvas_size, (5000, 3000));

        let widths: Vec<u32> = plan.tiles[..3].iter().map(|t| t.pixel_size.0).collect();
        assert_eq!(widths, vec![2048, 2048, 904]);
        let heights: Vec<u32> = plan
            .tiles
            .iter()
            .step_by(3)
            .map(|t| t.pixel_size.1)
            .collect();
        assert_eq!(heights, vec![2048, 952]);
    }

    #[test]
    fn test_usable_sizes_sum_to_canvas() {
        let bounds = bounds_for_pixels(5000, 3000, 4.0);
        let plan = plan_fixed_grid(&bounds, 4.0, (1024, 768), ((16, 16), (8, 8))).unwrap();

        let row_width: u32 = plan
            .tiles
            .iter()
            .filter(|t| t.pixel_offset.1 == 0)
            .map(|t| t.usable_size().0)
            .sum();
        assert_eq!(row_width, 5000);

        let column_height: u32 = plan
            .tiles
            .iter()
            .filter(|t| t.pixel_offset.0 == 0)
            .map(|t| t.usable_size().1)
            .sum();
        assert_eq!(column_height, 3000);
    }

    #[test]
    fn test_margins_overlap_between_tiles_only() {
        let bounds = bounds_for_pixels(3000, 1000, 1.0);
        let plan = plan_fixed_grid(&bounds, 1.0, (1024, 1024), ((32, 32), (0, 0))).unwrap();

        let first = &plan.tiles[0];
        let second = &plan.tiles[1];
        assert_eq!(first.crop.0, (0, 32));
        assert_eq!(second.crop.0, (32, 32));

        // The overlap between adjacent requests is exactly the two
        // margins meeting at their shared boundary.
        assert_relative_eq!(
            first.geo_bounds.max.x - second.geo_bounds.min.x,
            64.0,
            epsilon = 1e-9
        );

        // Outer edges stay clamped to the requested bounds.
        assert_relative_eq!(first.geo_bounds.min.x, bounds.min.x);
        let last = plan.tiles.last().unwrap();
        assert_relative_eq!(last.geo_bounds.max.x, bounds.max.x, epsilon = 1e-9);
    }

    #[test]
    fn test_usable_spans_tile_bounds_contiguously() {
        // Usable spans must cover the bounds exactly: no gaps, no overlap.
        let bounds = bounds_for_pixels(2500, 2200, 2.5);
        let plan = plan_fixed_grid(&bounds, 2.5, (1000, 1000), ((10, 10), (10, 10))).unwrap();

        let mut row: Vec<&TileDescriptor> = plan
            .tiles
            .iter()
            .filter(|t| t.pixel_offset.1 == 0)
            .collect();
        row.sort_by_key(|t| t.pixel_offset.0);
        for pair in row.windows(2) {
            let left_usable_east = pair[0].geo_bounds.max.x - pair[0].crop.0 .1 as f64 * 2.5;
            let right_usable_west = pair[1].geo_bounds.min.x + pair[1].crop.0 .0 as f64 * 2.5;
            assert_relative_eq!(left_usable_east, right_usable_west, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_pixel_roundtrip_within_one_pixel() {
        let resolution = 2.0;
        let bounds = bounds_for_pixels(4100, 3100, resolution);
        let plan = plan_fixed_grid(&bounds, resolution, (2048, 2048), ((16, 16), (16, 16))).unwrap();

        for tile in &plan.tiles {
            // The usable region's west/north edge, projected to pixels
            // from the canvas origin, must round-trip to the offset.
            let usable_west = tile.geo_bounds.min.x + tile.crop.0 .0 as f64 * resolution;
            let usable_north = tile.geo_bounds.max.y - tile.crop.1 .0 as f64 * resolution;
            let col = (usable_west - plan.canvas_origin.x) / resolution;
            let row = (plan.canvas_origin.y - usable_north) / resolution;
            assert!((col - tile.pixel_offset.0 as f64).abs() < 1.0);
            assert!((row - tile.pixel_offset.1 as f64).abs() < 1.0);
        }
    }

    #[test]
    fn test_single_tile_when_under_limit() {
        let bounds = bounds_for_pixels(500, 400, 1.0);
        let plan = plan_fixed_grid(&bounds, 1.0, (2048, 2048), ((64, 64), (64, 64))).unwrap();
        assert_eq!(plan.tile_count(), 1);
        let tile = &plan.tiles[0];
        assert_eq!(tile.pixel_size, (500, 400));
        assert_eq!(tile.crop, ((0, 0), (0, 0)));
        assert_eq!(tile.pixel_offset, (0, 0));
    }

    #[test]
    fn test_rejects_consuming_margins() {
        let bounds = bounds_for_pixels(100, 100, 1.0);
        let result = plan_fixed_grid(&bounds, 1.0, (64, 64), ((32, 32), (0, 0)));
        assert!(matches!(result, Err(PlanError::NoUsableTileSize("x"))));
    }

    #[test]
    fn test_rejects_empty_bounds() {
        let bounds = GeoBounds::new(Point::new(5.0, 5.0), Point::new(5.0, 10.0));
        assert!(matches!(
            plan_fixed_grid(&bounds, 1.0, (256, 256), ((0, 0), (0, 0))),
            Err(PlanError::EmptyBounds)
        ));
    }

    #[test]
    fn test_rejects_nonpositive_resolution() {
        let bounds = bounds_for_pixels(10, 10, 1.0);
        assert!(matches!(
            plan_fixed_grid(&bounds, 0.0, (256, 256), ((0, 0), (0, 0))),
            Err(PlanError::InvalidResolution(_))
        ));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_coverage_and_positive_sizes(
                width in 1u64..6000,
                height in 1u64..6000,
                tile in 64u32..2048,
                margin in 0u32..24
            ) {
                prop_assume!(tile as i64 - 2 * margin as i64 > 0);
                let resolution = 1.5;
                let bounds = bounds_for_pixels(width, height, resolution);
                let plan = plan_fixed_grid(
                    &bounds,
                    resolution,
                    (tile, tile),
                    ((margin, margin), (margin, margin)),
                ).unwrap();

                let coverage = plan.coverage().unwrap();
                prop_assert!(coverage.min.x <= bounds.min.x + 1e-9);
                prop_assert!(coverage.max.x >= bounds.max.x - 1e-9);
                prop_assert!(coverage.min.y <= bounds.min.y + 1e-9);
                prop_assert!(coverage.max.y >= bounds.max.y - 1e-9);

                for t in &plan.tiles {
                    prop_assert!(t.pixel_size.0 > 0 && t.pixel_size.1 > 0);
                    prop_assert!(t.usable_size().0 > 0 && t.usable_size().1 > 0);
                }

                let total: u64 = plan.tiles.iter()
                    .filter(|t| t.pixel_offset.1 == 0)
                    .map(|t| t.usable_size().0 as u64)
                    .sum();
                prop_assert_eq!(total, width);
            }
        }
    }
}
