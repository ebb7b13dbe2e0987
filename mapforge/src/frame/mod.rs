//! Map frame: the map's geometric identity.
//!
//! A [`MapFrame`] owns the projected centre, extents, rotation, and derived
//! bounds of the map being produced, and converts between projected space,
//! pixel space, world-file space, and the frame's own rotated drawing
//! space. Frames are built once per run by [`FrameBuilder`] (from an
//! explicit real-world size, from explicit extreme coordinates, or by
//! auto-fitting a point cloud) and are immutable afterwards.

mod world_file;

pub use world_file::{WorldFileError, WorldFileParams};

use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::geometry::{minimum_bounding_box, GeoBounds, Point};
use crate::proj::{Crs, ProjError, Reproject};

/// Metres per inch; converts scale and ppi into ground resolution.
const METRES_PER_INCH: f64 = 0.0254;

/// Errors constructing or querying a map frame.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Rotation outside ±45°.
    #[error("map rotation must be between -45 and +45 degrees, got {0}")]
    RotationOutOfRange(f64),

    /// Auto-rotation combined with an explicit map size.
    #[error("cannot specify map size and auto-rotation together")]
    AutoRotationWithSize,

    /// The supplied point set cannot form a bounding rectangle.
    #[error("point set is degenerate: cannot derive map extents")]
    DegenerateGeometry,

    /// No points were supplied at all.
    #[error("no points supplied for map bounds")]
    EmptyPointSet,

    /// Map size must be strictly positive on both axes.
    #[error("invalid map size: {0}x{1} mm")]
    InvalidSize(f64, f64),

    #[error(transparent)]
    Proj(#[from] ProjError),
}

/// Requested frame rotation: a fixed angle, or fitted by the minimal-area
/// bounding rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Rotation {
    #[default]
    North,
    Fixed(f64),
    Auto,
}

/// Builder for [`MapFrame`], selecting a construction mode by which
/// terminal method is called.
#[derive(Clone, Debug)]
pub struct FrameBuilder {
    name: String,
    scale: f64,
    rotation: Rotation,
    margin_mm: Option<f64>,
    projection: Option<Crs>,
    use_utm: bool,
}

impl FrameBuilder {
    /// `scale` is the map's representative fraction denominator (1:scale).
    pub fn new(name: impl Into<String>, scale: f64) -> Self {
        Self {
            name: name.into(),
            scale,
            rotation: Rotation::North,
            margin_mm: None,
            projection: None,
            use_utm: false,
        }
    }

    /// Fixed rotation in degrees, bounded by ±45°.
    pub fn rotation_deg(mut self, degrees: f64) -> Self {
        self.rotation = Rotation::Fixed(degrees);
        self
    }

    /// Fit rotation with the minimum-area bounding rectangle.
    pub fn auto_rotation(mut self) -> Self {
        self.rotation = Rotation::Auto;
        self
    }

    /// Margin added to both ends of each extent, in real-world
    /// millimetres at the map scale. Applied in every construction mode
    /// when set; construction mode never implies a margin.
    pub fn margin_mm(mut self, millimetres: f64) -> Self {
        self.margin_mm = Some(millimetres);
        self
    }

    /// Overrides the working projection. By default a transverse Mercator
    /// centred on the input data is used.
    pub fn working_projection(mut self, projection: Crs) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Selects the UTM zone containing the map centre as the working
    /// projection.
    pub fn utm_working_projection(mut self) -> Self {
        self.use_utm = true;
        self
    }

    /// Explicit size mode: WGS84 centre plus sheet size in millimetres.
    pub fn from_size(
        self,
        reprojector: &dyn Reproject,
        centre_wgs84: Point,
        size_mm: (f64, f64),
    ) -> Result<MapFrame, FrameError> {
        if !(size_mm.0 > 0.0 && size_mm.1 > 0.0) {
            return Err(FrameError::InvalidSize(size_mm.0, size_mm.1));
        }
        let rotation = match self.rotation {
            Rotation::Auto => return Err(FrameError::AutoRotationWithSize),
            Rotation::Fixed(degrees) => validated_rotation(degrees)?,
            Rotation::North => 0.0,
        };

        let projection = self.working_projection_for(centre_wgs84);
        let centre = reprojector.reproject_point(&Crs::wgs84(), &projection, centre_wgs84)?;
        let mut extents = (
            size_mm.0 * 0.001 * self.scale,
            size_mm.1 * 0.001 * self.scale,
        );
        self.apply_margin(&mut extents);

        Ok(MapFrame::assemble(
            self.name, self.scale, projection, centre, extents, rotation,
        ))
    }

    /// Explicit bounds mode, geographic: extreme longitudes and latitudes.
    pub fn from_geographic_extremes(
        self,
        reprojector: &dyn Reproject,
        longitudes: (f64, f64),
        latitudes: (f64, f64),
    ) -> Result<MapFrame, FrameError> {
        let corners = [
            Point::new(longitudes.0, latitudes.0),
            Point::new(longitudes.0, latitudes.1),
            Point::new(longitudes.1, latitudes.0),
            Point::new(longitudes.1, latitudes.1),
        ];
        self.from_points(reprojector, &corners)
    }

    /// Explicit bounds mode, projected: extreme eastings and northings in
    /// the given CRS.
    pub fn from_projected_extremes(
        self,
        reprojector: &dyn Reproject,
        crs: &Crs,
        eastings: (f64, f64),
        northings: (f64, f64),
    ) -> Result<MapFrame, FrameError> {
        let corners = [
            Point::new(eastings.0, northings.0),
            Point::new(eastings.0, northings.1),
            Point::new(eastings.1, northings.0),
            Point::new(eastings.1, northings.1),
        ];
        let wgs84_corners = reprojector.reproject(crs, &Crs::wgs84(), &corners)?;
        self.from_points(reprojector, &wgs84_corners)
    }

    /// Auto-fit mode: fit the frame to an unordered WGS84 point cloud,
    /// with fixed or auto rotation.
    pub fn from_points(
        self,
        reprojector: &dyn Reproject,
        wgs84_points: &[Point],
    ) -> Result<MapFrame, FrameError> {
        if wgs84_points.is_empty() {
            return Err(FrameError::EmptyPointSet);
        }

        let wgs84_bounds =
            GeoBounds::around(wgs84_points).expect("non-empty point set always has bounds");
        let projection = self.working_projection_for(wgs84_bounds.centre());
        let projected = reprojector.reproject(&Crs::wgs84(), &projection, wgs84_points)?;

        let (centre, mut extents, rotation) = match self.rotation {
            Rotation::Auto => {
                let rect = minimum_bounding_box(&projected).with_quarter_rotation();
                (rect.centre, rect.dimensions, rect.rotation.to_degrees())
            }
            fixed => {
                let degrees = match fixed {
                    Rotation::Fixed(degrees) => validated_rotation(degrees)?,
                    _ => 0.0,
                };
                let radians = degrees.to_radians();
                let rotated: Vec<Point> =
                    projected.iter().map(|p| p.rotate(-radians)).collect();
                let local =
                    GeoBounds::around(&rotated).expect("non-empty point set always has bounds");
                let centre = local.centre().rotate(radians);
                (centre, (local.width(), local.height()), degrees)
            }
        };

        self.apply_margin(&mut extents);
        if extents.0 <= 0.0 || extents.1 <= 0.0 {
            return Err(FrameError::DegenerateGeometry);
        }

        Ok(MapFrame::assemble(
            self.name, self.scale, projection, centre, extents, rotation,
        ))
    }

    fn working_projection_for(&self, centre_wgs84: Point) -> Crs {
        if let Some(projection) = &self.projection {
            projection.clone()
        } else if self.use_utm {
            Crs::utm(Crs::utm_zone_for(centre_wgs84), centre_wgs84.y < 0.0)
        } else {
            Crs::transverse_mercator(centre_wgs84.x, 1.0)
        }
    }

    fn apply_margin(&self, extents: &mut (f64, f64)) {
        if let Some(margin) = self.margin_mm {
            let ground = 2.0 * margin * 0.001 * self.scale;
            extents.0 += ground;
            extents.1 += ground;
        }
    }
}

fn validated_rotation(degrees: f64) -> Result<f64, FrameError> {
    if degrees.abs() <= 45.0 {
        Ok(degrees)
    } else {
        Err(FrameError::RotationOutOfRange(degrees))
    }
}

/// The affine placing projected coordinates into the frame's rotated
/// drawing space. Input points are given in projected units relative to
/// the bounds envelope's top-left corner with y increasing downward;
/// output is in millimetres on the final (unrotated) canvas, where the
/// rotated frame rectangle's corners land exactly on the canvas edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalTransform {
    /// Millimetres.
    pub translate: (f64, f64),
    pub rotate_deg: f64,
    /// Millimetres per projected unit.
    pub scale: f64,
}

impl LocalTransform {
    pub fn apply(&self, local: Point) -> Point {
        let scaled = local.scale(self.scale);
        let (sin, cos) = self.rotate_deg.to_radians().sin_cos();
        Point::new(
            cos * scaled.x - sin * scaled.y + self.translate.0,
            sin * scaled.x + cos * scaled.y + self.translate.1,
        )
    }
}

/// The map's geometric identity: projected centre, extents, rotation, and
/// the axis-aligned bounds envelope everything downstream downloads
/// against.
#[derive(Clone, Debug)]
pub struct MapFrame {
    name: String,
    scale: f64,
    projection: Crs,
    centre: Point,
    extents: (f64, f64),
    rotation_deg: f64,
    bounds: GeoBounds,
}

impl MapFrame {
    fn assemble(
        name: String,
        scale: f64,
        projection: Crs,
        centre: Point,
        extents: (f64, f64),
        rotation_deg: f64,
    ) -> Self {
        // The envelope of the rotated extents rectangle; always at least
        // as large as the tight rectangle, and what gets downloaded.
        let radians = rotation_deg.to_radians();
        let enlarged = (
            extents.0 * radians.cos().abs() + extents.1 * radians.sin().abs(),
            extents.0 * radians.sin().abs() + extents.1 * radians.cos().abs(),
        );
        let bounds = GeoBounds::new(
            Point::new(centre.x - 0.5 * enlarged.0, centre.y - 0.5 * enlarged.1),
            Point::new(centre.x + 0.5 * enlarged.0, centre.y + 0.5 * enlarged.1),
        );
        debug!(
            name,
            scale,
            rotation_deg,
            width = extents.0,
            height = extents.1,
            "map frame assembled"
        );
        Self {
            name,
            scale,
            projection,
            centre,
            extents,
            rotation_deg,
            bounds,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn projection(&self) -> &Crs {
        &self.projection
    }

    /// Projected centre of the frame.
    pub fn centre(&self) -> Point {
        self.centre
    }

    /// Frame extents in projected units (width, height), before rotation.
    pub fn extents(&self) -> (f64, f64) {
        self.extents
    }

    pub fn rotation_deg(&self) -> f64 {
        self.rotation_deg
    }

    /// Axis-aligned envelope of the rotated frame in the working CRS.
    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    /// The frame bounds transformed into another CRS.
    pub fn bounds_in(
        &self,
        reprojector: &dyn Reproject,
        target: &Crs,
    ) -> Result<GeoBounds, ProjError> {
        reprojector.transform_bounds(&self.projection, target, &self.bounds)
    }

    /// Ground resolution in projected units per pixel at the given ppi.
    pub fn resolution_at(&self, ppi: f64) -> f64 {
        self.scale * METRES_PER_INCH / ppi
    }

    /// Canvas pixel dimensions at the given ppi (ceiling per axis).
    pub fn pixel_dimensions_at(&self, ppi: f64) -> (u32, u32) {
        self.pixel_dimensions_for(self.resolution_at(ppi))
    }

    /// Canvas pixel dimensions at an explicit resolution.
    pub fn pixel_dimensions_for(&self, resolution: f64) -> (u32, u32) {
        (
            (self.extents.0 / resolution).ceil() as u32,
            (self.extents.1 / resolution).ceil() as u32,
        )
    }

    /// Frame extents in millimetres on paper.
    pub fn extents_mm(&self) -> (f64, f64) {
        (
            1000.0 * self.extents.0 / self.scale,
            1000.0 * self.extents.1 / self.scale,
        )
    }

    /// World-file parameters for a raster covering the frame at the given
    /// resolution. The raster's top-left corner is the frame's top-left
    /// corner rotated into place.
    pub fn world_file_params(&self, resolution: f64) -> WorldFileParams {
        let rotated = Point::new(self.extents.0, self.extents.1)
            .rotate(-self.rotation_deg.to_radians());
        let top_left = Point::new(
            self.centre.x - 0.5 * rotated.x,
            self.centre.y + 0.5 * rotated.y,
        );
        WorldFileParams::new(top_left, resolution, self.rotation_deg)
    }

    /// Writes the world file sidecar for a raster at `resolution`.
    pub fn write_world_file(&self, path: &Path, resolution: f64) -> Result<(), WorldFileError> {
        self.world_file_params(resolution).write_to(path)
    }

    /// The affine mapping bounds-relative projected coordinates into the
    /// frame's drawing space (see [`LocalTransform`]). The translation is
    /// the closed-form tangent offset that puts the rotated rectangle's
    /// corners on the canvas edges.
    pub fn local_transform(&self, millimetres_per_unit: f64) -> LocalTransform {
        if self.rotation_deg == 0.0 {
            return LocalTransform {
                translate: (0.0, 0.0),
                rotate_deg: 0.0,
                scale: millimetres_per_unit,
            };
        }

        let width = 1000.0 * self.bounds.width() / self.scale;
        let height = 1000.0 * self.bounds.height() / self.scale;
        let tangent = self.rotation_deg.to_radians().tan();

        let translate = if (tangent.abs() - 1.0).abs() < 1e-9 {
            // ±45° zeroes the shared denominator below; anchor the
            // top-left frame corner directly instead.
            let radians = self.rotation_deg.to_radians();
            let corner = Point::new(-0.5 * self.extents.0, 0.5 * self.extents.1).rotate(radians);
            let local = Point::new(
                (corner.x + 0.5 * self.bounds.width()) * 1000.0 / self.scale,
                (0.5 * self.bounds.height() - corner.y) * 1000.0 / self.scale,
            );
            let rotated = Point::new(
                radians.cos() * local.x - radians.sin() * local.y,
                radians.sin() * local.x + radians.cos() * local.y,
            );
            (-rotated.x, -rotated.y)
        } else {
            let denominator = (tangent * tangent - 1.0) * (tangent * tangent + 1.0).sqrt();
            if tangent >= 0.0 {
                let y = (tangent * (height * tangent - width) / denominator).abs();
                let x = (tangent * y).abs();
                (x, -y)
            } else {
                let x = -(tangent * (height + width * tangent) / denominator).abs();
                let y = -(tangent * x).abs();
                (x, -y)
            }
        };

        LocalTransform {
            translate,
            rotate_deg: self.rotation_deg,
            scale: millimetres_per_unit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::KrugerReprojector;
    use approx::assert_relative_eq;

    fn reprojector() -> KrugerReprojector {
        KrugerReprojector::new()
    }

    #[test]
    fn test_from_size_extents() {
        let frame = FrameBuilder::new("map", 25_000.0)
            .from_size(&reprojector(), Point::new(151.0, -33.5), (400.0, 300.0))
            .unwrap();
        // 400 mm at 1:25000 = 10 km.
        assert_relative_eq!(frame.extents().0, 10_000.0);
        assert_relative_eq!(frame.extents().1, 7_500.0);
        assert_eq!(frame.rotation_deg(), 0.0);
    }

    #[test]
    fn test_from_size_rejects_auto_rotation() {
        let result = FrameBuilder::new("map", 25_000.0)
            .auto_rotation()
            .from_size(&reprojector(), Point::new(151.0, -33.5), (400.0, 300.0));
        assert!(matches!(result, Err(FrameError::AutoRotationWithSize)));
    }

    #[test]
    fn test_rotation_bounds_enforced() {
        let result = FrameBuilder::new("map", 25_000.0)
            .rotation_deg(50.0)
            .from_size(&reprojector(), Point::new(151.0, -33.5), (400.0, 300.0));
        assert!(matches!(result, Err(FrameError::RotationOutOfRange(_))));
    }

    #[test]
    fn test_bounds_envelope_unrotated_equals_extents() {
        let frame = FrameBuilder::new("map", 25_000.0)
            .from_size(&reprojector(), Point::new(151.0, -33.5), (400.0, 300.0))
            .unwrap();
        assert_relative_eq!(frame.bounds().width(), 10_000.0, epsilon = 1e-6);
        assert_relative_eq!(frame.bounds().height(), 7_500.0, epsilon = 1e-6);
    }

    #[test]
    fn test_bounds_envelope_grows_with_rotation() {
        let frame = FrameBuilder::new("map", 25_000.0)
            .rotation_deg(30.0)
            .from_size(&reprojector(), Point::new(151.0, -33.5), (400.0, 300.0))
            .unwrap();
        let radians = 30.0_f64.to_radians();
        let expected_width = 10_000.0 * radians.cos() + 7_500.0 * radians.sin();
        let expected_height = 10_000.0 * radians.sin() + 7_500.0 * radians.cos();
        assert_relative_eq!(frame.bounds().width(), expected_width, epsilon = 1e-6);
        assert_relative_eq!(frame.bounds().height(), expected_height, epsilon = 1e-6);
        assert!(frame.bounds().width() > frame.extents().0);
    }

    #[test]
    fn test_auto_fit_fixed_rotation() {
        // A rectangle of points tilted by 20°: with the same fixed
        // rotation the fitted extents recover the untilted size.
        let reproj = reprojector();
        let working = Crs::transverse_mercator(151.0, 1.0);
        let radians = 20.0_f64.to_radians();
        let centre = reproj
            .reproject_point(&Crs::wgs84(), &working, Point::new(151.0, -33.5))
            .unwrap();
        let projected: Vec<Point> = [(-2_000.0, -1_000.0), (2_000.0, -1_000.0), (2_000.0, 1_000.0), (-2_000.0, 1_000.0)]
            .iter()
            .map(|&(x, y)| Point::new(x, y).rotate(radians).add(centre))
            .collect();
        let wgs84_points = reproj
            .reproject(&working, &Crs::wgs84(), &projected)
            .unwrap();

        let frame = FrameBuilder::new("map", 25_000.0)
            .rotation_deg(20.0)
            .working_projection(working)
            .from_points(&reproj, &wgs84_points)
            .unwrap();

        assert_relative_eq!(frame.extents().0, 4_000.0, epsilon = 0.5);
        assert_relative_eq!(frame.extents().1, 2_000.0, epsilon = 0.5);
        assert_relative_eq!(frame.centre().x, centre.x, epsilon = 0.5);
        assert_relative_eq!(frame.centre().y, centre.y, epsilon = 0.5);
    }

    #[test]
    fn test_auto_fit_auto_rotation() {
        let reproj = reprojector();
        let working = Crs::transverse_mercator(151.0, 1.0);
        let radians = 15.0_f64.to_radians();
        let centre = reproj
            .reproject_point(&Crs::wgs84(), &working, Point::new(151.0, -33.5))
            .unwrap();
        let projected: Vec<Point> = [(-3_000.0, -1_000.0), (3_000.0, -1_000.0), (3_000.0, 1_000.0), (-3_000.0, 1_000.0)]
            .iter()
            .map(|&(x, y)| Point::new(x, y).rotate(radians).add(centre))
            .collect();
        let wgs84_points = reproj
            .reproject(&working, &Crs::wgs84(), &projected)
            .unwrap();

        let frame = FrameBuilder::new("map", 25_000.0)
            .auto_rotation()
            .working_projection(working)
            .from_points(&reproj, &wgs84_points)
            .unwrap();

        assert_relative_eq!(frame.rotation_deg(), 15.0, epsilon = 0.01);
        assert_relative_eq!(frame.extents().0, 6_000.0, epsilon = 1.0);
        assert_relative_eq!(frame.extents().1, 2_000.0, epsilon = 1.0);
    }

    #[test]
    fn test_degenerate_points_need_margin() {
        let reproj = reprojector();
        let single = [Point::new(151.0, -33.5)];

        let bare = FrameBuilder::new("map", 25_000.0).from_points(&reproj, &single);
        assert!(matches!(bare, Err(FrameError::DegenerateGeometry)));

        // A margin turns a lone waypoint into a sensible box around it.
        let framed = FrameBuilder::new("map", 25_000.0)
            .margin_mm(15.0)
            .from_points(&reproj, &single)
            .unwrap();
        assert_relative_eq!(framed.extents().0, 750.0, epsilon = 1e-6);
        assert_relative_eq!(framed.extents().1, 750.0, epsilon = 1e-6);
    }

    #[test]
    fn test_resolution_and_dimensions() {
        let frame = FrameBuilder::new("map", 25_000.0)
            .from_size(&reprojector(), Point::new(151.0, -33.5), (400.0, 300.0))
            .unwrap();
        // 1:25000 at 300 ppi → 2.1166… m/px.
        let resolution = frame.resolution_at(300.0);
        assert_relative_eq!(resolution, 25_000.0 * 0.0254 / 300.0);
        let (width, height) = frame.pixel_dimensions_at(300.0);
        assert_eq!(width, (10_000.0 / resolution).ceil() as u32);
        assert_eq!(height, (7_500.0 / resolution).ceil() as u32);
    }

    #[test]
    fn test_world_file_roundtrip_unrotated() {
        let frame = FrameBuilder::new("map", 25_000.0)
            .from_size(&reprojector(), Point::new(151.0, -33.5), (400.0, 300.0))
            .unwrap();
        let resolution = frame.resolution_at(300.0);
        let params = frame.world_file_params(resolution);
        let (width, height) = frame.pixel_dimensions_for(resolution);

        // Pixel corners (half a pixel out from the stored pixel centres)
        // must land on the frame's bounds corners.
        let top_left = params.pixel_to_world(-0.5, -0.5);
        assert_relative_eq!(top_left.x, frame.bounds().min.x, epsilon = 1e-6);
        assert_relative_eq!(top_left.y, frame.bounds().max.y, epsilon = 1e-6);

        let bottom_right = params.pixel_to_world(width as f64 - 0.5, height as f64 - 0.5);
        assert_relative_eq!(bottom_right.x, frame.bounds().max.x, epsilon = resolution);
        assert_relative_eq!(bottom_right.y, frame.bounds().min.y, epsilon = resolution);
    }

    #[test]
    fn test_local_transform_identity_when_unrotated() {
        let frame = FrameBuilder::new("map", 25_000.0)
            .from_size(&reprojector(), Point::new(151.0, -33.5), (400.0, 300.0))
            .unwrap();
        let transform = frame.local_transform(1000.0 / frame.scale());
        assert_eq!(transform.translate, (0.0, 0.0));
        assert_eq!(transform.rotate_deg, 0.0);

        let mapped = transform.apply(Point::new(2_500.0, 1_250.0));
        assert_relative_eq!(mapped.x, 100.0);
        assert_relative_eq!(mapped.y, 50.0);
    }

    #[test]
    fn test_local_transform_corners_land_on_canvas() {
        for rotation in [30.0, -20.0, 10.0, 45.0, -45.0] {
            let frame = FrameBuilder::new("map", 25_000.0)
                .rotation_deg(rotation)
                .from_size(&reprojector(), Point::new(151.0, -33.5), (400.0, 300.0))
                .unwrap();
            let transform = frame.local_transform(1000.0 / frame.scale());
            let (canvas_width, canvas_height) = frame.extents_mm();
            let radians = rotation.to_radians();

            // Frame corners in bounds-relative, y-down projected units.
            let bounds = frame.bounds();
            let corners = [
                Point::new(-0.5 * frame.extents().0, 0.5 * frame.extents().1),
                Point::new(0.5 * frame.extents().0, 0.5 * frame.extents().1),
                Point::new(0.5 * frame.extents().0, -0.5 * frame.extents().1),
                Point::new(-0.5 * frame.extents().0, -0.5 * frame.extents().1),
            ];
            let expected = [
                (0.0, 0.0),
                (canvas_width, 0.0),
                (canvas_width, canvas_height),
                (0.0, canvas_height),
            ];
            for (corner, expected) in corners.iter().zip(expected.iter()) {
                let rotated = corner.rotate(radians).add(frame.centre());
                let local = Point::new(rotated.x - bounds.min.x, bounds.max.y - rotated.y);
                let mapped = transform.apply(local);
                assert_relative_eq!(mapped.x, expected.0, epsilon = 1e-6);
                assert_relative_eq!(mapped.y, expected.1, epsilon = 1e-6);
            }
        }
    }
}
