//! Minimum-area bounding rectangle by rotating calipers.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use super::{convex_hull, Point};

/// A rectangle that is not necessarily axis-aligned.
///
/// `rotation` is normalized into `[0, π/2)`; a rectangle's orientation is
/// periodic with period π/2, so any orientation has a representative in
/// that interval once the dimension pair is swapped per quarter turn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientedRect {
    pub centre: Point,
    /// (width, height), both ≥ 0.
    pub dimensions: (f64, f64),
    /// Radians, in `[0, π/2)`.
    pub rotation: f64,
}

impl OrientedRect {
    /// Normalizes rotation into `[0, π/2)`, swapping the dimension pair
    /// once per quarter turn taken.
    pub fn normalized(centre: Point, dimensions: (f64, f64), rotation: f64) -> Self {
        let quarter_turns = (rotation / FRAC_PI_2).floor();
        let rotation = rotation - quarter_turns * FRAC_PI_2;
        let dimensions = if (quarter_turns as i64).rem_euclid(2) == 1 {
            (dimensions.1, dimensions.0)
        } else {
            dimensions
        };
        Self {
            centre,
            dimensions,
            rotation,
        }
    }

    pub fn area(&self) -> f64 {
        self.dimensions.0 * self.dimensions.1
    }

    /// True when the rectangle has (near-)zero area along either axis.
    pub fn is_degenerate(&self) -> bool {
        self.dimensions.0 <= f64::EPSILON || self.dimensions.1 <= f64::EPSILON
    }

    /// The equivalent representation with rotation in `(-π/4, π/4]`,
    /// swapping the dimension pair when the normalized rotation exceeds
    /// π/4. This is the form a map frame wants, where rotation is bounded
    /// by ±45°.
    pub fn with_quarter_rotation(&self) -> Self {
        if self.rotation > FRAC_PI_4 {
            Self {
                centre: self.centre,
                dimensions: (self.dimensions.1, self.dimensions.0),
                rotation: self.rotation - FRAC_PI_2,
            }
        } else {
            *self
        }
    }
}

/// Caliper sweep state: four support vertex indices (min-x, min-y, max-x,
/// max-y at zero rotation) with their four mutually perpendicular support
/// directions, and the rotation accumulated so far. Updated by value each
/// step.
#[derive(Clone, Copy, Debug)]
struct CaliperState {
    supports: [usize; 4],
    directions: [Point; 4],
    rotation: f64,
}

impl CaliperState {
    fn new(hull: &[Point]) -> Self {
        let extreme = |cmp: fn(f64, f64) -> bool, axis: fn(&Point) -> f64| {
            let mut best = 0;
            for (index, point) in hull.iter().enumerate() {
                if cmp(axis(point), axis(&hull[best])) {
                    best = index;
                }
            }
            best
        };
        Self {
            supports: [
                extreme(|a, b| a < b, |p| p.x),
                extreme(|a, b| a < b, |p| p.y),
                extreme(|a, b| a > b, |p| p.x),
                extreme(|a, b| a > b, |p| p.y),
            ],
            directions: [
                Point::new(0.0, -1.0),
                Point::new(1.0, 0.0),
                Point::new(0.0, 1.0),
                Point::new(-1.0, 0.0),
            ],
            rotation: 0.0,
        }
    }

    /// Angle each caliper must rotate to align with its supporting hull
    /// edge; returns the minimal angle and which caliper attains it.
    fn next_alignment(&self, hull: &[Point]) -> (f64, usize) {
        let mut best = (f64::INFINITY, 0);
        for (which, (&support, &direction)) in
            self.supports.iter().zip(self.directions.iter()).enumerate()
        {
            let edge = hull[(support + 1) % hull.len()].sub(hull[support]);
            let cos = (edge.dot(direction) / edge.norm()).clamp(-1.0, 1.0);
            let angle = cos.acos();
            if angle < best.0 {
                best = (angle, which);
            }
        }
        best
    }

    fn rotated(mut self, angle: f64) -> Self {
        for direction in &mut self.directions {
            *direction = direction.rotate(angle);
        }
        self.rotation += angle;
        self
    }

    fn advanced(mut self, which: usize, hull_len: usize) -> Self {
        self.supports[which] = (self.supports[which] + 1) % hull_len;
        self
    }

    /// Candidate rectangle at the current rotation: dimensions from the
    /// opposing support pairs projected onto the caliper axes, centre from
    /// the midpoints of the rotated-frame extreme coordinates rotated back.
    fn candidate(&self, hull: &[Point]) -> OrientedRect {
        // Projections are non-negative up to rounding; clamp so a
        // degenerate hull cannot produce a negative dimension.
        let width = hull[self.supports[2]]
            .sub(hull[self.supports[0]])
            .project(self.directions[1])
            .max(0.0);
        let height = hull[self.supports[3]]
            .sub(hull[self.supports[1]])
            .project(self.directions[2])
            .max(0.0);

        let unrotated: Vec<Point> = self
            .supports
            .iter()
            .map(|&index| hull[index].rotate(-self.rotation))
            .collect();
        let centre = Point::new(
            0.5 * (unrotated[0].x + unrotated[2].x),
            0.5 * (unrotated[1].y + unrotated[3].y),
        )
        .rotate(self.rotation);

        OrientedRect::normalized(centre, (width, height), self.rotation)
    }
}

/// Computes the minimum-area bounding rectangle of a point set via
/// rotating calipers over its convex hull.
///
/// The sweep is bounded by a quarter turn; at each caliper-edge alignment
/// the candidate rectangle is evaluated and the smallest area wins, with
/// the first candidate keeping ties (deterministic by sweep order). A hull
/// with fewer than 2 distinct points yields a degenerate zero-area
/// rectangle rather than an error; callers that cannot tolerate one must
/// check [`OrientedRect::is_degenerate`].
pub fn minimum_bounding_box(points: &[Point]) -> OrientedRect {
    let hull = convex_hull(points);
    match hull.len() {
        0 => {
            return OrientedRect::normalized(Point::default(), (0.0, 0.0), 0.0);
        }
        1 => {
            return OrientedRect::normalized(hull[0], (0.0, 0.0), 0.0);
        }
        _ => {}
    }

    let mut state = CaliperState::new(&hull);
    let mut best: Option<OrientedRect> = None;

    while state.rotation < FRAC_PI_2 {
        let (angle, which) = state.next_alignment(&hull);
        if !angle.is_finite() {
            break;
        }
        state = state.rotated(angle);
        if state.rotation >= FRAC_PI_2 {
            break;
        }

        let candidate = state.candidate(&hull);
        if best.map_or(true, |rect| candidate.area() < rect.area()) {
            best = Some(candidate);
        }

        state = state.advanced(which, hull.len());
    }

    // A two-point hull aligned with an axis can run out of alignments
    // before any candidate is recorded; fall back to the axis-aligned box.
    best.unwrap_or_else(|| axis_aligned_box(&hull))
}

fn axis_aligned_box(points: &[Point]) -> OrientedRect {
    let (mut min, mut max) = (points[0], points[0]);
    for p in points {
        min = Point::new(min.x.min(p.x), min.y.min(p.y));
        max = Point::new(max.x.max(p.x), max.y.max(p.y));
    }
    OrientedRect::normalized(
        min.add(max).scale(0.5),
        (max.x - min.x, max.y - min.y),
        0.0,
    )
}
