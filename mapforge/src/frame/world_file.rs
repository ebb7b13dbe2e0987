//! World file parameters and I/O.
//!
//! A world file is six newline-separated reals georeferencing a raster:
//! x-scale, two rotation terms, negative y-scale, then the projected
//! coordinates of the *centre* of the top-left pixel. Pixel (col, row)
//! maps to world coordinates through the affine they define.

use std::io::Write;
use std::path::Path;

use thiserror::Error;

use crate::geometry::Point;

/// Errors reading a world file back.
#[derive(Debug, Error)]
pub enum WorldFileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("world file must contain six numbers, found {0}")]
    WrongLineCount(usize),

    #[error("unparseable world file entry: {0:?}")]
    BadNumber(String),
}

/// The six affine coefficients of a world file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldFileParams {
    /// Pixel width along x (line 1).
    pub x_scale: f64,
    /// Row rotation term (line 2).
    pub y_rotation: f64,
    /// Column rotation term (line 3).
    pub x_rotation: f64,
    /// Negative pixel height (line 4).
    pub y_scale: f64,
    /// Top-left pixel-centre x (line 5).
    pub origin_x: f64,
    /// Top-left pixel-centre y (line 6).
    pub origin_y: f64,
}

impl WorldFileParams {
    /// Builds the parameters for a raster whose top-left *corner* sits at
    /// `top_left`, with square pixels of size `resolution` and the raster
    /// rotated by `rotation_deg`. The stored origin is shifted half a
    /// pixel inward to the pixel centre.
    pub fn new(top_left: Point, resolution: f64, rotation_deg: f64) -> Self {
        let (sin, cos) = rotation_deg.to_radians().sin_cos();
        Self {
            x_scale: resolution * cos,
            y_rotation: resolution * sin,
            x_rotation: resolution * sin,
            y_scale: -resolution * cos,
            origin_x: top_left.x + 0.5 * resolution,
            origin_y: top_left.y - 0.5 * resolution,
        }
    }

    /// Maps a pixel coordinate to the working CRS. `(0, 0)` is the centre
    /// of the top-left pixel.
    pub fn pixel_to_world(&self, col: f64, row: f64) -> Point {
        Point::new(
            self.origin_x + self.x_scale * col + self.x_rotation * row,
            self.origin_y + self.y_rotation * col + self.y_scale * row,
        )
    }

    /// The six-line file layout.
    pub fn to_contents(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}\n{}\n{}\n",
            self.x_scale,
            self.y_rotation,
            self.x_rotation,
            self.y_scale,
            self.origin_x,
            self.origin_y
        )
    }

    pub fn write_to(&self, path: &Path) -> Result<(), WorldFileError> {
        let mut file = std::fs::File::create(path)?;
        file.write_all(self.to_contents().as_bytes())?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self, WorldFileError> {
        let contents = std::fs::read_to_string(path)?;
        let numbers: Vec<f64> = contents
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<f64>()
                    .map_err(|_| WorldFileError::BadNumber(token.to_string()))
            })
            .collect::<Result<_, _>>()?;
        if numbers.len() != 6 {
            return Err(WorldFileError::WrongLineCount(numbers.len()));
        }
        Ok(Self {
            x_scale: numbers[0],
            y_rotation: numbers[1],
            x_rotation: numbers[2],
            y_scale: numbers[3],
            origin_x: numbers[4],
            origin_y: numbers[5],
        })
    }
}
