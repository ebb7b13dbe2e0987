//! Helpers shared by the subcommands.

use std::path::Path;

use mapforge::config::MapConfig;
use mapforge::geometry::Point;
use mapforge::proj::KrugerReprojector;
use mapforge::MapFrame;

use crate::error::CliError;

/// Loads the run configuration: defaults deep-merged with the file's
/// overrides.
pub fn load_config(path: &Path) -> Result<MapConfig, CliError> {
    let yaml = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(path.display().to_string(), e))?;
    Ok(MapConfig::from_overrides(&yaml)?)
}

/// Reads a plain points file: one `longitude latitude` pair per line,
/// `#` comments and blank lines ignored.
pub fn read_points(path: &Path) -> Result<Vec<Point>, CliError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(path.display().to_string(), e))?;
    let mut points = Vec::new();
    for (number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(lon), Some(lat)) = (fields.next(), fields.next()) else {
            return Err(CliError::Usage(format!(
                "line {} of {}: expected \"longitude latitude\"",
                number + 1,
                path.display()
            )));
        };
        let (Ok(lon), Ok(lat)) = (lon.parse::<f64>(), lat.parse::<f64>()) else {
            return Err(CliError::Usage(format!(
                "line {} of {}: unparseable coordinates {:?}",
                number + 1,
                path.display(),
                line
            )));
        };
        points.push(Point::new(lon, lat));
    }
    if points.is_empty() {
        return Err(CliError::Usage(format!(
            "{} contains no points",
            path.display()
        )));
    }
    Ok(points)
}

/// Builds the frame from configuration plus an optional points file,
/// choosing the construction mode by which inputs are present.
pub fn build_frame(config: &MapConfig, points: Option<&Path>) -> Result<MapFrame, CliError> {
    let reprojector = KrugerReprojector::new();
    let builder = config.frame_builder()?;

    if let Some(points_path) = points {
        let points = read_points(points_path)?;
        return Ok(builder.from_points(&reprojector, &points)?);
    }
    if let (Some(size), Some(centre)) = (config.size, config.centre) {
        return Ok(builder.from_size(
            &reprojector,
            Point::new(centre[0], centre[1]),
            (size[0], size[1]),
        )?);
    }
    if let (Some(longitudes), Some(latitudes)) = (config.longitudes, config.latitudes) {
        return Ok(builder.from_geographic_extremes(
            &reprojector,
            (longitudes[0], longitudes[1]),
            (latitudes[0], latitudes[1]),
        )?);
    }

    Err(CliError::Usage(
        "map extent must be provided as a points file, size/centre, or longitudes/latitudes"
            .to_string(),
    ))
}
