//! Run configuration
//!
//! An explicit configuration value: compiled-in defaults deep-merged with
//! the user's YAML overrides once at startup, then passed by value into
//! component constructors. No process-wide mutable configuration exists
//! anywhere in the crate.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::fetch::{FetchOptions, RetryPolicy};
use crate::frame::{FrameBuilder, Rotation};

/// Errors loading or interpreting configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unknown rotation setting {0:?}; expected degrees or \"auto\"")]
    InvalidRotation(String),
}

/// Rotation as configured: a number of degrees, or the keyword `auto`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RotationSetting {
    Degrees(f64),
    Keyword(String),
}

impl Default for RotationSetting {
    fn default() -> Self {
        RotationSetting::Degrees(0.0)
    }
}

impl RotationSetting {
    pub fn to_rotation(&self) -> Result<Rotation, ConfigError> {
        match self {
            RotationSetting::Degrees(degrees) => Ok(Rotation::Fixed(*degrees)),
            RotationSetting::Keyword(keyword) if keyword == "auto" => Ok(Rotation::Auto),
            RotationSetting::Keyword(other) => Err(ConfigError::InvalidRotation(other.clone())),
        }
    }
}

/// Download behaviour shared by every layer of a run.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Bounded worker pool size.
    pub concurrency: usize,
    /// Minimum milliseconds between request launches, when the service
    /// asks for politeness.
    pub interval_ms: Option<u64>,
    /// Retry attempt budget per tile.
    pub attempts: u32,
    /// Per-attempt timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            interval_ms: None,
            attempts: 8,
            timeout_secs: 30,
        }
    }
}

impl DownloadConfig {
    pub fn to_fetch_options(&self) -> FetchOptions {
        let mut options = FetchOptions::default()
            .with_retry(RetryPolicy::exponential(self.attempts))
            .with_concurrency(self.concurrency)
            .with_attempt_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(interval) = self.interval_ms {
            options = options.with_request_interval(Duration::from_millis(interval));
        }
        options
    }
}

/// Top-level run configuration.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MapConfig {
    pub name: String,
    /// Representative fraction denominator (1:scale).
    pub scale: f64,
    pub ppi: f64,
    pub rotation: RotationSetting,
    /// Margin in real-world millimetres, added in every construction
    /// mode when set.
    pub margin: Option<f64>,
    /// Use the centre's UTM zone as the working projection instead of a
    /// data-centred transverse Mercator.
    pub utm: bool,
    /// Sheet size in millimetres (explicit-size mode).
    pub size: Option<[f64; 2]>,
    /// WGS84 centre as [longitude, latitude] (explicit-size mode).
    pub centre: Option<[f64; 2]>,
    /// Extreme longitudes (explicit-bounds mode).
    pub longitudes: Option<[f64; 2]>,
    /// Extreme latitudes (explicit-bounds mode).
    pub latitudes: Option<[f64; 2]>,
    pub downloads: DownloadConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            name: "map".to_string(),
            scale: 25_000.0,
            ppi: 300.0,
            rotation: RotationSetting::default(),
            margin: Some(15.0),
            utm: false,
            size: None,
            centre: None,
            longitudes: None,
            latitudes: None,
            downloads: DownloadConfig::default(),
        }
    }
}

impl MapConfig {
    /// Parses user YAML and deep-merges it over the defaults: scalar
    /// overrides win, mappings merge recursively.
    pub fn from_overrides(yaml: &str) -> Result<Self, ConfigError> {
        let defaults = serde_yaml::to_value(MapConfig::default())?;
        let overrides: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        let merged = deep_merge(defaults, overrides);
        Ok(serde_yaml::from_value(merged)?)
    }

    /// A frame builder carrying this configuration's frame settings.
    pub fn frame_builder(&self) -> Result<FrameBuilder, ConfigError> {
        let mut builder = FrameBuilder::new(self.name.clone(), self.scale);
        builder = match self.rotation.to_rotation()? {
            Rotation::Auto => builder.auto_rotation(),
            Rotation::Fixed(degrees) => builder.rotation_deg(degrees),
            Rotation::North => builder,
        };
        if let Some(margin) = self.margin {
            builder = builder.margin_mm(margin);
        }
        if self.utm {
            builder = builder.utm_working_projection();
        }
        Ok(builder)
    }
}

/// Recursive merge: overlay mappings into base mappings, everything else
/// replaces wholesale. Null overlays are ignored so explicit defaults
/// survive absent keys.
fn deep_merge(base: serde_yaml::Value, overlay: serde_yaml::Value) -> serde_yaml::Value {
    use serde_yaml::Value;
    match (base, overlay) {
        (base, Value::Null) => base,
        (Value::Mapping(mut base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                let merged = match base.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Mapping(base)
        }
        (_, overlay) => overlay,
    }
}
