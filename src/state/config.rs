/// Viewer configuration
///
/// Read once at startup from `<config dir>/leap-undistort/config.json`.
/// Every field is optional in the file; anything missing keeps its default.
/// A missing file is not an error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where tracking frames come from
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SensorSource {
    /// Built-in generated frames, no hardware required
    #[default]
    Synthetic,
    /// JSON-lines recording of sensor frames
    Replay {
        path: PathBuf,
        #[serde(default)]
        looping: bool,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    pub window_width: f32,
    pub window_height: f32,
    /// Update/draw ticks per second
    pub frame_rate: u32,
    /// Marker radius for palms, pixels at the z = 0 plane
    pub palm_radius: f32,
    /// Marker radius for fingertips
    pub tip_radius: f32,
    /// Vertical field of view of the overlay camera, degrees
    pub field_of_view: f32,
    pub source: SensorSource,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_width: 1280.0,
            window_height: 720.0,
            frame_rate: 60,
            palm_radius: 20.0,
            tip_radius: 10.0,
            field_of_view: 60.0,
            source: SensorSource::Synthetic,
        }
    }
}

impl ViewerConfig {
    /// Load the user's config, falling back to defaults on any problem
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            log::debug!("No config directory on this platform, using defaults");
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(Some(config)) => {
                log::info!("📁 Loaded config from {}", path.display());
                config
            }
            Ok(None) => Self::default(),
            Err(err) => {
                log::warn!("{}; using defaults", err);
                Self::default()
            }
        }
    }

    /// Read a config file; `Ok(None)` when it does not exist
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        Ok(Some(Self::from_json(&json)?))
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Location of the config file:
    /// - Linux: ~/.config/leap-undistort/config.json
    /// - macOS: ~/Library/Application Support/leap-undistort/config.json
    /// - Windows: %APPDATA%\leap-undistort\config.json
    pub fn config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("leap-undistort");
        path.push("config.json");
        Some(path)
    }

    /// Time between ticks
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_rate.max(1)))
    }
}
