use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detection::infrastructure::onnx_blazeface_detector::DEFAULT_CONFIDENCE;
use crate::imaging::domain::image_format::ImageFormat;
use crate::shared::constants::{
    DEFAULT_ALLOWED_MIME_TYPES, DEFAULT_OUTPUT_DIR, MIN_IMAGE_HEIGHT, MIN_IMAGE_WIDTH,
    RESIZE_WIDTH,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to access config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not determine config directory")]
    NoConfigDir,
}

/// Settings for the framing pipeline.
///
/// Built once at start-up and handed to the use case; nothing reads
/// configuration from global state. Missing fields in a config file take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramingConfig {
    /// Where resized images are written.
    pub output_dir: PathBuf,
    pub allowed_mime_types: Vec<String>,
    pub min_width: u32,
    pub min_height: u32,
    /// Width accepted images are scaled to before detection.
    pub resize_width: u32,
    pub detector_confidence: f64,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|m| m.to_string())
                .collect(),
            min_width: MIN_IMAGE_WIDTH,
            min_height: MIN_IMAGE_HEIGHT,
            resize_width: RESIZE_WIDTH,
            detector_confidence: DEFAULT_CONFIDENCE,
        }
    }
}

impl FramingConfig {
    /// `<config dir>/FaceFocus/config.json`, e.g. `~/.config/FaceFocus/config.json`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|d| d.join("FaceFocus").join("config.json"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Loads the config at `path`, or defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads from `path` if given, otherwise from [`Self::default_path`].
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Self::load(&Self::default_path()?),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(io_err)
    }

    /// The upload format for `mime_type`, if it is both allow-listed and
    /// one the pipeline can handle.
    pub fn accepted_format(&self, mime_type: &str) -> Option<ImageFormat> {
        let format = ImageFormat::from_mime(mime_type)?;
        self.allowed_mime_types
            .iter()
            .filter_map(|m| ImageFormat::from_mime(m))
            .any(|allowed| allowed == format)
            .then_some(format)
    }
}
