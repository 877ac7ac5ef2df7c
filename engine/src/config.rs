//! Configuration types for the viewer

use crate::io::ParseOptions;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Errors that can occur while resolving or loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid asset name: {0}")]
    InvalidAssetName(String),

    #[error("Directory not found: {0:?}")]
    MissingDirectory(PathBuf),
}

/// Configuration for asset paths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Root directory for all assets
    pub asset_root: PathBuf,
    /// Directory name for model files (relative to asset_root)
    pub models_dir: String,
}

impl AssetConfig {
    /// Create a new AssetConfig with custom paths
    pub fn new(asset_root: PathBuf, models_dir: String) -> Self {
        debug!(asset_root = ?asset_root, models_dir = models_dir, "Creating new AssetConfig");
        Self {
            asset_root,
            models_dir,
        }
    }

    /// Get the full path to a model file, e.g. `"backpack.obj"`
    pub fn model_path(&self, name: &str) -> Result<PathBuf, ConfigError> {
        // Validate name to prevent path traversal
        if name.contains("..") || name.contains('/') || name.contains('\\') {
            return Err(ConfigError::InvalidAssetName(name.to_string()));
        }
        let path = self.asset_root.join(&self.models_dir).join(name);
        debug!(name = name, path = ?path, "Generated model path");
        Ok(path)
    }

    /// Check if the asset directories exist
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.asset_root.exists() {
            return Err(ConfigError::MissingDirectory(self.asset_root.clone()));
        }

        let models_path = self.asset_root.join(&self.models_dir);
        if !models_path.exists() {
            return Err(ConfigError::MissingDirectory(models_path));
        }

        Ok(())
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            models_dir: "models".to_string(),
        }
    }
}

/// Initial camera placement and tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Eye position
    pub position: Vec3,
    /// Look direction
    pub front: Vec3,
    /// Up direction
    pub up: Vec3,
    /// Movement speed in units per second
    pub speed: f32,
    /// Mouse sensitivity in degrees per input unit
    pub sensitivity: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            speed: crate::core::camera::DEFAULT_SPEED,
            sensitivity: crate::core::camera::DEFAULT_SENSITIVITY,
        }
    }
}

/// Top-level viewer configuration, stored as JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Asset locations
    #[serde(default)]
    pub assets: AssetConfig,
    /// Initial camera
    #[serde(default)]
    pub camera: CameraSettings,
    /// Preprocessing flags passed to the scene parser
    #[serde(default)]
    pub import: ParseOptions,
}

impl ViewerConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        info!(path = ?path, "Loaded viewer config");
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
