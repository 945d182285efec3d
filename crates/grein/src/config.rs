//! Scene configuration.
//!
//! Loaded from JSON. Every field is optional; missing fields take their
//! defaults, so `{}` is a valid config.
//!
//! ```json
//! {
//!     "main_camera_tag": "MainCamera",
//!     "entity_capacity": 4096,
//!     "default_viewport": [1280, 720]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading a [`SceneConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Tag that marks the preferred camera for
    /// [`SceneGraph::active_camera`](crate::scene::SceneGraph::active_camera)
    /// and frame extraction.
    pub main_camera_tag: String,
    /// Entity slots and pool entries reserved up front.
    pub entity_capacity: usize,
    /// Viewport given to cameras attached through
    /// [`SceneGraph::add_camera`](crate::scene::SceneGraph::add_camera).
    pub default_viewport: (u32, u32),
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            main_camera_tag: "MainCamera".to_string(),
            entity_capacity: 0,
            default_viewport: (1920, 1080),
        }
    }
}

impl SceneConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.main_camera_tag.is_empty() {
            log::warn!("scene config has an empty main camera tag");
            return Err(ConfigError::Invalid("main_camera_tag must not be empty".into()));
        }
        let (width, height) = self.default_viewport;
        if width == 0 || height == 0 {
            log::warn!("scene config has a zero-sized viewport {width}x{height}");
            return Err(ConfigError::Invalid(format!(
                "default_viewport must be non-zero, got {width}x{height}"
            )));
        }
        Ok(())
    }
}
