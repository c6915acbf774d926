//! # Unified Configuration System
//!
//! All engine-level settings in one place: logging, the clear colour used by
//! the draw pass, where content and themes live, and the perspective every
//! scene camera starts with.
//!
//! ## Configuration Categories
//!
//! - **Engine Config**: logging and frame clear colour
//! - **Content Config**: content root, theme directory and theme index cache
//! - **Camera Config**: default perspective and placement of scene cameras
//!
//! Every struct is `#[serde(default)]`, so a config file only needs to name
//! the values it changes.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use crate::config::{Config, ConfigError};

/// # Camera Configuration
///
/// Perspective parameters given to the camera every scene creates for itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub field_of_view: f32,
    /// Viewport width divided by height
    pub aspect_ratio: f32,
    /// Distance to the near clipping plane
    pub near_plane: f32,
    /// Distance to the far clipping plane
    pub far_plane: f32,
    /// Z position a scene places its camera at
    pub scene_camera_z: f32,
}

impl CameraConfig {
    /// Set the field of view in degrees
    pub fn with_field_of_view(mut self, degrees: f32) -> Self {
        self.field_of_view = degrees;
        self
    }

    /// Set the aspect ratio
    pub fn with_aspect_ratio(mut self, aspect_ratio: f32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Set both clipping planes
    pub fn with_planes(mut self, near: f32, far: f32) -> Self {
        self.near_plane = near;
        self.far_plane = far;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            ("camera.field_of_view", self.field_of_view),
            ("camera.aspect_ratio", self.aspect_ratio),
            ("camera.near_plane", self.near_plane),
            ("camera.far_plane", self.far_plane),
            ("camera.scene_camera_z", self.scene_camera_z),
        ];
        for (field, value) in values {
            if !value.is_finite() {
                return Err(ConfigError::Invalid { field, reason: format!("{value} is not finite") });
            }
        }

        if self.aspect_ratio <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "camera.aspect_ratio",
                reason: "must be positive".to_string(),
            });
        }

        if self.far_plane <= self.near_plane {
            return Err(ConfigError::Invalid {
                field: "camera.far_plane",
                reason: format!("{} must exceed near plane {}", self.far_plane, self.near_plane),
            });
        }

        Ok(())
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            field_of_view: 72.0,
            aspect_ratio: 1.33,
            near_plane: 0.2,
            far_plane: 1000.0,
            scene_camera_z: 40.0,
        }
    }
}

/// # Content Configuration
///
/// Where content and theme files live on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Root directory of all game content
    pub content_root: PathBuf,
    /// Directory scanned for theme manifests
    pub theme_directory: PathBuf,
    /// File name of the theme index cache inside `theme_directory`
    pub theme_cache_file: String,
    /// Extension of theme manifest files (without the dot)
    pub theme_extension: String,
}

impl ContentConfig {
    /// Set the content root and derive the theme directory from it
    pub fn with_content_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.content_root = root.into();
        self.theme_directory = self.content_root.join("Themes");
        self
    }

    /// Full path of the theme index cache
    pub fn theme_cache_path(&self) -> PathBuf {
        self.theme_directory.join(&self.theme_cache_file)
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            content_root: PathBuf::from("Content"),
            theme_directory: PathBuf::from("Content").join("Themes"),
            theme_cache_file: "themes.rtc".to_string(),
            theme_extension: "rft".to_string(),
        }
    }
}

/// # Engine Configuration
///
/// Top-level configuration handed to [`Engine::new`](crate::Engine::new).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log filter for the engine (`env_logger` syntax)
    pub log_level: String,
    /// RGBA colour the frame is cleared to before scenes draw
    pub clear_color: [f32; 4],
    /// Content and theme locations
    pub content: ContentConfig,
    /// Default scene camera
    pub camera: CameraConfig,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            content: ContentConfig::default(),
            camera: CameraConfig::default(),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the clear colour
    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    /// Set content configuration
    pub fn with_content(mut self, content: ContentConfig) -> Self {
        self.content = content;
        self
    }

    /// Set camera configuration
    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "log_level",
                reason: "cannot be empty".to_string(),
            });
        }
        self.camera.validate()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for EngineConfig {}
