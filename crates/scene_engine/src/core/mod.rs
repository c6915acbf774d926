//! # Core Engine Module
//!
//! Shared abstractions the rest of the engine depends on.
//!
//! ## Organization
//!
//! - **Config**: Unified configuration for logging, content and cameras
//! - **Error**: The error taxonomy surfaced by scene operations
//! - **Services**: The explicit engine context passed into every scene hook

pub mod config;
pub mod error;
pub mod services;

// Re-export foundation modules for convenience
pub use crate::foundation;

// Re-export commonly used types
pub use config::{CameraConfig, Config, ConfigError, ContentConfig, EngineConfig};
pub use error::SceneError;
pub use services::{EngineServices, ProgressCallback};
