//! Error taxonomy for scene operations
//!
//! Missing files, themes and scene types are `NotFound`; a missing graphics
//! device or other required service is `InvalidState`; the view-frustum
//! visibility test reports `NotImplemented` instead of guessing.

use crate::content::ContentError;
use crate::theme::ThemeError;
use thiserror::Error;

/// Errors raised by scenes, layers and the scene director
#[derive(Error, Debug)]
pub enum SceneError {
    /// A referenced scene type, scene or resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A required device or service is missing
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The operation has no implementation
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    /// A scene factory rejected its arguments
    #[error("Failed to construct scene '{type_name}': {reason}")]
    Construction {
        /// Registered name of the scene type
        type_name: String,
        /// Why construction failed
        reason: String,
    },

    /// Content loading failed
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    /// Theme loading failed
    #[error("Theme error: {0}")]
    Theme(#[from] ThemeError),
}

impl SceneError {
    /// Construction failure for a scene type
    pub fn construction(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        SceneError::Construction {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }
}
