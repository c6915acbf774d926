//! Content caches
//!
//! Every scene names a content manager; textures loaded through it are
//! decoded once and shared until the scene is destroyed and the manager
//! released.

mod manager;

pub use manager::{ContentManager, ContentManagers, TextureLoad};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading content
#[derive(Error, Debug)]
pub enum ContentError {
    /// The file does not exist
    #[error("{} cannot be found", path.display())]
    NotFound {
        /// Requested path
        path: PathBuf,
    },

    /// The file exists but could not be decoded
    #[error("Failed to decode {}: {reason}", path.display())]
    Decode {
        /// File being decoded
        path: PathBuf,
        /// Decoder message
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The background loader stopped without reporting a result
    #[error("Loading {} was interrupted", path.display())]
    LoadInterrupted {
        /// File being loaded
        path: PathBuf,
    },
}
