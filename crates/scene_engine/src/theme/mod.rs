//! Themes - named bundles of textures, animations and sounds
//!
//! A theme is a RON manifest (`<name>.rft`) somewhere under the theme
//! directory. The [`ThemeIndex`] remembers where every manifest lives so a
//! theme can be loaded by name or alias without scanning the directory again;
//! [`ThemeLibrary`] loads a theme's content and answers lookups by name.

mod index;
mod library;
mod manifest;

pub use index::{ThemeIndex, ThemeIndexEntry};
pub use library::{AnimationInfo, ThemeLibrary, THEME_CONTENT_MANAGER};
pub use manifest::{
    ContentCollection, ContentEntry, ContentType, EntryProperties, FrameProperties, GraphicsSupportLevel,
    ThemeHeader, ThemeManifest,
};

use std::path::PathBuf;
use thiserror::Error;

use crate::content::ContentError;

/// Errors raised while indexing or loading themes
#[derive(Error, Debug)]
pub enum ThemeError {
    /// No indexed theme has this name or alias
    #[error("Theme not found: {0}")]
    NotFound(String),

    /// A manifest or index file is malformed
    #[error("Failed to parse {}: {reason}", path.display())]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Theme content failed to load
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    /// The index could not be written
    #[error("Serialization error: {0}")]
    Serialize(String),
}
