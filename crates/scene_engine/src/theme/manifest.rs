//! Theme manifest format
//!
//! ```ron
//! (
//!     header: (name: "Classic", alias: "classic", supports: "LOW | MEDIUM"),
//!     collections: [
//!         (kind: Graphics, entries: [
//!             (name: "Note", location: "note.png", properties: (right: 0.5)),
//!         ]),
//!     ],
//! )
//! ```

use std::path::{Path, PathBuf};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::graphics::TextureInfo;
use crate::theme::ThemeError;

bitflags! {
    /// Graphics quality levels a theme provides content for
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct GraphicsSupportLevel: u8 {
        /// Low detail
        const LOW = 0x01;
        /// Medium detail
        const MEDIUM = 0x02;
        /// High detail
        const HIGH = 0x04;
        /// Everything on
        const EXTREME = 0x08;
    }
}

fn default_version() -> f32 {
    1.0
}

/// Identity of a theme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeHeader {
    /// Theme name
    pub name: String,
    /// Alternative name the theme can be loaded by
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alias: String,
    /// Manifest version
    #[serde(default = "default_version")]
    pub version: f32,
    /// Quality levels covered
    #[serde(default)]
    pub supports: GraphicsSupportLevel,
}

/// Kind of content in a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    /// Fonts
    Font,
    /// Sound effects
    Sound,
    /// Textures and texture regions
    Graphics,
    /// Models
    Model,
    /// Videos
    Video,
    /// Frame animations cut from one texture
    AnimatedSprite,
}

/// Region of a texture used by one animation frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameProperties {
    /// Left texture coordinate
    pub left: f32,
    /// Top texture coordinate
    pub top: f32,
    /// Right texture coordinate
    pub right: f32,
    /// Bottom texture coordinate
    pub bottom: f32,
}

impl Default for FrameProperties {
    fn default() -> Self {
        Self { left: 0.0, top: 0.0, right: 1.0, bottom: 1.0 }
    }
}

/// Optional per-entry settings
///
/// Missing coordinates cover the whole texture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryProperties {
    /// Left texture coordinate
    pub left: f32,
    /// Top texture coordinate
    pub top: f32,
    /// Right texture coordinate
    pub right: f32,
    /// Bottom texture coordinate
    pub bottom: f32,
    /// Animation frames per second
    pub framerate: f32,
    /// Animation frames in playback order
    pub frames: Vec<FrameProperties>,
}

impl EntryProperties {
    /// Apply the entry's coordinates to a texture region
    pub fn region(&self, info: TextureInfo) -> TextureInfo {
        info.with_coordinates(self.left, self.top, self.right, self.bottom)
    }
}

impl Default for EntryProperties {
    fn default() -> Self {
        Self { left: 0.0, top: 0.0, right: 1.0, bottom: 1.0, framerate: 1.0, frames: Vec::new() }
    }
}

impl FrameProperties {
    /// Apply the frame's coordinates to a texture region
    pub fn region(&self, info: TextureInfo) -> TextureInfo {
        info.with_coordinates(self.left, self.top, self.right, self.bottom)
    }
}

/// One named piece of content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEntry {
    /// Lookup name
    pub name: String,
    /// File location relative to the manifest
    pub location: PathBuf,
    /// Coordinates and animation settings
    #[serde(default)]
    pub properties: EntryProperties,
}

/// Entries of one content type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentCollection {
    /// Content type of every entry
    pub kind: ContentType,
    /// Entries in file order
    #[serde(default)]
    pub entries: Vec<ContentEntry>,
}

/// A parsed `.rft` theme manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeManifest {
    /// Theme identity
    pub header: ThemeHeader,
    /// Content collections in file order
    #[serde(default)]
    pub collections: Vec<ContentCollection>,
}

impl ThemeManifest {
    /// Parse a manifest; `path` is only used in error messages
    pub fn parse(source: &str, path: &Path) -> Result<Self, ThemeError> {
        ron::from_str(source).map_err(|e| ThemeError::Parse { path: path.to_path_buf(), reason: e.to_string() })
    }

    /// Read and parse a manifest file
    pub fn load(path: &Path) -> Result<Self, ThemeError> {
        let source = std::fs::read_to_string(path)?;
        Self::parse(&source, path)
    }

    /// Whether `name` matches the theme's name or alias, ignoring case
    pub fn matches(&self, name: &str) -> bool {
        self.header.name.eq_ignore_ascii_case(name)
            || (!self.header.alias.is_empty() && self.header.alias.eq_ignore_ascii_case(name))
    }

    /// Every entry of one content type, across collections
    pub fn entries(&self, kind: ContentType) -> impl Iterator<Item = &ContentEntry> {
        self.collections
            .iter()
            .filter(move |collection| collection.kind == kind)
            .flat_map(|collection| collection.entries.iter())
    }
}
