//! Decoded textures and texture regions

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::content::ContentError;

/// Shared handle to a decoded texture
///
/// Handles compare by identity with [`Arc::ptr_eq`]; the content cache hands out
/// the same handle for every load of the same file.
pub type TextureHandle = Arc<Texture>;

/// RGBA8 texture decoded from disk
#[derive(Debug)]
pub struct Texture {
    path: PathBuf,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Texture {
    /// Decode an image file into RGBA8 pixels
    pub fn decode(path: &Path) -> Result<Self, ContentError> {
        let image = image::open(path).map_err(|e| ContentError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Self {
            path: path.to_path_buf(),
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    /// Build a texture from raw RGBA8 pixels
    pub fn from_rgba8(path: impl Into<PathBuf>, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self { path: path.into(), width, height, pixels }
    }

    /// File the texture was decoded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA8 pixel data, row major
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// A texture together with the region of it to draw
#[derive(Debug, Clone)]
pub struct TextureInfo {
    /// Texture the region belongs to
    pub texture: Option<TextureHandle>,
    /// Left texture coordinate
    pub left: f32,
    /// Top texture coordinate
    pub top: f32,
    /// Right texture coordinate
    pub right: f32,
    /// Bottom texture coordinate
    pub bottom: f32,
}

impl TextureInfo {
    /// Region covering the whole texture
    pub fn new(texture: Option<TextureHandle>) -> Self {
        Self { texture, left: 0.0, top: 0.0, right: 1.0, bottom: 1.0 }
    }

    /// Set the texture coordinates
    pub fn with_coordinates(mut self, left: f32, top: f32, right: f32, bottom: f32) -> Self {
        self.left = left;
        self.top = top;
        self.right = right;
        self.bottom = bottom;
        self
    }
}

impl PartialEq for TextureInfo {
    fn eq(&self, other: &Self) -> bool {
        same_texture(self.texture.as_ref(), other.texture.as_ref())
            && self.left == other.left
            && self.top == other.top
            && self.right == other.right
            && self.bottom == other.bottom
    }
}

impl Default for TextureInfo {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Whether two optional texture handles name the same texture
pub fn same_texture(a: Option<&TextureHandle>, b: Option<&TextureHandle>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}
