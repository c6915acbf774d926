//! Graphics device abstraction
//!
//! The scene graph never talks to a GPU API directly. Everything it needs from
//! a renderer goes through [`GraphicsDevice`], which a windowing backend (or a
//! headless recorder in tests and tools) implements.

use std::cell::RefCell;
use std::rc::Rc;

use crate::graphics::effect::EffectParameters;
use crate::graphics::vertex::VertexPositionColorTexture;

/// Shared handle to the graphics device
///
/// The scene graph lives on one thread, so the device is shared with `Rc`.
pub type DeviceHandle = Rc<RefCell<dyn GraphicsDevice>>;

/// Rendering backend trait used by scenes, effects and sprites
pub trait GraphicsDevice {
    /// Current viewport
    fn viewport(&self) -> Viewport;

    /// Bind a viewport for subsequent draws
    fn set_viewport(&mut self, viewport: Viewport);

    /// Clear the render target
    fn clear(&mut self, color: Color);

    /// Apply the first pass of an effect technique with the given parameter values
    fn apply_pass(&mut self, technique: &str, parameters: &EffectParameters);

    /// Draw an indexed triangle list
    fn draw_indexed_primitives(&mut self, vertices: &[VertexPositionColorTexture], indices: &[u16]);
}

/// Rectangle of the render target that drawing is mapped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Left edge in pixels
    pub x: u32,
    /// Top edge in pixels
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Viewport {
    /// Create a viewport
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Width divided by height, or `None` for a degenerate viewport
    pub fn aspect_ratio(&self) -> Option<f32> {
        if self.height == 0 {
            None
        } else {
            Some(self.width as f32 / self.height as f32)
        }
    }

    /// Whether the viewport covers no pixels
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Linear RGBA colour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
    /// Alpha channel
    pub a: f32,
}

impl Color {
    /// Opaque white
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };

    /// Opaque black
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };

    /// Create a colour, clamping every channel to `[0, 1]`
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Create a colour from an `[r, g, b, a]` array
    pub fn from_array(rgba: [f32; 4]) -> Self {
        Self::new(rgba[0], rgba[1], rgba[2], rgba[3])
    }

    /// Pack into `0xAABBGGRR`, the layout vertex colours are uploaded in
    pub fn to_packed(&self) -> u32 {
        let channel = |value: f32| (value * 255.0) as u32;
        (channel(self.a) << 24) | (channel(self.b) << 16) | (channel(self.g) << 8) | channel(self.r)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}
