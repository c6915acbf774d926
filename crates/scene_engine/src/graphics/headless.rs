//! Headless graphics device
//!
//! Records every call instead of rendering. Used by the demo binary to run
//! scenes without a window, and by tests to check what a frame produced.

use std::cell::RefCell;
use std::rc::Rc;

use crate::foundation::math::Mat4;
use crate::graphics::device::{Color, GraphicsDevice, Viewport};
use crate::graphics::effect::{names, EffectParameters};
use crate::graphics::vertex::VertexPositionColorTexture;

/// One applied effect pass
#[derive(Debug, Clone)]
pub struct AppliedPass {
    /// Technique that was applied
    pub technique: String,
    /// Alpha bound at the time, if any
    pub alpha: Option<f32>,
    /// World matrix bound at the time, if any
    pub world: Option<Mat4>,
    /// View matrix bound at the time, if any
    pub view: Option<Mat4>,
    /// Whether a texture was bound
    pub has_texture: bool,
}

/// One indexed draw
#[derive(Debug, Clone)]
pub struct DrawCall {
    /// Vertices submitted
    pub vertices: Vec<VertexPositionColorTexture>,
    /// Indices submitted
    pub indices: Vec<u16>,
}

impl DrawCall {
    /// Number of triangles drawn
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Graphics device that records calls
#[derive(Debug, Default)]
pub struct HeadlessDevice {
    viewport: Viewport,
    viewport_binds: usize,
    clears: Vec<Color>,
    passes: Vec<AppliedPass>,
    draws: Vec<DrawCall>,
}

impl HeadlessDevice {
    /// Create a device with the given back-buffer size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: Viewport::new(0, 0, width, height),
            ..Default::default()
        }
    }

    /// Create an 800x600 device wrapped for sharing
    pub fn shared() -> Rc<RefCell<HeadlessDevice>> {
        Rc::new(RefCell::new(Self::new(800, 600)))
    }

    /// Colours the target was cleared to
    pub fn clears(&self) -> &[Color] {
        &self.clears
    }

    /// Every applied pass, oldest first
    pub fn passes(&self) -> &[AppliedPass] {
        &self.passes
    }

    /// Names of every applied technique, oldest first
    pub fn applied_techniques(&self) -> Vec<String> {
        self.passes.iter().map(|pass| pass.technique.clone()).collect()
    }

    /// Every draw call, oldest first
    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    /// How many times a viewport was bound
    pub fn viewport_binds(&self) -> usize {
        self.viewport_binds
    }

    /// Forget everything recorded so far
    pub fn reset(&mut self) {
        self.viewport_binds = 0;
        self.clears.clear();
        self.passes.clear();
        self.draws.clear();
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.viewport_binds += 1;
    }

    fn clear(&mut self, color: Color) {
        self.clears.push(color);
    }

    fn apply_pass(&mut self, technique: &str, parameters: &EffectParameters) {
        self.passes.push(AppliedPass {
            technique: technique.to_string(),
            alpha: parameters.float(names::ALPHA),
            world: parameters.matrix(names::WORLD).copied(),
            view: parameters.matrix(names::VIEW).copied(),
            has_texture: parameters.texture(names::TEXTURE).is_some(),
        });
    }

    fn draw_indexed_primitives(&mut self, vertices: &[VertexPositionColorTexture], indices: &[u16]) {
        self.draws.push(DrawCall {
            vertices: vertices.to_vec(),
            indices: indices.to_vec(),
        });
    }
}
