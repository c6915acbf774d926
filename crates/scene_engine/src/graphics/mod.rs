//! Graphics collaborators
//!
//! The scene graph never talks to a GPU directly. It hands vertices and
//! effect state to a [`GraphicsDevice`]; [`HeadlessDevice`] records what it
//! is given, which is what the demo and the tests draw into.

mod animated_sprite;
mod device;
mod effect;
mod headless;
mod sprite;
mod texture;
mod vertex;

pub use animated_sprite::AnimatedSprite;
pub use device::{Color, DeviceHandle, GraphicsDevice, Viewport};
pub use effect::{names, BasicEffect, CustomEffect, Effect, EffectKind, EffectParameters, EffectValue, FretboardEffect};
pub use headless::{AppliedPass, DrawCall, HeadlessDevice};
pub use sprite::{Sprite, QUAD_INDICES};
pub use texture::{same_texture, Texture, TextureHandle, TextureInfo};
pub use vertex::VertexPositionColorTexture;
