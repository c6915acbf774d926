//! # Scene Engine
//!
//! The runtime scene layer of a 2.5D game: transforms with lazily rebuilt
//! world matrices, perspective cameras, draw layers that order their
//! entities, and scenes that a director starts, ticks, draws and replaces.
//!
//! ## Features
//!
//! - **Dirty-flag transforms**: setters batch, `update` rebuilds once
//! - **Cameras**: look-at view and clamped perspective, rebuilt on change
//! - **Layers**: updateable, drawable and destroyable entity subsets with
//!   optional back-to-front sorting
//! - **Scenes**: initialise/load/activity lifecycle, popups, deferred
//!   scene-to-scene transitions
//! - **Content and themes**: shared texture caches and RON theme manifests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! struct Menu;
//!
//! impl SceneScript for Menu {
//!     fn destroy(&mut self, _scene: &mut SceneCore, _services: &mut EngineServices) {}
//! }
//!
//! fn main() -> Result<(), EngineError> {
//!     let mut engine = Engine::new(EngineConfig::default())?;
//!     engine.register_scene("Menu", |args| Ok(Scene::new(&args, Menu)));
//!     engine.attach_graphics_device(HeadlessDevice::shared());
//!     engine.start_scene("Menu", Vec::new())?;
//!
//!     for _ in 0..60 {
//!         engine.tick(1.0 / 60.0)?;
//!         engine.draw()?;
//!     }
//!     engine.shutdown();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod content;
pub mod core;
pub mod foundation;
pub mod graphics;
pub mod scene;
pub mod theme;

mod engine;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::Config,
        content::{ContentError, ContentManager},
        core::{CameraConfig, ContentConfig, EngineConfig, EngineServices, ProgressCallback, SceneError},
        foundation::math::{Mat4, Vec2, Vec3},
        graphics::{
            AnimatedSprite, BasicEffect, Color, DeviceHandle, Effect, GraphicsDevice, HeadlessDevice, Sprite,
            TextureInfo, Viewport,
        },
        scene::{
            Camera, Destroyable, DrawableEntity, Entity, EntityHandle, Layer, LoadFuture, Scene, SceneArgs,
            SceneCore, SceneDirector, SceneKey, SceneParam, SceneScript, SortType, Transformable,
            UpdateableEntity,
        },
        theme::{AnimationInfo, ThemeError, ThemeLibrary},
        Engine, EngineError,
    };
}
