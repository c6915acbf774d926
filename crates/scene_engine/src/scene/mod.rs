//! Scene system
//!
//! Everything that makes up a running game screen:
//!
//! ```text
//! SceneDirector
//!      ↓ current scene
//! Scene (SceneCore + SceneScript)
//!      ↓ camera, default layer, extra layers, popups
//! Layer
//!      ↓ updateable / drawable / destroyable subsets
//! Entities (Transformable-based sprites, cameras, ...)
//! ```
//!
//! All scene-graph state lives on the thread that ticks the engine. Only
//! content loading crosses threads, and it hands its results back through
//! futures the scene awaits.

mod camera;
mod director;
mod entity;
mod layer;
mod lifecycle;
mod registry;
mod transformable;
mod transition;

pub use camera::{Camera, MAX_FIELD_OF_VIEW, MIN_FIELD_OF_VIEW, MIN_NEAR_PLANE};
pub use director::{SceneDirector, SceneKey};
pub use entity::{Destroyable, DrawableEntity, Entity, EntityBuilder, EntityHandle, UpdateableEntity};
pub use layer::{Layer, SortType};
pub use lifecycle::{LoadFuture, Scene, SceneCore, SceneScript};
pub use registry::{SceneArgs, SceneFactory, SceneParam, SceneRegistry};
pub use transformable::Transformable;
pub use transition::{SceneTransition, TransitionQueue};
