//! Position, rotation and scale with a lazily rebuilt world matrix
//!
//! Setters only mark the matrix stale; [`Transformable::update`] rebuilds it
//! once per batch of changes. The exception is an object that has never been
//! updated: its setters rebuild immediately, so a freshly configured object
//! already has a correct world matrix before its first tick.

use crate::foundation::math::{compose_world, utils, Mat4, Vec2, Vec3};

/// Local transform with a cached world matrix
#[derive(Debug, Clone)]
pub struct Transformable {
    position: Vec3,
    rotation: Vec3,
    scale: Vec2,
    world: Mat4,
    enable_updates: bool,

    position_changed: bool,
    rotation_changed: bool,
    scale_changed: bool,
    has_updated_once: bool,
    world_revision: u64,
}

impl Transformable {
    /// Identity transform: origin, no rotation, unit scale
    pub fn new() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec2::new(1.0, 1.0),
            world: Mat4::identity(),
            enable_updates: true,
            position_changed: false,
            rotation_changed: false,
            scale_changed: false,
            has_updated_once: false,
            world_revision: 0,
        }
    }

    //--- Position -----------------------------------------------------------

    /// Local position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// X position
    pub fn x(&self) -> f32 {
        self.position.x
    }

    /// Y position
    pub fn y(&self) -> f32 {
        self.position.y
    }

    /// Z position
    pub fn z(&self) -> f32 {
        self.position.z
    }

    /// Set the position
    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        let position = Vec3::new(x, y, z);
        if self.position != position {
            self.position = position;
            self.position_changed = true;
        }
        self.refresh_if_never_updated();
    }

    /// Set X, keeping Y and Z
    pub fn set_x(&mut self, x: f32) {
        self.set_position(x, self.position.y, self.position.z);
    }

    /// Set Y, keeping X and Z
    pub fn set_y(&mut self, y: f32) {
        self.set_position(self.position.x, y, self.position.z);
    }

    /// Set Z, keeping X and Y
    pub fn set_z(&mut self, z: f32) {
        self.set_position(self.position.x, self.position.y, z);
    }

    //--- Rotation -----------------------------------------------------------

    /// Rotation in degrees about X, Y and Z
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Rotation about X in degrees
    pub fn x_rotation(&self) -> f32 {
        self.rotation.x
    }

    /// Rotation about Y in degrees
    pub fn y_rotation(&self) -> f32 {
        self.rotation.y
    }

    /// Rotation about Z in degrees
    pub fn z_rotation(&self) -> f32 {
        self.rotation.z
    }

    /// Set the rotation in degrees; each component is kept modulo 360
    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        let rotation = Vec3::new(
            utils::wrap_degrees(x),
            utils::wrap_degrees(y),
            utils::wrap_degrees(z),
        );
        if self.rotation != rotation {
            self.rotation = rotation;
            self.rotation_changed = true;
        }
        self.refresh_if_never_updated();
    }

    /// Set rotation about X
    pub fn set_x_rotation(&mut self, degrees: f32) {
        self.set_rotation(degrees, self.rotation.y, self.rotation.z);
    }

    /// Set rotation about Y
    pub fn set_y_rotation(&mut self, degrees: f32) {
        self.set_rotation(self.rotation.x, degrees, self.rotation.z);
    }

    /// Set rotation about Z
    pub fn set_z_rotation(&mut self, degrees: f32) {
        self.set_rotation(self.rotation.x, self.rotation.y, degrees);
    }

    //--- Scale --------------------------------------------------------------

    /// Scale along X and Y
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Scale along X
    pub fn x_scale(&self) -> f32 {
        self.scale.x
    }

    /// Scale along Y
    pub fn y_scale(&self) -> f32 {
        self.scale.y
    }

    /// Set the scale
    pub fn set_scale(&mut self, x: f32, y: f32) {
        let scale = Vec2::new(x, y);
        if self.scale != scale {
            self.scale = scale;
            self.scale_changed = true;
        }
        self.refresh_if_never_updated();
    }

    /// Set scale along X
    pub fn set_x_scale(&mut self, x: f32) {
        self.set_scale(x, self.scale.y);
    }

    /// Set scale along Y
    pub fn set_y_scale(&mut self, y: f32) {
        self.set_scale(self.scale.x, y);
    }

    //--- World matrix -------------------------------------------------------

    /// Cached world matrix
    pub fn world(&self) -> &Mat4 {
        &self.world
    }

    /// Whether a change is waiting for the next update
    pub fn is_dirty(&self) -> bool {
        self.position_changed || self.rotation_changed || self.scale_changed
    }

    /// How many times the world matrix has been rebuilt
    pub fn world_revision(&self) -> u64 {
        self.world_revision
    }

    /// Whether [`update`](Self::update) has run at least once
    pub fn has_updated_once(&self) -> bool {
        self.has_updated_once
    }

    /// Whether the owning entity wants per-tick updates
    pub fn enable_updates(&self) -> bool {
        self.enable_updates
    }

    /// Enable or disable per-tick updates
    pub fn set_enable_updates(&mut self, enabled: bool) {
        self.enable_updates = enabled;
    }

    /// Rebuild the world matrix if anything changed since the last rebuild
    pub fn update(&mut self, _delta: f32) {
        self.rebuild_world();
        self.has_updated_once = true;
    }

    fn refresh_if_never_updated(&mut self) {
        if !self.has_updated_once {
            self.rebuild_world();
        }
    }

    fn rebuild_world(&mut self) {
        if !self.is_dirty() {
            return;
        }

        self.world = compose_world(&self.position, &self.rotation, &self.scale);
        self.position_changed = false;
        self.rotation_changed = false;
        self.scale_changed = false;
        self.world_revision += 1;
    }
}

impl Default for Transformable {
    fn default() -> Self {
        Self::new()
    }
}
