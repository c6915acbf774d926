//! # Scene Camera
//!
//! A perspective camera placed with a position and Euler rotation, in the same
//! way as any other scene object. View and projection matrices are cached and
//! rebuilt lazily.
//!
//! ## Dirty tracking
//!
//! - Perspective setters mark the projection stale
//! - Position and rotation setters mark the view stale
//! - [`Camera::update`] rebuilds whatever is stale, at most once per batch
//!
//! Until the first update every setter rebuilds immediately, so a camera that
//! was configured but never ticked still reports correct matrices.
//!
//! ## Coordinate System
//! Right-handed, Y up. With no rotation the camera looks down -Z.

use crate::core::config::CameraConfig;
use crate::foundation::math::{constants, utils, Mat4, Mat4Ext, Vec3};
use crate::graphics::Viewport;
use crate::scene::entity::{Entity, UpdateableEntity};

/// Smallest accepted field of view in degrees
pub const MIN_FIELD_OF_VIEW: f32 = 0.1;

/// Largest accepted field of view in degrees
pub const MAX_FIELD_OF_VIEW: f32 = 179.5;

/// Smallest accepted near plane distance
pub const MIN_NEAR_PLANE: f32 = 0.2;

/// Side of the reference quad measured by the `*_scale_at_distance` helpers
const REFERENCE_QUAD_SIZE: f32 = 100.0;

/// Perspective camera with cached view and projection matrices
#[derive(Debug, Clone)]
pub struct Camera {
    name: String,
    time_created: f32,

    position: Vec3,
    rotation: Vec3,

    field_of_view: f32,
    aspect_ratio: f32,
    near_plane: f32,
    far_plane: f32,

    rotation_matrix: Mat4,
    forward: Vec3,
    up: Vec3,
    view: Mat4,
    projection: Mat4,
    viewport: Option<Viewport>,

    position_changed: bool,
    rotation_changed: bool,
    perspective_changed: bool,
    has_updated_once: bool,
    view_revision: u64,
    projection_revision: u64,
}

impl Camera {
    /// Create a camera at `(0, 0, -10)` with the default perspective
    pub fn new() -> Self {
        Self::from_config(&CameraConfig::default()).at(Vec3::new(0.0, 0.0, -10.0))
    }

    /// Create a camera at the origin with the configured perspective
    ///
    /// Out-of-range perspective values are clamped the same way the setters
    /// clamp them.
    pub fn from_config(config: &CameraConfig) -> Self {
        let field_of_view = clamp_field_of_view(config.field_of_view);
        let near_plane = clamp_near_plane(config.near_plane);

        let mut camera = Self {
            name: "Camera".to_string(),
            time_created: 0.0,
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            field_of_view,
            aspect_ratio: config.aspect_ratio,
            near_plane,
            far_plane: config.far_plane,
            rotation_matrix: Mat4::identity(),
            forward: Vec3::from(constants::FORWARD),
            up: Vec3::from(constants::UP),
            view: Mat4::identity(),
            projection: Mat4::identity(),
            viewport: None,
            position_changed: true,
            rotation_changed: true,
            perspective_changed: true,
            has_updated_once: false,
            view_revision: 0,
            projection_revision: 0,
        };
        camera.rebuild();
        camera
    }

    /// Move the camera, returning it
    pub fn at(mut self, position: Vec3) -> Self {
        self.set_position(position.x, position.y, position.z);
        self
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Record the engine time the camera was created at
    pub fn with_time_created(mut self, time: f32) -> Self {
        self.time_created = time;
        self
    }

    //--- Placement ----------------------------------------------------------

    /// Camera position in world space
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

    /// Rotation in degrees about X, Y and Z
    pub fn rotation(&self) -> Vec3 {
        self.rotation
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

    //--- Perspective --------------------------------------------------------

    /// Vertical field of view in degrees
    pub fn field_of_view(&self) -> f32 {
        self.field_of_view
    }

    /// Width divided by height
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Near clipping distance
    pub fn near_plane(&self) -> f32 {
        self.near_plane
    }

    /// Far clipping distance
    pub fn far_plane(&self) -> f32 {
        self.far_plane
    }

    /// Set every perspective parameter at once
    ///
    /// # Arguments
    /// * `field_of_view` - Vertical field of view in degrees, clamped to `[0.1, 179.5]`
    /// * `aspect_ratio` - Viewport width divided by height
    /// * `near_plane` - Near clipping distance, raised to at least `0.2`
    /// * `far_plane` - Far clipping distance
    ///
    /// Clamping happens before the comparison with the current values, so an
    /// out-of-range input that clamps to the current value changes nothing.
    pub fn set_perspective(&mut self, field_of_view: f32, aspect_ratio: f32, near_plane: f32, far_plane: f32) {
        let field_of_view = clamp_field_of_view(field_of_view);
        let near_plane = clamp_near_plane(near_plane);

        let changed = self.field_of_view != field_of_view
            || self.aspect_ratio != aspect_ratio
            || self.near_plane != near_plane
            || self.far_plane != far_plane;

        if changed {
            self.field_of_view = field_of_view;
            self.aspect_ratio = aspect_ratio;
            self.near_plane = near_plane;
            self.far_plane = far_plane;
            self.perspective_changed = true;
        }
        self.refresh_if_never_updated();
    }

    /// Set the field of view in degrees
    pub fn set_field_of_view(&mut self, degrees: f32) {
        self.set_perspective(degrees, self.aspect_ratio, self.near_plane, self.far_plane);
    }

    /// Set the aspect ratio
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        if (self.aspect_ratio - aspect_ratio).abs() > 0.01 {
            log::debug!("Camera aspect ratio changed: {:.3} -> {:.3}", self.aspect_ratio, aspect_ratio);
        }
        self.set_perspective(self.field_of_view, aspect_ratio, self.near_plane, self.far_plane);
    }

    /// Set the near clipping distance
    pub fn set_near_plane(&mut self, distance: f32) {
        self.set_perspective(self.field_of_view, self.aspect_ratio, distance, self.far_plane);
    }

    /// Set the far clipping distance
    pub fn set_far_plane(&mut self, distance: f32) {
        self.set_perspective(self.field_of_view, self.aspect_ratio, self.near_plane, distance);
    }

    //--- Derived state ------------------------------------------------------

    /// World-to-view matrix
    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    /// View-to-clip matrix
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// Direction the camera looks in
    pub fn forward_vector(&self) -> Vec3 {
        self.forward
    }

    /// Camera up direction
    pub fn up_vector(&self) -> Vec3 {
        self.up
    }

    /// Viewport bound before the scene draws, if any
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Set the viewport bound before the scene draws
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    /// Whether a change is waiting for the next update
    pub fn is_dirty(&self) -> bool {
        self.position_changed || self.rotation_changed || self.perspective_changed
    }

    /// How many times the view matrix has been rebuilt
    pub fn view_revision(&self) -> u64 {
        self.view_revision
    }

    /// How many times the projection matrix has been rebuilt
    pub fn projection_revision(&self) -> u64 {
        self.projection_revision
    }

    /// Height of a 100-unit reference quad placed at depth `z`, in world units
    ///
    /// # Mathematical Notes
    /// The visible half-height at distance `d` is `d * tan(fov / 2)`. The
    /// distance is measured along the reference forward axis from the camera.
    pub fn y_scale_at_distance(&self, z: f32) -> f32 {
        let distance = (z - self.position.z) / REFERENCE_QUAD_SIZE;
        let half_fov = utils::deg_to_rad(self.field_of_view) * 0.5;
        REFERENCE_QUAD_SIZE * half_fov.tan() * distance * constants::FORWARD[2]
    }

    /// Width of a 100-unit reference quad placed at depth `z`, in world units
    pub fn x_scale_at_distance(&self, z: f32) -> f32 {
        self.y_scale_at_distance(z) * self.aspect_ratio
    }

    /// Rebuild stale matrices
    pub fn update(&mut self, _delta: f32) {
        self.rebuild();
        self.has_updated_once = true;
    }

    fn refresh_if_never_updated(&mut self) {
        if !self.has_updated_once {
            self.rebuild();
        }
    }

    fn rebuild(&mut self) {
        if self.perspective_changed {
            self.projection = Mat4::perspective(
                utils::deg_to_rad(self.field_of_view),
                self.aspect_ratio,
                self.near_plane,
                self.far_plane,
            );
            self.perspective_changed = false;
            self.projection_revision += 1;
        }

        if self.position_changed || self.rotation_changed {
            if self.rotation_changed {
                self.rotation_matrix = Mat4::rotation_xyz_degrees(&self.rotation);
            }
            self.forward = self.rotation_matrix.transform_vector(&Vec3::from(constants::FORWARD));
            self.up = self.rotation_matrix.transform_vector(&Vec3::from(constants::UP));
            self.view = Mat4::look_at(self.position, self.position + self.forward, self.up);

            self.position_changed = false;
            self.rotation_changed = false;
            self.view_revision += 1;
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for Camera {
    fn name(&self) -> &str {
        &self.name
    }

    fn time_created(&self) -> f32 {
        self.time_created
    }
}

impl UpdateableEntity for Camera {
    fn update(&mut self, delta: f32) {
        Camera::update(self, delta);
    }
}

fn clamp_field_of_view(degrees: f32) -> f32 {
    let clamped = utils::clamp(degrees, MIN_FIELD_OF_VIEW, MAX_FIELD_OF_VIEW);
    if clamped != degrees {
        log::trace!("Field of view {degrees} clamped to {clamped}");
    }
    clamped
}

fn clamp_near_plane(distance: f32) -> f32 {
    if distance < MIN_NEAR_PLANE {
        log::trace!("Near plane {distance} raised to {MIN_NEAR_PLANE}");
        MIN_NEAR_PLANE
    } else {
        distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Point3, Vec4};
    use approx::assert_relative_eq;

    fn ticked() -> Camera {
        let mut camera = Camera::new();
        camera.update(0.0);
        camera
    }

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.position(), Vec3::new(0.0, 0.0, -10.0));
        assert_eq!(camera.field_of_view(), 72.0);
        assert_eq!(camera.aspect_ratio(), 1.33);
        assert_eq!(camera.near_plane(), 0.2);
        assert_eq!(camera.far_plane(), 1000.0);
        assert!(camera.viewport().is_none());
        assert!(!camera.is_dirty());
    }

    #[test]
    fn test_field_of_view_is_clamped() {
        let mut camera = ticked();
        camera.set_field_of_view(200.0);
        assert_eq!(camera.field_of_view(), 179.5);

        camera.set_field_of_view(0.0);
        assert_eq!(camera.field_of_view(), 0.1);
    }

    #[test]
    fn test_near_plane_is_clamped() {
        let mut camera = ticked();
        camera.set_near_plane(0.05);
        assert_eq!(camera.near_plane(), 0.2);

        camera.set_near_plane(1.5);
        assert_eq!(camera.near_plane(), 1.5);
    }

    #[test]
    fn test_clamped_input_equal_to_current_is_not_a_change() {
        let mut camera = ticked();
        camera.set_field_of_view(MAX_FIELD_OF_VIEW);
        camera.update(0.016);
        let revision = camera.projection_revision();

        camera.set_field_of_view(1000.0);
        assert!(!camera.is_dirty());
        camera.update(0.016);
        assert_eq!(camera.projection_revision(), revision);
    }

    #[test]
    fn test_unrotated_camera_looks_down_negative_z() {
        let camera = ticked();
        assert_relative_eq!(camera.forward_vector(), Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
        assert_relative_eq!(camera.up_vector(), Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-6);

        // A point straight ahead stays on the view axis
        let ahead = camera.view().transform_point(&Point3::new(0.0, 0.0, -20.0));
        assert_relative_eq!(ahead, Point3::new(0.0, 0.0, -10.0), epsilon = 1e-5);
    }

    #[test]
    fn test_rotation_turns_forward_vector() {
        let mut camera = ticked();
        camera.set_y_rotation(90.0);
        camera.update(0.016);

        assert_relative_eq!(camera.forward_vector(), Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(camera.up_vector(), Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_matrices_rebuilt_lazily_and_once() {
        let mut camera = ticked();
        let view_revision = camera.view_revision();
        let projection_revision = camera.projection_revision();

        camera.set_position(1.0, 2.0, 3.0);
        camera.set_rotation(10.0, 0.0, 0.0);
        assert_eq!(camera.view_revision(), view_revision);

        camera.update(0.016);
        camera.update(0.016);
        assert_eq!(camera.view_revision(), view_revision + 1);
        assert_eq!(camera.projection_revision(), projection_revision);

        camera.set_aspect_ratio(2.0);
        camera.update(0.016);
        assert_eq!(camera.projection_revision(), projection_revision + 1);
        assert_eq!(camera.view_revision(), view_revision + 1);
    }

    #[test]
    fn test_setters_before_first_update_apply_immediately() {
        let mut camera = Camera::new();
        camera.set_position(0.0, 0.0, 40.0);

        let origin = camera.view().transform_point(&Point3::origin());
        assert_relative_eq!(origin, Point3::new(0.0, 0.0, -40.0), epsilon = 1e-4);
    }

    #[test]
    fn test_projection_matches_perspective_parameters() {
        let mut camera = ticked();
        camera.set_perspective(90.0, 1.0, 1.0, 100.0);
        camera.update(0.016);

        let near = camera.projection() * Vec4::new(0.0, 0.0, -1.0, 1.0);
        assert_relative_eq!(near.z / near.w, 0.0, epsilon = 1e-5);
        assert_relative_eq!(camera.projection()[(1, 1)], 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_scale_at_distance() {
        let mut camera = Camera::new();
        camera.set_position(0.0, 0.0, 40.0);
        camera.set_perspective(90.0, 2.0, 0.2, 1000.0);

        // 40 units in front of the camera with a 90 degree fov spans 40 units up
        assert_relative_eq!(camera.y_scale_at_distance(0.0), 40.0, epsilon = 1e-3);
        assert_relative_eq!(camera.x_scale_at_distance(0.0), 80.0, epsilon = 1e-3);
    }
}
