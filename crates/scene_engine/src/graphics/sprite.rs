//! Sprite - a textured quad placed by a [`Transformable`]
//!
//! The quad spans `(-1, -1)` to `(1, 1)` in model space; position, rotation
//! and scale come from the embedded transform. Texture coordinates are kept
//! as `(left, top, right, bottom)` and copied into the vertices on update.

use crate::core::SceneError;
use crate::foundation::math::{Mat4, Vec3};
use crate::graphics::device::Color;
use crate::graphics::effect::{names, Effect, EffectKind, EffectValue};
use crate::graphics::texture::{same_texture, TextureHandle, TextureInfo};
use crate::graphics::vertex::VertexPositionColorTexture;
use crate::scene::{DrawableEntity, Entity, Transformable, UpdateableEntity};

/// Two triangles: top-left, top-right, bottom-right, then back round to top-left
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

const QUAD_CORNERS: [[f32; 3]; 4] = [
    [-1.0, 1.0, 0.0],
    [1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
];

/// Textured quad entity
#[derive(Debug, Clone)]
pub struct Sprite {
    name: String,
    time_created: f32,
    transform: Transformable,
    texture: Option<TextureHandle>,
    enable_drawing: bool,
    color: Color,
    coordinates: [f32; 4],
    vertices: [VertexPositionColorTexture; 4],
}

impl Sprite {
    /// Create a white sprite showing the whole of `texture`
    pub fn new(texture: Option<TextureHandle>) -> Self {
        let color = Color::WHITE;
        let packed = color.to_packed();
        let vertices = QUAD_CORNERS.map(|corner| VertexPositionColorTexture::new(corner, packed, [0.0, 0.0]));

        let mut sprite = Self {
            name: String::new(),
            time_created: 0.0,
            transform: Transformable::new(),
            texture,
            enable_drawing: true,
            color,
            coordinates: [0.0, 0.0, 1.0, 1.0],
            vertices,
        };
        sprite.refresh_vertices();
        sprite
    }

    /// Create a sprite from a texture region
    pub fn from_texture_info(info: &TextureInfo) -> Self {
        let mut sprite = Self::new(info.texture.clone());
        sprite.set_texture_coordinates(info.left, info.top, info.right, info.bottom);
        sprite.refresh_vertices();
        sprite
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the creation time in seconds of game time
    pub fn with_time_created(mut self, time_created: f32) -> Self {
        self.time_created = time_created;
        self
    }

    /// Rename the sprite
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Position, rotation and scale
    pub fn transform(&self) -> &Transformable {
        &self.transform
    }

    /// Mutable position, rotation and scale
    pub fn transform_mut(&mut self) -> &mut Transformable {
        &mut self.transform
    }

    /// World matrix of the quad
    pub fn world(&self) -> &Mat4 {
        self.transform.world()
    }

    /// Texture drawn on the quad
    pub fn texture(&self) -> Option<&TextureHandle> {
        self.texture.as_ref()
    }

    /// Replace the texture
    pub fn set_texture(&mut self, texture: Option<TextureHandle>) {
        self.texture = texture;
    }

    /// Enable or disable drawing
    pub fn set_enable_drawing(&mut self, enabled: bool) {
        self.enable_drawing = enabled;
    }

    //--- Colour -------------------------------------------------------------

    /// Tint colour
    pub fn color(&self) -> Color {
        self.color
    }

    /// Opacity
    pub fn alpha(&self) -> f32 {
        self.color.a
    }

    /// Set the tint, clamping every channel to `[0, 1]`
    pub fn set_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.color = Color::new(r, g, b, a);
    }

    /// Set the opacity, clamped to `[0, 1]`
    pub fn set_alpha(&mut self, alpha: f32) {
        let Color { r, g, b, .. } = self.color;
        self.set_color(r, g, b, alpha);
    }

    //--- Texture coordinates ------------------------------------------------

    /// Texture coordinates as `(left, top, right, bottom)`
    pub fn texture_coordinates(&self) -> (f32, f32, f32, f32) {
        let [left, top, right, bottom] = self.coordinates;
        (left, top, right, bottom)
    }

    /// Set the texture coordinates; the vertices pick them up on the next update
    pub fn set_texture_coordinates(&mut self, left: f32, top: f32, right: f32, bottom: f32) {
        self.coordinates = [left, top, right, bottom];
    }

    /// Vertices as last refreshed
    pub fn vertices(&self) -> &[VertexPositionColorTexture; 4] {
        &self.vertices
    }

    /// Update even when updates are disabled
    pub fn force_update(&mut self, delta: f32) {
        self.refresh_vertices();
        self.transform.update(delta);
    }

    fn refresh_vertices(&mut self) {
        let [left, top, right, bottom] = self.coordinates;
        let uvs = [[left, top], [right, top], [right, bottom], [left, bottom]];
        let packed = self.color.to_packed();

        for (vertex, uv) in self.vertices.iter_mut().zip(uvs) {
            vertex.texture_coordinate = uv;
            vertex.color = packed;
        }
    }

    /// Bind texture, alpha and world into the effect and apply it
    ///
    /// Returns false when a fretboard effect already held these values and
    /// was left alone.
    fn bind(&self, effect: &mut dyn Effect) -> bool {
        let world = *self.transform.world();
        let alpha = self.alpha();

        match effect.kind() {
            EffectKind::Basic => {
                self.bind_texture(effect);
                effect.parameters_mut().set(names::WORLD, EffectValue::Matrix(world));
            }
            EffectKind::Fretboard => {
                let parameters = effect.parameters();
                let unchanged = same_texture(parameters.texture(names::TEXTURE), self.texture.as_ref())
                    && parameters.float(names::ALPHA) == Some(alpha)
                    && parameters.matrix(names::WORLD) == Some(&world);
                if unchanged {
                    return false;
                }

                self.bind_texture(effect);
                let parameters = effect.parameters_mut();
                parameters.set(names::ALPHA, EffectValue::Float(alpha));
                parameters.set(names::WORLD, EffectValue::Matrix(world));
            }
            EffectKind::Custom => {
                self.bind_texture(effect);
                let parameters = effect.parameters_mut();
                parameters.set(names::ALPHA, EffectValue::Float(alpha));
                parameters.set(names::WORLD, EffectValue::Matrix(world));
            }
        }

        effect.apply_current_technique();
        true
    }

    fn bind_texture(&self, effect: &mut dyn Effect) {
        let parameters = effect.parameters_mut();
        match &self.texture {
            Some(texture) => {
                parameters.set(names::TEXTURE, EffectValue::Texture(texture.clone()));
            }
            None => parameters.unset(names::TEXTURE),
        }
    }
}

impl Default for Sprite {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Entity for Sprite {
    fn name(&self) -> &str {
        &self.name
    }

    fn time_created(&self) -> f32 {
        self.time_created
    }
}

impl UpdateableEntity for Sprite {
    fn enable_updates(&self) -> bool {
        self.transform.enable_updates()
    }

    fn update(&mut self, delta: f32) {
        self.force_update(delta);
    }
}

impl DrawableEntity for Sprite {
    fn position(&self) -> Vec3 {
        self.transform.position()
    }

    fn enable_drawing(&self) -> bool {
        self.enable_drawing
    }

    fn draw(&mut self, effect: &mut dyn Effect) {
        if !self.enable_drawing {
            return;
        }
        let Some(device) = effect.graphics_device().cloned() else {
            return;
        };

        if !self.bind(effect) {
            log::trace!("Sprite '{}' left fretboard effect untouched", self.name);
        }
        device.borrow_mut().draw_indexed_primitives(&self.vertices, &QUAD_INDICES);
    }

    fn is_in_view(&self, _view: &Mat4, _projection: &Mat4) -> Result<bool, SceneError> {
        Err(SceneError::NotImplemented("sprite view test"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::{BasicEffect, CustomEffect, FretboardEffect, HeadlessDevice, Texture};
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn texture() -> TextureHandle {
        Arc::new(Texture::from_rgba8("white.png", 1, 1, vec![255; 4]))
    }

    #[test]
    fn test_new_sprite_covers_whole_texture() {
        let sprite = Sprite::new(None);
        let uvs: Vec<[f32; 2]> = sprite.vertices().iter().map(|v| v.texture_coordinate).collect();
        assert_eq!(uvs, vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        assert_eq!(sprite.vertices()[0].position, [-1.0, 1.0, 0.0]);
        assert_eq!(sprite.vertices()[2].position, [1.0, -1.0, 0.0]);
        assert_eq!(sprite.color(), Color::WHITE);
    }

    #[test]
    fn test_color_channels_are_clamped() {
        let mut sprite = Sprite::default();
        sprite.set_color(2.0, -1.0, 0.5, 1.5);
        assert_eq!(sprite.color(), Color::new(1.0, 0.0, 0.5, 1.0));

        sprite.set_alpha(-3.0);
        assert_eq!(sprite.alpha(), 0.0);
    }

    #[test]
    fn test_texture_coordinates_reach_vertices_on_update() {
        let mut sprite = Sprite::default();
        sprite.set_texture_coordinates(0.25, 0.5, 0.75, 1.0);
        assert_eq!(sprite.vertices()[1].texture_coordinate, [1.0, 0.0]);

        sprite.update(0.016);
        assert_eq!(sprite.vertices()[0].texture_coordinate, [0.25, 0.5]);
        assert_eq!(sprite.vertices()[1].texture_coordinate, [0.75, 0.5]);
        assert_eq!(sprite.vertices()[2].texture_coordinate, [0.75, 1.0]);
        assert_eq!(sprite.vertices()[3].texture_coordinate, [0.25, 1.0]);
    }

    #[test]
    fn test_update_rebuilds_world() {
        let mut sprite = Sprite::default();
        sprite.update(0.0);
        sprite.transform_mut().set_position(3.0, 0.0, 0.0);
        sprite.update(0.016);
        assert_relative_eq!(sprite.world()[(0, 3)], 3.0);
    }

    #[test]
    fn test_basic_effect_draw_binds_and_draws_two_triangles() {
        let device = HeadlessDevice::shared();
        let mut effect = BasicEffect::new(device.clone());
        let texture = texture();
        let mut sprite = Sprite::new(Some(texture.clone()));

        sprite.draw(&mut effect);

        let recorded = device.borrow();
        assert_eq!(recorded.passes().len(), 1);
        assert!(recorded.passes()[0].has_texture);
        assert_eq!(recorded.draws().len(), 1);
        assert_eq!(recorded.draws()[0].triangle_count(), 2);
        assert!(Arc::ptr_eq(effect.parameters().texture(names::TEXTURE).unwrap(), &texture));
    }

    #[test]
    fn test_fretboard_effect_skips_redundant_apply() {
        let device = HeadlessDevice::shared();
        let mut effect = FretboardEffect::new(device.clone());
        let mut sprite = Sprite::new(Some(texture()));

        sprite.draw(&mut effect);
        sprite.draw(&mut effect);
        assert_eq!(device.borrow().passes().len(), 1);
        assert_eq!(device.borrow().draws().len(), 2);

        sprite.set_alpha(0.5);
        sprite.draw(&mut effect);
        assert_eq!(device.borrow().passes().len(), 2);
        assert_eq!(effect.alpha(), Some(0.5));
    }

    #[test]
    fn test_custom_effect_receives_declared_parameters_only() {
        let device = HeadlessDevice::shared();
        let mut effect = CustomEffect::new(Some(device.clone()), "Glow", &[names::ALPHA]);
        let mut sprite = Sprite::new(Some(texture()));
        sprite.set_alpha(0.25);

        sprite.draw(&mut effect);

        assert_eq!(effect.parameters().float(names::ALPHA), Some(0.25));
        assert!(effect.parameters().get(names::WORLD).is_none());
        assert_eq!(device.borrow().applied_techniques(), vec!["Glow".to_string()]);
    }

    #[test]
    fn test_draw_skipped_when_disabled_or_deviceless() {
        let device = HeadlessDevice::shared();
        let mut effect = BasicEffect::new(device.clone());
        let mut sprite = Sprite::default();
        sprite.set_enable_drawing(false);
        sprite.draw(&mut effect);

        let mut deviceless = CustomEffect::new(None, "Any", &[names::WORLD]);
        sprite.set_enable_drawing(true);
        sprite.draw(&mut deviceless);

        assert!(device.borrow().draws().is_empty());
        assert!(deviceless.parameters().get(names::WORLD).is_none());
    }

    #[test]
    fn test_view_test_is_not_implemented() {
        let sprite = Sprite::default();
        let result = sprite.is_in_view(&Mat4::identity(), &Mat4::identity());
        assert!(matches!(result, Err(SceneError::NotImplemented(_))));
    }
}
