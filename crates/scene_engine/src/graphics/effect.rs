//! Effects - bindable shader state handed to `draw` calls
//!
//! An effect is a technique plus a set of named parameters. Only names the
//! effect declares accept values, so an entity can offer `Texture`, `Alpha` and
//! `World` to any effect and the effect keeps what it understands.
//!
//! Two built-in kinds are known by the scene graph: [`BasicEffect`], which the
//! scene creates for itself, and [`FretboardEffect`], which sprites skip
//! re-applying when nothing changed. Everything else is a [`CustomEffect`].

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::foundation::math::Mat4;
use crate::graphics::device::DeviceHandle;
use crate::graphics::texture::TextureHandle;

/// Well-known parameter names
pub mod names {
    /// Texture sampled by the technique
    pub const TEXTURE: &str = "Texture";
    /// Overall opacity
    pub const ALPHA: &str = "Alpha";
    /// Model-to-world matrix
    pub const WORLD: &str = "World";
    /// World-to-view matrix
    pub const VIEW: &str = "View";
    /// View-to-clip matrix
    pub const PROJECTION: &str = "Projection";
}

/// Built-in effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// The scene's default textured effect
    Basic,
    /// Texture/alpha/world effect that tolerates skipping redundant applies
    Fretboard,
    /// Any other effect
    Custom,
}

/// Value bound to an effect parameter
#[derive(Debug, Clone)]
pub enum EffectValue {
    /// Texture handle
    Texture(TextureHandle),
    /// Scalar
    Float(f32),
    /// 4x4 matrix
    Matrix(Mat4),
}

impl PartialEq for EffectValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (EffectValue::Texture(a), EffectValue::Texture(b)) => Arc::ptr_eq(a, b),
            (EffectValue::Float(a), EffectValue::Float(b)) => a == b,
            (EffectValue::Matrix(a), EffectValue::Matrix(b)) => a == b,
            _ => false,
        }
    }
}

/// Named parameters of an effect
#[derive(Debug, Clone, Default)]
pub struct EffectParameters {
    values: BTreeMap<String, Option<EffectValue>>,
}

impl EffectParameters {
    /// Parameters with the given names declared and unset
    pub fn with_names(names: &[&str]) -> Self {
        let mut parameters = Self::default();
        for name in names {
            parameters.declare(name);
        }
        parameters
    }

    /// Declare a parameter name
    pub fn declare(&mut self, name: &str) {
        self.values.entry(name.to_string()).or_insert(None);
    }

    /// Whether the effect has a parameter with this name
    pub fn is_declared(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Set a declared parameter; returns `false` and ignores the value for undeclared names
    pub fn set(&mut self, name: &str, value: EffectValue) -> bool {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    /// Current value of a parameter
    pub fn get(&self, name: &str) -> Option<&EffectValue> {
        self.values.get(name).and_then(Option::as_ref)
    }

    /// Current texture bound to a parameter
    pub fn texture(&self, name: &str) -> Option<&TextureHandle> {
        match self.get(name) {
            Some(EffectValue::Texture(texture)) => Some(texture),
            _ => None,
        }
    }

    /// Current scalar bound to a parameter
    pub fn float(&self, name: &str) -> Option<f32> {
        match self.get(name) {
            Some(EffectValue::Float(value)) => Some(*value),
            _ => None,
        }
    }

    /// Current matrix bound to a parameter
    pub fn matrix(&self, name: &str) -> Option<&Mat4> {
        match self.get(name) {
            Some(EffectValue::Matrix(matrix)) => Some(matrix),
            _ => None,
        }
    }

    /// Clear a parameter back to unset
    pub fn unset(&mut self, name: &str) {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = None;
        }
    }

    /// Declared parameter names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Shader state bound before drawing
pub trait Effect {
    /// Which built-in kind this effect is
    fn kind(&self) -> EffectKind;

    /// Device the effect applies to, if any
    fn graphics_device(&self) -> Option<&DeviceHandle>;

    /// Current technique name
    fn technique(&self) -> &str;

    /// Parameter values
    fn parameters(&self) -> &EffectParameters;

    /// Mutable parameter values
    fn parameters_mut(&mut self) -> &mut EffectParameters;

    /// Apply the first pass of the current technique to the device
    fn apply_current_technique(&self) {
        if let Some(device) = self.graphics_device() {
            device.borrow_mut().apply_pass(self.technique(), self.parameters());
        }
    }
}

/// The scene's default effect: texture, world, view and projection
pub struct BasicEffect {
    device: DeviceHandle,
    parameters: EffectParameters,
    texture_enabled: bool,
}

impl BasicEffect {
    /// Create a basic effect bound to a device
    pub fn new(device: DeviceHandle) -> Self {
        let parameters = EffectParameters::with_names(&[
            names::TEXTURE,
            names::WORLD,
            names::VIEW,
            names::PROJECTION,
        ]);
        Self { device, parameters, texture_enabled: false }
    }

    /// Whether the textured technique is used
    pub fn texture_enabled(&self) -> bool {
        self.texture_enabled
    }

    /// Switch between the textured and untextured technique
    pub fn set_texture_enabled(&mut self, enabled: bool) {
        self.texture_enabled = enabled;
    }

    /// Bind a texture, or clear it
    pub fn set_texture(&mut self, texture: Option<TextureHandle>) {
        match texture {
            Some(texture) => {
                self.parameters.set(names::TEXTURE, EffectValue::Texture(texture));
            }
            None => self.parameters.unset(names::TEXTURE),
        }
    }

    /// Bind the world matrix
    pub fn set_world(&mut self, world: Mat4) {
        self.parameters.set(names::WORLD, EffectValue::Matrix(world));
    }

    /// Bind the view matrix
    pub fn set_view(&mut self, view: Mat4) {
        self.parameters.set(names::VIEW, EffectValue::Matrix(view));
    }

    /// Bind the projection matrix
    pub fn set_projection(&mut self, projection: Mat4) {
        self.parameters.set(names::PROJECTION, EffectValue::Matrix(projection));
    }
}

impl Effect for BasicEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::Basic
    }

    fn graphics_device(&self) -> Option<&DeviceHandle> {
        Some(&self.device)
    }

    fn technique(&self) -> &str {
        if self.texture_enabled {
            "BasicEffect_Texture"
        } else {
            "BasicEffect"
        }
    }

    fn parameters(&self) -> &EffectParameters {
        &self.parameters
    }

    fn parameters_mut(&mut self) -> &mut EffectParameters {
        &mut self.parameters
    }
}

/// Texture, alpha and world effect used for scrolling track surfaces
pub struct FretboardEffect {
    device: DeviceHandle,
    parameters: EffectParameters,
}

impl FretboardEffect {
    /// Create a fretboard effect bound to a device
    pub fn new(device: DeviceHandle) -> Self {
        let parameters = EffectParameters::with_names(&[names::TEXTURE, names::ALPHA, names::WORLD]);
        Self { device, parameters }
    }

    /// Currently bound texture
    pub fn texture(&self) -> Option<&TextureHandle> {
        self.parameters.texture(names::TEXTURE)
    }

    /// Currently bound alpha
    pub fn alpha(&self) -> Option<f32> {
        self.parameters.float(names::ALPHA)
    }

    /// Currently bound world matrix
    pub fn world(&self) -> Option<&Mat4> {
        self.parameters.matrix(names::WORLD)
    }
}

impl Effect for FretboardEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::Fretboard
    }

    fn graphics_device(&self) -> Option<&DeviceHandle> {
        Some(&self.device)
    }

    fn technique(&self) -> &str {
        "Fretboard"
    }

    fn parameters(&self) -> &EffectParameters {
        &self.parameters
    }

    fn parameters_mut(&mut self) -> &mut EffectParameters {
        &mut self.parameters
    }
}

/// Effect with a caller-chosen technique and parameter set
pub struct CustomEffect {
    device: Option<DeviceHandle>,
    technique: String,
    parameters: EffectParameters,
}

impl CustomEffect {
    /// Create a custom effect declaring the given parameter names
    pub fn new(device: Option<DeviceHandle>, technique: impl Into<String>, parameter_names: &[&str]) -> Self {
        Self {
            device,
            technique: technique.into(),
            parameters: EffectParameters::with_names(parameter_names),
        }
    }

    /// Switch technique
    pub fn set_technique(&mut self, technique: impl Into<String>) {
        self.technique = technique.into();
    }
}

impl Effect for CustomEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::Custom
    }

    fn graphics_device(&self) -> Option<&DeviceHandle> {
        self.device.as_ref()
    }

    fn technique(&self) -> &str {
        &self.technique
    }

    fn parameters(&self) -> &EffectParameters {
        &self.parameters
    }

    fn parameters_mut(&mut self) -> &mut EffectParameters {
        &mut self.parameters
    }
}
