//! Scene factories by name
//!
//! Scene types are registered once at startup under a string key. Starting a
//! scene or loading a popup looks the key up and calls the factory with the
//! arguments the director or the parent scene supplies.

use std::collections::HashMap;

use crate::core::config::CameraConfig;
use crate::core::SceneError;
use crate::scene::lifecycle::Scene;

/// Positional argument passed to a scene factory
#[derive(Debug, Clone, PartialEq)]
pub enum SceneParam {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f32),
    /// String
    Text(String),
}

/// Everything a factory gets to build a scene
#[derive(Debug, Clone)]
pub struct SceneArgs {
    /// Content manager the scene loads into
    pub content_manager_name: String,
    /// Perspective for the scene camera
    pub camera: CameraConfig,
    /// Engine time the scene is created at
    pub time_created: f32,
    /// Caller-supplied arguments
    pub params: Vec<SceneParam>,
}

impl SceneArgs {
    /// Arguments without parameters
    pub fn new(content_manager_name: impl Into<String>, camera: CameraConfig) -> Self {
        Self {
            content_manager_name: content_manager_name.into(),
            camera,
            time_created: 0.0,
            params: Vec::new(),
        }
    }

    /// Attach positional parameters
    pub fn with_params(mut self, params: Vec<SceneParam>) -> Self {
        self.params = params;
        self
    }

    /// Set the creation time
    pub fn with_time_created(mut self, time: f32) -> Self {
        self.time_created = time;
        self
    }

    /// Parameter at `index`
    pub fn param(&self, index: usize) -> Option<&SceneParam> {
        self.params.get(index)
    }

    /// String parameter at `index`
    pub fn text(&self, index: usize) -> Option<&str> {
        match self.param(index) {
            Some(SceneParam::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Float parameter at `index`; integers convert
    pub fn float(&self, index: usize) -> Option<f32> {
        match self.param(index) {
            Some(SceneParam::Float(value)) => Some(*value),
            Some(SceneParam::Int(value)) => Some(*value as f32),
            _ => None,
        }
    }

    /// Integer parameter at `index`
    pub fn int(&self, index: usize) -> Option<i64> {
        match self.param(index) {
            Some(SceneParam::Int(value)) => Some(*value),
            _ => None,
        }
    }

    /// Boolean parameter at `index`
    pub fn bool(&self, index: usize) -> Option<bool> {
        match self.param(index) {
            Some(SceneParam::Bool(value)) => Some(*value),
            _ => None,
        }
    }
}

/// Builds a scene from its arguments
pub type SceneFactory = Box<dyn Fn(SceneArgs) -> Result<Scene, SceneError>>;

/// Scene factories by name
#[derive(Default)]
pub struct SceneRegistry {
    factories: HashMap<String, SceneFactory>,
}

impl SceneRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory, replacing any earlier one with the same name
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(SceneArgs) -> Result<Scene, SceneError> + 'static,
    {
        let name = name.into();
        if self.factories.insert(name.clone(), Box::new(factory)).is_some() {
            log::warn!("Scene type '{name}' registered twice, keeping the newer factory");
        } else {
            log::debug!("Registered scene type '{name}'");
        }
    }

    /// Whether a factory exists for `name`
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in no particular order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build a scene of type `name`
    ///
    /// # Errors
    /// `NotFound` for an unregistered name; whatever the factory returns otherwise.
    pub fn create(&self, name: &str, args: SceneArgs) -> Result<Scene, SceneError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| SceneError::NotFound(format!("scene type '{name}'")))?;

        let mut scene = factory(args)?;
        scene.set_type_name(name);
        Ok(scene)
    }
}
