//! Scenes - layers, a camera and popups driven through lifecycle hooks
//!
//! A [`Scene`] is the engine-owned state ([`SceneCore`]) plus the game's
//! [`SceneScript`]. The engine calls the hooks in a fixed order:
//!
//! ```text
//! initialize -> load | load_async -> activity(true)     first frame
//! activity(false) -> camera -> layers -> popups         every later tick
//! destroy -> popups -> layers -> release content manager removal
//! ```

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use crate::content::ContentManager;
use crate::core::config::CameraConfig;
use crate::core::{EngineServices, ProgressCallback, SceneError};
use crate::graphics::{BasicEffect, Effect};
use crate::scene::camera::Camera;
use crate::scene::director::SceneKey;
use crate::scene::entity::EntityHandle;
use crate::scene::layer::Layer;
use crate::scene::registry::SceneArgs;
use crate::scene::transition::SceneTransition;

/// Future returned by [`SceneScript::load_async`]
///
/// Not `Send`: scenes stay on the thread that ticks them.
pub type LoadFuture<'a> = Pin<Box<dyn Future<Output = Result<(), SceneError>> + 'a>>;

/// Game-specific behaviour of a scene
pub trait SceneScript {
    /// Runs once before loading
    fn initialize(&mut self, _scene: &mut SceneCore, _services: &mut EngineServices) -> Result<(), SceneError> {
        Ok(())
    }

    /// Load content synchronously
    fn load(&mut self, _scene: &mut SceneCore, _services: &mut EngineServices) -> Result<(), SceneError> {
        Ok(())
    }

    /// Load content in the background, reporting progress in percent
    ///
    /// The default runs [`load`](Self::load) and reports `100.0`.
    fn load_async<'a>(
        &'a mut self,
        scene: &'a mut SceneCore,
        services: &'a mut EngineServices,
        progress: Option<ProgressCallback>,
    ) -> LoadFuture<'a> {
        Box::pin(async move {
            self.load(scene, services)?;
            if let Some(progress) = progress {
                progress(100.0);
            }
            Ok(())
        })
    }

    /// Per-frame game logic; `is_first_call` is true exactly once, right after loading
    fn activity(
        &mut self,
        _scene: &mut SceneCore,
        _services: &mut EngineServices,
        _is_first_call: bool,
    ) -> Result<(), SceneError> {
        Ok(())
    }

    /// Scene-specific teardown
    fn destroy(&mut self, scene: &mut SceneCore, services: &mut EngineServices);
}

/// Engine-owned state of a scene
pub struct SceneCore {
    key: Option<SceneKey>,
    content_manager_name: String,
    time_created: f32,
    game_time: f32,
    camera_config: CameraConfig,
    camera: Rc<RefCell<Camera>>,
    default_layer: Layer,
    layers: Vec<Layer>,
    popups: Vec<Scene>,
    default_effect: Option<BasicEffect>,
    is_loaded: bool,
    enable_updates: bool,
    enable_drawing: bool,
}

impl SceneCore {
    fn new(content_manager_name: String, camera_config: CameraConfig, time_created: f32) -> Self {
        let camera = Camera::from_config(&camera_config)
            .with_name(format!("{content_manager_name} camera"))
            .with_time_created(time_created)
            .at(crate::foundation::math::Vec3::new(0.0, 0.0, camera_config.scene_camera_z));
        let camera = Rc::new(RefCell::new(camera));
        let default_layer = Layer::new("DefaultLayer", Rc::clone(&camera)).with_time_created(time_created);

        Self {
            key: None,
            content_manager_name,
            time_created,
            game_time: time_created,
            camera_config,
            camera,
            default_layer,
            layers: Vec::new(),
            popups: Vec::new(),
            default_effect: None,
            is_loaded: false,
            enable_updates: true,
            enable_drawing: true,
        }
    }

    /// Director key, once the director manages the scene
    pub fn key(&self) -> Option<SceneKey> {
        self.key
    }

    /// Name of the content manager the scene loads into
    pub fn content_manager_name(&self) -> &str {
        &self.content_manager_name
    }

    /// Engine time the scene was created at
    pub fn time_created(&self) -> f32 {
        self.time_created
    }

    /// The scene camera, shared with the layers that use it
    pub fn camera(&self) -> &Rc<RefCell<Camera>> {
        &self.camera
    }

    /// Whether loading finished
    pub fn is_loaded(&self) -> bool {
        self.is_loaded
    }

    /// Whether ticks reach the scene
    pub fn enable_updates(&self) -> bool {
        self.enable_updates
    }

    /// Enable or disable ticking
    pub fn set_enable_updates(&mut self, enabled: bool) {
        self.enable_updates = enabled;
    }

    /// Whether the scene draws
    pub fn enable_drawing(&self) -> bool {
        self.enable_drawing
    }

    /// Enable or disable drawing
    pub fn set_enable_drawing(&mut self, enabled: bool) {
        self.enable_drawing = enabled;
    }

    /// Effect created on the first draw
    pub fn default_effect(&self) -> Option<&BasicEffect> {
        self.default_effect.as_ref()
    }

    /// Content manager of this scene, created on first use
    pub fn content(&self, services: &mut EngineServices) -> Arc<ContentManager> {
        services.content_manager(&self.content_manager_name)
    }

    //--- Layers -------------------------------------------------------------

    /// Layer every scene has
    pub fn default_layer(&self) -> &Layer {
        &self.default_layer
    }

    /// Mutable default layer
    pub fn default_layer_mut(&mut self) -> &mut Layer {
        &mut self.default_layer
    }

    /// Extra layers in draw order
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Extra layer at `index`
    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }

    /// Append a layer viewed through the scene camera
    pub fn add_layer(&mut self, name: impl Into<String>) -> &mut Layer {
        let camera = Rc::clone(&self.camera);
        self.add_layer_with_camera(name, camera)
    }

    /// Append a layer viewed through another camera
    pub fn add_layer_with_camera(&mut self, name: impl Into<String>, camera: Rc<RefCell<Camera>>) -> &mut Layer {
        let layer = Layer::new(name, camera).with_time_created(self.game_time);
        let index = self.layers.len();
        self.layers.push(layer);
        &mut self.layers[index]
    }

    //--- Entities -----------------------------------------------------------

    /// Add an entity to the default layer
    pub fn add(&mut self, entity: impl Into<EntityHandle>) {
        self.default_layer.add(entity);
    }

    /// Add an entity to the extra layer at `layer_index`; returns `false` if there is no such layer
    pub fn add_to(&mut self, layer_index: usize, entity: impl Into<EntityHandle>) -> bool {
        match self.layers.get_mut(layer_index) {
            Some(layer) => {
                layer.add(entity);
                true
            }
            None => false,
        }
    }

    /// Remove an entity from the default layer and every extra layer
    pub fn remove(&mut self, entity: &EntityHandle) -> bool {
        let mut removed = self.default_layer.remove(entity);
        for layer in &mut self.layers {
            removed |= layer.remove(entity);
        }
        removed
    }

    //--- Popups -------------------------------------------------------------

    /// Popups in load order
    pub fn popups(&self) -> &[Scene] {
        &self.popups
    }

    /// Mutable popups
    pub fn popups_mut(&mut self) -> &mut Vec<Scene> {
        &mut self.popups
    }

    /// Build, load and start a popup of a registered type
    ///
    /// The popup shares this scene's content manager and camera settings, and
    /// is updated and drawn after this scene's own layers.
    pub fn load_popup(&mut self, services: &mut EngineServices, type_name: &str) -> Result<&mut Scene, SceneError> {
        let mut popup = self.create_popup(services, type_name)?;
        popup.initialize(services)?;
        popup.load(services)?;
        popup.activity(services, true)?;
        popup.has_started = true;

        Ok(self.push_popup(popup))
    }

    /// Like [`load_popup`](Self::load_popup), loading through the popup's async loader
    pub async fn load_popup_async(
        &mut self,
        services: &mut EngineServices,
        type_name: &str,
        progress: Option<ProgressCallback>,
    ) -> Result<&mut Scene, SceneError> {
        let mut popup = self.create_popup(services, type_name)?;
        popup.initialize(services)?;
        popup.load_async(services, progress).await?;
        popup.activity(services, true)?;
        popup.has_started = true;

        Ok(self.push_popup(popup))
    }

    fn create_popup(&self, services: &EngineServices, type_name: &str) -> Result<Scene, SceneError> {
        let args = SceneArgs::new(self.content_manager_name.clone(), self.camera_config.clone())
            .with_time_created(services.total_game_time());
        services.registry().create(type_name, args)
    }

    fn push_popup(&mut self, popup: Scene) -> &mut Scene {
        log::info!("Popup '{}' loaded", popup.type_name());
        let index = self.popups.len();
        self.popups.push(popup);
        &mut self.popups[index]
    }

    //--- Transitions --------------------------------------------------------

    /// Leave this scene and start a scene of type `target`, or just leave when `target` is empty
    ///
    /// Applied by the director once the current tick finishes.
    pub fn move_to_scene(&self, services: &mut EngineServices, target: &str) {
        let target = target.trim();
        let target = (!target.is_empty()).then(|| target.to_string());

        if self.key.is_none() {
            log::warn!("Scene using '{}' is not director-managed; only the target will start", self.content_manager_name);
        }

        services.request_transition(SceneTransition::MoveTo { from: self.key, target });
    }
}

/// A scene: engine state plus game behaviour
pub struct Scene {
    type_name: String,
    core: SceneCore,
    script: Box<dyn SceneScript>,
    has_started: bool,
}

impl Scene {
    /// Build a scene from factory arguments
    pub fn new(args: &SceneArgs, script: impl SceneScript + 'static) -> Self {
        Self {
            type_name: String::new(),
            core: SceneCore::new(args.content_manager_name.clone(), args.camera.clone(), args.time_created),
            script: Box::new(script),
            has_started: false,
        }
    }

    /// Build a scene with the default camera
    pub fn with_content_manager(content_manager_name: impl Into<String>, script: impl SceneScript + 'static) -> Self {
        let args = SceneArgs::new(content_manager_name, CameraConfig::default());
        Self::new(&args, script)
    }

    /// Registered type name, empty for scenes built by hand
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub(crate) fn set_type_name(&mut self, name: &str) {
        self.type_name = name.to_string();
    }

    pub(crate) fn set_key(&mut self, key: SceneKey) {
        self.core.key = Some(key);
    }

    /// Engine-owned state
    pub fn core(&self) -> &SceneCore {
        &self.core
    }

    /// Mutable engine-owned state
    pub fn core_mut(&mut self) -> &mut SceneCore {
        &mut self.core
    }

    /// Whether the first-frame sequence has run
    pub fn has_started(&self) -> bool {
        self.has_started
    }

    /// Whether loading finished
    pub fn is_loaded(&self) -> bool {
        self.core.is_loaded
    }

    //--- Lifecycle ----------------------------------------------------------

    /// Run the initialize hook
    pub fn initialize(&mut self, services: &mut EngineServices) -> Result<(), SceneError> {
        self.core.game_time = services.total_game_time();
        self.script.initialize(&mut self.core, services)
    }

    /// Run the load hook and mark the scene loaded
    pub fn load(&mut self, services: &mut EngineServices) -> Result<(), SceneError> {
        self.script.load(&mut self.core, services)?;
        self.core.is_loaded = true;
        Ok(())
    }

    /// Run the async load hook and mark the scene loaded when it completes
    pub async fn load_async(
        &mut self,
        services: &mut EngineServices,
        progress: Option<ProgressCallback>,
    ) -> Result<(), SceneError> {
        self.script.load_async(&mut self.core, services, progress).await?;
        self.core.is_loaded = true;
        log::debug!("Scene '{}' finished loading asynchronously", self.type_name);
        Ok(())
    }

    /// Run the activity hook
    pub fn activity(&mut self, services: &mut EngineServices, is_first_call: bool) -> Result<(), SceneError> {
        self.script.activity(&mut self.core, services, is_first_call)
    }

    /// Run the first-frame sequence if it has not run yet
    ///
    /// Initialize, load, then the first activity call.
    pub fn start(&mut self, services: &mut EngineServices) -> Result<(), SceneError> {
        if self.has_started {
            return Ok(());
        }

        self.initialize(services)?;
        self.load(services)?;
        self.activity(services, true)?;
        self.has_started = true;

        log::info!("Scene '{}' started", self.type_name);
        Ok(())
    }

    pub(crate) fn mark_started(&mut self) {
        self.has_started = true;
    }

    /// Tick: activity, camera, default layer, extra layers, popups
    pub fn update(&mut self, services: &mut EngineServices, delta: f32) -> Result<(), SceneError> {
        if !self.core.enable_updates {
            return Ok(());
        }
        if !self.core.is_loaded {
            log::trace!("Scene '{}' not loaded yet, skipping update", self.type_name);
            return Ok(());
        }

        self.core.game_time = services.total_game_time();
        self.script.activity(&mut self.core, services, false)?;

        self.core.camera.borrow_mut().update(delta);
        self.core.default_layer.update(delta);
        for layer in &mut self.core.layers {
            layer.update(delta);
        }
        for popup in &mut self.core.popups {
            popup.update(services, delta)?;
        }

        Ok(())
    }

    /// Draw the default layer, extra layers and popups with the scene's effect
    ///
    /// The first call only creates the effect (and seeds the camera viewport
    /// from the device); drawing starts with the second call.
    pub fn draw(&mut self, services: &EngineServices) {
        if !self.core.enable_drawing {
            return;
        }
        let Some(device) = services.graphics_device() else {
            log::trace!("No graphics device, scene '{}' not drawn", self.type_name);
            return;
        };

        if self.core.default_effect.is_none() {
            let mut effect = BasicEffect::new(Rc::clone(device));
            effect.set_texture_enabled(true);

            let mut camera = self.core.camera.borrow_mut();
            if camera.viewport().is_none() {
                camera.set_viewport(device.borrow().viewport());
            }
            drop(camera);

            self.core.default_effect = Some(effect);
            log::debug!("Default effect created for scene '{}'", self.type_name);
            return;
        }
        let Some(effect) = self.core.default_effect.as_mut() else {
            return;
        };

        let camera = self.core.camera.borrow();
        if let Some(viewport) = camera.viewport() {
            device.borrow_mut().set_viewport(viewport);
        }
        effect.set_view(*camera.view());
        effect.set_projection(*camera.projection());
        drop(camera);

        effect.apply_current_technique();
        self.core.default_layer.draw(&mut *effect);
        for layer in &self.core.layers {
            layer.draw(&mut *effect);
        }
        for popup in &mut self.core.popups {
            popup.draw(services);
        }
    }

    /// Run the destroy hook, tear down popups and layers, then release the
    /// scene's content manager
    pub fn destroy(&mut self, services: &mut EngineServices) {
        self.script.destroy(&mut self.core, services);

        for mut popup in self.core.popups.drain(..) {
            popup.destroy(services);
        }
        self.core.default_layer.destroy();
        for layer in &mut self.core.layers {
            layer.destroy();
        }

        if !self.core.content_manager_name.trim().is_empty() {
            services.remove_content_manager(&self.core.content_manager_name);
        }
        log::info!("Scene '{}' destroyed", self.type_name);
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("type_name", &self.type_name)
            .field("content_manager", &self.core.content_manager_name)
            .field("has_started", &self.has_started)
            .field("is_loaded", &self.core.is_loaded)
            .finish_non_exhaustive()
    }
}
