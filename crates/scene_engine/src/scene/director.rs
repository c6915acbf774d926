//! Scene director - owns every active scene and the current one
//!
//! The director ticks and draws only the current scene. Scenes are started by
//! registered type name, loaded in the background, or handed over directly.
//! Removing the current scene falls back to the most recently added scene
//! still alive.

use crate::core::{EngineServices, ProgressCallback, SceneError};
use crate::foundation::collections::{new_key_type, OrderedSlotMap};
use crate::scene::lifecycle::Scene;
use crate::scene::registry::{SceneArgs, SceneParam};
use crate::scene::transition::SceneTransition;

new_key_type! {
    /// Stable handle to a scene owned by the director
    pub struct SceneKey;
}

/// Registry of active scenes
#[derive(Default)]
pub struct SceneDirector {
    scenes: OrderedSlotMap<SceneKey, Scene>,
    current: Option<SceneKey>,
}

impl SceneDirector {
    /// Director with no scenes
    pub fn new() -> Self {
        Self::default()
    }

    /// Key of the current scene
    pub fn current_key(&self) -> Option<SceneKey> {
        self.current
    }

    /// The current scene
    pub fn current_scene(&self) -> Option<&Scene> {
        self.current.and_then(|key| self.scenes.get(key))
    }

    /// The current scene, mutably
    pub fn current_scene_mut(&mut self) -> Option<&mut Scene> {
        let key = self.current?;
        self.scenes.get_mut(key)
    }

    /// Scene by key
    pub fn scene(&self, key: SceneKey) -> Option<&Scene> {
        self.scenes.get(key)
    }

    /// Scene by key, mutably
    pub fn scene_mut(&mut self, key: SceneKey) -> Option<&mut Scene> {
        self.scenes.get_mut(key)
    }

    /// Keys of every scene in the order they were added
    pub fn keys(&self) -> impl Iterator<Item = SceneKey> + '_ {
        self.scenes.keys()
    }

    /// Number of scenes
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Whether there are no scenes
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    //--- Per-frame ----------------------------------------------------------

    /// Tick the current scene, then apply transitions requested during the tick
    ///
    /// A current scene that has not started yet gets its first-frame sequence
    /// instead of an update.
    pub fn update(&mut self, services: &mut EngineServices, delta: f32) -> Result<(), SceneError> {
        if let Some(key) = self.current {
            match self.scenes.get_mut(key) {
                Some(scene) if !scene.has_started() => scene.start(services)?,
                Some(scene) => scene.update(services, delta)?,
                None => {
                    log::warn!("Current scene no longer exists");
                    self.current = None;
                }
            }
        }

        self.apply_transitions(services)
    }

    /// Draw the current scene
    pub fn draw(&mut self, services: &EngineServices) {
        if let Some(scene) = self.current_scene_mut() {
            scene.draw(services);
        }
    }

    /// Apply every queued transition in request order
    pub fn apply_transitions(&mut self, services: &mut EngineServices) -> Result<(), SceneError> {
        for transition in services.take_transitions() {
            match transition {
                SceneTransition::MoveTo { from, target } => {
                    if let Some(from) = from {
                        self.remove(services, from);
                    }
                    if let Some(target) = target {
                        self.start_scene(services, &target, Vec::new())?;
                    }
                }
            }
        }
        Ok(())
    }

    //--- Scene management ---------------------------------------------------

    /// Build a scene of a registered type and make it current
    ///
    /// With a graphics device attached the first-frame sequence runs right
    /// away; otherwise it runs on the next [`update`](Self::update). The scene
    /// stays registered even when its first frame fails.
    pub fn start_scene(
        &mut self,
        services: &mut EngineServices,
        type_name: &str,
        params: Vec<SceneParam>,
    ) -> Result<SceneKey, SceneError> {
        let args = Self::args_for(services, type_name, params);
        let scene = services.registry().create(type_name, args)?;
        let key = self.insert(scene);
        self.current = Some(key);
        log::info!("Starting scene '{type_name}'");

        if services.graphics_device().is_some() {
            if let Some(scene) = self.scenes.get_mut(key) {
                scene.start(services)?;
            }
        }

        Ok(key)
    }

    /// Build a scene of a registered type and load it through its async loader
    ///
    /// The loaded scene is registered and started but does not become current.
    /// A scene whose loading fails is dropped without being registered, along
    /// with its content manager.
    pub async fn load_scene_async(
        &mut self,
        services: &mut EngineServices,
        type_name: &str,
        progress: Option<ProgressCallback>,
        params: Vec<SceneParam>,
    ) -> Result<SceneKey, SceneError> {
        let args = Self::args_for(services, type_name, params);
        let scene = services.registry().create(type_name, args)?;
        let key = self.insert(scene);

        if let Err(error) = self.run_async_first_frame(services, key, progress).await {
            log::error!("Loading scene '{type_name}' failed: {error}");
            if let Some(scene) = self.scenes.remove(key) {
                self.release_content(services, &scene);
            }
            return Err(error);
        }

        log::info!("Scene '{type_name}' loaded in the background");
        Ok(key)
    }

    async fn run_async_first_frame(
        &mut self,
        services: &mut EngineServices,
        key: SceneKey,
        progress: Option<ProgressCallback>,
    ) -> Result<(), SceneError> {
        let scene = self
            .scenes
            .get_mut(key)
            .ok_or_else(|| SceneError::NotFound("scene being loaded".to_string()))?;

        scene.initialize(services)?;
        scene.load_async(services, progress).await?;
        scene.activity(services, true)?;
        scene.mark_started();
        Ok(())
    }

    /// Register a scene and make it current without running any hooks
    ///
    /// A scene that has not started runs its first-frame sequence on the next
    /// [`update`](Self::update).
    pub fn set_current_scene(&mut self, scene: Scene) -> SceneKey {
        let key = self.insert(scene);
        self.current = Some(key);
        key
    }

    /// Make an already registered scene current
    pub fn make_current(&mut self, key: SceneKey) -> Result<(), SceneError> {
        if !self.scenes.contains_key(key) {
            return Err(SceneError::NotFound("scene key".to_string()));
        }
        self.current = Some(key);
        Ok(())
    }

    /// Remove and destroy a scene; returns whether it existed
    ///
    /// Removing the current scene makes the most recently added remaining
    /// scene current, or leaves no current scene.
    pub fn remove(&mut self, services: &mut EngineServices, key: SceneKey) -> bool {
        let Some(mut scene) = self.scenes.remove(key) else {
            log::debug!("Scene to remove is not registered");
            return false;
        };

        if self.current == Some(key) {
            self.current = self.scenes.last_key();
        }

        scene.destroy(services);
        true
    }

    /// Destroy every scene, oldest first
    pub fn clear(&mut self, services: &mut EngineServices) {
        self.current = None;
        for mut scene in self.scenes.drain() {
            scene.destroy(services);
        }
    }

    fn insert(&mut self, mut scene: Scene) -> SceneKey {
        self.scenes.insert_with_key(|key| {
            scene.set_key(key);
            scene
        })
    }

    /// Drop the content manager of a scene that never made it into the director
    ///
    /// A manager still named by a registered scene stays.
    fn release_content(&self, services: &mut EngineServices, scene: &Scene) {
        let name = scene.core().content_manager_name();
        if name.trim().is_empty() {
            return;
        }
        let shared = self
            .scenes
            .keys()
            .filter_map(|key| self.scenes.get(key))
            .any(|other| other.core().content_manager_name() == name);
        if !shared {
            services.remove_content_manager(name);
        }
    }

    fn args_for(services: &EngineServices, type_name: &str, params: Vec<SceneParam>) -> SceneArgs {
        SceneArgs::new(type_name, services.config().camera.clone())
            .with_time_created(services.total_game_time())
            .with_params(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::HeadlessDevice;
    use crate::testing::{hook, DrawLog, Probe, ScriptLog};
    use crate::scene::EntityHandle;
    use std::sync::{Arc, Mutex};

    fn services(log: &ScriptLog, names: &[&str]) -> EngineServices {
        let mut services = EngineServices::default();
        for name in names {
            let factory_log = log.clone();
            services.registry_mut().register(*name, move |args| Ok(factory_log.scene(&args)));
        }
        services
    }

    #[test]
    fn test_start_scene_without_device_defers_first_frame() {
        let log = ScriptLog::default();
        let mut services = services(&log, &["Menu"]);
        let mut director = SceneDirector::new();

        let key = director.start_scene(&mut services, "Menu", Vec::new()).unwrap();
        assert_eq!(director.current_key(), Some(key));
        assert!(log.entries().is_empty());

        director.update(&mut services, 0.016).unwrap();
        assert_eq!(log.entries(), vec!["Menu:initialize", "Menu:load", "Menu:activity(true)"]);

        log.clear();
        director.update(&mut services, 0.016).unwrap();
        assert_eq!(log.entries(), vec!["Menu:activity(false)"]);
    }

    #[test]
    fn test_start_scene_with_device_runs_first_frame_immediately() {
        let log = ScriptLog::default();
        let mut services = services(&log, &["Menu"]);
        services.set_graphics_device(HeadlessDevice::shared());
        let mut director = SceneDirector::new();

        director.start_scene(&mut services, "Menu", Vec::new()).unwrap();
        assert_eq!(log.entries(), vec!["Menu:initialize", "Menu:load", "Menu:activity(true)"]);

        log.clear();
        director.update(&mut services, 0.016).unwrap();
        assert_eq!(log.entries(), vec!["Menu:activity(false)"]);
    }

    #[test]
    fn test_start_unknown_scene_registers_nothing() {
        let log = ScriptLog::default();
        let mut services = services(&log, &[]);
        let mut director = SceneDirector::new();

        let result = director.start_scene(&mut services, "Missing", Vec::new());
        assert!(matches!(result, Err(SceneError::NotFound(_))));
        assert!(director.is_empty());
        assert!(director.current_key().is_none());
    }

    #[test]
    fn test_scene_content_manager_is_named_after_type() {
        let log = ScriptLog::default();
        let mut services = services(&log, &["Menu"]);
        let mut director = SceneDirector::new();

        let key = director.start_scene(&mut services, "Menu", Vec::new()).unwrap();
        let scene = director.scene(key).unwrap();
        assert_eq!(scene.core().content_manager_name(), "Menu");
        assert_eq!(scene.core().key(), Some(key));
    }

    #[test]
    fn test_removing_current_falls_back_to_last_added() {
        let log = ScriptLog::default();
        let mut services = services(&log, &["A", "B", "C"]);
        let mut director = SceneDirector::new();

        let a = director.start_scene(&mut services, "A", Vec::new()).unwrap();
        let b = director.start_scene(&mut services, "B", Vec::new()).unwrap();
        let c = director.start_scene(&mut services, "C", Vec::new()).unwrap();

        assert!(director.remove(&mut services, c));
        assert_eq!(director.current_key(), Some(b));

        assert!(director.remove(&mut services, a));
        assert_eq!(director.current_key(), Some(b));

        assert!(director.remove(&mut services, b));
        assert_eq!(director.current_key(), None);
        assert!(!director.remove(&mut services, b));

        assert_eq!(log.entries(), vec!["C:destroy", "A:destroy", "B:destroy"]);
    }

    #[test]
    fn test_remove_releases_scene_content() {
        let log = ScriptLog::default();
        let mut services = services(&log, &["Menu"]);
        let mut director = SceneDirector::new();

        let key = director.start_scene(&mut services, "Menu", Vec::new()).unwrap();
        services.content_manager("Menu");
        director.remove(&mut services, key);

        assert!(services.content_managers().get("Menu").is_none());
    }

    #[test]
    fn test_move_to_scene_replaces_requesting_scene_after_tick() {
        let log = ScriptLog::default();
        let mut services = services(&log, &["Credits"]);
        let factory_log = log.clone();
        services.registry_mut().register("Game", move |args| {
            Ok(factory_log.scene_with(
                &args,
                hook(|scene, services, first| {
                    if !first {
                        scene.move_to_scene(services, "Credits");
                    }
                    Ok(())
                }),
            ))
        });

        let mut director = SceneDirector::new();
        let game = director.start_scene(&mut services, "Game", Vec::new()).unwrap();
        director.update(&mut services, 0.016).unwrap();
        log.clear();

        director.update(&mut services, 0.016).unwrap();

        assert!(director.scene(game).is_none());
        assert_eq!(director.len(), 1);
        assert_eq!(director.current_scene().unwrap().type_name(), "Credits");
        assert_eq!(log.entries(), vec!["Game:activity(false)", "Game:destroy"]);

        director.update(&mut services, 0.016).unwrap();
        assert!(director.current_scene().unwrap().has_started());
    }

    #[test]
    fn test_move_to_empty_scene_only_removes() {
        let log = ScriptLog::default();
        let mut services = services(&log, &["Menu"]);
        let factory_log = log.clone();
        services.registry_mut().register("Game", move |args| {
            Ok(factory_log.scene_with(
                &args,
                hook(|scene, services, _| {
                    scene.move_to_scene(services, "");
                    Ok(())
                }),
            ))
        });

        let mut director = SceneDirector::new();
        let menu = director.start_scene(&mut services, "Menu", Vec::new()).unwrap();
        director.start_scene(&mut services, "Game", Vec::new()).unwrap();
        director.update(&mut services, 0.016).unwrap();

        assert_eq!(director.len(), 1);
        assert_eq!(director.current_key(), Some(menu));
    }

    #[test]
    fn test_popup_move_to_scene_keeps_parent_and_starts_target() {
        let log = ScriptLog::default();
        let mut services = services(&log, &["Credits"]);
        let popup_log = log.clone();
        services.registry_mut().register("Pause", move |args| {
            Ok(popup_log.scene_with(
                &args,
                hook(|scene, services, first| {
                    if !first {
                        scene.move_to_scene(services, "Credits");
                    }
                    Ok(())
                }),
            ))
        });
        let parent_log = log.clone();
        services.registry_mut().register("Game", move |args| {
            Ok(parent_log.scene_with(
                &args,
                hook(|scene, services, first| {
                    if first {
                        scene.load_popup(services, "Pause")?;
                    }
                    Ok(())
                }),
            ))
        });

        let mut director = SceneDirector::new();
        let game = director.start_scene(&mut services, "Game", Vec::new()).unwrap();
        director.update(&mut services, 0.016).unwrap();
        director.update(&mut services, 0.016).unwrap();

        assert!(director.scene(game).is_some());
        assert_eq!(director.len(), 2);
        assert_eq!(director.current_scene().unwrap().type_name(), "Credits");
    }

    #[test]
    fn test_set_current_scene_starts_new_scene_but_never_restarts() {
        let log = ScriptLog::default();
        let mut services = services(&log, &["Menu"]);
        let mut director = SceneDirector::new();

        let menu = director.start_scene(&mut services, "Menu", Vec::new()).unwrap();
        director.update(&mut services, 0.016).unwrap();

        let args = SceneArgs::new("Manual", services.config().camera.clone());
        let manual = director.set_current_scene(log.scene(&args));
        assert_eq!(director.current_key(), Some(manual));
        log.clear();

        director.update(&mut services, 0.016).unwrap();
        assert_eq!(log.entries(), vec!["Manual:initialize", "Manual:load", "Manual:activity(true)"]);

        log.clear();
        director.make_current(menu).unwrap();
        director.update(&mut services, 0.016).unwrap();
        assert_eq!(log.entries(), vec!["Menu:activity(false)"]);
    }

    #[test]
    fn test_make_current_rejects_removed_key() {
        let log = ScriptLog::default();
        let mut services = services(&log, &["Menu"]);
        let mut director = SceneDirector::new();

        let menu = director.start_scene(&mut services, "Menu", Vec::new()).unwrap();
        director.remove(&mut services, menu);
        assert!(matches!(director.make_current(menu), Err(SceneError::NotFound(_))));
    }

    #[test]
    fn test_load_scene_async_registers_started_scene_without_switching() {
        let log = ScriptLog::default();
        let mut services = services(&log, &["Menu", "Level"]);
        let mut director = SceneDirector::new();
        let menu = director.start_scene(&mut services, "Menu", Vec::new()).unwrap();

        let reported = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reported);
        let progress: ProgressCallback = Arc::new(move |value: f32| sink.lock().unwrap().push(value));

        let level = pollster::block_on(director.load_scene_async(&mut services, "Level", Some(progress), Vec::new()))
            .unwrap();

        assert_eq!(director.current_key(), Some(menu));
        let scene = director.scene(level).unwrap();
        assert!(scene.has_started());
        assert!(scene.is_loaded());
        assert_eq!(*reported.lock().unwrap(), vec![50.0, 100.0]);
        assert_eq!(
            log.entries(),
            vec!["Level:initialize", "Level:load_async", "Level:activity(true)"]
        );
    }

    #[test]
    fn test_failed_async_load_is_not_registered() {
        let log = ScriptLog::default();
        let mut services = services(&log, &[]);
        let factory_log = log.clone();
        services.registry_mut().register("Broken", move |args| {
            Ok(factory_log.scene_with(
                &args,
                hook(|_, _, _| Err(SceneError::InvalidState("level data missing".to_string()))),
            ))
        });

        let mut director = SceneDirector::new();
        let result = pollster::block_on(director.load_scene_async(&mut services, "Broken", None, Vec::new()));

        assert!(matches!(result, Err(SceneError::InvalidState(_))));
        assert!(director.is_empty());
    }

    #[test]
    fn test_failed_async_load_releases_its_content() {
        let log = ScriptLog::default();
        let mut services = services(&log, &[]);
        let factory_log = log.clone();
        services.registry_mut().register("Broken", move |args| {
            Ok(factory_log.scene_with(
                &args,
                hook(|scene, services, _| {
                    let _content = scene.content(services);
                    Err(SceneError::InvalidState("level data missing".to_string()))
                }),
            ))
        });

        let mut director = SceneDirector::new();
        let result = pollster::block_on(director.load_scene_async(&mut services, "Broken", None, Vec::new()));

        assert!(result.is_err());
        assert!(services.content_managers().get("Broken").is_none());
    }

    #[test]
    fn test_failed_async_load_keeps_content_of_registered_scene() {
        let log = ScriptLog::default();
        let mut services = services(&log, &["Game"]);
        let mut director = SceneDirector::new();
        let running = director.start_scene(&mut services, "Game", Vec::new()).unwrap();
        let _content = director.scene(running).unwrap().core().content(&mut services);

        let factory_log = log.clone();
        services.registry_mut().register("Game", move |args| {
            Ok(factory_log.scene_with(
                &args,
                hook(|_, _, _| Err(SceneError::InvalidState("level data missing".to_string()))),
            ))
        });
        let result = pollster::block_on(director.load_scene_async(&mut services, "Game", None, Vec::new()));

        assert!(result.is_err());
        assert_eq!(director.len(), 1);
        assert!(services.content_managers().get("Game").is_some());
    }

    #[test]
    fn test_draw_reaches_only_current_scene() {
        let log = ScriptLog::default();
        let draw_log = DrawLog::default();
        let mut services = EngineServices::default();
        services.set_graphics_device(HeadlessDevice::shared());

        for name in ["First", "Second"] {
            let probe = Probe::shared(name, &draw_log);
            let factory_log = log.clone();
            services.registry_mut().register(name, move |args| {
                let mut scene = factory_log.scene(&args);
                scene.core_mut().add(EntityHandle::builder(&probe).drawable());
                Ok(scene)
            });
        }

        let mut director = SceneDirector::new();
        director.start_scene(&mut services, "First", Vec::new()).unwrap();
        director.start_scene(&mut services, "Second", Vec::new()).unwrap();

        director.draw(&services);
        director.draw(&services);

        assert_eq!(draw_log.entries(), vec!["Second"]);
    }

    #[test]
    fn test_clear_destroys_every_scene() {
        let log = ScriptLog::default();
        let mut services = services(&log, &["A", "B"]);
        let mut director = SceneDirector::new();
        director.start_scene(&mut services, "A", Vec::new()).unwrap();
        director.start_scene(&mut services, "B", Vec::new()).unwrap();

        director.clear(&mut services);

        assert!(director.is_empty());
        assert!(director.current_key().is_none());
        assert_eq!(log.entries(), vec!["A:destroy", "B:destroy"]);
    }
}
