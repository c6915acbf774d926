//! Engine - owns the services and the scene director and drives them per frame

use thiserror::Error;

use crate::config::ConfigError;
use crate::core::{EngineConfig, EngineServices, SceneError};
use crate::foundation::logging;
use crate::graphics::{Color, DeviceHandle};
use crate::scene::{Scene, SceneArgs, SceneDirector, SceneKey, SceneParam};
use crate::theme::ThemeError;

/// Errors raised by [`Engine`] operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// The configuration is invalid or could not be read
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A scene operation failed
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// A theme failed to load
    #[error("Theme error: {0}")]
    Theme(#[from] ThemeError),
}

/// Main engine struct
///
/// Call [`tick`](Self::tick) then [`draw`](Self::draw) once per frame.
pub struct Engine {
    services: EngineServices,
    director: SceneDirector,
}

impl Engine {
    /// Validate the configuration, initialise logging and create the services
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        logging::init(&config.log_level);
        log::info!("Initializing scene engine...");

        Ok(Self { services: EngineServices::new(config), director: SceneDirector::new() })
    }

    /// Engine services
    pub fn services(&self) -> &EngineServices {
        &self.services
    }

    /// Mutable engine services
    pub fn services_mut(&mut self) -> &mut EngineServices {
        &mut self.services
    }

    /// Scene director
    pub fn director(&self) -> &SceneDirector {
        &self.director
    }

    /// Mutable scene director
    pub fn director_mut(&mut self) -> &mut SceneDirector {
        &mut self.director
    }

    /// Both halves at once, for calls that need the director and the services together
    pub fn split_mut(&mut self) -> (&mut SceneDirector, &mut EngineServices) {
        (&mut self.director, &mut self.services)
    }

    /// Register a scene factory under `name`
    pub fn register_scene<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(SceneArgs) -> Result<Scene, SceneError> + 'static,
    {
        self.services.registry_mut().register(name, factory);
    }

    /// Attach the device scenes draw with
    pub fn attach_graphics_device(&mut self, device: DeviceHandle) {
        self.services.set_graphics_device(device);
    }

    /// Start a registered scene and make it current
    pub fn start_scene(&mut self, type_name: &str, params: Vec<SceneParam>) -> Result<SceneKey, EngineError> {
        Ok(self.director.start_scene(&mut self.services, type_name, params)?)
    }

    /// Load a theme by name or alias
    pub fn load_theme(&mut self, name: &str) -> Result<(), EngineError> {
        Ok(self.services.themes_mut().load_theme(name)?)
    }

    /// Advance the clock by `delta` seconds and update the current scene
    ///
    /// Transitions requested during the update are applied before returning.
    pub fn tick(&mut self, delta: f32) -> Result<(), EngineError> {
        self.services.timer_mut().advance(delta);
        self.director.update(&mut self.services, delta)?;
        Ok(())
    }

    /// Clear the frame and draw the current scene
    pub fn draw(&mut self) -> Result<(), EngineError> {
        let device = self
            .services
            .graphics_device()
            .cloned()
            .ok_or_else(|| SceneError::InvalidState("no graphics device attached".to_string()))?;

        device.borrow_mut().clear(Color::from_array(self.services.config().clear_color));
        self.director.draw(&self.services);
        Ok(())
    }

    /// Destroy every scene
    pub fn shutdown(&mut self) {
        log::info!("Shutting down scene engine with {} scene(s)", self.director.len());
        self.director.clear(&mut self.services);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::HeadlessDevice;
    use crate::testing::{hook, ScriptLog};

    fn engine(log: &ScriptLog) -> Engine {
        let mut engine = Engine::new(EngineConfig::new().with_clear_color([0.0, 0.0, 1.0, 1.0])).unwrap();
        for name in ["Menu", "Game"] {
            let factory_log = log.clone();
            engine.register_scene(name, move |args| Ok(factory_log.scene(&args)));
        }
        engine
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig::new().with_log_level("  ");
        assert!(matches!(Engine::new(config), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_draw_without_device_is_invalid_state() {
        let log = ScriptLog::default();
        let mut engine = engine(&log);
        assert!(matches!(engine.draw(), Err(EngineError::Scene(SceneError::InvalidState(_)))));
    }

    #[test]
    fn test_tick_advances_time_and_starts_scene() {
        let log = ScriptLog::default();
        let mut engine = engine(&log);
        engine.start_scene("Menu", Vec::new()).unwrap();

        engine.tick(0.5).unwrap();
        engine.tick(0.25).unwrap();

        assert_eq!(engine.services().total_game_time(), 0.75);
        assert_eq!(engine.services().elapsed_game_time(), 0.25);
        assert_eq!(
            log.entries(),
            vec!["Menu:initialize", "Menu:load", "Menu:activity(true)", "Menu:activity(false)"]
        );
    }

    #[test]
    fn test_draw_clears_with_configured_color() {
        let log = ScriptLog::default();
        let mut engine = engine(&log);
        let device = HeadlessDevice::shared();
        engine.attach_graphics_device(device.clone());
        engine.start_scene("Menu", Vec::new()).unwrap();

        engine.draw().unwrap();
        engine.draw().unwrap();

        assert_eq!(device.borrow().clears(), &[Color::new(0.0, 0.0, 1.0, 1.0); 2]);
    }

    #[test]
    fn test_transition_applied_within_tick() {
        let log = ScriptLog::default();
        let mut engine = engine(&log);
        let factory_log = log.clone();
        engine.register_scene("Intro", move |args| {
            Ok(factory_log.scene_with(
                &args,
                hook(|scene, services, _| {
                    scene.move_to_scene(services, "Game");
                    Ok(())
                }),
            ))
        });

        engine.start_scene("Intro", Vec::new()).unwrap();
        engine.tick(0.016).unwrap();

        assert_eq!(engine.director().len(), 1);
        assert_eq!(engine.director().current_scene().unwrap().type_name(), "Game");
    }

    #[test]
    fn test_shutdown_destroys_scenes() {
        let log = ScriptLog::default();
        let mut engine = engine(&log);
        engine.start_scene("Menu", Vec::new()).unwrap();
        engine.start_scene("Game", Vec::new()).unwrap();

        engine.shutdown();

        assert!(engine.director().is_empty());
        assert_eq!(log.entries(), vec!["Menu:destroy", "Game:destroy"]);
    }
}
