//! Engine services - the explicit context every scene hook receives
//!
//! Holds what the scene graph needs from the outside world: the clock, the
//! graphics device (once one exists), the named content caches, the loaded
//! theme, the scene registry and the queue of scene transitions requested
//! during a tick.

use std::sync::Arc;

use crate::content::{ContentManager, ContentManagers};
use crate::core::config::EngineConfig;
use crate::foundation::time::Timer;
use crate::graphics::DeviceHandle;
use crate::scene::{SceneRegistry, SceneTransition, TransitionQueue};
use crate::theme::{ThemeLibrary, THEME_CONTENT_MANAGER};

/// Progress notification for background loads, in percent (`0.0..=100.0`)
///
/// May be invoked from a loader thread rather than the tick thread.
pub type ProgressCallback = Arc<dyn Fn(f32) + Send + Sync>;

/// Engine-wide services shared by the director and every scene
pub struct EngineServices {
    config: EngineConfig,
    timer: Timer,
    graphics_device: Option<DeviceHandle>,
    content: ContentManagers,
    themes: ThemeLibrary,
    registry: SceneRegistry,
    transitions: TransitionQueue,
}

impl EngineServices {
    /// Create services with no graphics device attached
    pub fn new(config: EngineConfig) -> Self {
        let mut content = ContentManagers::new();
        let themes = ThemeLibrary::new(&config.content, content.get_or_create(THEME_CONTENT_MANAGER, 0.0));

        Self {
            config,
            timer: Timer::new(),
            graphics_device: None,
            content,
            themes,
            registry: SceneRegistry::new(),
            transitions: TransitionQueue::new(),
        }
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    //--- Time -------------------------------------------------------------

    /// Seconds since the engine started ticking
    pub fn total_game_time(&self) -> f32 {
        self.timer.total_time()
    }

    /// Seconds covered by the last tick
    pub fn elapsed_game_time(&self) -> f32 {
        self.timer.delta_time()
    }

    /// Engine clock
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Mutable engine clock
    pub fn timer_mut(&mut self) -> &mut Timer {
        &mut self.timer
    }

    //--- Graphics ---------------------------------------------------------

    /// The graphics device, once one has been attached
    pub fn graphics_device(&self) -> Option<&DeviceHandle> {
        self.graphics_device.as_ref()
    }

    /// Attach the graphics device scenes draw with
    pub fn set_graphics_device(&mut self, device: DeviceHandle) {
        log::info!("Graphics device attached");
        self.graphics_device = Some(device);
    }

    //--- Content ----------------------------------------------------------

    /// Get the content manager with this name, creating it on first use
    pub fn content_manager(&mut self, name: &str) -> Arc<ContentManager> {
        let time = self.timer.total_time();
        self.content.get_or_create(name, time)
    }

    /// Release and forget every content manager with this name
    pub fn remove_content_manager(&mut self, name: &str) {
        self.content.remove(name);
    }

    /// All live content managers
    pub fn content_managers(&self) -> &ContentManagers {
        &self.content
    }

    /// Loaded theme content
    pub fn themes(&self) -> &ThemeLibrary {
        &self.themes
    }

    /// Mutable theme library, for loading themes
    pub fn themes_mut(&mut self) -> &mut ThemeLibrary {
        &mut self.themes
    }

    //--- Scenes -----------------------------------------------------------

    /// Scene factories by name
    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    /// Mutable scene registry, for registering factories at startup
    pub fn registry_mut(&mut self) -> &mut SceneRegistry {
        &mut self.registry
    }

    /// Queue a scene transition for the director to apply after this tick
    pub fn request_transition(&mut self, transition: SceneTransition) {
        self.transitions.push(transition);
    }

    /// Take every queued transition, leaving the queue empty
    pub fn take_transitions(&mut self) -> Vec<SceneTransition> {
        self.transitions.take()
    }

    /// Whether any transition is waiting
    pub fn has_pending_transitions(&self) -> bool {
        !self.transitions.is_empty()
    }
}

impl Default for EngineServices {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
