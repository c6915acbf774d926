//! Test doubles shared by the unit tests

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::{EngineServices, ProgressCallback, SceneError};
use crate::foundation::math::Vec3;
use crate::graphics::Effect;
use crate::scene::{
    Destroyable, DrawableEntity, Entity, LoadFuture, Scene, SceneArgs, SceneCore, SceneScript,
    UpdateableEntity,
};

/// Ordered record of names, shared between a test and its doubles
#[derive(Clone, Default)]
pub struct DrawLog(Rc<RefCell<Vec<String>>>);

impl DrawLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Entity with every capability that records what happens to it
pub struct Probe {
    pub name: String,
    pub position: Vec3,
    pub updates: u32,
    pub enable_updates: bool,
    pub destroyed: bool,
    log: DrawLog,
}

impl Probe {
    pub fn shared(name: &str, log: &DrawLog) -> Rc<RefCell<Probe>> {
        Rc::new(RefCell::new(Probe {
            name: name.to_string(),
            position: Vec3::zeros(),
            updates: 0,
            enable_updates: true,
            destroyed: false,
            log: log.clone(),
        }))
    }
}

impl Entity for Probe {
    fn name(&self) -> &str {
        &self.name
    }
}

impl UpdateableEntity for Probe {
    fn enable_updates(&self) -> bool {
        self.enable_updates
    }

    fn update(&mut self, _delta: f32) {
        self.updates += 1;
    }
}

impl DrawableEntity for Probe {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn draw(&mut self, _effect: &mut dyn Effect) {
        self.log.push(self.name.clone());
    }
}

impl Destroyable for Probe {
    fn destroy(&mut self) {
        self.destroyed = true;
    }
}

/// Hook run from [`RecordingScript::activity`]
pub type ActivityHook = Box<dyn FnMut(&mut SceneCore, &mut EngineServices, bool) -> Result<(), SceneError>>;

/// Box an activity hook
pub fn hook<F>(f: F) -> ActivityHook
where
    F: FnMut(&mut SceneCore, &mut EngineServices, bool) -> Result<(), SceneError> + 'static,
{
    Box::new(f)
}

/// Record of scene hook calls, shared between a test and its scripts
#[derive(Clone, Default)]
pub struct ScriptLog(Rc<RefCell<Vec<String>>>);

impl ScriptLog {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Scene whose hooks record into this log, labelled with its content manager name
    pub fn scene(&self, args: &SceneArgs) -> Scene {
        Scene::new(args, RecordingScript::new(&args.content_manager_name, self))
    }

    /// Scene with a custom activity hook
    pub fn scene_with(&self, args: &SceneArgs, hook: ActivityHook) -> Scene {
        Scene::new(args, RecordingScript::new(&args.content_manager_name, self).on_activity(hook))
    }
}

/// Scene script that records every hook call
pub struct RecordingScript {
    label: String,
    log: ScriptLog,
    on_activity: Option<ActivityHook>,
}

impl RecordingScript {
    pub fn new(label: &str, log: &ScriptLog) -> Self {
        Self { label: label.to_string(), log: log.clone(), on_activity: None }
    }

    pub fn on_activity(mut self, hook: ActivityHook) -> Self {
        self.on_activity = Some(hook);
        self
    }

    fn record(&self, hook: &str) {
        self.log.record(format!("{}:{hook}", self.label));
    }
}

impl SceneScript for RecordingScript {
    fn initialize(&mut self, _scene: &mut SceneCore, _services: &mut EngineServices) -> Result<(), SceneError> {
        self.record("initialize");
        Ok(())
    }

    fn load(&mut self, _scene: &mut SceneCore, _services: &mut EngineServices) -> Result<(), SceneError> {
        self.record("load");
        Ok(())
    }

    fn load_async<'a>(
        &'a mut self,
        _scene: &'a mut SceneCore,
        _services: &'a mut EngineServices,
        progress: Option<ProgressCallback>,
    ) -> LoadFuture<'a> {
        Box::pin(async move {
            self.record("load_async");
            if let Some(progress) = progress {
                progress(50.0);
                progress(100.0);
            }
            Ok(())
        })
    }

    fn activity(
        &mut self,
        scene: &mut SceneCore,
        services: &mut EngineServices,
        is_first_call: bool,
    ) -> Result<(), SceneError> {
        self.record(&format!("activity({is_first_call})"));
        match self.on_activity.as_mut() {
            Some(hook) => hook(scene, services, is_first_call),
            None => Ok(()),
        }
    }

    fn destroy(&mut self, _scene: &mut SceneCore, _services: &mut EngineServices) {
        self.record("destroy");
    }
}
