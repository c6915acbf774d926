//! Scene demo
//!
//! Drives the scene engine headlessly: a menu that hands over to a game
//! scene, a pause popup loaded by the game, and a credits scene loaded in
//! the background. Everything drawn lands in a recording device whose
//! counters are logged at the end.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use scene_engine::prelude::*;

const FRAME: f32 = 1.0 / 60.0;
const CONFIG_PATH: &str = "scene_demo.toml";

/// Spins a logo for a second, then moves on to the game
struct MenuScript {
    logo: Rc<RefCell<Sprite>>,
}

impl SceneScript for MenuScript {
    fn load(&mut self, scene: &mut SceneCore, _services: &mut EngineServices) -> Result<(), SceneError> {
        self.logo.borrow_mut().transform_mut().set_scale(4.0, 2.0);
        scene.add(EntityHandle::builder(&self.logo).updateable().drawable());
        Ok(())
    }

    fn activity(
        &mut self,
        scene: &mut SceneCore,
        services: &mut EngineServices,
        is_first_call: bool,
    ) -> Result<(), SceneError> {
        if is_first_call {
            return Ok(());
        }

        let mut logo = self.logo.borrow_mut();
        let spin = logo.transform().z_rotation() + 90.0 * services.elapsed_game_time();
        logo.transform_mut().set_z_rotation(spin);

        if services.total_game_time() - scene.time_created() > 1.0 {
            scene.move_to_scene(services, "Game");
        }
        Ok(())
    }

    fn destroy(&mut self, _scene: &mut SceneCore, _services: &mut EngineServices) {
        log::info!("Menu torn down");
    }
}

/// Notes scrolling towards the camera on a sorted layer, with a pause popup
struct GameScript {
    notes: Vec<Rc<RefCell<Sprite>>>,
}

impl SceneScript for GameScript {
    fn load(&mut self, scene: &mut SceneCore, _services: &mut EngineServices) -> Result<(), SceneError> {
        let board = scene.add_layer("Fretboard");
        board.set_sort_type(SortType::AWAY_FROM_CAMERA);
        board.set_enable_sorting(true);

        for (lane, depth) in [(-2.0, -30.0), (0.0, -10.0), (2.0, -20.0)] {
            let note = Rc::new(RefCell::new(Sprite::default().with_name(format!("Note{lane}"))));
            note.borrow_mut().transform_mut().set_position(lane, 0.0, depth);
            board.add(EntityHandle::builder(&note).updateable().drawable());
            self.notes.push(note);
        }
        Ok(())
    }

    fn activity(
        &mut self,
        scene: &mut SceneCore,
        services: &mut EngineServices,
        is_first_call: bool,
    ) -> Result<(), SceneError> {
        if is_first_call {
            scene.load_popup(services, "Pause")?;
            return Ok(());
        }

        let step = 20.0 * services.elapsed_game_time();
        for note in &self.notes {
            let mut note = note.borrow_mut();
            let z = note.transform().z() + step;
            note.transform_mut().set_z(if z > 30.0 { -30.0 } else { z });
        }
        Ok(())
    }

    fn destroy(&mut self, _scene: &mut SceneCore, _services: &mut EngineServices) {
        log::info!("Game torn down with {} note(s)", self.notes.len());
    }
}

/// Popup overlay that does nothing but exist
struct PauseScript;

impl SceneScript for PauseScript {
    fn destroy(&mut self, _scene: &mut SceneCore, _services: &mut EngineServices) {}
}

/// Scene loaded in the background while the game runs
struct CreditsScript;

impl SceneScript for CreditsScript {
    fn load_async<'a>(
        &'a mut self,
        scene: &'a mut SceneCore,
        _services: &'a mut EngineServices,
        progress: Option<ProgressCallback>,
    ) -> LoadFuture<'a> {
        Box::pin(async move {
            for (index, name) in ["Programming", "Art", "Music"].into_iter().enumerate() {
                let layer = scene.add_layer(name);
                layer.set_enable_drawing(false);
                if let Some(progress) = &progress {
                    progress((index + 1) as f32 / 3.0 * 100.0);
                }
            }
            Ok(())
        })
    }

    fn destroy(&mut self, _scene: &mut SceneCore, _services: &mut EngineServices) {}
}

fn register_scenes(engine: &mut Engine) {
    engine.register_scene("Menu", |args| {
        let logo = Rc::new(RefCell::new(Sprite::default().with_name("Logo").with_time_created(args.time_created)));
        Ok(Scene::new(&args, MenuScript { logo }))
    });
    engine.register_scene("Game", |args| Ok(Scene::new(&args, GameScript { notes: Vec::new() })));
    engine.register_scene("Pause", |args| Ok(Scene::new(&args, PauseScript)));
    engine.register_scene("Credits", |args| Ok(Scene::new(&args, CreditsScript)));
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::load_or_default(CONFIG_PATH)?;
    let mut engine = Engine::new(config)?;
    register_scenes(&mut engine);

    let device = HeadlessDevice::shared();
    engine.attach_graphics_device(device.clone());
    engine.start_scene("Menu", Vec::new())?;

    for _ in 0..90 {
        engine.tick(FRAME)?;
        engine.draw()?;
    }

    let current = engine.director().current_scene().map(|scene| scene.type_name().to_string());
    log::info!("Current scene after 1.5s: {current:?}");

    let progress: ProgressCallback = Arc::new(|percent: f32| log::info!("Credits loading: {percent:.0}%"));
    let (director, services) = engine.split_mut();
    let credits = pollster::block_on(director.load_scene_async(services, "Credits", Some(progress), Vec::new()))?;
    log::info!("Credits registered alongside the game: {} scene(s)", engine.director().len());

    for _ in 0..30 {
        engine.tick(FRAME)?;
        engine.draw()?;
    }

    engine.director_mut().make_current(credits)?;
    engine.tick(FRAME)?;
    engine.draw()?;

    {
        let recorded = device.borrow();
        log::info!(
            "Device saw {} clear(s), {} pass(es) and {} draw call(s)",
            recorded.clears().len(),
            recorded.passes().len(),
            recorded.draws().len()
        );
    }

    engine.shutdown();
    Ok(())
}
