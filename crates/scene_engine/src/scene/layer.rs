//! Layers - groups of entities sharing a camera and a draw order policy
//!
//! A layer keeps every entity added to it plus three capability subsets. Each
//! tick it updates the updateable subset and, when sorting is on, reorders the
//! drawable subset so entities farther from the camera draw first. Drawing
//! walks the drawable subset forwards, or backwards under
//! [`SortType::REVERSE_SORT`], without touching the stored order.

use std::cell::RefCell;
use std::rc::Rc;

use bitflags::bitflags;

use crate::foundation::math::Vec3;
use crate::graphics::Effect;
use crate::scene::camera::Camera;
use crate::scene::entity::{
    allocation_id, Destroyable, DrawableEntity, Entity, EntityHandle, UpdateableEntity,
};

bitflags! {
    /// Draw order policy of a layer
    ///
    /// `AWAY_FROM_CAMERA` sorts by distance and only applies while sorting is
    /// enabled; `REVERSE_SORT` flips the draw direction on its own.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SortType: u8 {
        /// No particular order
        const NONE = 0x01;
        /// Farthest from the camera first
        const AWAY_FROM_CAMERA = 0x02;
        /// Draw the drawable subset back to front
        const REVERSE_SORT = 0x04;
    }
}

impl Default for SortType {
    fn default() -> Self {
        SortType::NONE
    }
}

/// Entity registry with update, draw and destroy subsets
pub struct Layer {
    name: String,
    time_created: f32,
    camera: Rc<RefCell<Camera>>,
    sort_type: SortType,
    enable_updates: bool,
    enable_drawing: bool,
    enable_sorting: bool,

    entities: Vec<EntityHandle>,
    updateable: Vec<Rc<RefCell<dyn UpdateableEntity>>>,
    drawable: Vec<Rc<RefCell<dyn DrawableEntity>>>,
    destroyable: Vec<Rc<RefCell<dyn Destroyable>>>,

    camera_position: Vec3,
}

impl Layer {
    /// Create an empty layer viewed through `camera`
    pub fn new(name: impl Into<String>, camera: Rc<RefCell<Camera>>) -> Self {
        Self {
            name: name.into(),
            time_created: 0.0,
            camera,
            sort_type: SortType::default(),
            enable_updates: true,
            enable_drawing: true,
            enable_sorting: false,
            entities: Vec::new(),
            updateable: Vec::new(),
            drawable: Vec::new(),
            destroyable: Vec::new(),
            camera_position: Vec3::zeros(),
        }
    }

    /// Record the engine time the layer was created at
    pub fn with_time_created(mut self, time: f32) -> Self {
        self.time_created = time;
        self
    }

    /// Layer name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Camera used for distance sorting
    pub fn camera(&self) -> &Rc<RefCell<Camera>> {
        &self.camera
    }

    /// Replace the camera
    pub fn set_camera(&mut self, camera: Rc<RefCell<Camera>>) {
        self.camera = camera;
    }

    /// Draw order policy
    pub fn sort_type(&self) -> SortType {
        self.sort_type
    }

    /// Set the draw order policy
    pub fn set_sort_type(&mut self, sort_type: SortType) {
        self.sort_type = sort_type;
    }

    /// Whether `update` does anything
    pub fn enable_updates(&self) -> bool {
        self.enable_updates
    }

    /// Enable or disable updates
    pub fn set_enable_updates(&mut self, enabled: bool) {
        self.enable_updates = enabled;
    }

    /// Whether `draw` does anything
    pub fn enable_drawing(&self) -> bool {
        self.enable_drawing
    }

    /// Enable or disable drawing
    pub fn set_enable_drawing(&mut self, enabled: bool) {
        self.enable_drawing = enabled;
    }

    /// Whether distance sorting runs after updates
    pub fn enable_sorting(&self) -> bool {
        self.enable_sorting
    }

    /// Enable or disable distance sorting
    pub fn set_enable_sorting(&mut self, enabled: bool) {
        self.enable_sorting = enabled;
    }

    //--- Membership ---------------------------------------------------------

    /// Add an entity under the capabilities its handle declares
    ///
    /// Adding an entity that is already in the layer does nothing.
    pub fn add(&mut self, entity: impl Into<EntityHandle>) {
        let entity = entity.into();
        if self.contains(&entity) {
            log::trace!("Entity already in layer '{}'", self.name);
            return;
        }

        if let Some(updateable) = entity.updateable() {
            self.updateable.push(Rc::clone(updateable));
        }
        if let Some(drawable) = entity.drawable() {
            self.drawable.push(Rc::clone(drawable));
        }
        if let Some(destroyable) = entity.destroyable() {
            self.destroyable.push(Rc::clone(destroyable));
        }
        self.entities.push(entity);
    }

    /// Remove an entity from every subset; returns whether it was present
    pub fn remove(&mut self, entity: &EntityHandle) -> bool {
        let id = entity.id();
        let before = self.entities.len();

        self.entities.retain(|e| e.id() != id);
        self.updateable.retain(|e| allocation_id(e) != id);
        self.drawable.retain(|e| allocation_id(e) != id);
        self.destroyable.retain(|e| allocation_id(e) != id);

        self.entities.len() != before
    }

    /// Whether the entity is in the layer
    pub fn contains(&self, entity: &EntityHandle) -> bool {
        self.entities.iter().any(|e| e.same_entity(entity))
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the layer holds no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of updateable entities
    pub fn updateable_count(&self) -> usize {
        self.updateable.len()
    }

    /// Number of drawable entities
    pub fn drawable_count(&self) -> usize {
        self.drawable.len()
    }

    /// Number of destroyable entities
    pub fn destroyable_count(&self) -> usize {
        self.destroyable.len()
    }

    /// Drawable entities in their stored order
    pub fn drawables(&self) -> impl Iterator<Item = &Rc<RefCell<dyn DrawableEntity>>> {
        self.drawable.iter()
    }

    //--- Per-frame ----------------------------------------------------------

    /// Update entities that want updates, then sort drawables if enabled
    pub fn update(&mut self, delta: f32) {
        if !self.enable_updates || self.updateable.is_empty() {
            return;
        }

        self.camera_position = self.camera.borrow().position();

        for entity in &self.updateable {
            let mut entity = entity.borrow_mut();
            if entity.enable_updates() {
                entity.update(delta);
            }
        }

        if self.enable_sorting && self.sort_type.contains(SortType::AWAY_FROM_CAMERA) {
            self.sort_away_from_camera();
        }
    }

    /// Draw every drawable entity with `effect`
    pub fn draw(&self, effect: &mut dyn Effect) {
        if !self.enable_drawing {
            return;
        }

        if self.sort_type.contains(SortType::REVERSE_SORT) {
            for entity in self.drawable.iter().rev() {
                entity.borrow_mut().draw(effect);
            }
        } else {
            for entity in &self.drawable {
                entity.borrow_mut().draw(effect);
            }
        }
    }

    /// Destroy destroyable entities and empty the layer
    pub fn destroy(&mut self) {
        for entity in &self.destroyable {
            entity.borrow_mut().destroy();
        }

        log::debug!("Layer '{}' destroyed with {} entities", self.name, self.entities.len());

        self.entities.clear();
        self.updateable.clear();
        self.drawable.clear();
        self.destroyable.clear();
        self.camera_position = Vec3::zeros();
    }

    // Stable, so equally distant entities keep their relative order
    fn sort_away_from_camera(&mut self) {
        let camera = self.camera_position;
        let mut keyed: Vec<(f32, Rc<RefCell<dyn DrawableEntity>>)> = self
            .drawable
            .drain(..)
            .map(|entity| {
                let distance = (entity.borrow().position() - camera).norm();
                (distance, entity)
            })
            .collect();

        keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
        self.drawable = keyed.into_iter().map(|(_, entity)| entity).collect();
    }
}

impl Entity for Layer {
    fn name(&self) -> &str {
        &self.name
    }

    fn time_created(&self) -> f32 {
        self.time_created
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::{CustomEffect, HeadlessDevice};
    use crate::testing::{DrawLog, Probe};

    fn layer() -> Layer {
        Layer::new("test", Rc::new(RefCell::new(Camera::new().at(Vec3::zeros()))))
    }

    fn effect() -> CustomEffect {
        CustomEffect::new(Some(HeadlessDevice::shared()), "Test", &[])
    }

    fn drawn_order(layer: &Layer, log: &DrawLog) -> Vec<String> {
        log.clear();
        layer.draw(&mut effect());
        log.entries()
    }

    #[test]
    fn test_capability_subsets_follow_declaration() {
        let mut layer = layer();
        let log = DrawLog::default();
        let full = Probe::shared("full", &log);
        let drawable_only = Probe::shared("drawable", &log);
        let inert = Probe::shared("inert", &log);

        layer.add(EntityHandle::builder(&full).updateable().drawable().destroyable());
        layer.add(EntityHandle::builder(&drawable_only).drawable());
        layer.add(EntityHandle::builder(&inert));

        assert_eq!(layer.len(), 3);
        assert_eq!(layer.updateable_count(), 1);
        assert_eq!(layer.drawable_count(), 2);
        assert_eq!(layer.destroyable_count(), 1);
    }

    #[test]
    fn test_adding_twice_is_ignored() {
        let mut layer = layer();
        let log = DrawLog::default();
        let probe = Probe::shared("probe", &log);
        let handle = EntityHandle::builder(&probe).updateable().build();

        layer.add(handle.clone());
        layer.add(handle);
        layer.update(0.1);

        assert_eq!(layer.len(), 1);
        assert_eq!(probe.borrow().updates, 1);
    }

    #[test]
    fn test_remove_clears_every_subset() {
        let mut layer = layer();
        let log = DrawLog::default();
        let probe = Probe::shared("probe", &log);
        let handle = EntityHandle::builder(&probe).updateable().drawable().destroyable().build();

        layer.add(handle.clone());
        assert!(layer.remove(&handle));
        assert!(!layer.remove(&handle));

        assert!(layer.is_empty());
        assert_eq!(layer.updateable_count(), 0);
        assert_eq!(layer.drawable_count(), 0);
        assert_eq!(layer.destroyable_count(), 0);
    }

    #[test]
    fn test_update_skips_disabled_entities() {
        let mut layer = layer();
        let log = DrawLog::default();
        let active = Probe::shared("active", &log);
        let paused = Probe::shared("paused", &log);
        paused.borrow_mut().enable_updates = false;

        layer.add(EntityHandle::builder(&active).updateable());
        layer.add(EntityHandle::builder(&paused).updateable());
        layer.update(0.1);

        assert_eq!(active.borrow().updates, 1);
        assert_eq!(paused.borrow().updates, 0);
    }

    #[test]
    fn test_disabled_layer_does_nothing() {
        let mut layer = layer();
        let log = DrawLog::default();
        let probe = Probe::shared("probe", &log);
        layer.add(EntityHandle::builder(&probe).updateable().drawable());

        layer.set_enable_updates(false);
        layer.set_enable_drawing(false);
        layer.update(0.1);

        assert_eq!(probe.borrow().updates, 0);
        assert!(drawn_order(&layer, &log).is_empty());
    }

    #[test]
    fn test_away_from_camera_draws_farthest_first() {
        let mut layer = layer();
        let log = DrawLog::default();
        for (name, z) in [("near", -1.0), ("far", -10.0), ("middle", -5.0)] {
            let probe = Probe::shared(name, &log);
            probe.borrow_mut().position = Vec3::new(0.0, 0.0, z);
            layer.add(EntityHandle::builder(&probe).updateable().drawable());
        }

        layer.set_enable_sorting(true);
        layer.set_sort_type(SortType::AWAY_FROM_CAMERA);
        layer.update(0.1);

        assert_eq!(drawn_order(&layer, &log), vec!["far", "middle", "near"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_distances() {
        let mut layer = layer();
        let log = DrawLog::default();
        for (name, x) in [("a", 3.0), ("b", -3.0), ("c", 0.0)] {
            let probe = Probe::shared(name, &log);
            probe.borrow_mut().position = Vec3::new(x, 4.0, 0.0);
            layer.add(EntityHandle::builder(&probe).updateable().drawable());
        }

        layer.set_enable_sorting(true);
        layer.set_sort_type(SortType::AWAY_FROM_CAMERA);
        layer.update(0.1);

        // a and b are both 5 units away, c is 4
        assert_eq!(drawn_order(&layer, &log), vec!["a", "b", "c"]);
    }

    fn sorted_layer(log: &DrawLog, sort_type: SortType) -> Layer {
        let mut layer = layer();
        for (name, z) in [("d1", -1.0), ("d5", -5.0), ("d3", -3.0)] {
            let probe = Probe::shared(name, log);
            probe.borrow_mut().position = Vec3::new(0.0, 0.0, z);
            layer.add(EntityHandle::builder(&probe).updateable().drawable());
        }
        layer.set_enable_sorting(true);
        layer.set_sort_type(sort_type);
        layer
    }

    #[test]
    fn test_sorted_order_holds_across_updates() {
        let log = DrawLog::default();
        let mut layer = sorted_layer(&log, SortType::AWAY_FROM_CAMERA);

        for _ in 0..3 {
            layer.update(0.1);
            assert_eq!(drawn_order(&layer, &log), vec!["d5", "d3", "d1"]);
        }
    }

    #[test]
    fn test_away_from_camera_combines_with_reverse_sort() {
        let log = DrawLog::default();
        let mut layer = sorted_layer(&log, SortType::AWAY_FROM_CAMERA | SortType::REVERSE_SORT);

        layer.update(0.1);
        assert_eq!(drawn_order(&layer, &log), vec!["d1", "d3", "d5"]);

        layer.set_sort_type(SortType::AWAY_FROM_CAMERA);
        assert_eq!(drawn_order(&layer, &log), vec!["d5", "d3", "d1"]);
    }

    #[test]
    fn test_nan_position_does_not_break_sorting() {
        let mut layer = layer();
        let log = DrawLog::default();
        for (name, z) in [("near", -1.0), ("nan", f32::NAN), ("far", -10.0), ("mid", -5.0)] {
            let probe = Probe::shared(name, &log);
            probe.borrow_mut().position = Vec3::new(0.0, 0.0, z);
            layer.add(EntityHandle::builder(&probe).updateable().drawable());
        }

        layer.set_enable_sorting(true);
        layer.set_sort_type(SortType::AWAY_FROM_CAMERA);
        layer.update(0.1);

        let finite: Vec<String> = drawn_order(&layer, &log).into_iter().filter(|name| name != "nan").collect();
        assert_eq!(finite, vec!["far", "mid", "near"]);
        assert_eq!(layer.drawable_count(), 4);
    }

    #[test]
    fn test_sorting_disabled_keeps_insertion_order() {
        let mut layer = layer();
        let log = DrawLog::default();
        for (name, z) in [("near", -1.0), ("far", -10.0)] {
            let probe = Probe::shared(name, &log);
            probe.borrow_mut().position = Vec3::new(0.0, 0.0, z);
            layer.add(EntityHandle::builder(&probe).updateable().drawable());
        }

        layer.set_sort_type(SortType::AWAY_FROM_CAMERA);
        layer.update(0.1);

        assert_eq!(drawn_order(&layer, &log), vec!["near", "far"]);
    }

    #[test]
    fn test_reverse_sort_flips_draw_direction_only() {
        let mut layer = layer();
        let log = DrawLog::default();
        for name in ["first", "second", "third"] {
            let probe = Probe::shared(name, &log);
            layer.add(EntityHandle::builder(&probe).drawable());
        }

        layer.set_sort_type(SortType::REVERSE_SORT);
        assert_eq!(drawn_order(&layer, &log), vec!["third", "second", "first"]);

        layer.set_sort_type(SortType::NONE);
        assert_eq!(drawn_order(&layer, &log), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_destroy_empties_layer_and_destroys_destroyables() {
        let mut layer = layer();
        let log = DrawLog::default();
        let kept = Probe::shared("kept", &log);
        let destroyed = Probe::shared("destroyed", &log);

        layer.add(EntityHandle::builder(&kept).updateable().drawable());
        layer.add(EntityHandle::builder(&destroyed).drawable().destroyable());
        layer.destroy();

        assert!(layer.is_empty());
        assert_eq!(layer.updateable_count() + layer.drawable_count() + layer.destroyable_count(), 0);
        assert!(destroyed.borrow().destroyed);
        assert!(!kept.borrow().destroyed);
    }
}
