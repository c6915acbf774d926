//! Entity capability traits and the handle a layer stores
//!
//! An entity can be updated every tick, drawn, destroyed with its layer, or
//! any mix of the three. The caller states which capabilities apply when
//! building an [`EntityHandle`]; the layer never inspects concrete types.
//!
//! ```ignore
//! let sprite = Rc::new(RefCell::new(Sprite::new(texture)));
//! layer.add(EntityHandle::builder(&sprite).updateable().drawable().build());
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::SceneError;
use crate::foundation::math::{Mat4, Vec3};
use crate::graphics::Effect;

/// Anything that can live in a layer
pub trait Entity {
    /// Display name
    fn name(&self) -> &str;

    /// Engine time in seconds when the entity was created
    fn time_created(&self) -> f32 {
        0.0
    }
}

/// Entity updated once per tick
pub trait UpdateableEntity: Entity {
    /// Whether the layer should call [`update`](Self::update)
    fn enable_updates(&self) -> bool {
        true
    }

    /// Advance the entity by `delta` seconds
    fn update(&mut self, delta: f32);
}

/// Entity drawn once per frame
pub trait DrawableEntity: UpdateableEntity {
    /// World position, used for distance sorting
    fn position(&self) -> Vec3;

    /// Whether the entity draws itself
    fn enable_drawing(&self) -> bool {
        true
    }

    /// Draw with the given effect
    fn draw(&mut self, effect: &mut dyn Effect);

    /// Whether the entity's bounds intersect the view volume
    fn is_in_view(&self, _view: &Mat4, _projection: &Mat4) -> Result<bool, SceneError> {
        Err(SceneError::NotImplemented("view volume visibility test"))
    }
}

/// Entity that releases resources when its layer is destroyed
pub trait Destroyable: Entity {
    /// Release resources
    fn destroy(&mut self);
}

/// Shared entity plus the capabilities it was registered with
#[derive(Clone)]
pub struct EntityHandle {
    entity: Rc<RefCell<dyn Entity>>,
    updateable: Option<Rc<RefCell<dyn UpdateableEntity>>>,
    drawable: Option<Rc<RefCell<dyn DrawableEntity>>>,
    destroyable: Option<Rc<RefCell<dyn Destroyable>>>,
}

impl EntityHandle {
    /// Start declaring the capabilities of a shared entity
    pub fn builder<T: Entity + 'static>(entity: &Rc<RefCell<T>>) -> EntityBuilder<T> {
        EntityBuilder {
            entity: Rc::clone(entity),
            updateable: None,
            drawable: None,
            destroyable: None,
        }
    }

    /// The entity itself
    pub fn entity(&self) -> &Rc<RefCell<dyn Entity>> {
        &self.entity
    }

    /// Update capability, if declared
    pub fn updateable(&self) -> Option<&Rc<RefCell<dyn UpdateableEntity>>> {
        self.updateable.as_ref()
    }

    /// Draw capability, if declared
    pub fn drawable(&self) -> Option<&Rc<RefCell<dyn DrawableEntity>>> {
        self.drawable.as_ref()
    }

    /// Destroy capability, if declared
    pub fn destroyable(&self) -> Option<&Rc<RefCell<dyn Destroyable>>> {
        self.destroyable.as_ref()
    }

    /// Whether both handles refer to the same allocation
    pub fn same_entity(&self, other: &EntityHandle) -> bool {
        self.id() == other.id()
    }

    /// Whether this handle refers to the given shared entity
    pub fn is<T: ?Sized>(&self, entity: &Rc<RefCell<T>>) -> bool {
        self.id() == allocation_id(entity)
    }

    pub(crate) fn id(&self) -> *const () {
        allocation_id(&self.entity)
    }
}

impl std::fmt::Debug for EntityHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityHandle")
            .field("updateable", &self.updateable.is_some())
            .field("drawable", &self.drawable.is_some())
            .field("destroyable", &self.destroyable.is_some())
            .finish()
    }
}

/// Address of the shared allocation, ignoring the vtable
pub(crate) fn allocation_id<T: ?Sized>(entity: &Rc<RefCell<T>>) -> *const () {
    Rc::as_ptr(entity).cast::<()>()
}

/// Builder for [`EntityHandle`]
pub struct EntityBuilder<T: Entity + 'static> {
    entity: Rc<RefCell<T>>,
    updateable: Option<Rc<RefCell<dyn UpdateableEntity>>>,
    drawable: Option<Rc<RefCell<dyn DrawableEntity>>>,
    destroyable: Option<Rc<RefCell<dyn Destroyable>>>,
}

impl<T: Entity + 'static> EntityBuilder<T> {
    /// Update the entity every tick
    pub fn updateable(mut self) -> Self
    where
        T: UpdateableEntity,
    {
        let shared: Rc<RefCell<dyn UpdateableEntity>> = self.entity.clone();
        self.updateable = Some(shared);
        self
    }

    /// Draw the entity every frame
    pub fn drawable(mut self) -> Self
    where
        T: DrawableEntity,
    {
        let shared: Rc<RefCell<dyn DrawableEntity>> = self.entity.clone();
        self.drawable = Some(shared);
        self
    }

    /// Destroy the entity with its layer
    pub fn destroyable(mut self) -> Self
    where
        T: Destroyable,
    {
        let shared: Rc<RefCell<dyn Destroyable>> = self.entity.clone();
        self.destroyable = Some(shared);
        self
    }

    /// Finish the handle
    pub fn build(self) -> EntityHandle {
        EntityHandle {
            entity: self.entity,
            updateable: self.updateable,
            drawable: self.drawable,
            destroyable: self.destroyable,
        }
    }
}

impl<T: Entity + 'static> From<EntityBuilder<T>> for EntityHandle {
    fn from(builder: EntityBuilder<T>) -> Self {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker {
        updates: u32,
    }

    impl Entity for Marker {
        fn name(&self) -> &str {
            "marker"
        }
    }

    impl UpdateableEntity for Marker {
        fn update(&mut self, _delta: f32) {
            self.updates += 1;
        }
    }

    #[test]
    fn test_builder_declares_only_requested_capabilities() {
        let marker = Rc::new(RefCell::new(Marker { updates: 0 }));
        let handle = EntityHandle::builder(&marker).updateable().build();

        assert!(handle.updateable().is_some());
        assert!(handle.drawable().is_none());
        assert!(handle.destroyable().is_none());
    }

    #[test]
    fn test_handles_share_the_entity() {
        let marker = Rc::new(RefCell::new(Marker { updates: 0 }));
        let handle = EntityHandle::builder(&marker).updateable().build();

        if let Some(updateable) = handle.updateable() {
            updateable.borrow_mut().update(0.1);
        }
        assert_eq!(marker.borrow().updates, 1);
    }

    #[test]
    fn test_identity_is_allocation_identity() {
        let first = Rc::new(RefCell::new(Marker { updates: 0 }));
        let second = Rc::new(RefCell::new(Marker { updates: 0 }));

        let a = EntityHandle::builder(&first).build();
        let b = EntityHandle::builder(&first).updateable().build();
        let c = EntityHandle::builder(&second).build();

        assert!(a.same_entity(&b));
        assert!(!a.same_entity(&c));
        assert!(a.is(&first));
        assert!(!a.is(&second));
    }
}
