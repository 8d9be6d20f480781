//! Native gameplay scripts bound to entities

use std::fmt;
use std::sync::Arc;

use lumen_core::Timestep;
use lumen_ecs::Component;

use crate::entity::Entity;
use crate::scene::Scene;

/// Behaviour attached to one entity while the runtime is active.
///
/// The scene creates the instance lazily on the first runtime update,
/// calls `on_create` once, then `on_update` every runtime frame. `on_destroy`
/// runs when the entity is destroyed or the runtime stops.
pub trait ScriptableEntity: Send + Sync {
    fn on_create(&mut self, _ctx: &mut ScriptContext<'_>) {}

    fn on_update(&mut self, _ctx: &mut ScriptContext<'_>, _ts: Timestep) {}

    fn on_destroy(&mut self, _ctx: &mut ScriptContext<'_>) {}
}

/// Access to the scene from inside a script hook
pub struct ScriptContext<'a> {
    scene: &'a mut Scene,
    entity: Entity,
}

impl<'a> ScriptContext<'a> {
    pub(crate) fn new(scene: &'a mut Scene, entity: Entity) -> Self {
        Self { scene, entity }
    }

    /// The entity running this script
    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn scene(&self) -> &Scene {
        &*self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut *self.scene
    }

    /// Component of the scripted entity, if present
    pub fn get<T: Component>(&self) -> Option<&T> {
        self.scene.try_get_component::<T>(self.entity)
    }

    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.scene.try_get_component_mut::<T>(self.entity)
    }
}

pub type ScriptFactory = Arc<dyn Fn() -> Box<dyn ScriptableEntity> + Send + Sync>;

/// Binds a script type to an entity.
///
/// Holds a factory and, while the runtime is active, the live instance.
/// Cloning copies the binding only; the clone instantiates its own script.
#[derive(Default)]
pub struct NativeScriptComponent {
    factory: Option<ScriptFactory>,
    pub(crate) instance: Option<Box<dyn ScriptableEntity>>,
}

impl NativeScriptComponent {
    pub fn bind<T: ScriptableEntity + Default + 'static>() -> Self {
        Self::from_factory(|| Box::new(T::default()))
    }

    pub fn from_factory<F>(factory: F) -> Self
    where
        F: Fn() -> Box<dyn ScriptableEntity> + Send + Sync + 'static,
    {
        Self {
            factory: Some(Arc::new(factory)),
            instance: None,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.factory.is_some()
    }

    pub fn is_instantiated(&self) -> bool {
        self.instance.is_some()
    }

    pub(crate) fn instantiate(&self) -> Option<Box<dyn ScriptableEntity>> {
        self.factory.as_ref().map(|factory| factory())
    }
}

impl Clone for NativeScriptComponent {
    fn clone(&self) -> Self {
        Self {
            factory: self.factory.clone(),
            instance: None,
        }
    }
}

impl fmt::Debug for NativeScriptComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeScriptComponent")
            .field("bound", &self.is_bound())
            .field("instantiated", &self.is_instantiated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Idle;

    impl ScriptableEntity for Idle {}

    #[test]
    fn test_clone_keeps_binding_only() {
        let mut script = NativeScriptComponent::bind::<Idle>();
        script.instance = script.instantiate();
        assert!(script.is_instantiated());

        let copy = script.clone();
        assert!(copy.is_bound());
        assert!(!copy.is_instantiated());
    }

    #[test]
    fn test_unbound_component_has_no_instance() {
        let script = NativeScriptComponent::default();
        assert!(!script.is_bound());
        assert!(script.instantiate().is_none());
    }
}
