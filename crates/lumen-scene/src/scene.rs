use std::collections::HashMap;

use lumen_core::{EntityKey, EntityUuid, Timestep};
use lumen_ecs::{Component, Registry};
use lumen_physics::{PhysicsConfig, PhysicsWorld2D};
use lumen_render::{
    CameraView, CircleRendererComponent, EditorCamera, Renderer2D, SpriteRendererComponent,
};
use tracing::{debug, trace, warn};

use crate::components::{
    BoxCollider2DComponent, CameraComponent, CircleCollider2DComponent, IdComponent,
    Rigidbody2DComponent, SceneComponent, TagComponent, TransformComponent, Viewport,
};
use crate::entity::{Entity, SceneId};
use crate::error::SceneError;
use crate::script::{NativeScriptComponent, ScriptContext};

/// Tag given to entities created with an empty name
pub const DEFAULT_ENTITY_NAME: &str = "Entity";

/// Owns every entity of one scene, their components and, while the runtime
/// is active, the physics world simulating them.
///
/// Entity handles passed to a scene must come from that scene; a foreign
/// handle is a contract violation and panics.
pub struct Scene {
    pub(crate) id: SceneId,
    pub(crate) registry: Registry,
    pub(crate) viewport: Viewport,
    pub(crate) physics_config: PhysicsConfig,
    /// Present exactly while the runtime is active
    pub(crate) physics: Option<PhysicsWorld2D>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::with_physics_config(PhysicsConfig::default())
    }

    pub fn with_physics_config(physics_config: PhysicsConfig) -> Self {
        Self {
            id: SceneId::next(),
            registry: Registry::new(),
            viewport: Viewport::default(),
            physics_config,
            physics: None,
        }
    }

    pub fn id(&self) -> SceneId {
        self.id
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn physics_config(&self) -> &PhysicsConfig {
        &self.physics_config
    }

    /// Deep copy of `other` as a new, inactive scene.
    ///
    /// Every entity keeps its UUID and tag; every scene component is copied
    /// by value. Runtime state (physics handles, script instances) is not
    /// carried over.
    pub fn copy(other: &Scene) -> Scene {
        let mut scene = Scene::with_physics_config(other.physics_config.clone());
        scene.viewport = other.viewport;

        let mut entity_map = HashMap::new();
        for (_, (id, tag)) in other.registry.view::<(&IdComponent, Option<&TagComponent>)>() {
            let name = tag.map_or(DEFAULT_ENTITY_NAME, |t| t.tag.as_str());
            let entity = scene.create_entity_with_uuid(name, id.id);
            entity_map.insert(id.id, entity.raw());
        }

        copy_component::<TransformComponent>(other, &mut scene, &entity_map);
        copy_component::<SpriteRendererComponent>(other, &mut scene, &entity_map);
        copy_component::<CircleRendererComponent>(other, &mut scene, &entity_map);
        copy_component::<CameraComponent>(other, &mut scene, &entity_map);
        copy_component::<NativeScriptComponent>(other, &mut scene, &entity_map);
        copy_component::<Rigidbody2DComponent>(other, &mut scene, &entity_map);
        copy_component::<BoxCollider2DComponent>(other, &mut scene, &entity_map);
        copy_component::<CircleCollider2DComponent>(other, &mut scene, &entity_map);

        debug!(
            "Copied scene {:?} into {:?} ({} entities)",
            other.id,
            scene.id,
            scene.entity_count()
        );
        scene
    }

    // ========================================================================
    // Entity lifecycle
    // ========================================================================

    /// Create an entity with a fresh UUID, a default transform and a tag
    pub fn create_entity(&mut self, name: &str) -> Entity {
        self.create_entity_with_uuid(name, EntityUuid::new())
    }

    pub fn create_entity_with_uuid(&mut self, name: &str, uuid: EntityUuid) -> Entity {
        let entity = Entity::new(self.registry.create(), self.id);
        self.add_component(entity, IdComponent { id: uuid });
        self.add_component(entity, TransformComponent::default());
        let tag = if name.is_empty() {
            DEFAULT_ENTITY_NAME
        } else {
            name
        };
        self.add_component(entity, TagComponent::new(tag));
        entity
    }

    /// Destroy an entity and everything attached to it.
    ///
    /// A live script instance gets `on_destroy` first. While the runtime is
    /// active the entity's body and shapes leave the physics world too.
    /// Returns false if the entity was already gone.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        let raw = self.raw(entity);
        if !self.registry.is_alive(raw) {
            return false;
        }

        let instance = self
            .registry
            .try_get_mut::<NativeScriptComponent>(raw)
            .and_then(|script| script.instance.take());
        if let Some(mut instance) = instance {
            instance.on_destroy(&mut ScriptContext::new(self, entity));
        }

        if let Some(mut rb) = self.registry.remove::<Rigidbody2DComponent>(raw) {
            if rb.runtime_body.is_some() {
                debug!("Releasing physics body of destroyed entity {}", entity);
            }
            rb.on_removed(self.physics.as_mut());
        }
        self.registry.destroy(raw)
    }

    /// Copy an entity within this scene under a new UUID.
    ///
    /// While the runtime is active the copy gets its own body and shapes.
    pub fn duplicate_entity(&mut self, entity: Entity) -> Entity {
        let src = self.raw(entity);
        assert!(
            self.registry.is_alive(src),
            "cannot duplicate destroyed entity {entity:?}"
        );
        let name = self
            .registry
            .try_get::<TagComponent>(src)
            .map(|t| t.tag.clone())
            .unwrap_or_default();
        let copy = self.create_entity(&name);

        self.duplicate_component::<TransformComponent>(src, copy);
        self.duplicate_component::<SpriteRendererComponent>(src, copy);
        self.duplicate_component::<CircleRendererComponent>(src, copy);
        self.duplicate_component::<CameraComponent>(src, copy);
        self.duplicate_component::<NativeScriptComponent>(src, copy);
        self.duplicate_component::<Rigidbody2DComponent>(src, copy);
        self.duplicate_component::<BoxCollider2DComponent>(src, copy);
        self.duplicate_component::<CircleCollider2DComponent>(src, copy);

        if self.physics.is_some() && self.registry.has::<Rigidbody2DComponent>(copy.raw()) {
            if let Err(e) = self.instantiate_body(copy.raw()) {
                warn!("Failed to create physics body for {}: {}", copy, e);
            }
        }
        copy
    }

    fn duplicate_component<T: SceneComponent>(&mut self, src: lumen_ecs::Entity, dst: Entity) {
        if let Some(component) = self.registry.try_get::<T>(src).cloned() {
            self.add_or_replace_component(dst, component);
        }
    }

    pub fn is_valid(&self, entity: Entity) -> bool {
        entity.scene_id() == self.id && self.registry.is_alive(entity.raw())
    }

    // ========================================================================
    // Components
    // ========================================================================

    /// Attach a component the entity does not hold yet and run its added hook
    pub fn add_component<T: SceneComponent>(&mut self, entity: Entity, component: T) -> &mut T {
        let raw = self.raw(entity);
        let viewport = self.viewport;
        let added = self.registry.attach(raw, component);
        added.on_added(entity, viewport);
        added
    }

    /// Attach a component, replacing (and releasing) any existing one
    pub fn add_or_replace_component<T: SceneComponent>(
        &mut self,
        entity: Entity,
        component: T,
    ) -> &mut T {
        let raw = self.raw(entity);
        if let Some(mut old) = self.registry.remove::<T>(raw) {
            old.on_removed(self.physics.as_mut());
        }
        let viewport = self.viewport;
        let added = self.registry.attach(raw, component);
        added.on_added(entity, viewport);
        added
    }

    /// Panics if the entity lacks `T`
    pub fn get_component<T: Component>(&self, entity: Entity) -> &T {
        self.registry.get::<T>(self.raw(entity))
    }

    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> &mut T {
        let raw = self.raw(entity);
        self.registry.get_mut::<T>(raw)
    }

    pub fn try_get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.registry.try_get::<T>(self.raw(entity))
    }

    pub fn try_get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        let raw = self.raw(entity);
        self.registry.try_get_mut::<T>(raw)
    }

    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.registry.has::<T>(self.raw(entity))
    }

    /// Detach `T` and run its removed hook.
    ///
    /// Panics for the core components every entity keeps (id, tag, transform).
    pub fn remove_component<T: SceneComponent>(&mut self, entity: Entity) -> Option<T> {
        assert!(
            !T::CORE,
            "{} is a core component and cannot be removed",
            std::any::type_name::<T>()
        );
        let raw = self.raw(entity);
        let mut removed = self.registry.remove::<T>(raw)?;
        removed.on_removed(self.physics.as_mut());
        Some(removed)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Every tagged entity with its tag, in store order
    pub fn entities(&self) -> impl Iterator<Item = (Entity, &TagComponent)> + '_ {
        self.registry
            .view::<&TagComponent>()
            .map(move |(raw, tag)| (Entity::new(raw, self.id), tag))
    }

    pub fn entity_count(&self) -> usize {
        self.registry.len()
    }

    pub fn find_entity_by_uuid(&self, uuid: EntityUuid) -> Option<Entity> {
        self.registry
            .view::<&IdComponent>()
            .find(|(_, id)| id.id == uuid)
            .map(|(raw, _)| Entity::new(raw, self.id))
    }

    /// First entity in store order whose tag equals `name`
    pub fn find_entity_by_name(&self, name: &str) -> Option<Entity> {
        self.entities()
            .find(|(_, tag)| tag.tag == name)
            .map(|(entity, _)| entity)
    }

    /// Resolve a key handed out by [`Entity::key`], if its entity is still alive.
    ///
    /// Keys carry no scene identity. Resolve a key only against the scene
    /// that issued it (the scene whose render produced it); a key from
    /// another scene may name an unrelated entity here.
    pub fn entity_from_key(&self, key: EntityKey) -> Option<Entity> {
        let raw = lumen_ecs::Entity::from_bits(key.to_raw());
        self.registry
            .is_alive(raw)
            .then(|| Entity::new(raw, self.id))
    }

    /// First camera flagged primary, in store order. The runtime renders
    /// through this camera.
    pub fn primary_camera_entity(&self) -> Option<Entity> {
        self.primary_camera()
            .map(|(raw, _, _)| Entity::new(raw, self.id))
    }

    fn primary_camera(
        &self,
    ) -> Option<(lumen_ecs::Entity, &TransformComponent, &CameraComponent)> {
        self.registry
            .view::<(&TransformComponent, &CameraComponent)>()
            .find(|(_, (_, camera))| camera.primary)
            .map(|(raw, (transform, camera))| (raw, transform, camera))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Direct store access. Bypasses the component hooks.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    // ========================================================================
    // Frame dispatch
    // ========================================================================

    /// Editor frame: render through the editor camera. No scripts, no physics.
    pub fn on_update_editor(
        &self,
        _ts: Timestep,
        camera: &EditorCamera,
        renderer: &mut dyn Renderer2D,
    ) {
        self.render_scene(&camera.camera_view(), renderer);
    }

    /// Runtime frame: scripts, physics, then render through the primary camera
    pub fn on_update_runtime(
        &mut self,
        ts: Timestep,
        renderer: &mut dyn Renderer2D,
    ) -> Result<(), SceneError> {
        self.update_scripts(ts);
        self.on_update_physics(ts)?;

        match self.primary_camera_view() {
            Some(view) => self.render_scene(&view, renderer),
            None => trace!("No primary camera in scene {:?}, skipping render", self.id),
        }
        Ok(())
    }

    pub fn on_viewport_resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
        for (_, camera) in self.registry.view_mut::<&mut CameraComponent>() {
            if !camera.fixed_aspect_ratio {
                camera.camera.set_viewport_size(width, height);
            }
        }
    }

    fn primary_camera_view(&self) -> Option<CameraView> {
        self.primary_camera().map(|(_, transform, camera)| {
            CameraView::from_transform(camera.camera.projection(), transform.matrix())
        })
    }

    fn render_scene(&self, camera: &CameraView, renderer: &mut dyn Renderer2D) {
        renderer.begin_scene(camera);

        for (raw, (transform, sprite)) in self
            .registry
            .group::<(&TransformComponent, &SpriteRendererComponent)>()
        {
            let key = Entity::new(raw, self.id).key();
            renderer.draw_sprite(transform.matrix(), sprite, key);
        }

        for (raw, (transform, circle)) in self
            .registry
            .group::<(&TransformComponent, &CircleRendererComponent)>()
        {
            let key = Entity::new(raw, self.id).key();
            renderer.draw_circle(transform.matrix(), circle, key);
        }

        renderer.end_scene();
    }

    /// Run native scripts, creating instances on first encounter.
    ///
    /// The instance is moved out of its component for the duration of its
    /// hooks so the script can reach the rest of the scene.
    fn update_scripts(&mut self, ts: Timestep) {
        let scripted: Vec<_> = self
            .registry
            .view::<&NativeScriptComponent>()
            .map(|(raw, _)| raw)
            .collect();

        for raw in scripted {
            let Some(script) = self.registry.try_get_mut::<NativeScriptComponent>(raw) else {
                // Destroyed by an earlier script this frame.
                continue;
            };
            let (mut instance, created) = match script.instance.take() {
                Some(instance) => (instance, false),
                None => match script.instantiate() {
                    Some(instance) => (instance, true),
                    None => continue,
                },
            };

            let entity = Entity::new(raw, self.id);
            let mut ctx = ScriptContext::new(self, entity);
            if created {
                instance.on_create(&mut ctx);
            }
            instance.on_update(&mut ctx, ts);

            match self.registry.try_get_mut::<NativeScriptComponent>(raw) {
                Some(script) => script.instance = Some(instance),
                // The script removed itself or its entity.
                None => instance.on_destroy(&mut ScriptContext::new(self, entity)),
            }
        }
    }

    /// Give `on_destroy` to every live script instance and drop them
    pub(crate) fn destroy_script_instances(&mut self) {
        let scripted: Vec<_> = self
            .registry
            .view::<&NativeScriptComponent>()
            .filter(|(_, script)| script.is_instantiated())
            .map(|(raw, _)| raw)
            .collect();

        for raw in scripted {
            let instance = self
                .registry
                .try_get_mut::<NativeScriptComponent>(raw)
                .and_then(|script| script.instance.take());
            if let Some(mut instance) = instance {
                let entity = Entity::new(raw, self.id);
                instance.on_destroy(&mut ScriptContext::new(self, entity));
            }
        }
    }

    pub(crate) fn raw(&self, entity: Entity) -> lumen_ecs::Entity {
        assert_eq!(
            entity.scene_id(),
            self.id,
            "entity {entity:?} belongs to another scene"
        );
        entity.raw()
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.id)
            .field("entities", &self.registry.len())
            .field("viewport", &self.viewport)
            .field("runtime_active", &self.physics.is_some())
            .finish()
    }
}

/// Copy every `T` of `src` onto the entity with the same UUID in `dst`
fn copy_component<T: SceneComponent>(
    src: &Scene,
    dst: &mut Scene,
    entity_map: &HashMap<EntityUuid, lumen_ecs::Entity>,
) {
    for (_, (id, component)) in src.registry.view::<(&IdComponent, &T)>() {
        if let Some(&target) = entity_map.get(&id.id) {
            dst.registry.attach_or_replace(target, component.clone());
        }
    }
}
