//! Runtime bridge between scene components and the physics world

use glam::Vec3;
use lumen_core::Timestep;
use lumen_ecs::Registry;
use lumen_physics::{BodyDesc, PhysicsError, PhysicsWorld2D};
use tracing::{info, warn};

use crate::components::{
    BoxCollider2DComponent, CameraComponent, CircleCollider2DComponent, Rigidbody2DComponent,
    TransformComponent,
};
use crate::error::SceneError;
use crate::scene::Scene;

impl Scene {
    pub fn is_runtime_active(&self) -> bool {
        self.physics.is_some()
    }

    /// The live physics world, while the runtime is active
    pub fn physics_world(&self) -> Option<&PhysicsWorld2D> {
        self.physics.as_ref()
    }

    /// Build a physics world and one body per rigid body entity
    pub fn on_runtime_start(&mut self) -> Result<(), SceneError> {
        if self.physics.is_some() {
            return Err(SceneError::RuntimeAlreadyActive);
        }

        let mut world = PhysicsWorld2D::with_config(self.physics_config.clone());
        let bodies: Vec<_> = self
            .registry
            .view::<&Rigidbody2DComponent>()
            .map(|(raw, _)| raw)
            .collect();
        for raw in bodies {
            create_body(&mut self.registry, &mut world, raw)?;
        }

        let primaries = self
            .registry
            .view::<(&TransformComponent, &CameraComponent)>()
            .filter(|(_, (_, camera))| camera.primary)
            .count();
        if primaries > 1 {
            warn!(
                "Scene {:?} has {} primary cameras, rendering through the first",
                self.id, primaries
            );
        }

        info!(
            "Runtime started: {} bodies, {} shapes",
            world.body_count(),
            world.shape_count()
        );
        self.physics = Some(world);
        Ok(())
    }

    /// Tear down scripts and the physics world. Every runtime handle is cleared.
    pub fn on_runtime_stop(&mut self) -> Result<(), SceneError> {
        if self.physics.is_none() {
            return Err(SceneError::RuntimeNotActive);
        }

        self.destroy_script_instances();

        for (_, rb) in self.registry.view_mut::<&mut Rigidbody2DComponent>() {
            rb.runtime_body = None;
        }
        for (_, collider) in self.registry.view_mut::<&mut BoxCollider2DComponent>() {
            collider.runtime_shape = None;
        }
        for (_, collider) in self.registry.view_mut::<&mut CircleCollider2DComponent>() {
            collider.runtime_shape = None;
        }

        if let Some(world) = self.physics.take() {
            info!("Runtime stopped: released {} bodies", world.body_count());
        }
        Ok(())
    }

    /// Step the world by `ts` and write body poses back into transforms.
    ///
    /// Only translation x/y and rotation z are written. No-op while inactive.
    pub fn on_update_physics(&mut self, ts: Timestep) -> Result<(), SceneError> {
        let Some(world) = self.physics.as_mut() else {
            return Ok(());
        };

        // Rigid bodies attached since the runtime started.
        let pending: Vec<_> = self
            .registry
            .view::<&Rigidbody2DComponent>()
            .filter(|(_, rb)| rb.runtime_body.is_none())
            .map(|(raw, _)| raw)
            .collect();
        for raw in pending {
            create_body(&mut self.registry, world, raw)?;
        }

        // Colliders attached or replaced on a live body.
        let mut unshaped: Vec<_> = self
            .registry
            .view::<(&Rigidbody2DComponent, &BoxCollider2DComponent)>()
            .filter(|(_, (rb, collider))| rb.runtime_body.is_some() && collider.runtime_shape.is_none())
            .map(|(raw, _)| raw)
            .collect();
        unshaped.extend(
            self.registry
                .view::<(&Rigidbody2DComponent, &CircleCollider2DComponent)>()
                .filter(|(_, (rb, collider))| {
                    rb.runtime_body.is_some() && collider.runtime_shape.is_none()
                })
                .map(|(raw, _)| raw),
        );
        for raw in unshaped {
            attach_missing_shapes(&mut self.registry, world, raw)?;
        }

        world.step(ts.seconds());

        for (_, (transform, rb)) in self
            .registry
            .view_mut::<(&mut TransformComponent, &Rigidbody2DComponent)>()
        {
            let Some(body) = rb.runtime_body else {
                continue;
            };
            let pose = world.body_pose(body)?;
            transform.translation.x = pose.position.x;
            transform.translation.y = pose.position.y;
            transform.rotation.z = pose.angle;
        }
        Ok(())
    }

    /// Create the body for one entity if the runtime is active
    pub(crate) fn instantiate_body(&mut self, raw: lumen_ecs::Entity) -> Result<(), PhysicsError> {
        match self.physics.as_mut() {
            Some(world) => create_body(&mut self.registry, world, raw),
            None => Ok(()),
        }
    }
}

/// Create a body (and its shapes) from the entity's components, storing the
/// handles back on them.
fn create_body(
    registry: &mut Registry,
    world: &mut PhysicsWorld2D,
    raw: lumen_ecs::Entity,
) -> Result<(), PhysicsError> {
    let transform = registry
        .try_get::<TransformComponent>(raw)
        .copied()
        .unwrap_or_default();
    let rb = registry.get_mut::<Rigidbody2DComponent>(raw);
    let body = world.create_body(&BodyDesc {
        body_type: rb.body_type,
        position: transform.translation.truncate(),
        angle: transform.rotation.z,
        fixed_rotation: rb.fixed_rotation,
    });
    rb.runtime_body = Some(body);

    // Shapes of a replaced body went with it.
    if let Some(collider) = registry.try_get_mut::<BoxCollider2DComponent>(raw) {
        collider.runtime_shape = None;
    }
    if let Some(collider) = registry.try_get_mut::<CircleCollider2DComponent>(raw) {
        collider.runtime_shape = None;
    }
    attach_missing_shapes(registry, world, raw)
}

/// Give every collider of the entity without a shape one on its live body
fn attach_missing_shapes(
    registry: &mut Registry,
    world: &mut PhysicsWorld2D,
    raw: lumen_ecs::Entity,
) -> Result<(), PhysicsError> {
    let Some(body) = registry
        .try_get::<Rigidbody2DComponent>(raw)
        .and_then(|rb| rb.runtime_body)
    else {
        return Ok(());
    };
    let scale = registry
        .try_get::<TransformComponent>(raw)
        .map_or(Vec3::ONE, |transform| transform.scale);

    if let Some(collider) = registry.try_get_mut::<BoxCollider2DComponent>(raw) {
        if collider.runtime_shape.is_none() {
            collider.runtime_shape = Some(world.create_shape(body, &collider.shape_desc(scale))?);
        }
    }
    if let Some(collider) = registry.try_get_mut::<CircleCollider2DComponent>(raw) {
        if collider.runtime_shape.is_none() {
            collider.runtime_shape = Some(world.create_shape(body, &collider.shape_desc(scale))?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::TagComponent;
    use crate::entity::Entity;
    use crate::script::{NativeScriptComponent, ScriptContext, ScriptableEntity};
    use glam::Vec2;
    use lumen_physics::{BodyType, PhysicsConfig};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    const DT: Timestep = Timestep::from_seconds(1.0 / 60.0);

    fn body_entity(scene: &mut Scene, name: &str, body_type: BodyType, position: Vec2) -> Entity {
        let entity = scene.create_entity(name);
        scene.get_component_mut::<TransformComponent>(entity).translation = position.extend(0.0);
        scene.add_component(entity, Rigidbody2DComponent::new(body_type));
        scene.add_component(
            entity,
            BoxCollider2DComponent {
                size: Vec2::splat(0.5),
                ..Default::default()
            },
        );
        entity
    }

    #[test]
    fn test_player_falls_under_gravity() {
        let mut scene = Scene::new();
        let player = body_entity(&mut scene, "Player", BodyType::Dynamic, Vec2::new(0.0, 5.0));
        scene.on_runtime_start().unwrap();

        let mut last_y = 5.0;
        for frame in 0..60 {
            scene.on_update_physics(DT).unwrap();
            let y = scene.get_component::<TransformComponent>(player).translation.y;
            if frame == 0 {
                assert_ne!(y, 5.0);
            }
            assert!(y < last_y, "frame {frame}: {y} did not drop below {last_y}");
            last_y = y;
        }
        // Roughly g * t^2 / 2 after one second.
        assert!((5.0 - last_y - 5.0).abs() < 0.5);
    }

    #[test]
    fn test_pose_written_back_leaves_other_fields() {
        let mut scene = Scene::new();
        let entity = body_entity(&mut scene, "Box", BodyType::Dynamic, Vec2::new(1.0, 2.0));
        {
            let transform = scene.get_component_mut::<TransformComponent>(entity);
            transform.translation.z = 3.0;
            transform.scale = glam::Vec3::new(2.0, 2.0, 1.0);
        }
        scene.on_runtime_start().unwrap();
        scene.on_update_physics(DT).unwrap();

        let transform = scene.get_component::<TransformComponent>(entity);
        assert_eq!(transform.translation.z, 3.0);
        assert_eq!(transform.scale, glam::Vec3::new(2.0, 2.0, 1.0));
        assert_eq!(transform.translation.x, 1.0);
    }

    #[test]
    fn test_static_body_stays_put() {
        let mut scene = Scene::new();
        let ground = body_entity(&mut scene, "Ground", BodyType::Static, Vec2::new(0.0, -1.0));
        scene.on_runtime_start().unwrap();
        for _ in 0..30 {
            scene.on_update_physics(DT).unwrap();
        }
        assert_eq!(
            scene.get_component::<TransformComponent>(ground).translation.y,
            -1.0
        );
    }

    #[test]
    fn test_zero_gravity_config() {
        let config = PhysicsConfig {
            gravity: Vec2::ZERO,
            ..Default::default()
        };
        let mut scene = Scene::with_physics_config(config);
        let entity = body_entity(&mut scene, "Float", BodyType::Dynamic, Vec2::new(0.0, 5.0));
        scene.on_runtime_start().unwrap();
        for _ in 0..10 {
            scene.on_update_physics(DT).unwrap();
        }
        assert!((scene.get_component::<TransformComponent>(entity).translation.y - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_start_and_stop_state_machine() {
        let mut scene = Scene::new();
        assert!(matches!(scene.on_runtime_stop(), Err(SceneError::RuntimeNotActive)));

        scene.on_runtime_start().unwrap();
        assert!(scene.is_runtime_active());
        assert!(matches!(
            scene.on_runtime_start(),
            Err(SceneError::RuntimeAlreadyActive)
        ));

        scene.on_runtime_stop().unwrap();
        assert!(!scene.is_runtime_active());
        assert!(scene.physics_world().is_none());
    }

    #[test]
    fn test_update_physics_inactive_is_noop() {
        let mut scene = Scene::new();
        let entity = body_entity(&mut scene, "Idle", BodyType::Dynamic, Vec2::new(0.0, 5.0));
        scene.on_update_physics(DT).unwrap();
        assert_eq!(scene.get_component::<TransformComponent>(entity).translation.y, 5.0);
    }

    #[test]
    fn test_stop_clears_handles_and_old_handles_go_stale() {
        let mut scene = Scene::new();
        let entity = scene.create_entity("Ball");
        scene.add_component(entity, Rigidbody2DComponent::new(BodyType::Dynamic));
        scene.add_component(entity, CircleCollider2DComponent::default());

        scene.on_runtime_start().unwrap();
        let old_body = scene
            .get_component::<Rigidbody2DComponent>(entity)
            .runtime_body
            .unwrap();
        assert!(scene
            .get_component::<CircleCollider2DComponent>(entity)
            .runtime_shape
            .is_some());
        assert_eq!(scene.physics_world().unwrap().shape_count(), 1);

        scene.on_runtime_stop().unwrap();
        assert!(scene.get_component::<Rigidbody2DComponent>(entity).runtime_body.is_none());
        assert!(scene
            .get_component::<CircleCollider2DComponent>(entity)
            .runtime_shape
            .is_none());

        scene.on_runtime_start().unwrap();
        let world = scene.physics_world().unwrap();
        assert!(matches!(
            world.body_pose(old_body),
            Err(PhysicsError::StaleHandle { .. })
        ));
        let new_body = scene
            .get_component::<Rigidbody2DComponent>(entity)
            .runtime_body
            .unwrap();
        assert!(world.body_pose(new_body).is_ok());
    }

    #[test]
    fn test_destroy_releases_body() {
        let mut scene = Scene::new();
        let a = body_entity(&mut scene, "A", BodyType::Dynamic, Vec2::ZERO);
        body_entity(&mut scene, "B", BodyType::Dynamic, Vec2::new(3.0, 0.0));
        scene.on_runtime_start().unwrap();
        assert_eq!(scene.physics_world().unwrap().body_count(), 2);

        scene.destroy_entity(a);
        let world = scene.physics_world().unwrap();
        assert_eq!(world.body_count(), 1);
        assert_eq!(world.shape_count(), 1);
        scene.on_update_physics(DT).unwrap();
    }

    #[test]
    fn test_remove_component_releases_physics() {
        let mut scene = Scene::new();
        let entity = body_entity(&mut scene, "A", BodyType::Dynamic, Vec2::ZERO);
        scene.on_runtime_start().unwrap();

        scene.remove_component::<BoxCollider2DComponent>(entity);
        assert_eq!(scene.physics_world().unwrap().shape_count(), 0);
        assert_eq!(scene.physics_world().unwrap().body_count(), 1);

        scene.remove_component::<Rigidbody2DComponent>(entity);
        assert_eq!(scene.physics_world().unwrap().body_count(), 0);
        scene.on_update_physics(DT).unwrap();
    }

    #[test]
    fn test_duplicate_under_runtime_gets_own_body() {
        let mut scene = Scene::new();
        let original = body_entity(&mut scene, "Crate", BodyType::Dynamic, Vec2::new(0.0, 2.0));
        scene.on_runtime_start().unwrap();

        let copy = scene.duplicate_entity(original);
        let body_a = scene.get_component::<Rigidbody2DComponent>(original).runtime_body;
        let body_b = scene.get_component::<Rigidbody2DComponent>(copy).runtime_body;
        assert!(body_b.is_some());
        assert_ne!(body_a, body_b);
        assert_eq!(scene.physics_world().unwrap().body_count(), 2);
        assert_eq!(scene.physics_world().unwrap().shape_count(), 2);
    }

    #[test]
    fn test_rigidbody_added_during_runtime_joins_next_step() {
        let mut scene = Scene::new();
        scene.on_runtime_start().unwrap();
        let late = body_entity(&mut scene, "Late", BodyType::Dynamic, Vec2::new(0.0, 1.0));
        assert!(scene.get_component::<Rigidbody2DComponent>(late).runtime_body.is_none());

        scene.on_update_physics(DT).unwrap();
        assert!(scene.get_component::<Rigidbody2DComponent>(late).runtime_body.is_some());
        assert!(scene.get_component::<TransformComponent>(late).translation.y < 1.0);
    }

    #[test]
    fn test_kinematic_body_ignores_gravity() {
        let mut scene = Scene::new();
        let entity = body_entity(&mut scene, "Platform", BodyType::Kinematic, Vec2::new(0.0, 3.0));
        scene.on_runtime_start().unwrap();
        for _ in 0..30 {
            scene.on_update_physics(DT).unwrap();
        }
        assert_eq!(scene.get_component::<TransformComponent>(entity).translation.y, 3.0);
    }

    fn wide_ground(scene: &mut Scene) -> Entity {
        let ground = body_entity(scene, "Ground", BodyType::Static, Vec2::new(0.0, -1.0));
        scene.get_component_mut::<TransformComponent>(ground).scale = Vec3::new(20.0, 1.0, 1.0);
        ground
    }

    #[test]
    fn test_replaced_collider_gets_new_shape() {
        let mut scene = Scene::new();
        wide_ground(&mut scene);
        let crate_entity = body_entity(&mut scene, "Crate", BodyType::Dynamic, Vec2::new(0.0, 2.0));
        scene.on_runtime_start().unwrap();
        assert_eq!(scene.physics_world().unwrap().shape_count(), 2);

        scene.add_or_replace_component(
            crate_entity,
            BoxCollider2DComponent {
                size: Vec2::splat(1.0),
                ..Default::default()
            },
        );
        assert_eq!(scene.physics_world().unwrap().shape_count(), 1);

        scene.on_update_physics(DT).unwrap();
        assert_eq!(scene.physics_world().unwrap().shape_count(), 2);
        assert!(scene
            .get_component::<BoxCollider2DComponent>(crate_entity)
            .runtime_shape
            .is_some());

        for _ in 0..180 {
            scene.on_update_physics(DT).unwrap();
        }
        // Ground top is at -0.5 and the new half extent is 1.0.
        let y = scene.get_component::<TransformComponent>(crate_entity).translation.y;
        assert!((y - 0.5).abs() < 0.1, "crate resting at {y}");
    }

    #[test]
    fn test_collider_added_during_runtime_collides() {
        let mut scene = Scene::new();
        wide_ground(&mut scene);
        let ball = scene.create_entity("Ball");
        scene.get_component_mut::<TransformComponent>(ball).translation = Vec3::new(0.0, 2.0, 0.0);
        scene.add_component(ball, Rigidbody2DComponent::new(BodyType::Dynamic));
        scene.on_runtime_start().unwrap();

        scene.add_component(ball, CircleCollider2DComponent::default());
        for _ in 0..180 {
            scene.on_update_physics(DT).unwrap();
        }
        assert_eq!(scene.physics_world().unwrap().shape_count(), 2);
        let y = scene.get_component::<TransformComponent>(ball).translation.y;
        assert!((y - 0.0).abs() < 0.1, "ball resting at {y}");
    }

    fn tilted_crate(scene: &mut Scene, name: &str, x: f32, fixed_rotation: bool) -> Entity {
        let entity = scene.create_entity(name);
        {
            let transform = scene.get_component_mut::<TransformComponent>(entity);
            transform.translation = Vec3::new(x, 2.0, 0.0);
            transform.rotation.z = 0.4;
        }
        scene.add_component(
            entity,
            Rigidbody2DComponent {
                fixed_rotation,
                ..Rigidbody2DComponent::new(BodyType::Dynamic)
            },
        );
        scene.add_component(
            entity,
            BoxCollider2DComponent {
                offset: Vec2::new(0.3, 0.0),
                ..Default::default()
            },
        );
        entity
    }

    #[test]
    fn test_fixed_rotation_keeps_angle_on_landing() {
        let mut scene = Scene::new();
        wide_ground(&mut scene);
        let locked = tilted_crate(&mut scene, "Locked", -3.0, true);
        let free = tilted_crate(&mut scene, "Free", 3.0, false);
        scene.on_runtime_start().unwrap();

        for _ in 0..120 {
            scene.on_update_physics(DT).unwrap();
            let angle = scene.get_component::<TransformComponent>(locked).rotation.z;
            assert!((angle - 0.4).abs() < 1e-4, "locked body turned to {angle}");
        }
        assert!(scene.get_component::<TransformComponent>(locked).translation.y < 1.0);

        let free_angle = scene.get_component::<TransformComponent>(free).rotation.z;
        assert!((free_angle - 0.4).abs() > 0.05, "free body stayed at {free_angle}");
    }

    #[test]
    fn test_body_angle_written_back() {
        let config = PhysicsConfig {
            gravity: Vec2::ZERO,
            ..Default::default()
        };
        let mut scene = Scene::with_physics_config(config);
        let entity = body_entity(&mut scene, "Turned", BodyType::Dynamic, Vec2::new(0.0, 1.0));
        scene.get_component_mut::<TransformComponent>(entity).rotation.z = 0.7;
        scene.on_runtime_start().unwrap();

        scene.get_component_mut::<TransformComponent>(entity).rotation.z = 0.0;
        scene.on_update_physics(DT).unwrap();
        let rotation = scene.get_component::<TransformComponent>(entity).rotation;
        assert!((rotation.z - 0.7).abs() < 1e-5);
        assert_eq!((rotation.x, rotation.y), (0.0, 0.0));
    }

    #[derive(Default)]
    struct Flag {
        destroyed: Arc<AtomicBool>,
    }

    impl ScriptableEntity for Flag {
        fn on_destroy(&mut self, ctx: &mut ScriptContext<'_>) {
            assert!(ctx.get::<TagComponent>().is_some());
            self.destroyed.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_stop_destroys_script_instances() {
        let destroyed = Arc::new(AtomicBool::new(false));
        let mut scene = Scene::new();
        let entity = scene.create_entity("Scripted");
        let flag = Arc::clone(&destroyed);
        scene.add_component(
            entity,
            NativeScriptComponent::from_factory(move || {
                Box::new(Flag {
                    destroyed: Arc::clone(&flag),
                })
            }),
        );

        scene.on_runtime_start().unwrap();
        let mut renderer = lumen_render::RecordingRenderer::new();
        scene.on_update_runtime(DT, &mut renderer).unwrap();
        assert!(scene.get_component::<NativeScriptComponent>(entity).is_instantiated());

        scene.on_runtime_stop().unwrap();
        assert!(destroyed.load(Ordering::SeqCst));
        assert!(!scene.get_component::<NativeScriptComponent>(entity).is_instantiated());
    }
}
