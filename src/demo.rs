//! Built-in demo scene

use glam::{Vec2, Vec3};
use lumen_core::{Color, Timestep};
use lumen_physics::PhysicsConfig;
use lumen_scene::{
    BodyType, BoxCollider2DComponent, CameraComponent, CircleCollider2DComponent,
    CircleRendererComponent, NativeScriptComponent, Rigidbody2DComponent, Scene, ScriptContext,
    ScriptableEntity, SpriteRendererComponent, TransformComponent,
};

/// Spins its entity around the z axis
#[derive(Default)]
struct Spinner {
    turns: f32,
}

impl ScriptableEntity for Spinner {
    fn on_create(&mut self, ctx: &mut ScriptContext<'_>) {
        tracing::debug!("Spinner attached to {}", ctx.entity());
    }

    fn on_update(&mut self, ctx: &mut ScriptContext<'_>, ts: Timestep) {
        self.turns += ts.seconds() * 0.5;
        if let Some(transform) = ctx.get_mut::<TransformComponent>() {
            transform.rotation.z = self.turns * std::f32::consts::TAU;
        }
    }
}

/// A floor, a stack of crates, a ball and a camera
pub fn build_scene(physics: PhysicsConfig) -> Scene {
    let mut scene = Scene::with_physics_config(physics);

    let camera = scene.create_entity("Camera");
    scene.get_component_mut::<TransformComponent>(camera).translation = Vec3::new(0.0, 4.0, 0.0);
    let camera_component = scene.add_component(camera, CameraComponent::primary());
    camera_component.camera.set_orthographic(16.0, -1.0, 1.0);

    let ground = scene.create_entity("Ground");
    *scene.get_component_mut::<TransformComponent>(ground) =
        TransformComponent::from_translation(Vec3::new(0.0, -1.0, 0.0))
            .with_scale(Vec3::new(20.0, 1.0, 1.0));
    scene.add_component(ground, SpriteRendererComponent::from_color(Color::from_hex(0x3a3a3a)));
    scene.add_component(ground, Rigidbody2DComponent::new(BodyType::Static));
    scene.add_component(ground, BoxCollider2DComponent::default());

    for i in 0..4 {
        let crate_entity = scene.create_entity(&format!("Crate {}", i));
        scene.get_component_mut::<TransformComponent>(crate_entity).translation =
            Vec3::new(0.1 * i as f32, 1.0 + 1.5 * i as f32, 0.0);
        scene.add_component(
            crate_entity,
            SpriteRendererComponent::from_color(Color::from_hex(0xc08040)),
        );
        scene.add_component(crate_entity, Rigidbody2DComponent::new(BodyType::Dynamic));
        scene.add_component(crate_entity, BoxCollider2DComponent::default());
    }

    let ball = scene.create_entity("Ball");
    scene.get_component_mut::<TransformComponent>(ball).translation = Vec3::new(-3.0, 6.0, 0.0);
    scene.add_component(
        ball,
        CircleRendererComponent {
            color: Color::BLUE,
            ..Default::default()
        },
    );
    scene.add_component(ball, Rigidbody2DComponent::new(BodyType::Dynamic));
    scene.add_component(
        ball,
        CircleCollider2DComponent {
            restitution: 0.6,
            ..Default::default()
        },
    );

    let spinner = scene.create_entity("Spinner");
    scene.get_component_mut::<TransformComponent>(spinner).translation = Vec3::new(5.0, 3.0, 0.0);
    scene.add_component(spinner, SpriteRendererComponent::from_color(Color::GREEN));
    scene.add_component(spinner, NativeScriptComponent::bind::<Spinner>());

    scene
}

/// Bodies' positions for reporting
pub fn body_positions(scene: &Scene) -> Vec<(String, Vec2)> {
    scene
        .entities()
        .filter(|(entity, _)| scene.has_component::<Rigidbody2DComponent>(*entity))
        .map(|(entity, tag)| {
            let transform = scene.get_component::<TransformComponent>(entity);
            (tag.tag.clone(), transform.translation.truncate())
        })
        .collect()
}
