//! Component types understood by the scene
//!
//! Every type the scene copies, duplicates or serves through its component
//! API implements [`SceneComponent`]. The trait has no default methods, so a
//! type without explicit hooks cannot be attached through a [`Scene`].
//!
//! [`Scene`]: crate::Scene

use glam::{Vec2, Vec3};
use lumen_core::{EntityUuid, Transform};
use lumen_ecs::Component;
use lumen_physics::{
    BodyHandle, BodyType, PhysicsWorld2D, ShapeDesc, ShapeGeometry, ShapeHandle,
};
use lumen_render::{CircleRendererComponent, SpriteRendererComponent};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entity::Entity;
use crate::scene_camera::SceneCamera;
use crate::script::NativeScriptComponent;

/// Last known viewport size of a scene, in pixels. Zero until the first resize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_set(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Hooks the scene runs when a component enters or leaves an entity.
pub trait SceneComponent: Component + Clone {
    /// Core components live as long as their entity. They can be replaced
    /// but never removed.
    const CORE: bool;

    /// Called right after the component is attached through the scene.
    fn on_added(&mut self, entity: Entity, viewport: Viewport);

    /// Called after the component was detached, with the physics world when
    /// the runtime is active.
    fn on_removed(&mut self, physics: Option<&mut PhysicsWorld2D>);
}

/// Stable identity, survives scene copies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdComponent {
    pub id: EntityUuid,
}

/// Human-readable entity name
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagComponent {
    pub tag: String,
}

impl TagComponent {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

pub type TransformComponent = Transform;

#[derive(Debug, Clone, PartialEq)]
pub struct CameraComponent {
    pub camera: SceneCamera,
    /// The runtime renders through the first primary camera
    pub primary: bool,
    /// Keep the aspect ratio when the viewport resizes
    pub fixed_aspect_ratio: bool,
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self {
            camera: SceneCamera::default(),
            primary: false,
            fixed_aspect_ratio: false,
        }
    }
}

impl CameraComponent {
    pub fn primary() -> Self {
        Self {
            primary: true,
            ..Default::default()
        }
    }
}

/// Rigid body settings. `runtime_body` is set only while the runtime is active.
///
/// Cloning never carries the runtime handle.
#[derive(Debug, PartialEq)]
pub struct Rigidbody2DComponent {
    pub body_type: BodyType,
    pub fixed_rotation: bool,
    pub runtime_body: Option<BodyHandle>,
}

impl Default for Rigidbody2DComponent {
    fn default() -> Self {
        Self {
            body_type: BodyType::Static,
            fixed_rotation: false,
            runtime_body: None,
        }
    }
}

impl Rigidbody2DComponent {
    pub fn new(body_type: BodyType) -> Self {
        Self {
            body_type,
            ..Default::default()
        }
    }
}

impl Clone for Rigidbody2DComponent {
    fn clone(&self) -> Self {
        Self {
            runtime_body: None,
            ..*self
        }
    }
}

/// Box collider. `size` holds half extents, scaled by the entity transform.
#[derive(Debug, PartialEq)]
pub struct BoxCollider2DComponent {
    pub offset: Vec2,
    pub size: Vec2,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub runtime_shape: Option<ShapeHandle>,
}

impl Default for BoxCollider2DComponent {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            size: Vec2::splat(0.5),
            density: 1.0,
            friction: 0.5,
            restitution: 0.0,
            runtime_shape: None,
        }
    }
}

impl BoxCollider2DComponent {
    pub(crate) fn shape_desc(&self, scale: Vec3) -> ShapeDesc {
        ShapeDesc {
            geometry: ShapeGeometry::Box {
                half_extents: self.size * scale.truncate(),
                offset: self.offset,
            },
            density: self.density,
            friction: self.friction,
            restitution: self.restitution,
        }
    }
}

impl Clone for BoxCollider2DComponent {
    fn clone(&self) -> Self {
        Self {
            runtime_shape: None,
            ..*self
        }
    }
}

/// Circle collider. The radius is scaled by the entity's x scale.
#[derive(Debug, PartialEq)]
pub struct CircleCollider2DComponent {
    pub offset: Vec2,
    pub radius: f32,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub runtime_shape: Option<ShapeHandle>,
}

impl Default for CircleCollider2DComponent {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            radius: 0.5,
            density: 1.0,
            friction: 0.5,
            restitution: 0.0,
            runtime_shape: None,
        }
    }
}

impl CircleCollider2DComponent {
    pub(crate) fn shape_desc(&self, scale: Vec3) -> ShapeDesc {
        ShapeDesc {
            geometry: ShapeGeometry::Circle {
                radius: self.radius * scale.x,
                offset: self.offset,
            },
            density: self.density,
            friction: self.friction,
            restitution: self.restitution,
        }
    }
}

impl Clone for CircleCollider2DComponent {
    fn clone(&self) -> Self {
        Self {
            runtime_shape: None,
            ..*self
        }
    }
}

macro_rules! no_hooks {
    (@impl $core:literal; $($ty:ty),+) => {
        $(
            impl SceneComponent for $ty {
                const CORE: bool = $core;

                fn on_added(&mut self, _entity: Entity, _viewport: Viewport) {}

                fn on_removed(&mut self, _physics: Option<&mut PhysicsWorld2D>) {}
            }
        )+
    };
    (core: $($ty:ty),+ $(,)?) => {
        no_hooks!(@impl true; $($ty),+);
    };
    ($($ty:ty),+ $(,)?) => {
        no_hooks!(@impl false; $($ty),+);
    };
}

no_hooks!(core: IdComponent, TagComponent, TransformComponent);

no_hooks!(
    SpriteRendererComponent,
    CircleRendererComponent,
    NativeScriptComponent,
);

impl SceneComponent for CameraComponent {
    const CORE: bool = false;

    fn on_added(&mut self, _entity: Entity, viewport: Viewport) {
        if viewport.is_set() {
            self.camera.set_viewport_size(viewport.width, viewport.height);
        }
    }

    fn on_removed(&mut self, _physics: Option<&mut PhysicsWorld2D>) {}
}

impl SceneComponent for Rigidbody2DComponent {
    const CORE: bool = false;

    fn on_added(&mut self, _entity: Entity, _viewport: Viewport) {}

    /// Removing the body also removes every shape attached to it.
    fn on_removed(&mut self, physics: Option<&mut PhysicsWorld2D>) {
        let Some(body) = self.runtime_body.take() else {
            return;
        };
        if let Some(world) = physics {
            if let Err(e) = world.remove_body(body) {
                warn!("Failed to release rigid body: {}", e);
            }
        }
    }
}

fn release_shape(shape: Option<ShapeHandle>, physics: Option<&mut PhysicsWorld2D>) {
    let (Some(shape), Some(world)) = (shape, physics) else {
        return;
    };
    // Already gone when the owning body was removed first.
    if world.contains_shape(shape) {
        if let Err(e) = world.remove_shape(shape) {
            warn!("Failed to release collider: {}", e);
        }
    }
}

impl SceneComponent for BoxCollider2DComponent {
    const CORE: bool = false;

    fn on_added(&mut self, _entity: Entity, _viewport: Viewport) {}

    fn on_removed(&mut self, physics: Option<&mut PhysicsWorld2D>) {
        release_shape(self.runtime_shape.take(), physics);
    }
}

impl SceneComponent for CircleCollider2DComponent {
    const CORE: bool = false;

    fn on_added(&mut self, _entity: Entity, _viewport: Viewport) {}

    fn on_removed(&mut self, physics: Option<&mut PhysicsWorld2D>) {
        release_shape(self.runtime_shape.take(), physics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_physics::BodyDesc;

    #[test]
    fn test_clone_drops_runtime_handles() {
        let mut world = PhysicsWorld2D::new();
        let body = world.create_body(&BodyDesc {
            body_type: BodyType::Dynamic,
            position: Vec2::ZERO,
            angle: 0.0,
            fixed_rotation: false,
        });
        let shape = world
            .create_shape(body, &BoxCollider2DComponent::default().shape_desc(Vec3::ONE))
            .unwrap();

        let rb = Rigidbody2DComponent {
            body_type: BodyType::Dynamic,
            fixed_rotation: true,
            runtime_body: Some(body),
        };
        let copy = rb.clone();
        assert_eq!(copy.runtime_body, None);
        assert_eq!(copy.body_type, BodyType::Dynamic);
        assert!(copy.fixed_rotation);

        let collider = BoxCollider2DComponent {
            runtime_shape: Some(shape),
            ..Default::default()
        };
        assert_eq!(collider.clone(), BoxCollider2DComponent::default());
    }

    #[test]
    fn test_shape_desc_applies_scale() {
        let scale = Vec3::new(2.0, 4.0, 1.0);
        let boxed = BoxCollider2DComponent::default().shape_desc(scale);
        assert_eq!(
            boxed.geometry,
            ShapeGeometry::Box {
                half_extents: Vec2::new(1.0, 2.0),
                offset: Vec2::ZERO,
            }
        );

        let circle = CircleCollider2DComponent::default().shape_desc(scale);
        assert_eq!(
            circle.geometry,
            ShapeGeometry::Circle {
                radius: 1.0,
                offset: Vec2::ZERO,
            }
        );
    }

    #[test]
    fn test_removed_rigidbody_releases_body() {
        let mut world = PhysicsWorld2D::new();
        let body = world.create_body(&BodyDesc {
            body_type: BodyType::Static,
            position: Vec2::ZERO,
            angle: 0.0,
            fixed_rotation: false,
        });
        let mut rb = Rigidbody2DComponent {
            runtime_body: Some(body),
            ..Default::default()
        };
        rb.on_removed(Some(&mut world));
        assert!(!world.contains_body(body));
        assert_eq!(rb.runtime_body, None);
    }

    #[test]
    fn test_camera_hook_applies_viewport() {
        let mut camera = CameraComponent::primary();
        let entity = Entity::new(lumen_ecs::Entity::from_raw(0, 0), crate::SceneId::next());

        camera.on_added(entity, Viewport::default());
        assert_eq!(camera.camera.aspect_ratio(), 1.0);

        camera.on_added(entity, Viewport::new(300, 100));
        assert_eq!(camera.camera.aspect_ratio(), 3.0);
    }
}
