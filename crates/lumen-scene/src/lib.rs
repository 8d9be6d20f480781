//! Lumen Scene - the runtime scene graph
//!
//! A [`Scene`] owns a component store, the entity lifecycle (create, copy,
//! duplicate, destroy), the bridge to the 2D physics world and the two
//! per-frame update paths: the editor path (render only) and the runtime
//! path (scripts, physics, primary-camera render).

mod components;
mod entity;
mod error;
mod physics;
mod scene;
mod scene_camera;
mod script;
mod session;

pub use components::{
    BoxCollider2DComponent, CameraComponent, CircleCollider2DComponent, IdComponent,
    Rigidbody2DComponent, SceneComponent, TagComponent, TransformComponent, Viewport,
};
pub use entity::{Entity, SceneId};
pub use error::SceneError;
pub use scene::{Scene, DEFAULT_ENTITY_NAME};
pub use scene_camera::{ProjectionType, SceneCamera};
pub use script::{NativeScriptComponent, ScriptContext, ScriptFactory, ScriptableEntity};
pub use session::{SceneSession, SceneState};

pub use lumen_physics::{BodyType, PhysicsConfig};
pub use lumen_render::{CircleRendererComponent, SpriteRendererComponent};
