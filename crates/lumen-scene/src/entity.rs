use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use lumen_core::EntityKey;

static NEXT_SCENE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one scene instance. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneId(u64);

impl SceneId {
    pub(crate) fn next() -> Self {
        Self(NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle to one entity of one scene.
///
/// A lightweight copyable value: a store row plus the owning scene. Two
/// handles are equal only if they name the same row generation of the same
/// scene. The handle owns nothing; once the entity is destroyed every copy
/// stops resolving.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity {
    raw: lumen_ecs::Entity,
    scene: SceneId,
}

impl Entity {
    pub(crate) fn new(raw: lumen_ecs::Entity, scene: SceneId) -> Self {
        Self { raw, scene }
    }

    pub(crate) fn raw(&self) -> lumen_ecs::Entity {
        self.raw
    }

    /// The scene this handle belongs to.
    pub fn scene_id(&self) -> SceneId {
        self.scene
    }

    /// Opaque key for editor widgets and picking buffers.
    pub fn key(&self) -> EntityKey {
        EntityKey::from_raw(self.raw.to_bits())
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({} in scene {})", self.raw, self.scene.0)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_includes_scene() {
        let raw = lumen_ecs::Entity::from_raw(0, 0);
        let a = Entity::new(raw, SceneId::next());
        let b = Entity::new(raw, SceneId::next());
        assert_ne!(a, b);
        assert_eq!(a, Entity::new(raw, a.scene_id()));
    }

    #[test]
    fn key_differs_per_generation() {
        let scene = SceneId::next();
        let first = Entity::new(lumen_ecs::Entity::from_raw(4, 0), scene);
        let reused = Entity::new(lumen_ecs::Entity::from_raw(4, 1), scene);
        assert_ne!(first.key(), reused.key());
    }
}
