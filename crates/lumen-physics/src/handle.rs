use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};

static NEXT_WORLD_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one physics world instance. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorldId(u64);

impl WorldId {
    pub(crate) fn next() -> Self {
        Self(NEXT_WORLD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque reference to a rigid body inside a specific physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    pub(crate) world: WorldId,
    pub(crate) raw: RigidBodyHandle,
}

impl BodyHandle {
    /// The world that created this body.
    pub fn world_id(&self) -> WorldId {
        self.world
    }
}

/// Opaque reference to a collision shape inside a specific physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeHandle {
    pub(crate) world: WorldId,
    pub(crate) raw: ColliderHandle,
}

impl ShapeHandle {
    /// The world that created this shape.
    pub fn world_id(&self) -> WorldId {
        self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_ids_are_unique() {
        let a = WorldId::next();
        let b = WorldId::next();
        assert_ne!(a, b);
    }
}
