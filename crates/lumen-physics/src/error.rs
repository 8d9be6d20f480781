use crate::handle::WorldId;

/// Errors raised by the physics world
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhysicsError {
    #[error("handle issued by physics world {issued_by} used with world {current}")]
    StaleHandle { issued_by: WorldId, current: WorldId },

    #[error("rigid body no longer exists")]
    BodyNotFound,

    #[error("shape no longer exists")]
    ShapeNotFound,

    #[error("unknown body type discriminant: {0}")]
    UnknownBodyType(u8),
}
