use lumen_physics::PhysicsError;

/// Errors raised by scene lifecycle operations
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("scene runtime is already active")]
    RuntimeAlreadyActive,

    #[error("scene runtime is not active")]
    RuntimeNotActive,

    #[error("physics error: {0}")]
    Physics(#[from] PhysicsError),
}
