//! Lumen Physics - 2D physics simulation using rapier2d
//!
//! Wraps one rapier world behind strongly-typed handles. Every handle records
//! the world that issued it, so a handle kept past the end of its world is
//! rejected instead of resolving to an unrelated object.

mod desc;
mod error;
mod handle;
mod world;

pub use desc::{BodyDesc, BodyPose, BodyType, ShapeDesc, ShapeGeometry};
pub use error::PhysicsError;
pub use handle::{BodyHandle, ShapeHandle, WorldId};
pub use world::{PhysicsConfig, PhysicsWorld2D};
