//! Lumen ECS - Entity component store
//!
//! Generational indices for entities, sparse-set storage per component type,
//! typed views over component combinations and cached groups for the
//! combinations that are scanned every frame.

mod component;
mod entity;
mod group;
mod query;
mod registry;

pub use component::Component;
pub use entity::Entity;
pub use query::{QueryIter, ReadOnlyWorldQuery, WorldQuery};
pub use registry::Registry;
