//! Lumen Core - Core types and utilities for the Lumen engine
//!
//! This crate provides the foundational types used throughout the engine:
//! - Mathematical primitives (re-exported from glam)
//! - Transform data for entity positioning
//! - Persistent entity identity and opaque entity keys
//! - Frame timestep and fixed-step clock

pub mod time;
pub mod types;

pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
pub use time::{ClockConfig, FrameClock, Timestep};
pub use types::{Color, EntityKey, EntityUuid, Transform};
