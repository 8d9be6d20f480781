use glam::Vec2;
use rapier2d::prelude::RigidBodyType;
use serde::{Deserialize, Serialize};

use crate::error::PhysicsError;

/// How a body takes part in the simulation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BodyType {
    /// Never moves
    #[default]
    Static = 0,
    /// Driven by forces and gravity
    Dynamic = 1,
    /// Moved by velocity only, unaffected by forces
    Kinematic = 2,
}

impl BodyType {
    pub const ALL: [BodyType; 3] = [BodyType::Static, BodyType::Dynamic, BodyType::Kinematic];

    pub(crate) fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyType::Static => RigidBodyType::Fixed,
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Kinematic => RigidBodyType::KinematicVelocityBased,
        }
    }
}

impl TryFrom<u8> for BodyType {
    type Error = PhysicsError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BodyType::Static),
            1 => Ok(BodyType::Dynamic),
            2 => Ok(BodyType::Kinematic),
            other => Err(PhysicsError::UnknownBodyType(other)),
        }
    }
}

/// Parameters for creating a rigid body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub position: Vec2,
    /// Rotation in radians
    pub angle: f32,
    pub fixed_rotation: bool,
}

/// Collision geometry, in body-local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeGeometry {
    Box { half_extents: Vec2, offset: Vec2 },
    Circle { radius: f32, offset: Vec2 },
}

/// Parameters for creating a shape on a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeDesc {
    pub geometry: ShapeGeometry,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
}

/// Simulated world pose of a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPose {
    pub position: Vec2,
    /// Rotation in radians
    pub angle: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_type_from_discriminant() {
        for body_type in BodyType::ALL {
            assert_eq!(BodyType::try_from(body_type as u8), Ok(body_type));
        }
        assert_eq!(
            BodyType::try_from(7),
            Err(PhysicsError::UnknownBodyType(7))
        );
    }

    #[test]
    fn body_type_mapping() {
        assert_eq!(BodyType::Static.to_rapier(), RigidBodyType::Fixed);
        assert_eq!(BodyType::Dynamic.to_rapier(), RigidBodyType::Dynamic);
        assert_eq!(
            BodyType::Kinematic.to_rapier(),
            RigidBodyType::KinematicVelocityBased
        );
    }
}
