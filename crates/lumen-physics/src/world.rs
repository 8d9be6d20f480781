use glam::Vec2;
use nalgebra::Vector2;
use rapier2d::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::desc::{BodyDesc, BodyPose, ShapeDesc, ShapeGeometry};
use crate::error::PhysicsError;
use crate::handle::{BodyHandle, ShapeHandle, WorldId};

/// Physics world configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity vector (default: -10 on Y axis)
    pub gravity: Vec2,
    /// Integration sub-steps per `step` call (default: 4)
    pub substeps: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -10.0),
            substeps: 4,
        }
    }
}

fn to_vector(v: Vec2) -> Vector2<Real> {
    Vector2::new(v.x, v.y)
}

/// One 2D physics simulation and all of its bodies and shapes
pub struct PhysicsWorld2D {
    id: WorldId,
    config: PhysicsConfig,

    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,

    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    ccd_solver: CCDSolver,
}

impl PhysicsWorld2D {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        let id = WorldId::next();
        debug!("Creating physics world {} with gravity {:?}", id, config.gravity);

        Self {
            id,
            config,
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            ccd_solver: CCDSolver::new(),
        }
    }

    pub fn id(&self) -> WorldId {
        self.id
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Advance the simulation by `dt` seconds, split into the configured
    /// number of equal sub-steps.
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let substeps = self.config.substeps.max(1);
        let gravity = to_vector(self.config.gravity);
        self.integration_parameters.dt = dt / substeps as f32;

        for _ in 0..substeps {
            self.physics_pipeline.step(
                &gravity,
                &self.integration_parameters,
                &mut self.island_manager,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.rigid_body_set,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                &mut self.ccd_solver,
                None,
                &(),
                &(),
            );
        }
    }

    /// Create a rigid body
    pub fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let mut builder = RigidBodyBuilder::new(desc.body_type.to_rapier())
            .translation(to_vector(desc.position))
            .rotation(desc.angle);
        if desc.fixed_rotation {
            builder = builder.lock_rotations();
        }
        let raw = self.rigid_body_set.insert(builder.build());
        BodyHandle { world: self.id, raw }
    }

    /// Create a shape and attach it to `body`
    pub fn create_shape(
        &mut self,
        body: BodyHandle,
        desc: &ShapeDesc,
    ) -> Result<ShapeHandle, PhysicsError> {
        self.check_world(body.world)?;
        if !self.rigid_body_set.contains(body.raw) {
            return Err(PhysicsError::BodyNotFound);
        }

        let builder = match desc.geometry {
            ShapeGeometry::Box {
                half_extents,
                offset,
            } => ColliderBuilder::cuboid(half_extents.x, half_extents.y)
                .translation(to_vector(offset)),
            ShapeGeometry::Circle { radius, offset } => {
                ColliderBuilder::ball(radius).translation(to_vector(offset))
            }
        };
        let collider = builder
            .density(desc.density)
            .friction(desc.friction)
            .restitution(desc.restitution)
            .build();

        let raw =
            self.collider_set
                .insert_with_parent(collider, body.raw, &mut self.rigid_body_set);
        Ok(ShapeHandle { world: self.id, raw })
    }

    /// Simulated position and rotation of a body
    pub fn body_pose(&self, body: BodyHandle) -> Result<BodyPose, PhysicsError> {
        self.check_world(body.world)?;
        let rb = self
            .rigid_body_set
            .get(body.raw)
            .ok_or(PhysicsError::BodyNotFound)?;
        let translation = rb.translation();
        Ok(BodyPose {
            position: Vec2::new(translation.x, translation.y),
            angle: rb.rotation().angle(),
        })
    }

    /// Remove a body together with every shape attached to it
    pub fn remove_body(&mut self, body: BodyHandle) -> Result<(), PhysicsError> {
        self.check_world(body.world)?;
        self.rigid_body_set
            .remove(
                body.raw,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .map(|_| ())
            .ok_or(PhysicsError::BodyNotFound)
    }

    /// Remove a single shape
    pub fn remove_shape(&mut self, shape: ShapeHandle) -> Result<(), PhysicsError> {
        self.check_world(shape.world)?;
        self.collider_set
            .remove(
                shape.raw,
                &mut self.island_manager,
                &mut self.rigid_body_set,
                true,
            )
            .map(|_| ())
            .ok_or(PhysicsError::ShapeNotFound)
    }

    pub fn contains_body(&self, body: BodyHandle) -> bool {
        body.world == self.id && self.rigid_body_set.contains(body.raw)
    }

    pub fn contains_shape(&self, shape: ShapeHandle) -> bool {
        shape.world == self.id && self.collider_set.contains(shape.raw)
    }

    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    pub fn shape_count(&self) -> usize {
        self.collider_set.len()
    }

    fn check_world(&self, issued_by: WorldId) -> Result<(), PhysicsError> {
        if issued_by == self.id {
            Ok(())
        } else {
            Err(PhysicsError::StaleHandle {
                issued_by,
                current: self.id,
            })
        }
    }
}

impl Default for PhysicsWorld2D {
    fn default() -> Self {
        Self::new()
    }
}
