//! Projection owned by a camera component

use glam::Mat4;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionType {
    Perspective,
    #[default]
    Orthographic,
}

/// Camera projection with separate perspective and orthographic parameters.
///
/// The projection matrix is rebuilt on every parameter change.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneCamera {
    projection_type: ProjectionType,

    /// Vertical field of view in radians
    perspective_fov: f32,
    perspective_near: f32,
    perspective_far: f32,

    orthographic_size: f32,
    orthographic_near: f32,
    orthographic_far: f32,

    aspect_ratio: f32,
    projection: Mat4,
}

impl Default for SceneCamera {
    fn default() -> Self {
        let mut camera = Self {
            projection_type: ProjectionType::Orthographic,
            perspective_fov: 45f32.to_radians(),
            perspective_near: 0.01,
            perspective_far: 1000.0,
            orthographic_size: 10.0,
            orthographic_near: -1.0,
            orthographic_far: 1.0,
            aspect_ratio: 1.0,
            projection: Mat4::IDENTITY,
        };
        camera.recalculate_projection();
        camera
    }
}

impl SceneCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_orthographic(&mut self, size: f32, near_clip: f32, far_clip: f32) {
        self.projection_type = ProjectionType::Orthographic;
        self.orthographic_size = size;
        self.orthographic_near = near_clip;
        self.orthographic_far = far_clip;
        self.recalculate_projection();
    }

    pub fn set_perspective(&mut self, vertical_fov: f32, near_clip: f32, far_clip: f32) {
        self.projection_type = ProjectionType::Perspective;
        self.perspective_fov = vertical_fov;
        self.perspective_near = near_clip;
        self.perspective_far = far_clip;
        self.recalculate_projection();
    }

    /// Update the aspect ratio from a viewport size. A zero-sized viewport is ignored.
    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect_ratio = width as f32 / height as f32;
        self.recalculate_projection();
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn projection_type(&self) -> ProjectionType {
        self.projection_type
    }

    pub fn set_projection_type(&mut self, projection_type: ProjectionType) {
        self.projection_type = projection_type;
        self.recalculate_projection();
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn perspective_fov(&self) -> f32 {
        self.perspective_fov
    }

    pub fn set_perspective_fov(&mut self, fov: f32) {
        self.perspective_fov = fov;
        self.recalculate_projection();
    }

    pub fn perspective_clip(&self) -> (f32, f32) {
        (self.perspective_near, self.perspective_far)
    }

    pub fn orthographic_size(&self) -> f32 {
        self.orthographic_size
    }

    pub fn set_orthographic_size(&mut self, size: f32) {
        self.orthographic_size = size;
        self.recalculate_projection();
    }

    pub fn orthographic_clip(&self) -> (f32, f32) {
        (self.orthographic_near, self.orthographic_far)
    }

    fn recalculate_projection(&mut self) {
        self.projection = match self.projection_type {
            ProjectionType::Perspective => Mat4::perspective_rh_gl(
                self.perspective_fov,
                self.aspect_ratio,
                self.perspective_near,
                self.perspective_far,
            ),
            ProjectionType::Orthographic => {
                let half_height = self.orthographic_size * 0.5;
                let half_width = half_height * self.aspect_ratio;
                Mat4::orthographic_rh_gl(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.orthographic_near,
                    self.orthographic_far,
                )
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_orthographic_bounds() {
        let mut camera = SceneCamera::new();
        camera.set_orthographic(10.0, -1.0, 1.0);
        camera.set_viewport_size(200, 100);
        assert_eq!(camera.aspect_ratio(), 2.0);

        // Right edge of the view volume (size * aspect / 2) lands on +1 in clip space.
        let p = camera.projection().project_point3(Vec3::new(10.0, 5.0, 0.0));
        assert!((p.x - 1.0).abs() < 1e-5);
        assert!((p.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_switching_projection_type() {
        let mut camera = SceneCamera::new();
        let ortho = camera.projection();
        camera.set_perspective(60f32.to_radians(), 0.1, 100.0);
        assert_eq!(camera.projection_type(), ProjectionType::Perspective);
        assert_ne!(camera.projection(), ortho);

        camera.set_projection_type(ProjectionType::Orthographic);
        assert_eq!(camera.projection(), ortho);
    }

    #[test]
    fn test_zero_viewport_ignored() {
        let mut camera = SceneCamera::new();
        camera.set_viewport_size(1600, 900);
        let before = camera.projection();
        camera.set_viewport_size(0, 900);
        assert_eq!(camera.projection(), before);
    }
}
