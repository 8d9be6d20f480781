//! Camera data passed to `begin_scene`

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Projection and view matrices for one render pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub projection: Mat4,
    /// World-to-camera transform
    pub view: Mat4,
}

impl CameraView {
    /// A camera placed by a world transform (camera-to-world).
    pub fn from_transform(projection: Mat4, camera_transform: Mat4) -> Self {
        Self {
            projection,
            view: camera_transform.inverse(),
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// Orbit camera used by the editor viewport
#[derive(Debug, Clone)]
pub struct EditorCamera {
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near_clip: f32,
    pub far_clip: f32,
    pub focal_point: Vec3,
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    viewport: (f32, f32),
}

impl Default for EditorCamera {
    fn default() -> Self {
        Self::new(45f32.to_radians(), 1.778, 0.1, 1000.0)
    }
}

impl EditorCamera {
    pub fn new(fov: f32, aspect_ratio: f32, near_clip: f32, far_clip: f32) -> Self {
        Self {
            fov,
            aspect_ratio,
            near_clip,
            far_clip,
            focal_point: Vec3::ZERO,
            distance: 10.0,
            pitch: 0.0,
            yaw: 0.0,
            viewport: (1280.0, 720.0),
        }
    }

    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.viewport = (width, height);
        self.aspect_ratio = width / height;
    }

    pub fn viewport_size(&self) -> (f32, f32) {
        self.viewport
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, -self.yaw, -self.pitch, 0.0)
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    pub fn position(&self) -> Vec3 {
        self.focal_point - self.forward() * self.distance
    }

    /// Move towards the focal point, pushing it forward once the camera gets close
    pub fn zoom(&mut self, delta: f32) {
        self.distance -= delta;
        if self.distance < 1.0 {
            self.focal_point += self.forward();
            self.distance = 1.0;
        }
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, self.aspect_ratio, self.near_clip, self.far_clip)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(), self.position()).inverse()
    }

    pub fn camera_view(&self) -> CameraView {
        CameraView {
            projection: self.projection(),
            view: self.view_matrix(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera_looks_down_negative_z() {
        let camera = EditorCamera::default();
        assert!((camera.position() - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-5);

        let focal = camera.view_matrix().transform_point3(camera.focal_point);
        assert!((focal - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-4);
    }

    #[test]
    fn test_viewport_updates_aspect() {
        let mut camera = EditorCamera::default();
        camera.set_viewport_size(800.0, 400.0);
        assert_eq!(camera.aspect_ratio, 2.0);

        camera.set_viewport_size(0.0, 400.0);
        assert_eq!(camera.aspect_ratio, 2.0);
    }

    #[test]
    fn test_zoom_clamps_distance() {
        let mut camera = EditorCamera::default();
        camera.zoom(20.0);
        assert_eq!(camera.distance, 1.0);
        assert!(camera.focal_point.z < 0.0);
    }

    #[test]
    fn test_camera_view_from_transform() {
        let transform = Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0));
        let view = CameraView::from_transform(Mat4::IDENTITY, transform);
        let p = view.view_projection().transform_point3(Vec3::new(3.0, 0.0, 0.0));
        assert!(p.length() < 1e-6);
    }
}
