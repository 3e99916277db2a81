//! Perspective camera

use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// Perspective camera with an explicit look-at point.
///
/// The projection matrix is cached and only rebuilt by
/// [`PerspectiveCamera::update_projection_matrix`], so callers that change
/// `fov`/`aspect`/`near`/`far` must call it before the next frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    look_at: Vec3,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            up: Vec3::Y,
            fov,
            aspect,
            near,
            far,
            look_at: Vec3::NEG_Z,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self::new(config.fov, aspect, config.near, config.far);
        camera.position = Vec3::from(config.position);
        camera.look_at(Vec3::ZERO);
        camera
    }

    /// Orient the camera towards `point`
    pub fn look_at(&mut self, point: Vec3) {
        self.look_at = point;
    }

    /// Point the camera is currently oriented towards
    pub fn look_at_point(&self) -> Vec3 {
        self.look_at
    }

    pub fn forward(&self) -> Vec3 {
        (self.look_at - self.position).normalize_or_zero()
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_at, self.up)
    }

    pub fn build_view_projection_matrix(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    /// Camera-space right and up axes in world space
    pub fn screen_axes(&self) -> (Vec3, Vec3) {
        let forward = self.forward();
        let right = forward.cross(self.up).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();
        (right, up)
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = PerspectiveCamera::default();
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 8.0));
        assert_eq!(camera.look_at_point(), Vec3::ZERO);
        assert_eq!(camera.fov, 50.0);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 1000.0);
    }

    #[test]
    fn test_projection_is_cached_until_updated() {
        let mut camera = PerspectiveCamera::new(50.0, 1.0, 0.1, 1000.0);
        let before = camera.projection_matrix();

        camera.set_aspect(2.0);
        assert_eq!(camera.projection_matrix(), before);

        camera.update_projection_matrix();
        let expected = Mat4::perspective_rh(50.0_f32.to_radians(), 2.0, 0.1, 1000.0);
        assert_eq!(camera.projection_matrix(), expected);
    }

    #[test]
    fn test_origin_projects_to_center() {
        let camera = PerspectiveCamera::default();
        let ndc = camera.build_view_projection_matrix().project_point3(Vec3::ZERO);
        assert!(ndc.x.abs() < 1e-6);
        assert!(ndc.y.abs() < 1e-6);
    }
}
