//! Orbit controls
//!
//! Pointer input accumulates spherical deltas around `target`; [`OrbitControls::update`]
//! integrates them into the camera once per frame. With damping enabled only a
//! `damping_factor` share of the pending delta is applied per frame and the rest
//! decays, which gives the camera its inertia.

use glam::Vec3;
use std::f32::consts::PI;

use crate::config::ControlsConfig;
use crate::constants;
use crate::viewport::PerspectiveCamera;

/// What the user is currently doing with the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionKind {
    #[default]
    Idle,
    Rotate,
    Pan,
}

/// Observable configuration of the controls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlsState {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Spherical {
    radius: f32,
    /// Polar angle from +Y
    phi: f32,
    /// Azimuth around +Y, measured from +Z
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

/// Orbit-style camera controls with damping and auto-rotation
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub auto_rotate: bool,
    /// 2.0 is one full turn every 30 seconds
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    /// Height in points of the element the controls are bound to
    element_height: f32,
    interaction: InteractionKind,
    spherical_delta: Spherical,
    scale: f32,
    pan_offset: Vec3,
}

impl OrbitControls {
    pub fn new(config: &ControlsConfig, element_height: f32) -> Self {
        Self {
            target: Vec3::ZERO,
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor,
            auto_rotate: config.auto_rotate,
            auto_rotate_speed: config.auto_rotate_speed,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            pan_speed: config.pan_speed,
            min_distance: constants::controls::MIN_DISTANCE,
            max_distance: constants::controls::MAX_DISTANCE,
            element_height: element_height.max(1.0),
            interaction: InteractionKind::Idle,
            spherical_delta: Spherical::default(),
            scale: 1.0,
            pan_offset: Vec3::ZERO,
        }
    }

    pub fn state(&self) -> ControlsState {
        ControlsState {
            target: self.target,
            enable_damping: self.enable_damping,
            damping_factor: self.damping_factor,
            auto_rotate: self.auto_rotate,
            auto_rotate_speed: self.auto_rotate_speed,
        }
    }

    pub fn interaction(&self) -> InteractionKind {
        self.interaction
    }

    pub fn set_element_height(&mut self, height: f32) {
        self.element_height = height.max(1.0);
    }

    pub fn begin_interaction(&mut self, kind: InteractionKind) {
        self.interaction = kind;
    }

    pub fn end_interaction(&mut self) {
        self.interaction = InteractionKind::Idle;
    }

    /// Pointer drag in points
    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        let h = self.element_height;
        self.rotate_left(2.0 * PI * delta_x / h * self.rotate_speed);
        self.rotate_up(2.0 * PI * delta_y / h * self.rotate_speed);
    }

    /// Positive steps move the camera towards the target
    pub fn dolly(&mut self, steps: f32) {
        let zoom_scale = 0.95_f32.powf(self.zoom_speed * steps.abs());
        if steps > 0.0 {
            self.scale *= zoom_scale;
        } else if steps < 0.0 {
            self.scale /= zoom_scale;
        }
    }

    /// Screen-space pan in points; moves the target with the camera
    pub fn pan(&mut self, delta_x: f32, delta_y: f32, camera: &PerspectiveCamera) {
        let offset = camera.position - self.target;
        let target_distance = offset.length() * (camera.fov.to_radians() / 2.0).tan();
        let (right, up) = camera.screen_axes();
        let h = self.element_height;
        self.pan_offset -= right * (2.0 * delta_x * target_distance / h * self.pan_speed);
        self.pan_offset += up * (2.0 * delta_y * target_distance / h * self.pan_speed);
    }

    /// Drop pending motion and return the target to the origin
    pub fn reset(&mut self) {
        self.target = Vec3::ZERO;
        self.interaction = InteractionKind::Idle;
        self.spherical_delta = Spherical::default();
        self.scale = 1.0;
        self.pan_offset = Vec3::ZERO;
    }

    fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    fn auto_rotation_angle(&self, dt: f32) -> f32 {
        2.0 * PI / 60.0 * self.auto_rotate_speed * dt
    }

    /// Integrate pending motion into `camera`. `dt` is in seconds.
    ///
    /// Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera, dt: f32) -> bool {
        let offset = camera.position - self.target;
        let mut spherical = Spherical::from_offset(offset);

        if self.auto_rotate && self.interaction == InteractionKind::Idle {
            self.rotate_left(self.auto_rotation_angle(dt));
        }

        let factor = if self.enable_damping { self.damping_factor } else { 1.0 };
        spherical.theta += self.spherical_delta.theta * factor;
        spherical.phi += self.spherical_delta.phi * factor;

        let eps = constants::controls::POLAR_EPSILON;
        spherical.phi = spherical.phi.clamp(eps, PI - eps);
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset * factor;

        let previous = camera.position;
        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target);

        if self.enable_damping {
            let decay = 1.0 - self.damping_factor;
            self.spherical_delta.theta *= decay;
            self.spherical_delta.phi *= decay;
            self.pan_offset *= decay;
        } else {
            self.spherical_delta = Spherical::default();
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        previous.distance_squared(camera.position) > f32::EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::default()
    }

    fn controls() -> OrbitControls {
        OrbitControls::new(&ControlsConfig::default(), 600.0)
    }

    #[test]
    fn test_defaults() {
        let state = controls().state();
        assert!(state.enable_damping);
        assert_eq!(state.damping_factor, 0.05);
        assert!(state.auto_rotate);
        assert_eq!(state.auto_rotate_speed, 8.0);
        assert_eq!(state.target, Vec3::ZERO);
    }

    #[test]
    fn test_spherical_round_trip_of_home_position() {
        let s = Spherical::from_offset(Vec3::new(0.0, 0.0, 8.0));
        assert_eq!(s.theta, 0.0);
        assert!((s.phi - PI / 2.0).abs() < 1e-6);
        assert!((s.to_offset() - Vec3::new(0.0, 0.0, 8.0)).length() < 1e-5);
    }

    #[test]
    fn test_auto_rotate_keeps_distance_and_moves_camera() {
        let mut controls = controls();
        let mut camera = camera();
        for _ in 0..120 {
            controls.update(&mut camera, 1.0 / 60.0);
        }
        assert!((camera.position.length() - 8.0).abs() < 1e-3);
        assert!(camera.position.x.abs() > 0.1);
        assert_eq!(camera.look_at_point(), Vec3::ZERO);
    }

    #[test]
    fn test_static_without_auto_rotate() {
        let mut controls = controls();
        controls.auto_rotate = false;
        let mut camera = camera();
        let moved = controls.update(&mut camera, 1.0 / 60.0);
        assert!(!moved);
        assert!((camera.position - Vec3::new(0.0, 0.0, 8.0)).length() < 1e-5);
    }

    #[test]
    fn test_damped_rotation_decays() {
        let mut controls = controls();
        controls.auto_rotate = false;
        let mut camera = camera();

        controls.rotate(100.0, 0.0);
        let first = controls.spherical_delta.theta;
        controls.update(&mut camera, 1.0 / 60.0);
        assert!((controls.spherical_delta.theta - first * 0.95).abs() < 1e-6);

        // Momentum keeps moving the camera after input stops
        let before = camera.position;
        assert!(controls.update(&mut camera, 1.0 / 60.0));
        assert!(before != camera.position);
    }

    #[test]
    fn test_undamped_rotation_applies_immediately() {
        let mut controls = controls();
        controls.auto_rotate = false;
        controls.enable_damping = false;
        let mut camera = camera();

        // Half the element height is a half turn
        controls.rotate(300.0, 0.0);
        controls.update(&mut camera, 1.0 / 60.0);
        assert!((camera.position - Vec3::new(0.0, 0.0, -8.0)).length() < 1e-3);
        assert_eq!(controls.spherical_delta, Spherical::default());
    }

    #[test]
    fn test_polar_angle_is_clamped() {
        let mut controls = controls();
        controls.auto_rotate = false;
        controls.enable_damping = false;
        let mut camera = camera();

        controls.rotate(0.0, 10_000.0);
        controls.update(&mut camera, 0.0);
        assert!(camera.position.y > 0.0);
        assert!(camera.position.is_finite());
    }

    #[test]
    fn test_dolly_in_and_out() {
        let mut controls = controls();
        controls.auto_rotate = false;
        controls.enable_damping = false;
        let mut camera = camera();

        controls.dolly(1.0);
        controls.update(&mut camera, 0.0);
        assert!((camera.position.length() - 8.0 * 0.95).abs() < 1e-4);

        controls.dolly(-1.0);
        controls.update(&mut camera, 0.0);
        assert!((camera.position.length() - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_pan_moves_target() {
        let mut controls = controls();
        controls.auto_rotate = false;
        controls.enable_damping = false;
        let mut camera = camera();

        controls.pan(60.0, 0.0, &camera);
        controls.update(&mut camera, 0.0);
        assert!(controls.target.x < 0.0);
        assert_eq!(camera.look_at_point(), controls.target);
    }

    #[test]
    fn test_reset_clears_momentum() {
        let mut controls = controls();
        let mut camera = camera();
        controls.rotate(50.0, 20.0);
        controls.pan(10.0, 10.0, &camera);
        controls.update(&mut camera, 1.0 / 60.0);

        controls.reset();
        controls.auto_rotate = false;
        camera.position = Vec3::new(0.0, 0.0, 8.0);
        camera.look_at(Vec3::ZERO);

        controls.update(&mut camera, 1.0 / 60.0);
        assert!((camera.position - Vec3::new(0.0, 0.0, 8.0)).length() < 1e-5);
        assert_eq!(controls.target, Vec3::ZERO);
    }

    #[test]
    fn test_auto_rotate_pauses_while_interacting() {
        let mut controls = controls();
        controls.enable_damping = false;
        let mut camera = camera();

        controls.begin_interaction(InteractionKind::Rotate);
        assert!(!controls.update(&mut camera, 1.0));
        controls.end_interaction();
        assert!(controls.update(&mut camera, 1.0));
    }
}
