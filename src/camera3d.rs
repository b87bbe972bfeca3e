use glam::{Mat4, Vec3};
use winit::dpi::PhysicalSize;

const DEFAULT_UP: Vec3 = Vec3::Y;

/// Perspective camera the shadow cascades are fitted against.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
}

/// Orthonormal camera frame. `left` completes a right-handed frame with `forward` and `up`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    pub forward: Vec3,
    pub left: Vec3,
    pub up: Vec3,
}

impl Camera3D {
    pub fn new(position: Vec3, target: Vec3, fov_y_radians: f32, near: f32, far: f32) -> Self {
        Self { position, target, up: DEFAULT_UP, fov_y_radians, near, far }
    }

    /// Camera at `position` looking along `forward`.
    pub fn looking_along(position: Vec3, forward: Vec3, fov_y_radians: f32, near: f32, far: f32) -> Self {
        Self::new(position, position + forward.normalize_or_zero(), fov_y_radians, near, far)
    }

    pub fn forward(&self) -> Vec3 {
        let forward = (self.target - self.position).normalize_or_zero();
        if forward == Vec3::ZERO {
            Vec3::NEG_Z
        } else {
            forward
        }
    }

    pub fn basis(&self) -> CameraBasis {
        let forward = self.forward();
        let mut left = self.up.cross(forward).normalize_or_zero();
        if left == Vec3::ZERO {
            // Looking straight along `up`.
            left = forward.any_orthonormal_vector();
        }
        let up = forward.cross(left).normalize();
        CameraBasis { forward, left, up }
    }

    pub fn view_matrix(&self) -> Mat4 {
        let basis = self.basis();
        Mat4::look_to_rh(self.position, basis.forward, basis.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_radians, aspect.max(0.0001), self.near, self.far)
    }

    pub fn view_projection(&self, viewport: PhysicalSize<u32>) -> Mat4 {
        self.projection_matrix(viewport_aspect(viewport)) * self.view_matrix()
    }

    /// Rotates the view direction about the camera position, leaving the position untouched.
    pub fn rotate_in_place(&mut self, yaw_radians: f32, pitch_radians: f32) {
        let basis = self.basis();
        let yaw = glam::Quat::from_axis_angle(DEFAULT_UP, yaw_radians);
        let pitch = glam::Quat::from_axis_angle(basis.left, -pitch_radians);
        let forward = (yaw * pitch * basis.forward).normalize_or_zero();
        let distance = (self.target - self.position).length().max(1.0);
        self.target = self.position + forward * distance;
    }
}

pub fn viewport_aspect(viewport: PhysicalSize<u32>) -> f32 {
    if viewport.height > 0 {
        viewport.width as f32 / viewport.height as f32
    } else {
        1.0
    }
}
