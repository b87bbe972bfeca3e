use glam::{DVec3, Vec3};

use crate::camera3d::{Camera3D, CameraBasis};

/// Camera state needed to rebuild one view-frustum slice in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumSlice {
    pub position: Vec3,
    pub basis: CameraBasis,
    pub fov_y_radians: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl FrustumSlice {
    pub fn from_camera(camera: &Camera3D, aspect: f32, z_near: f32, z_far: f32) -> Self {
        Self {
            position: camera.position,
            basis: camera.basis(),
            fov_y_radians: camera.fov_y_radians,
            aspect,
            z_near,
            z_far,
        }
    }

    pub fn corners(&self) -> [Vec3; 8] {
        extract_corners(self)
    }

    /// View-space depth the enclosing box is centred on.
    pub fn center_depth(&self, z_center_bias: f32) -> f64 {
        let t = 0.5 + 0.5 * z_center_bias.clamp(0.0, 1.0) as f64;
        let (near, far) = (self.z_near as f64, self.z_far as f64);
        near + (far - near) * t
    }

    /// World-space point on the view axis at [`Self::center_depth`].
    pub fn biased_center(&self, z_center_bias: f32) -> DVec3 {
        self.position.as_dvec3() + self.basis.forward.as_dvec3() * self.center_depth(z_center_bias)
    }

    /// Distance from [`Self::biased_center`] to the farthest slice corner. Depends on the slice shape
    /// only, not on where the camera stands or which way it faces.
    pub fn enclosing_radius(&self, z_center_bias: f32) -> f64 {
        let tan_half_y = (self.fov_y_radians as f64 * 0.5).tan();
        let tan_half_x = tan_half_y * self.aspect.max(0.0001) as f64;
        let lateral = tan_half_x.hypot(tan_half_y);
        let center = self.center_depth(z_center_bias);
        [self.z_near as f64, self.z_far as f64]
            .into_iter()
            .map(|z| (z - center).hypot(z * lateral))
            .fold(0.0, f64::max)
    }
}

/// The 8 world-space corners of a camera frustum slice: near plane first, then far plane, each
/// wound as (-left,-up), (+left,-up), (+left,+up), (-left,+up).
///
/// Built from the camera basis rather than an inverse projection, so it holds for any projection
/// convention. Half-extents use `tan(fovY / 2) * aspect` horizontally.
pub fn extract_corners(slice: &FrustumSlice) -> [Vec3; 8] {
    let tan_half_y = (slice.fov_y_radians * 0.5).tan();
    let tan_half_x = tan_half_y * slice.aspect.max(0.0001);
    let CameraBasis { forward, left, up } = slice.basis;
    let mut corners = [Vec3::ZERO; 8];
    for (plane, z) in [slice.z_near, slice.z_far].into_iter().enumerate() {
        let center = slice.position + forward * z;
        let x = left * (z * tan_half_x);
        let y = up * (z * tan_half_y);
        let base = plane * 4;
        corners[base] = center - x - y;
        corners[base + 1] = center + x - y;
        corners[base + 2] = center + x + y;
        corners[base + 3] = center - x + y;
    }
    corners
}
