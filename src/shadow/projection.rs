use glam::{Mat4, Vec3};

use super::bounds::LightSpaceBox;
use crate::light::{Light, LightKind};

const MIN_SPOT_FOV: f32 = 1.0 * std::f32::consts::PI / 180.0;
const MAX_SPOT_FOV: f32 = 170.0 * std::f32::consts::PI / 180.0;

/// Fixed perspective parameters for spot and point light shadows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionSettings {
    pub spot_aspect: f32,
    pub spot_near: f32,
    pub spot_far: f32,
    pub point_fov_radians: f32,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self { spot_aspect: 1.0, spot_near: 0.1, spot_far: 100.0, point_fov_radians: 90f32.to_radians() }
    }
}

fn light_up(direction: Vec3) -> Vec3 {
    if direction.dot(Vec3::Y).abs() > 0.95 {
        Vec3::X
    } else {
        Vec3::Y
    }
}

/// View matrix for a light. Directional lights get a pure rotation anchored at the world origin so the
/// texel grid their cascades snap to does not move with anything but the light's direction.
pub fn light_view_matrix(light: &Light) -> Mat4 {
    let direction = light.direction.normalize_or_zero();
    let direction = if direction == Vec3::ZERO { Vec3::NEG_Y } else { direction };
    let eye = match light.kind {
        LightKind::Directional | LightKind::None => Vec3::ZERO,
        LightKind::Spot | LightKind::Point => light.position,
    };
    Mat4::look_to_rh(eye, direction, light_up(direction))
}

/// Orthographic projection straight from a fitted light-space box. The light looks down `-Z`, so the
/// box's `maxs.z` is the near plane.
pub fn orthographic_from_box(bounds: &LightSpaceBox) -> Mat4 {
    Mat4::orthographic_rh(
        bounds.mins.x,
        bounds.maxs.x,
        bounds.mins.y,
        bounds.maxs.y,
        -bounds.maxs.z,
        -bounds.mins.z,
    )
}

/// Spot cone field of view, `2 * acos(outer_cone_cos)`. Cosines must already be in `[-1, 1]`
/// (see [`Light::sanitized`]); the result is clamped into a usable perspective range.
pub fn spot_fov(outer_cone_cos: f32) -> f32 {
    debug_assert!((-1.0..=1.0).contains(&outer_cone_cos), "unsanitized cone cosine {outer_cone_cos}");
    (2.0 * outer_cone_cos.acos()).clamp(MIN_SPOT_FOV, MAX_SPOT_FOV)
}

/// Builds the projection for one (light, cascade). Directional lights need the fitted box; spot and
/// point lights ignore it and use a single perspective frustum.
pub fn build_projection(light: &Light, bounds: Option<&LightSpaceBox>, settings: &ProjectionSettings) -> Mat4 {
    let near = settings.spot_near.max(0.001);
    let far = settings.spot_far.max(near + 0.001);
    let aspect = settings.spot_aspect.max(0.0001);
    match light.kind {
        LightKind::Directional => bounds.map(orthographic_from_box).unwrap_or(Mat4::IDENTITY),
        LightKind::Spot => Mat4::perspective_rh(spot_fov(light.outer_cone_cos), aspect, near, far),
        LightKind::Point => {
            let fov = settings.point_fov_radians.clamp(MIN_SPOT_FOV, MAX_SPOT_FOV);
            Mat4::perspective_rh(fov, aspect, near, far)
        }
        LightKind::None => Mat4::IDENTITY,
    }
}
