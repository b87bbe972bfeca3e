use bytemuck::Zeroable;
use glam::{Mat4, Vec3};

use super::{CascadeSplits, MAX_SHADOW_CASCADES, SHADOW_MAP_RESOLUTION};
use crate::light::{Light, MAX_LIGHTS};

/// Cascade boundaries plus sampling configuration, as read by `lit.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CascadeBoundaryUniform {
    pub boundaries: [[f32; 4]; MAX_SHADOW_CASCADES / 4],
    /// cascade count, sample count, PCF enabled (0/1), resolution.
    pub params: [u32; 4],
}

impl CascadeBoundaryUniform {
    pub fn new(splits: &CascadeSplits, sample_count: u32, pcf_enabled: bool) -> Self {
        let padded = splits.padded();
        let mut boundaries = [[0.0f32; 4]; MAX_SHADOW_CASCADES / 4];
        for (idx, value) in padded.iter().enumerate() {
            boundaries[idx / 4][idx % 4] = *value;
        }
        Self {
            boundaries,
            params: [splits.count() as u32, sample_count.max(1), pcf_enabled as u32, SHADOW_MAP_RESOLUTION],
        }
    }

    pub fn cascade_count(&self) -> u32 {
        self.params[0]
    }

    pub fn boundary(&self, cascade: usize) -> f32 {
        self.boundaries[cascade / 4][cascade % 4]
    }
}

/// One light's parameters and per-cascade view×projection matrices.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowLightGpu {
    pub view_proj: [[[f32; 4]; 4]; MAX_SHADOW_CASCADES],
    /// xyz position, w intensity.
    pub position_intensity: [f32; 4],
    /// xyz direction, w specular attenuation.
    pub direction_specular: [f32; 4],
    /// rgb colour, w shadow bias.
    pub color_bias: [f32; 4],
    /// constant, linear, quadratic attenuation, w unused.
    pub attenuation: [f32; 4],
    /// inner cone cos, outer cone cos, zw unused.
    pub cone: [f32; 4],
    /// kind tag, cascade count, shadowed (0/1), depth-texture slot.
    pub info: [u32; 4],
}

impl ShadowLightGpu {
    pub fn from_light(light: &Light, slot: usize, shadowed: bool, view_proj: &[Mat4]) -> Self {
        let mut matrices = [Mat4::IDENTITY.to_cols_array_2d(); MAX_SHADOW_CASCADES];
        for (dst, src) in matrices.iter_mut().zip(view_proj.iter()) {
            *dst = src.to_cols_array_2d();
        }
        let cascade_count = view_proj.len().min(MAX_SHADOW_CASCADES) as u32;
        Self {
            view_proj: matrices,
            position_intensity: light.position.extend(light.intensity).to_array(),
            direction_specular: light.direction.extend(light.specular_attenuation).to_array(),
            color_bias: light.color.extend(light.shadow_bias).to_array(),
            attenuation: [light.attenuation.constant, light.attenuation.linear, light.attenuation.quadratic, 0.0],
            cone: [light.inner_cone_cos, light.outer_cone_cos, 0.0, 0.0],
            info: [light.kind.gpu_tag(), cascade_count, shadowed as u32, slot as u32],
        }
    }
}

/// Everything the lit pass reads, uploaded as one uniform block per frame.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LitFrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    /// xyz camera position, w unused.
    pub camera_pos: [f32; 4],
    pub cascades: CascadeBoundaryUniform,
    pub lights: [ShadowLightGpu; MAX_LIGHTS],
    /// x light count.
    pub counts: [u32; 4],
}

impl LitFrameUniform {
    pub fn new(
        view: Mat4,
        view_proj: Mat4,
        camera_pos: Vec3,
        cascades: CascadeBoundaryUniform,
        lights: &[ShadowLightGpu],
    ) -> Self {
        let mut packed = [ShadowLightGpu::zeroed(); MAX_LIGHTS];
        for (dst, src) in packed.iter_mut().zip(lights.iter()) {
            *dst = *src;
        }
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            camera_pos: camera_pos.extend(0.0).to_array(),
            cascades,
            lights: packed,
            counts: [lights.len().min(MAX_LIGHTS) as u32, 0, 0, 0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_uniform_packs_splits() {
        let splits = CascadeSplits::compute(0.0, 80.0, &[25.0, 50.0, 100.0]);
        let uniform = CascadeBoundaryUniform::new(&splits, 16, true);
        assert_eq!(uniform.cascade_count(), 3);
        assert_eq!(uniform.params, [3, 16, 1, SHADOW_MAP_RESOLUTION]);
        assert_eq!(uniform.boundary(0), splits.boundaries()[0]);
        assert_eq!(uniform.boundary(2), 80.0);
        assert_eq!(uniform.boundary(7), 80.0);
    }

    #[test]
    fn uniform_sizes_are_vec4_aligned() {
        assert_eq!(std::mem::size_of::<CascadeBoundaryUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<ShadowLightGpu>() % 16, 0);
        assert_eq!(std::mem::size_of::<LitFrameUniform>() % 16, 0);
    }
}
