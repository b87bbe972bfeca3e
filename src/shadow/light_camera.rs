use anyhow::{Context, Result};
use glam::Mat4;

use super::bounds::LightSpaceBox;
use super::projection::light_view_matrix;
use super::{MAX_SHADOW_CASCADES, SHADOW_MAP_RESOLUTION};
use crate::light::{Light, LightKind};
use crate::renderer::ShadowBackend;

/// Per-light-slot shadow state: view, per-cascade projections and the depth texture they render into.
///
/// The depth texture is owned here; it is reallocated lazily when the number of slices the light needs
/// changes (for example a directional light toggled to a spot light).
#[derive(Debug)]
pub struct LightCamera<T> {
    slot: usize,
    kind: LightKind,
    view: Mat4,
    projections: [Mat4; MAX_SHADOW_CASCADES],
    view_projections: [Mat4; MAX_SHADOW_CASCADES],
    boxes: [Option<LightSpaceBox>; MAX_SHADOW_CASCADES],
    cascade_count: usize,
    depth_target: Option<T>,
    depth_layers: u32,
}

impl<T> LightCamera<T> {
    pub fn new(slot: usize) -> Self {
        Self {
            slot,
            kind: LightKind::None,
            view: Mat4::IDENTITY,
            projections: [Mat4::IDENTITY; MAX_SHADOW_CASCADES],
            view_projections: [Mat4::IDENTITY; MAX_SHADOW_CASCADES],
            boxes: [None; MAX_SHADOW_CASCADES],
            cascade_count: 1,
            depth_target: None,
            depth_layers: 0,
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn kind(&self) -> LightKind {
        self.kind
    }

    /// Picks up the light's orientation and how many slices it needs this frame. Spot and point
    /// lights always use a single slice.
    pub fn sync_light(&mut self, light: &Light, directional_cascades: usize) {
        self.kind = light.kind;
        self.view = light_view_matrix(light);
        self.cascade_count = match light.kind {
            LightKind::Directional => directional_cascades.clamp(1, MAX_SHADOW_CASCADES),
            _ => 1,
        };
        for cascade in self.cascade_count..MAX_SHADOW_CASCADES {
            self.projections[cascade] = Mat4::IDENTITY;
            self.view_projections[cascade] = Mat4::IDENTITY;
            self.boxes[cascade] = None;
        }
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn cascade_count(&self) -> usize {
        self.cascade_count
    }

    pub fn set_cascade(&mut self, cascade: usize, projection: Mat4, bounds: Option<LightSpaceBox>) {
        if cascade >= MAX_SHADOW_CASCADES {
            return;
        }
        self.projections[cascade] = projection;
        self.view_projections[cascade] = projection * self.view;
        self.boxes[cascade] = bounds;
    }

    pub fn projection(&self, cascade: usize) -> Mat4 {
        self.projections[cascade.min(MAX_SHADOW_CASCADES - 1)]
    }

    pub fn view_projection(&self, cascade: usize) -> Mat4 {
        self.view_projections[cascade.min(MAX_SHADOW_CASCADES - 1)]
    }

    /// Active view×projection matrices, one per cascade.
    pub fn view_projections(&self) -> &[Mat4] {
        &self.view_projections[..self.cascade_count]
    }

    /// Fitted light-space box of a cascade (directional lights only).
    pub fn cascade_box(&self, cascade: usize) -> Option<&LightSpaceBox> {
        self.boxes.get(cascade).and_then(|b| b.as_ref())
    }

    pub fn depth_target(&self) -> Option<&T> {
        self.depth_target.as_ref()
    }

    pub fn depth_layers(&self) -> u32 {
        self.depth_layers
    }

    pub fn needs_reallocation(&self) -> bool {
        self.depth_target.is_none() || self.depth_layers != self.cascade_count as u32
    }

    /// Makes sure the depth texture has one slice per active cascade. Returns `true` when a new
    /// texture was allocated.
    pub fn ensure_depth_target<B>(&mut self, backend: &mut B) -> Result<bool>
    where
        B: ShadowBackend<DepthTarget = T>,
    {
        if !self.needs_reallocation() {
            return Ok(false);
        }
        let layers = self.cascade_count as u32;
        let target = backend
            .create_depth_target(self.slot, layers, SHADOW_MAP_RESOLUTION)
            .with_context(|| format!("Allocating {layers}-slice shadow map for light slot {}", self.slot))?;
        if self.depth_target.is_some() {
            log::info!(
                "[shadow] light slot {} depth texture reallocated: {} -> {} slices",
                self.slot,
                self.depth_layers,
                layers
            );
        }
        self.depth_target = Some(target);
        self.depth_layers = layers;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RecordingBackend;
    use glam::Vec3;

    #[test]
    fn spot_light_forces_single_cascade() {
        let mut camera = LightCamera::<()>::new(0);
        camera.sync_light(&Light::spot(Vec3::Y * 4.0, Vec3::NEG_Y, 15.0, 25.0), 6);
        assert_eq!(camera.cascade_count(), 1);
        camera.sync_light(&Light::directional(Vec3::new(0.2, -1.0, 0.1)), 6);
        assert_eq!(camera.cascade_count(), 6);
    }

    #[test]
    fn depth_target_follows_cascade_count() {
        let mut backend = RecordingBackend::new();
        let mut camera = LightCamera::new(2);
        camera.sync_light(&Light::directional(Vec3::new(0.2, -1.0, 0.1)), 4);
        assert!(camera.ensure_depth_target(&mut backend).expect("allocate"));
        assert!(!camera.ensure_depth_target(&mut backend).expect("reuse"));
        assert_eq!(camera.depth_layers(), 4);

        camera.sync_light(&Light::point(Vec3::ZERO), 4);
        assert!(camera.needs_reallocation());
        assert!(camera.ensure_depth_target(&mut backend).expect("reallocate"));
        assert_eq!(camera.depth_layers(), 1);
        assert_eq!(backend.allocations_for_slot(2), vec![4, 1]);
    }

    #[test]
    fn view_projection_combines_view_and_projection() {
        let mut camera = LightCamera::<()>::new(0);
        camera.sync_light(&Light::directional(Vec3::new(0.0, -1.0, 0.5)), 2);
        let proj = Mat4::orthographic_rh(-1.0, 1.0, -1.0, 1.0, 0.0, 10.0);
        camera.set_cascade(1, proj, None);
        assert_eq!(camera.view_projection(1), proj * camera.view());
        assert_eq!(camera.view_projections().len(), 2);
    }
}
