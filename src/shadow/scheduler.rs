use anyhow::{Context, Result};

use super::bounds::{fit_bounds, BoundsFitParams};
use super::frustum::FrustumSlice;
use super::light_camera::LightCamera;
use super::projection::build_projection;
use super::splits::CascadeSplits;
use super::uniforms::{CascadeBoundaryUniform, LitFrameUniform, ShadowLightGpu};
use super::SHADOW_MAP_RESOLUTION;
use crate::config::ShadowConfig;
use crate::light::{Light, LightKind, MAX_LIGHTS};
use crate::renderer::{DepthPass, DrawItem, LitPass, ShadowBackend};
use crate::scene::Scene;

/// What the scheduler does with a light slot this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Invalid,
    NotShadowCasting,
    ShadowCasting(LightKind),
}

impl SlotState {
    pub fn classify(light: &Light) -> Self {
        if !light.is_valid() {
            SlotState::Invalid
        } else if !light.casts_shadow {
            SlotState::NotShadowCasting
        } else {
            SlotState::ShadowCasting(light.kind)
        }
    }
}

/// Per-frame inputs. The scene is read-only for the whole frame.
#[derive(Clone, Copy)]
pub struct ShadowFrameInput<'a> {
    pub scene: &'a Scene,
    /// Viewport width / height.
    pub aspect: f32,
    pub config: &'a ShadowConfig,
    pub draws: &'a [DrawItem],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShadowFrameStats {
    pub depth_passes: usize,
    pub shadowed_lights: usize,
    pub lit_lights: usize,
    pub reallocations: usize,
    pub repaired_splits: bool,
}

/// Drives one frame of shadow rendering: every (light, cascade) depth pass, then the single lit pass.
pub struct ShadowScheduler<B: ShadowBackend> {
    cameras: Vec<LightCamera<B::DepthTarget>>,
    splits: Option<CascadeSplits>,
    warned_repaired_splits: bool,
}

impl<B: ShadowBackend> Default for ShadowScheduler<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ShadowBackend> ShadowScheduler<B> {
    pub fn new() -> Self {
        Self { cameras: Vec::with_capacity(MAX_LIGHTS), splits: None, warned_repaired_splits: false }
    }

    pub fn light_cameras(&self) -> &[LightCamera<B::DepthTarget>] {
        &self.cameras
    }

    pub fn light_camera(&self, slot: usize) -> Option<&LightCamera<B::DepthTarget>> {
        self.cameras.get(slot)
    }

    /// Splits used by the most recent frame.
    pub fn splits(&self) -> Option<&CascadeSplits> {
        self.splits.as_ref()
    }

    pub fn render_frame(&mut self, backend: &mut B, input: ShadowFrameInput<'_>) -> Result<ShadowFrameStats> {
        let scene = input.scene;
        let camera = &scene.camera;
        let lights = scene.lights();
        let mut stats = ShadowFrameStats::default();

        let splits = CascadeSplits::compute(camera.near, camera.far, &input.config.cascade_percentages);
        stats.repaired_splits = splits.was_repaired();
        if splits.was_repaired() && !self.warned_repaired_splits {
            log::warn!(
                "[shadow] cascade percentages {:?} are out of order; using {:?}",
                input.config.cascade_percentages,
                splits.boundaries()
            );
            self.warned_repaired_splits = true;
        }
        self.splits = Some(splits);

        self.sync_camera_count(lights.len());
        backend.begin_frame().context("Beginning shadow frame")?;

        let settings = input.config.projection_settings();
        let casters: Vec<&DrawItem> = input.draws.iter().filter(|draw| draw.casts_shadows).collect();
        let mut gpu_lights = Vec::with_capacity(lights.len());

        for (slot, (light, light_camera)) in lights.iter().zip(self.cameras.iter_mut()).enumerate() {
            let state = SlotState::classify(light);
            if state == SlotState::Invalid {
                gpu_lights.push(ShadowLightGpu::from_light(light, slot, false, &[]));
                continue;
            }
            stats.lit_lights += 1;
            light_camera.sync_light(light, splits.count());
            if state == SlotState::NotShadowCasting {
                gpu_lights.push(ShadowLightGpu::from_light(light, slot, false, &[]));
                continue;
            }

            if light_camera.ensure_depth_target(backend)? {
                stats.reallocations += 1;
            }
            for cascade in 0..light_camera.cascade_count() {
                let bounds = match light.kind {
                    LightKind::Directional => {
                        let (z_near, z_far) = splits.range(cascade);
                        let slice = FrustumSlice::from_camera(camera, input.aspect, z_near, z_far);
                        let params = BoundsFitParams {
                            light_view: light_camera.view(),
                            resolution: SHADOW_MAP_RESOLUTION,
                            z_center_bias: input.config.z_center_bias,
                            margin: input.config.bounds_margin,
                        };
                        Some(fit_bounds(&slice, &params))
                    }
                    _ => None,
                };
                let projection = build_projection(light, bounds.as_ref(), &settings);
                light_camera.set_cascade(cascade, projection, bounds);
            }

            let Some(target) = light_camera.depth_target() else {
                gpu_lights.push(ShadowLightGpu::from_light(light, slot, false, &[]));
                continue;
            };
            for cascade in 0..light_camera.cascade_count() {
                backend
                    .depth_pass(DepthPass {
                        slot,
                        target,
                        layer: cascade as u32,
                        view_proj: light_camera.view_projection(cascade),
                        casters: &casters,
                    })
                    .with_context(|| format!("Depth pass for light slot {slot}, cascade {cascade}"))?;
                stats.depth_passes += 1;
            }
            stats.shadowed_lights += 1;
            gpu_lights.push(ShadowLightGpu::from_light(light, slot, true, light_camera.view_projections()));
        }

        let cascades =
            CascadeBoundaryUniform::new(&splits, input.config.sample_count, input.config.pcf_enabled);
        let view = camera.view_matrix();
        let view_proj = camera.projection_matrix(input.aspect) * view;
        let uniform = LitFrameUniform::new(view, view_proj, camera.position, cascades, &gpu_lights);

        let mut depth_targets = [None; MAX_LIGHTS];
        for (slot, (light, light_camera)) in lights.iter().zip(self.cameras.iter()).enumerate() {
            if SlotState::classify(light) == SlotState::ShadowCasting(light.kind) {
                depth_targets[slot] = light_camera.depth_target();
            }
        }
        let visible: Vec<&DrawItem> = input.draws.iter().filter(|draw| draw.visible).collect();
        backend
            .lit_pass(LitPass { uniform: &uniform, depth_targets, draws: &visible })
            .context("Lit pass")?;
        backend.end_frame().context("Submitting shadow frame")?;
        Ok(stats)
    }

    fn sync_camera_count(&mut self, light_count: usize) {
        let light_count = light_count.min(MAX_LIGHTS);
        if self.cameras.len() > light_count {
            self.cameras.truncate(light_count);
        }
        while self.cameras.len() < light_count {
            let slot = self.cameras.len();
            self.cameras.push(LightCamera::new(slot));
        }
    }
}
