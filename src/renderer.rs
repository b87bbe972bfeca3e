//! Command sink the shadow scheduler drives. The scheduler never touches a graphics API directly; it
//! asks a [`ShadowBackend`] to allocate depth targets and to record depth and lit passes.

pub mod recording;
pub mod wgpu_backend;

use anyhow::Result;
use glam::Mat4;

use crate::light::MAX_LIGHTS;
use crate::shadow::LitFrameUniform;

pub use recording::{BackendCommand, RecordedDepthTarget, RecordingBackend};
pub use wgpu_backend::{WgpuDepthTarget, WgpuShadowBackend};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Opaque reference to mesh data owned by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// One drawable in the frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawItem {
    pub mesh: MeshHandle,
    pub model: Mat4,
    pub casts_shadows: bool,
    pub visible: bool,
}

impl DrawItem {
    pub fn new(mesh: MeshHandle, model: Mat4) -> Self {
        Self { mesh, model, casts_shadows: true, visible: true }
    }

    pub fn with_shadows(mut self, casts_shadows: bool) -> Self {
        self.casts_shadows = casts_shadows;
        self
    }
}

/// Depth-only render of one (light, cascade): clear the slice, closer-wins depth test with writes,
/// every caster drawn with `view_proj`.
pub struct DepthPass<'a, T> {
    pub slot: usize,
    pub target: &'a T,
    pub layer: u32,
    pub view_proj: Mat4,
    pub casters: &'a [&'a DrawItem],
}

/// The single shading pass after all depth passes. `depth_targets[slot]` is bound at the fixed
/// texture range; empty slots get a placeholder.
pub struct LitPass<'a, T> {
    pub uniform: &'a LitFrameUniform,
    pub depth_targets: [Option<&'a T>; MAX_LIGHTS],
    pub draws: &'a [&'a DrawItem],
}

pub trait ShadowBackend {
    type DepthTarget;

    /// Allocates a square depth-texture array with `layers` slices. Failure is fatal for the frame.
    fn create_depth_target(&mut self, slot: usize, layers: u32, resolution: u32) -> Result<Self::DepthTarget>;

    fn begin_frame(&mut self) -> Result<()> {
        Ok(())
    }

    fn depth_pass(&mut self, pass: DepthPass<'_, Self::DepthTarget>) -> Result<()>;

    fn lit_pass(&mut self, pass: LitPass<'_, Self::DepthTarget>) -> Result<()>;

    /// Hands the recorded frame to the device. Does not wait for completion.
    fn end_frame(&mut self) -> Result<()> {
        Ok(())
    }
}
