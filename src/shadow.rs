//! Cascaded shadow mapping: cascade splits, light-space fitting and the per-frame pass scheduler.

pub mod bounds;
pub mod frustum;
pub mod light_camera;
pub mod projection;
pub mod scheduler;
pub mod splits;
pub mod uniforms;

pub use bounds::{cascade_extent, fit_bounds, texel_size, BoundsFitParams, LightSpaceBox};
pub use frustum::{extract_corners, FrustumSlice};
pub use light_camera::LightCamera;
pub use projection::{build_projection, light_view_matrix, ProjectionSettings};
pub use scheduler::{ShadowFrameInput, ShadowFrameStats, ShadowScheduler, SlotState};
pub use splits::CascadeSplits;
pub use uniforms::{CascadeBoundaryUniform, LitFrameUniform, ShadowLightGpu};

/// Upper bound on cascades per directional light (and on depth-texture slices per light).
pub const MAX_SHADOW_CASCADES: usize = 8;

/// Edge length of every shadow depth slice, in texels.
pub const SHADOW_MAP_RESOLUTION: u32 = 2048;

const _: () = assert!(SHADOW_MAP_RESOLUTION > 0);
