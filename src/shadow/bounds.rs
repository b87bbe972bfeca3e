use glam::{DMat4, DVec3, Mat4, Vec3};

use super::frustum::FrustumSlice;

const MIN_EXTENT: f64 = 1e-4;
/// Fraction of a texel treated as "already on the grid" when snapping.
const SNAP_TOLERANCE: f64 = 1e-2;
const MAX_SNAP_SLACK: f64 = 0.25;

/// Axis-aligned box in a light's view space. The light looks down `-Z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSpaceBox {
    pub mins: Vec3,
    pub maxs: Vec3,
}

impl LightSpaceBox {
    pub fn extents(&self) -> Vec3 {
        self.maxs - self.mins
    }

    pub fn is_cube(&self, tolerance: f32) -> bool {
        let e = self.extents();
        (e.x - e.y).abs() <= tolerance && (e.y - e.z).abs() <= tolerance
    }

    /// Re-snaps `mins` onto the grid of a cube with edge `extent`. `extent` is the edge the box was
    /// fitted with (see [`cascade_extent`]); it is not re-derived from the stored f32 corners.
    pub fn texel_snapped(&self, extent: f64, resolution: u32) -> Self {
        snap_cube(self.mins.as_dvec3(), extent, resolution)
    }
}

/// World units covered by one shadow-map texel of a cube with edge `extent`.
pub fn texel_size(extent: f64, resolution: u32) -> f64 {
    extent.max(MIN_EXTENT) / resolution.max(1) as f64
}

/// Inputs for [`fit_bounds`] that do not come from the frustum slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsFitParams {
    pub light_view: Mat4,
    pub resolution: u32,
    /// 0 centres the enclosure at the slice mid-depth, 1 at its far plane.
    pub z_center_bias: f32,
    /// World units added on every side, catching casters just outside the visible slice.
    pub margin: f32,
}

/// Fits a stable light-space cube around one cascade's frustum slice.
///
/// 1. World-space cube around the z-biased centre, sized by the farthest slice corner plus `margin`.
/// 2. Each of the cube's 8 corners goes through `light_view` individually; the result is their box.
///    Transforming only mins/maxs is wrong once the light view rotates.
/// 3. Cube-ify at [`cascade_extent`] so the projected size does not change as the camera moves.
/// 4. Snap to the texel grid so sub-texel camera translation does not slide the sample grid.
///
/// Everything runs in f64; the box is narrowed to f32 once, at the end.
pub fn fit_bounds(slice: &FrustumSlice, params: &BoundsFitParams) -> LightSpaceBox {
    let center = slice.biased_center(params.z_center_bias);
    let half = enclosure_half_size(slice, params);
    let light_view = params.light_view.as_dmat4();
    let (mut lo, mut hi) = (DVec3::splat(f64::MAX), DVec3::splat(f64::MIN));
    for corner in cube_corners(center, half) {
        let point = light_view.transform_point3(corner);
        lo = lo.min(point);
        hi = hi.max(point);
    }
    let extent = cube_extent(half, &light_view);
    snap_cube((lo + hi) * 0.5 - DVec3::splat(extent * 0.5), extent, params.resolution)
}

/// Edge of the light-space cube [`fit_bounds`] produces for `slice`.
///
/// A function of the slice shape, the margin and the light's rotation only. Camera translation never
/// changes it, so consecutive frames snap onto the same texel grid.
pub fn cascade_extent(slice: &FrustumSlice, params: &BoundsFitParams) -> f64 {
    cube_extent(enclosure_half_size(slice, params), &params.light_view.as_dmat4())
}

fn enclosure_half_size(slice: &FrustumSlice, params: &BoundsFitParams) -> f64 {
    (slice.enclosing_radius(params.z_center_bias) + params.margin.max(0.0) as f64).max(MIN_EXTENT)
}

/// Largest light-space extent of a world cube with half-size `half`: per light axis, the half-size
/// times the absolute row sum of the view rotation.
fn cube_extent(half: f64, light_view: &DMat4) -> f64 {
    let spread = (0..3)
        .map(|row| {
            let axis = light_view.row(row);
            axis.x.abs() + axis.y.abs() + axis.z.abs()
        })
        .fold(0.0, f64::max);
    (2.0 * half * spread).max(MIN_EXTENT)
}

fn cube_corners(center: DVec3, half: f64) -> [DVec3; 8] {
    let (lo, hi) = (center - DVec3::splat(half), center + DVec3::splat(half));
    [
        DVec3::new(lo.x, lo.y, lo.z),
        DVec3::new(hi.x, lo.y, lo.z),
        DVec3::new(hi.x, hi.y, lo.z),
        DVec3::new(lo.x, hi.y, lo.z),
        DVec3::new(lo.x, lo.y, hi.z),
        DVec3::new(hi.x, lo.y, hi.z),
        DVec3::new(hi.x, hi.y, hi.z),
        DVec3::new(lo.x, hi.y, hi.z),
    ]
}

/// Floors `mins` onto the grid of `extent / resolution` sized texels; `maxs` sits exactly `extent`
/// further so the box stays a cube of that edge.
fn snap_cube(mins: DVec3, extent: f64, resolution: u32) -> LightSpaceBox {
    let extent = extent.max(MIN_EXTENT);
    let texel = texel_size(extent, resolution);
    let snap = |value: f64| -> f64 {
        let q = value / texel;
        let nearest = q.round();
        // An on-grid value stored as f32 comes back off by a few ulps; that still counts as on the grid.
        let slack = SNAP_TOLERANCE.max(4.0 * value.abs() * f32::EPSILON as f64 / texel).min(MAX_SNAP_SLACK);
        if (q - nearest).abs() < slack {
            nearest
        } else {
            q.floor()
        }
    };
    let mins = DVec3::new(snap(mins.x), snap(mins.y), snap(mins.z)) * texel;
    LightSpaceBox { mins: mins.as_vec3(), maxs: (mins + DVec3::splat(extent)).as_vec3() }
}
