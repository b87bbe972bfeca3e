use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Maximum number of simultaneously active lights (and light cameras).
pub const MAX_LIGHTS: usize = 8;

const DEFAULT_LIGHT_DIRECTION: Vec3 = Vec3::new(0.4, -0.8, 0.35);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LightKind {
    #[default]
    None,
    Directional,
    Spot,
    Point,
}

impl LightKind {
    pub fn label(self) -> &'static str {
        match self {
            LightKind::None => "None",
            LightKind::Directional => "Directional",
            LightKind::Spot => "Spot",
            LightKind::Point => "Point",
        }
    }

    /// GPU-side type tag, matches `LIGHT_KIND_*` in `lit.wgsl`.
    pub fn gpu_tag(self) -> u32 {
        match self {
            LightKind::None => 0,
            LightKind::Directional => 1,
            LightKind::Spot => 2,
            LightKind::Point => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self { constant: 1.0, linear: 0.09, quadratic: 0.032 }
    }
}

/// One light slot. A flat value type; lights live in a [`LightArray`] and are addressed by index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub position: Vec3,
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub attenuation: Attenuation,
    pub specular_attenuation: f32,
    pub inner_cone_cos: f32,
    pub outer_cone_cos: f32,
    pub casts_shadow: bool,
    pub shadow_bias: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            kind: LightKind::None,
            position: Vec3::ZERO,
            direction: DEFAULT_LIGHT_DIRECTION.normalize(),
            color: Vec3::ONE,
            intensity: 1.0,
            attenuation: Attenuation::default(),
            specular_attenuation: 1.0,
            inner_cone_cos: 25.0_f32.to_radians().cos(),
            outer_cone_cos: 35.0_f32.to_radians().cos(),
            casts_shadow: false,
            shadow_bias: 0.002,
        }
    }
}

impl Light {
    pub fn directional(direction: Vec3) -> Self {
        Self { kind: LightKind::Directional, direction, casts_shadow: true, ..Self::default() }.sanitized()
    }

    pub fn spot(position: Vec3, direction: Vec3, inner_degrees: f32, outer_degrees: f32) -> Self {
        Self {
            kind: LightKind::Spot,
            position,
            direction,
            inner_cone_cos: inner_degrees.to_radians().cos(),
            outer_cone_cos: outer_degrees.to_radians().cos(),
            casts_shadow: true,
            ..Self::default()
        }
        .sanitized()
    }

    pub fn point(position: Vec3) -> Self {
        Self { kind: LightKind::Point, position, casts_shadow: true, ..Self::default() }.sanitized()
    }

    pub fn with_shadows(mut self, casts_shadow: bool) -> Self {
        self.casts_shadow = casts_shadow;
        self
    }

    pub fn is_valid(&self) -> bool {
        self.kind != LightKind::None
    }

    /// Repairs values the shadow math cannot digest: zero directions, cone cosines outside `[-1, 1]`,
    /// an inner cone wider than the outer one and negative intensity or bias.
    pub fn sanitized(mut self) -> Self {
        self.direction = self.direction.normalize_or_zero();
        if self.direction == Vec3::ZERO || !self.direction.is_finite() {
            self.direction = DEFAULT_LIGHT_DIRECTION.normalize();
        }
        self.outer_cone_cos = sanitize_cos(self.outer_cone_cos);
        self.inner_cone_cos = sanitize_cos(self.inner_cone_cos).max(self.outer_cone_cos);
        self.intensity = self.intensity.max(0.0);
        self.specular_attenuation = self.specular_attenuation.max(0.0);
        self.shadow_bias = if self.shadow_bias.is_finite() { self.shadow_bias.max(0.0) } else { 0.0 };
        self
    }
}

fn sanitize_cos(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        1.0
    }
}

/// Fixed-capacity light storage. Slot indices are stable for the lifetime of the array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightArray {
    lights: SmallVec<[Light; MAX_LIGHTS]>,
}

impl LightArray {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a light and returns its slot, or `None` when every slot is taken.
    pub fn push(&mut self, light: Light) -> Option<usize> {
        if self.lights.len() >= MAX_LIGHTS {
            log::warn!("[light] light array is full ({MAX_LIGHTS} slots); dropping {} light", light.kind.label());
            return None;
        }
        self.lights.push(light);
        Some(self.lights.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&Light> {
        self.lights.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Light> {
        self.lights.get_mut(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Light> {
        self.lights.iter()
    }

    pub fn as_slice(&self) -> &[Light] {
        &self.lights
    }
}

impl FromIterator<Light> for LightArray {
    fn from_iter<T: IntoIterator<Item = Light>>(iter: T) -> Self {
        let mut array = LightArray::new();
        for light in iter {
            if array.push(light).is_none() {
                break;
            }
        }
        array
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightRotation {
    pub axis: [f32; 3],
    pub degrees_per_second: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightMovement {
    pub from: [f32; 3],
    pub to: [f32; 3],
    pub period_seconds: f32,
}

/// Per-light animation evaluated from absolute time, so a given timestamp always yields the same pose.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LightAnimation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<LightRotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement: Option<LightMovement>,
}

impl LightAnimation {
    pub fn is_static(&self) -> bool {
        self.rotation.is_none() && self.movement.is_none()
    }

    /// Returns `base` posed at `elapsed_seconds`.
    pub fn evaluate(&self, base: &Light, elapsed_seconds: f32) -> Light {
        let mut light = *base;
        if let Some(rotation) = self.rotation {
            let axis = Vec3::from_array(rotation.axis).normalize_or_zero();
            if axis != Vec3::ZERO {
                let angle = (rotation.degrees_per_second * elapsed_seconds).to_radians();
                light.direction = (Quat::from_axis_angle(axis, angle) * base.direction).normalize_or_zero();
            }
        }
        if let Some(movement) = self.movement {
            let from = Vec3::from_array(movement.from);
            let to = Vec3::from_array(movement.to);
            light.position = from.lerp(to, ping_pong(elapsed_seconds, movement.period_seconds));
        }
        light.sanitized()
    }
}

/// Maps time onto `0 -> 1 -> 0` over one period.
fn ping_pong(elapsed_seconds: f32, period_seconds: f32) -> f32 {
    if period_seconds <= f32::EPSILON {
        return 0.0;
    }
    let phase = (elapsed_seconds / period_seconds).rem_euclid(1.0);
    1.0 - (phase * 2.0 - 1.0).abs()
}
