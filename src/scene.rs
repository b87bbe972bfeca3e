use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fs;
use std::path::Path;

use crate::camera3d::Camera3D;
use crate::light::{
    Attenuation, Light, LightAnimation, LightArray, LightKind, LightMovement, LightRotation, MAX_LIGHTS,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct Vec3Data {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<glam::Vec3> for Vec3Data {
    fn from(value: glam::Vec3) -> Self {
        Self { x: value.x, y: value.y, z: value.z }
    }
}

impl From<Vec3Data> for glam::Vec3 {
    fn from(value: Vec3Data) -> Self {
        glam::Vec3::new(value.x, value.y, value.z)
    }
}

fn default_camera_position() -> Vec3Data {
    Vec3Data { x: 0.0, y: 6.0, z: 18.0 }
}

const fn default_fov_y_degrees() -> f32 {
    60.0
}

const fn default_camera_near() -> f32 {
    0.1
}

const fn default_camera_far() -> f32 {
    200.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneCameraData {
    #[serde(default = "default_camera_position")]
    pub position: Vec3Data,
    #[serde(default)]
    pub target: Vec3Data,
    #[serde(default = "default_fov_y_degrees")]
    pub fov_y_degrees: f32,
    #[serde(default = "default_camera_near")]
    pub near: f32,
    #[serde(default = "default_camera_far")]
    pub far: f32,
}

impl Default for SceneCameraData {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            target: Vec3Data::default(),
            fov_y_degrees: default_fov_y_degrees(),
            near: default_camera_near(),
            far: default_camera_far(),
        }
    }
}

impl SceneCameraData {
    pub fn to_camera(&self) -> Camera3D {
        let near = self.near.max(1e-4);
        Camera3D::new(
            self.position.into(),
            self.target.into(),
            self.fov_y_degrees.clamp(1.0, 179.0).to_radians(),
            near,
            self.far.max(near),
        )
    }
}

fn default_light_direction() -> Vec3Data {
    Vec3Data::from(glam::Vec3::new(0.4, -0.8, 0.35).normalize())
}

fn default_light_color() -> Vec3Data {
    Vec3Data { x: 1.0, y: 0.97, z: 0.92 }
}

const fn default_intensity() -> f32 {
    1.0
}

const fn default_inner_cone_degrees() -> f32 {
    25.0
}

const fn default_outer_cone_degrees() -> f32 {
    35.0
}

const fn default_casts_shadow() -> bool {
    true
}

fn default_shadow_bias() -> f32 {
    0.002
}

/// On-disk description of one light. Cone angles are half-angles in degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightDefinition {
    pub kind: LightKind,
    #[serde(default)]
    pub position: Vec3Data,
    #[serde(default = "default_light_direction")]
    pub direction: Vec3Data,
    #[serde(default = "default_light_color")]
    pub color: Vec3Data,
    #[serde(default = "default_intensity")]
    pub intensity: f32,
    #[serde(default)]
    pub attenuation: Attenuation,
    #[serde(default = "default_intensity")]
    pub specular_attenuation: f32,
    #[serde(default = "default_inner_cone_degrees")]
    pub inner_cone_degrees: f32,
    #[serde(default = "default_outer_cone_degrees")]
    pub outer_cone_degrees: f32,
    #[serde(default = "default_casts_shadow")]
    pub casts_shadow: bool,
    #[serde(default = "default_shadow_bias")]
    pub shadow_bias: f32,
    #[serde(default, skip_serializing_if = "LightAnimation::is_static")]
    pub animation: LightAnimation,
}

impl LightDefinition {
    pub fn to_light(&self) -> Light {
        Light {
            kind: self.kind,
            position: self.position.into(),
            direction: self.direction.into(),
            color: self.color.into(),
            intensity: self.intensity,
            attenuation: self.attenuation,
            specular_attenuation: self.specular_attenuation,
            inner_cone_cos: self.inner_cone_degrees.to_radians().cos(),
            outer_cone_cos: self.outer_cone_degrees.to_radians().cos(),
            casts_shadow: self.casts_shadow,
            shadow_bias: self.shadow_bias,
        }
        .sanitized()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneDefinition {
    #[serde(default)]
    pub camera: SceneCameraData,
    #[serde(default)]
    pub lights: Vec<LightDefinition>,
}

impl SceneDefinition {
    /// Slowly turning sun, a fixed spot light, a wandering point light and an unshadowed fill light.
    pub fn demo() -> Self {
        let light = |kind: LightKind| LightDefinition {
            kind,
            position: Vec3Data::default(),
            direction: default_light_direction(),
            color: default_light_color(),
            intensity: default_intensity(),
            attenuation: Attenuation::default(),
            specular_attenuation: default_intensity(),
            inner_cone_degrees: default_inner_cone_degrees(),
            outer_cone_degrees: default_outer_cone_degrees(),
            casts_shadow: default_casts_shadow(),
            shadow_bias: default_shadow_bias(),
            animation: LightAnimation::default(),
        };
        let sun = LightDefinition {
            animation: LightAnimation {
                rotation: Some(LightRotation { axis: [0.0, 1.0, 0.0], degrees_per_second: 6.0 }),
                movement: None,
            },
            ..light(LightKind::Directional)
        };
        let spot = LightDefinition {
            position: Vec3Data { x: -6.0, y: 8.0, z: 4.0 },
            direction: Vec3Data::from(glam::Vec3::new(0.5, -1.0, -0.3).normalize()),
            color: Vec3Data { x: 1.0, y: 0.8, z: 0.6 },
            intensity: 3.0,
            ..light(LightKind::Spot)
        };
        let lamp = LightDefinition {
            position: Vec3Data { x: 0.0, y: 3.0, z: -6.0 },
            direction: Vec3Data { x: 0.0, y: -1.0, z: 0.0 },
            color: Vec3Data { x: 0.5, y: 0.7, z: 1.0 },
            intensity: 2.0,
            animation: LightAnimation {
                rotation: None,
                movement: Some(LightMovement { from: [-6.0, 3.0, -6.0], to: [6.0, 3.0, -6.0], period_seconds: 8.0 }),
            },
            ..light(LightKind::Point)
        };
        let fill = LightDefinition {
            position: Vec3Data { x: 4.0, y: 6.0, z: 10.0 },
            intensity: 0.4,
            casts_shadow: false,
            ..light(LightKind::Point)
        };
        Self { camera: SceneCameraData::default(), lights: vec![sun, spot, lamp, fill] }
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("Reading scene file {}", path.display()))?;
        let definition = serde_json::from_slice::<SceneDefinition>(&bytes)
            .with_context(|| format!("Parsing scene file {}", path.display()))?;
        Ok(definition)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating scene directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json.as_bytes()).with_context(|| format!("Writing scene file {}", path.display()))?;
        Ok(())
    }
}

/// Per-frame context handed to the shadow scheduler: the camera and the light array, plus the
/// animation state that poses the lights. A scene change builds a new `Scene` and replaces the old one
/// wholesale.
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: Camera3D,
    base_lights: LightArray,
    animations: SmallVec<[LightAnimation; MAX_LIGHTS]>,
    lights: LightArray,
}

impl Scene {
    pub fn new(camera: Camera3D, lights: LightArray) -> Self {
        let animations = lights.iter().map(|_| LightAnimation::default()).collect();
        Self { camera, base_lights: lights.clone(), animations, lights }
    }

    pub fn from_definition(definition: &SceneDefinition) -> Self {
        if definition.lights.len() > MAX_LIGHTS {
            log::warn!(
                "[scene] {} lights defined; only the first {} are used",
                definition.lights.len(),
                MAX_LIGHTS
            );
        }
        let mut scene = Scene::new(definition.camera.to_camera(), LightArray::new());
        for light_def in definition.lights.iter().take(MAX_LIGHTS) {
            scene.add_light(light_def.to_light(), light_def.animation);
        }
        scene
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_definition(&SceneDefinition::load_from_path(path)?))
    }

    pub fn add_light(&mut self, light: Light, animation: LightAnimation) -> Option<usize> {
        let slot = self.base_lights.push(light)?;
        self.lights.push(light);
        self.animations.push(animation);
        Some(slot)
    }

    /// Replaces the un-animated light in `slot`; the posed copy is refreshed immediately.
    pub fn set_light(&mut self, slot: usize, light: Light) -> bool {
        let (Some(base), Some(posed)) = (self.base_lights.get_mut(slot), self.lights.get_mut(slot)) else {
            return false;
        };
        *base = light.sanitized();
        *posed = *base;
        true
    }

    pub fn lights(&self) -> &LightArray {
        &self.lights
    }

    /// Poses every animated light at `elapsed_seconds`.
    pub fn update(&mut self, elapsed_seconds: f32) {
        for (slot, animation) in self.animations.iter().enumerate() {
            if animation.is_static() {
                continue;
            }
            if let (Some(base), Some(posed)) = (self.base_lights.get(slot), self.lights.get_mut(slot)) {
                *posed = animation.evaluate(base, elapsed_seconds);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_converts_cone_angles_to_cosines() {
        let definition: LightDefinition = serde_json::from_str(
            r#"{ "kind": "spot", "position": { "x": 0, "y": 5, "z": 0 }, "direction": { "x": 0, "y": -1, "z": 0 },
                 "inner_cone_degrees": 20, "outer_cone_degrees": 30 }"#,
        )
        .expect("parse light");
        let light = definition.to_light();
        assert_eq!(light.kind, LightKind::Spot);
        assert!((light.outer_cone_cos - 30f32.to_radians().cos()).abs() < 1e-6);
        assert!(light.casts_shadow);
    }

    #[test]
    fn scene_caps_light_count() {
        let definition = SceneDefinition {
            camera: SceneCameraData::default(),
            lights: (0..12)
                .map(|_| serde_json::from_str::<LightDefinition>(r#"{ "kind": "point" }"#).expect("light"))
                .collect(),
        };
        let scene = Scene::from_definition(&definition);
        assert_eq!(scene.lights().len(), MAX_LIGHTS);
    }

    #[test]
    fn update_poses_animated_lights_only() {
        let definition: SceneDefinition = serde_json::from_str(
            r#"{
                "lights": [
                    { "kind": "directional" },
                    { "kind": "point", "animation": { "movement": { "from": [0, 1, 0], "to": [4, 1, 0], "period_seconds": 2 } } }
                ]
            }"#,
        )
        .expect("parse scene");
        let mut scene = Scene::from_definition(&definition);
        let sun_before = *scene.lights().get(0).expect("sun");
        scene.update(1.0);
        assert_eq!(*scene.lights().get(0).expect("sun"), sun_before);
        let lamp = scene.lights().get(1).expect("lamp");
        assert!(lamp.position.abs_diff_eq(glam::Vec3::new(4.0, 1.0, 0.0), 1e-4));
    }
}
