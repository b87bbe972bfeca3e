use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::shadow::ProjectionSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self { width: 1280, height: 720 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShadowConfig {
    /// Far edge of each cascade as a percentage of the camera's `[near, far]` range.
    #[serde(default = "ShadowConfig::default_cascade_percentages")]
    pub cascade_percentages: Vec<f32>,
    #[serde(default = "ShadowConfig::default_pcf_enabled")]
    pub pcf_enabled: bool,
    #[serde(default = "ShadowConfig::default_sample_count")]
    pub sample_count: u32,
    #[serde(default = "ShadowConfig::default_bounds_margin")]
    pub bounds_margin: f32,
    #[serde(default = "ShadowConfig::default_z_center_bias")]
    pub z_center_bias: f32,
    #[serde(default = "ShadowConfig::default_spot_aspect")]
    pub spot_aspect: f32,
    #[serde(default = "ShadowConfig::default_spot_near")]
    pub spot_near: f32,
    #[serde(default = "ShadowConfig::default_spot_far")]
    pub spot_far: f32,
    #[serde(default = "ShadowConfig::default_point_fov_degrees")]
    pub point_fov_degrees: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub shadow: ShadowConfig,
}

#[derive(Debug, Clone, Default)]
pub struct AppConfigOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ShadowConfig {
    fn default_cascade_percentages() -> Vec<f32> {
        vec![6.0, 18.0, 45.0, 100.0]
    }

    const fn default_pcf_enabled() -> bool {
        true
    }

    const fn default_sample_count() -> u32 {
        16
    }

    const fn default_bounds_margin() -> f32 {
        5.0
    }

    const fn default_z_center_bias() -> f32 {
        0.25
    }

    const fn default_spot_aspect() -> f32 {
        1.0
    }

    const fn default_spot_near() -> f32 {
        0.1
    }

    const fn default_spot_far() -> f32 {
        150.0
    }

    const fn default_point_fov_degrees() -> f32 {
        90.0
    }

    pub fn projection_settings(&self) -> ProjectionSettings {
        ProjectionSettings {
            spot_aspect: self.spot_aspect,
            spot_near: self.spot_near,
            spot_far: self.spot_far,
            point_fov_radians: self.point_fov_degrees.to_radians(),
        }
    }
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            cascade_percentages: Self::default_cascade_percentages(),
            pcf_enabled: Self::default_pcf_enabled(),
            sample_count: Self::default_sample_count(),
            bounds_margin: Self::default_bounds_margin(),
            z_center_bias: Self::default_z_center_bias(),
            spot_aspect: Self::default_spot_aspect(),
            spot_near: Self::default_spot_near(),
            spot_far: Self::default_spot_far(),
            point_fov_degrees: Self::default_point_fov_degrees(),
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("[config] {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &AppConfigOverrides) {
        if let Some(width) = overrides.width {
            self.viewport.width = width;
        }
        if let Some(height) = overrides.height {
            self.viewport.height = height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_shadow_fields_take_defaults() {
        let cfg: AppConfig = serde_json::from_str(r#"{ "shadow": { "pcf_enabled": false } }"#).expect("parse");
        assert!(!cfg.shadow.pcf_enabled);
        assert_eq!(cfg.shadow.cascade_percentages, ShadowConfig::default_cascade_percentages());
        assert_eq!(cfg.viewport.width, 1280);
    }

    #[test]
    fn overrides_replace_viewport() {
        let mut cfg = AppConfig::default();
        cfg.apply_overrides(&AppConfigOverrides { width: Some(640), height: None });
        assert_eq!(cfg.viewport.width, 640);
        assert_eq!(cfg.viewport.height, 720);
    }
}
