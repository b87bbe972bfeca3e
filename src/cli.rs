use crate::config::AppConfigOverrides;
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub scene: Option<PathBuf>,
    pub frames: Option<u32>,
    pub gpu: Option<bool>,
    width: Option<u32>,
    height: Option<u32>,
}

impl CliOverrides {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    /// Reads `--name value` pairs after the program name. A repeated flag overrides the earlier one.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = CliOverrides::default();
        let mut args = args.into_iter().skip(1);
        while let Some(flag) = args.next() {
            let flag = flag.as_ref();
            let name = flag
                .strip_prefix("--")
                .ok_or_else(|| anyhow!("Unexpected argument '{flag}'. Flags take the form --name value."))?;
            let value = args.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?;
            let value = value.as_ref();
            match name {
                "config" => overrides.config = Some(PathBuf::from(value)),
                "scene" => overrides.scene = Some(PathBuf::from(value)),
                "frames" => overrides.frames = Some(parse_count("frame count", value)?),
                "width" => overrides.width = Some(parse_count("width", value)?),
                "height" => overrides.height = Some(parse_count("height", value)?),
                "gpu" => overrides.gpu = Some(parse_bool_flag("gpu", value)?),
                _ => bail!(
                    "Unknown flag '{flag}'. Supported flags: --config, --scene, --frames, --width, --height, --gpu."
                ),
            }
        }
        Ok(overrides)
    }

    pub fn config_overrides(&self) -> AppConfigOverrides {
        AppConfigOverrides { width: self.width, height: self.height }
    }
}

fn parse_count(what: &str, value: &str) -> Result<u32> {
    value.parse::<u32>().with_context(|| format!("Invalid {what} '{value}'"))
}

fn parse_bool_flag(flag: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        other => bail!("Invalid {flag} value '{other}'. Use on/off or true/false."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_paths_frames_and_gpu() {
        let args = ["app", "--scene", "scenes/yard.json", "--frames", "12", "--gpu", "on", "--width", "640"];
        let overrides = CliOverrides::parse(args).expect("parse overrides");
        assert_eq!(overrides.scene, Some(PathBuf::from("scenes/yard.json")));
        assert_eq!(overrides.frames, Some(12));
        assert_eq!(overrides.gpu, Some(true));
        let config = overrides.config_overrides();
        assert_eq!((config.width, config.height), (Some(640), None));
    }

    #[test]
    fn latest_flag_wins() {
        let args = ["app", "--frames", "3", "--frames", "9", "--gpu", "on", "--gpu", "off"];
        let overrides = CliOverrides::parse(args).expect("parse overrides");
        assert_eq!(overrides.frames, Some(9));
        assert_eq!(overrides.gpu, Some(false));
    }

    #[test]
    fn missing_value_errors() {
        let err = CliOverrides::parse(["app", "--width"]).unwrap_err();
        assert!(err.to_string().contains("Expected a value"), "error should mention missing value");
    }

    #[test]
    fn rejects_bad_numbers_and_bare_arguments() {
        let err = CliOverrides::parse(["app", "--frames", "many"]).unwrap_err();
        assert!(err.to_string().contains("Invalid frame count"), "{err}");
        assert!(CliOverrides::parse(["app", "scene.json"]).is_err());
    }

    #[test]
    fn rejects_unknown_flags() {
        let err = CliOverrides::parse(["app", "--vsync", "on"]).unwrap_err();
        assert!(err.to_string().contains("Unknown flag"), "unknown flags should error");
    }
}
