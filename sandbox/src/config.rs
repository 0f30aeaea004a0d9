use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use common::context::GlSettings;
use log::LevelFilter;
use palette::Srgba;
use serde::Deserialize;

use crate::cli::Cli;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Hello World".to_string(),
            width: 640,
            height: 480,
            vsync: true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlVersionConfig {
    pub major: u8,
    pub minor: u8,
}

impl Default for GlVersionConfig {
    fn default() -> Self {
        Self { major: 3, minor: 3 }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PulseConfig {
    pub color: [f32; 4],
    pub step: f32,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            color: [0.0, 0.5, 0.8, 1.0],
            step: 0.01,
        }
    }
}

impl PulseConfig {
    pub fn color(&self) -> Srgba {
        let [red, green, blue, alpha] = self.color;
        Srgba::new(red, green, blue, alpha)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SandboxConfig {
    pub window: WindowConfig,
    pub gl: GlVersionConfig,
    pub shader: PathBuf,
    pub pulse: PulseConfig,
    pub clear_color: [f32; 4],
    /// `None` breaks on GL errors in debug builds only.
    pub break_on_gl_error: Option<bool>,
    pub log_level: String,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            gl: GlVersionConfig::default(),
            shader: PathBuf::from(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/res/shaders/Basic.shader"
            )),
            pulse: PulseConfig::default(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            break_on_gl_error: None,
            log_level: "info".to_string(),
        }
    }
}

impl SandboxConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).wrap_err("Invalid sandbox configuration")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let json = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json(&json).wrap_err_with(|| format!("In {}", path.display()))
    }

    /// Command line flags win over the file.
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(shader) = &cli.shader {
            self.shader = shader.clone();
        }
        if let Some(width) = cli.width {
            self.window.width = width;
        }
        if let Some(height) = cli.height {
            self.window.height = height;
        }
        if let Some(title) = &cli.title {
            self.window.title = title.clone();
        }
        self
    }

    pub fn log_level(&self) -> Result<LevelFilter> {
        self.log_level
            .parse()
            .map_err(|_| eyre!("Unknown log level '{}'", self.log_level))
    }

    pub fn break_on_gl_error(&self) -> bool {
        self.break_on_gl_error.unwrap_or(cfg!(debug_assertions))
    }

    pub fn gl_settings(&self) -> GlSettings {
        GlSettings {
            major: self.gl.major,
            minor: self.gl.minor,
            vsync: self.window.vsync,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_object_gives_defaults() {
        let config = SandboxConfig::from_json("{}").unwrap();

        assert_eq!(config, SandboxConfig::default());
        assert_eq!(config.window.width, 640);
        assert_eq!(config.gl_settings(), GlSettings::default());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = SandboxConfig::from_json(
            r#"{ "window": { "title": "Quad" }, "pulse": { "step": 0.05 }, "log_level": "debug" }"#,
        )
        .unwrap();

        assert_eq!(config.window.title, "Quad");
        assert_eq!(config.window.height, 480);
        assert_eq!(config.pulse.step, 0.05);
        assert_eq!(config.pulse.color, [0.0, 0.5, 0.8, 1.0]);
        assert_eq!(config.log_level().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn default_pulse_starts_with_red_off() {
        let color = PulseConfig::default().color();

        assert_eq!(color.red, 0.0);
        assert_eq!((color.green, color.blue, color.alpha), (0.5, 0.8, 1.0));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(SandboxConfig::from_json(r#"{ "windows": {} }"#).is_err());
    }

    #[test]
    fn bad_log_level_is_an_error() {
        let config = SandboxConfig {
            log_level: "loud".to_string(),
            ..SandboxConfig::default()
        };

        assert!(config.log_level().is_err());
    }

    #[test]
    fn explicit_break_setting_wins() {
        let config = SandboxConfig::from_json(r#"{ "break_on_gl_error": false }"#).unwrap();
        assert!(!config.break_on_gl_error());

        let config = SandboxConfig::from_json(r#"{ "break_on_gl_error": true }"#).unwrap();
        assert!(config.break_on_gl_error());
    }

    #[test]
    fn cli_overrides_file() {
        let cli = Cli {
            shader: Some(PathBuf::from("other.shader")),
            height: Some(720),
            ..Cli::default()
        };

        let config = SandboxConfig::default().with_overrides(&cli);

        assert_eq!(config.shader, PathBuf::from("other.shader"));
        assert_eq!(config.window.height, 720);
        assert_eq!(config.window.width, 640);
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "gl": {{ "major": 4, "minor": 5 }} }}"#).unwrap();

        let config = SandboxConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.gl, GlVersionConfig { major: 4, minor: 5 });
    }

    #[test]
    fn default_shader_ships_with_the_crate() {
        assert!(SandboxConfig::default().shader.is_file());
    }
}
