use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use artgen::{
    ColorModel, CoordinateSystem, Dimensionality, Normalizer, RenderConfiguration,
    DEFAULT_COMPLEXITY,
};
use renderer::{RendererConfig, DEFAULT_TIME_SCALE, DEFAULT_W_RATE};
use serde::Deserialize;

use crate::cli::SettingsArgs;

/// Contents of `autoart.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub seed: Option<u64>,
    pub complexity: Option<usize>,
    pub color_model: Option<ColorModel>,
    pub normalizer: Option<Normalizer>,
    pub coordinates: Option<CoordinateSystem>,
    pub dimensions: Option<Dimensionality>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fullscreen: Option<bool>,
    pub time_scale: Option<f32>,
    pub w_rate: Option<f32>,
}

impl FileSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file at {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse settings file at {}", path.display()))
    }

    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no settings file; using defaults");
            Ok(Self::default())
        }
    }
}

/// Fully resolved settings: defaults, then the file, then flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub seed: Option<u64>,
    pub complexity: usize,
    pub render: RenderConfiguration,
    pub size: (u32, u32),
    pub fullscreen: bool,
    pub time_scale: f32,
    pub w_rate: f32,
}

impl Default for Settings {
    fn default() -> Self {
        let defaults = RendererConfig::default();
        Self {
            seed: None,
            complexity: DEFAULT_COMPLEXITY,
            render: RenderConfiguration::default(),
            size: defaults.surface_size,
            fullscreen: false,
            time_scale: DEFAULT_TIME_SCALE,
            w_rate: DEFAULT_W_RATE,
        }
    }
}

impl Settings {
    pub fn resolve(file: FileSettings, args: &SettingsArgs) -> Result<Self> {
        let defaults = Self::default();
        let render = RenderConfiguration {
            color_model: args
                .color_model
                .or(file.color_model)
                .unwrap_or(defaults.render.color_model),
            normalizer: args
                .normalizer
                .or(file.normalizer)
                .unwrap_or(defaults.render.normalizer),
            coordinates: args
                .coordinates
                .or(file.coordinates)
                .unwrap_or(defaults.render.coordinates),
            dimensions: args
                .dimensions
                .or(file.dimensions)
                .unwrap_or(defaults.render.dimensions),
        };
        let size = args.size.unwrap_or((
            file.width.unwrap_or(defaults.size.0),
            file.height.unwrap_or(defaults.size.1),
        ));
        if size.0 == 0 || size.1 == 0 {
            bail!("window dimensions must be greater than zero");
        }

        let complexity = args
            .complexity
            .or(file.complexity)
            .unwrap_or(defaults.complexity);
        let complexity = artgen::validate_complexity(complexity)?;

        let time_scale = checked_rate("time_scale", args.time_scale.or(file.time_scale))?
            .unwrap_or(defaults.time_scale);
        let w_rate =
            checked_rate("w_rate", args.w_rate.or(file.w_rate))?.unwrap_or(defaults.w_rate);

        Ok(Self {
            seed: args.seed.or(file.seed),
            complexity,
            render,
            size,
            fullscreen: args.fullscreen || file.fullscreen.unwrap_or(defaults.fullscreen),
            time_scale,
            w_rate,
        })
    }

    pub fn renderer_config(&self, seed: u64, dump_source: Option<PathBuf>) -> RendererConfig {
        RendererConfig {
            surface_size: self.size,
            fullscreen: self.fullscreen,
            complexity: self.complexity,
            render_config: self.render,
            seed,
            time_scale: self.time_scale,
            w_rate: self.w_rate,
            dump_source,
        }
    }
}

fn checked_rate(name: &str, value: Option<f32>) -> Result<Option<f32>> {
    match value {
        Some(rate) if !rate.is_finite() || rate < 0.0 => {
            bail!("{name} must be a finite, non-negative number (got {rate})")
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_settings(contents: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("autoart.toml");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn defaults_without_file_or_flags() {
        let settings = Settings::resolve(FileSettings::default(), &SettingsArgs::default()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.size, (1280, 720));
        assert_eq!(settings.complexity, DEFAULT_COMPLEXITY);
    }

    #[test]
    fn file_values_override_defaults() {
        let (_dir, path) = write_settings(
            r#"
seed = 7
complexity = 4
color_model = "hsv"
dimensions = "4d"
width = 640
height = 480
fullscreen = true
time_scale = 0.5
"#,
        );
        let file = FileSettings::load(&path).unwrap();
        let settings = Settings::resolve(file, &SettingsArgs::default()).unwrap();

        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.complexity, 4);
        assert_eq!(settings.render.color_model, ColorModel::Hsv);
        assert_eq!(settings.render.dimensions, Dimensionality::FourD);
        assert_eq!(settings.render.normalizer, Normalizer::Sigmoid);
        assert_eq!(settings.size, (640, 480));
        assert!(settings.fullscreen);
        assert_eq!(settings.time_scale, 0.5);
        assert_eq!(settings.w_rate, DEFAULT_W_RATE);
    }

    #[test]
    fn flags_override_file_values() {
        let file = FileSettings {
            seed: Some(7),
            complexity: Some(4),
            color_model: Some(ColorModel::Hsv),
            width: Some(640),
            ..FileSettings::default()
        };
        let args = SettingsArgs {
            seed: Some(99),
            color_model: Some(ColorModel::Rgb),
            size: Some((300, 200)),
            ..SettingsArgs::default()
        };
        let settings = Settings::resolve(file, &args).unwrap();

        assert_eq!(settings.seed, Some(99));
        assert_eq!(settings.complexity, 4);
        assert_eq!(settings.render.color_model, ColorModel::Rgb);
        assert_eq!(settings.size, (300, 200));
    }

    #[test]
    fn rejects_invalid_file_values() {
        let file = FileSettings {
            complexity: Some(artgen::max_complexity() + 1),
            ..FileSettings::default()
        };
        let err = Settings::resolve(file, &SettingsArgs::default()).unwrap_err();
        assert!(err.to_string().contains("too high"), "{err}");

        let file = FileSettings {
            time_scale: Some(-1.0),
            ..FileSettings::default()
        };
        assert!(Settings::resolve(file, &SettingsArgs::default()).is_err());

        let file = FileSettings {
            height: Some(0),
            ..FileSettings::default()
        };
        assert!(Settings::resolve(file, &SettingsArgs::default()).is_err());
    }

    #[test]
    fn unknown_keys_and_values_fail_to_parse() {
        let (_dir, path) = write_settings("colour = \"rgb\"\n");
        assert!(FileSettings::load(&path).is_err());

        let (_dir, path) = write_settings("normalizer = \"tanh\"\n");
        assert!(FileSettings::load(&path).is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let file = FileSettings::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(file, FileSettings::default());
    }

    #[test]
    fn renderer_config_carries_resolved_values() {
        let settings = Settings {
            complexity: 3,
            fullscreen: true,
            ..Settings::default()
        };
        let config = settings.renderer_config(42, Some(PathBuf::from("art.frag")));
        assert_eq!(config.seed, 42);
        assert_eq!(config.complexity, 3);
        assert!(config.fullscreen);
        assert_eq!(config.surface_size, (1280, 720));
        assert_eq!(config.dump_source, Some(PathBuf::from("art.frag")));
    }
}
