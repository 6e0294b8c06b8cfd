use std::path::PathBuf;

use artgen::{ColorModel, CoordinateSystem, Dimensionality, GlslDialect, Normalizer};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "autoart",
    author,
    version,
    about = "Procedurally generated GLSL art",
    long_about = "Builds a random per-pixel color formula from x, y and time, compiles it \
                  into a fragment shader and renders it. Press R for a new formula, F for \
                  fullscreen, D/P/N/C to toggle 4D, polar coordinates, the normalizer and \
                  HSV, Up/Down to move w, and Escape or Q to quit."
)]
pub struct Cli {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Write each generated fragment shader to this file.
    #[arg(long, value_name = "PATH")]
    pub dump_source: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Flags layered over the settings file. Unset flags leave the file value.
#[derive(Args, Debug, Default, Clone)]
pub struct SettingsArgs {
    /// Settings file to read instead of `autoart.toml` in the config directory.
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Generator seed; a clock-derived seed is used when omitted.
    #[arg(long, env = "AUTOART_SEED", value_name = "SEED", global = true)]
    pub seed: Option<u64>,

    /// Expression depth of each color channel.
    #[arg(long, value_name = "DEPTH", value_parser = parse_complexity, global = true)]
    pub complexity: Option<usize>,

    /// Color model: `rgb` or `hsv`.
    #[arg(long, value_name = "MODEL", value_parser = parse_color_model, global = true)]
    pub color_model: Option<ColorModel>,

    /// Channel normalizer: `mod` or `sigmoid`.
    #[arg(long, value_name = "FUNCTION", value_parser = parse_normalizer, global = true)]
    pub normalizer: Option<Normalizer>,

    /// Coordinate system: `cartesian` or `polar`.
    #[arg(long, value_name = "SYSTEM", value_parser = parse_coordinates, global = true)]
    pub coordinates: Option<CoordinateSystem>,

    /// Dimensionality: `3d` or `4d`.
    #[arg(long, value_name = "DIMENSIONS", value_parser = parse_dimensions, global = true)]
    pub dimensions: Option<Dimensionality>,

    /// Window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size, global = true)]
    pub size: Option<(u32, u32)>,

    /// Start in borderless fullscreen.
    #[arg(long, global = true)]
    pub fullscreen: bool,

    /// Multiplier from elapsed seconds to the shader's `t`.
    #[arg(long, value_name = "SCALE", value_parser = parse_rate, global = true)]
    pub time_scale: Option<f32>,

    /// How far `w` moves per second while Up/Down is held.
    #[arg(long, value_name = "RATE", value_parser = parse_rate, global = true)]
    pub w_rate: Option<f32>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the generated vertex and fragment sources without opening a window.
    Print(PrintArgs),
}

#[derive(Args, Debug)]
pub struct PrintArgs {
    /// GLSL dialect to emit: `110` or `450`.
    #[arg(long, value_name = "VERSION", value_parser = parse_dialect, default_value = "110")]
    pub dialect: GlslDialect,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_complexity(value: &str) -> Result<usize, String> {
    let trimmed = value.trim();
    let requested: usize = trimmed
        .parse()
        .map_err(|_| format!("invalid complexity '{trimmed}'; expected a non-negative integer"))?;
    artgen::validate_complexity(requested).map_err(|err| err.to_string())
}

pub fn parse_color_model(value: &str) -> Result<ColorModel, String> {
    value.parse().map_err(|err: artgen::ConfigError| err.to_string())
}

pub fn parse_normalizer(value: &str) -> Result<Normalizer, String> {
    value.parse().map_err(|err: artgen::ConfigError| err.to_string())
}

pub fn parse_coordinates(value: &str) -> Result<CoordinateSystem, String> {
    value.parse().map_err(|err: artgen::ConfigError| err.to_string())
}

pub fn parse_dimensions(value: &str) -> Result<Dimensionality, String> {
    value.parse().map_err(|err: artgen::ConfigError| err.to_string())
}

pub fn parse_surface_size(value: &str) -> Result<(u32, u32), String> {
    let trimmed = value.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| "expected WxH format, e.g. 1280x720".to_string())?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in size '{trimmed}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in size '{trimmed}'"))?;

    if width == 0 || height == 0 {
        return Err("window dimensions must be greater than zero".to_string());
    }
    Ok((width, height))
}

pub fn parse_rate(value: &str) -> Result<f32, String> {
    let trimmed = value.trim();
    let rate: f32 = trimmed
        .parse()
        .map_err(|_| format!("invalid number '{trimmed}'"))?;
    if !rate.is_finite() || rate < 0.0 {
        return Err(format!("'{trimmed}' must be a finite, non-negative number"));
    }
    Ok(rate)
}

pub fn parse_dialect(value: &str) -> Result<GlslDialect, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "110" | "legacy" => Ok(GlslDialect::Glsl110),
        "450" | "vulkan" => Ok(GlslDialect::Glsl450),
        other => Err(format!("unknown GLSL dialect '{other}'; use 110 or 450")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_surface_sizes() {
        assert_eq!(parse_surface_size("1280x720"), Ok((1280, 720)));
        assert_eq!(parse_surface_size(" 640 X 480 "), Ok((640, 480)));
        assert!(parse_surface_size("1280").is_err());
        assert!(parse_surface_size("0x720").is_err());
        assert!(parse_surface_size("wide x 10").is_err());
    }

    #[test]
    fn complexity_is_bounded() {
        assert_eq!(parse_complexity("10"), Ok(10));
        assert_eq!(parse_complexity(" 0 "), Ok(0));
        assert!(parse_complexity("-1").is_err());
        let too_high = (artgen::max_complexity() + 1).to_string();
        let err = parse_complexity(&too_high).unwrap_err();
        assert!(err.contains("too high"), "{err}");
    }

    #[test]
    fn rates_must_be_finite_and_non_negative() {
        assert_eq!(parse_rate("0.01"), Ok(0.01));
        assert_eq!(parse_rate("0"), Ok(0.0));
        assert!(parse_rate("-1").is_err());
        assert!(parse_rate("inf").is_err());
        assert!(parse_rate("NaN").is_err());
    }

    #[test]
    fn parses_toggles_and_dialects() {
        assert_eq!(parse_color_model("HSV"), Ok(ColorModel::Hsv));
        assert_eq!(parse_normalizer("mod"), Ok(Normalizer::Mod));
        assert_eq!(parse_coordinates("polar"), Ok(CoordinateSystem::Polar));
        assert_eq!(parse_dimensions("4d"), Ok(Dimensionality::FourD));
        assert!(parse_color_model("cmyk").unwrap_err().contains("rgb or hsv"));
        assert_eq!(parse_dialect("450"), Ok(GlslDialect::Glsl450));
        assert!(parse_dialect("330").is_err());
    }

    #[test]
    fn print_subcommand_accepts_global_flags() {
        let cli = Cli::try_parse_from([
            "autoart",
            "print",
            "--seed",
            "42",
            "--color-model",
            "hsv",
            "--dialect",
            "450",
        ])
        .unwrap();
        assert_eq!(cli.settings.seed, Some(42));
        assert_eq!(cli.settings.color_model, Some(ColorModel::Hsv));
        match cli.command {
            Some(Command::Print(args)) => assert_eq!(args.dialect, GlslDialect::Glsl450),
            None => panic!("expected print subcommand"),
        }
    }

    #[test]
    fn window_flags_parse_without_subcommand() {
        let cli = Cli::try_parse_from([
            "autoart",
            "--size",
            "800x600",
            "--fullscreen",
            "--dimensions",
            "4d",
            "--dump-source",
            "/tmp/art.frag",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.settings.size, Some((800, 600)));
        assert!(cli.settings.fullscreen);
        assert_eq!(cli.settings.dimensions, Some(Dimensionality::FourD));
        assert_eq!(cli.dump_source, Some(PathBuf::from("/tmp/art.frag")));
    }
}
