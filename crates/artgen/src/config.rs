use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assemble::MAX_SOURCE_BYTES;
use crate::expr::worst_case_len;

/// Complexity used when nothing else is requested.
pub const DEFAULT_COMPLEXITY: usize = 10;

/// Leaves headroom for the boilerplate wrapped around the three channels.
const BOILERPLATE_ALLOWANCE: usize = 4 * 1024;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "complexity {requested} is too high; the generated source could exceed {limit} bytes (max complexity {max})"
    )]
    ComplexityTooHigh {
        requested: usize,
        max: usize,
        limit: usize,
    },
    #[error("unknown {field} value '{value}'; expected {expected}")]
    UnknownValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// How the three generated channels are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorModel {
    #[default]
    Rgb,
    Hsv,
}

/// Function squashing each channel into a displayable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalizer {
    Mod,
    #[default]
    Sigmoid,
}

/// How screen position maps onto the `x`/`y` variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateSystem {
    #[default]
    Cartesian,
    Polar,
}

/// Whether the extra `w` variable and its uniform exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Dimensionality {
    #[default]
    #[serde(rename = "3d")]
    ThreeD,
    #[serde(rename = "4d")]
    FourD,
}

impl Dimensionality {
    pub fn is_four_d(self) -> bool {
        matches!(self, Dimensionality::FourD)
    }
}

macro_rules! parse_and_display {
    ($ty:ident, $field:literal, $expected:literal, { $($variant:ident => [$display:literal $(, $alias:literal)*]),+ $(,)? }) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $($ty::$variant => f.write_str($display),)+
                }
            }
        }

        impl std::str::FromStr for $ty {
            type Err = ConfigError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let normalized = value.trim().to_ascii_lowercase();
                match normalized.as_str() {
                    $($display $(| $alias)* => Ok($ty::$variant),)+
                    _ => Err(ConfigError::UnknownValue {
                        field: $field,
                        value: value.to_string(),
                        expected: $expected,
                    }),
                }
            }
        }
    };
}

parse_and_display!(ColorModel, "color model", "rgb or hsv", {
    Rgb => ["rgb"],
    Hsv => ["hsv"],
});

parse_and_display!(Normalizer, "normalizer", "mod or sigmoid", {
    Mod => ["mod", "modulo"],
    Sigmoid => ["sigmoid", "logistic"],
});

parse_and_display!(CoordinateSystem, "coordinate system", "cartesian or polar", {
    Cartesian => ["cartesian"],
    Polar => ["polar"],
});

parse_and_display!(Dimensionality, "dimensions", "3d or 4d", {
    ThreeD => ["3d", "3"],
    FourD => ["4d", "4"],
});

/// One of the eight actions that set a single configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    SetColorModel(ColorModel),
    SetNormalizer(Normalizer),
    SetCoordinateSystem(CoordinateSystem),
    SetDimensionality(Dimensionality),
}

/// The four orthogonal toggles read by the source assembler.
///
/// All sixteen combinations are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfiguration {
    pub color_model: ColorModel,
    pub normalizer: Normalizer,
    pub coordinates: CoordinateSystem,
    pub dimensions: Dimensionality,
}

impl RenderConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn four_d(&self) -> bool {
        self.dimensions.is_four_d()
    }

    /// Applies `action` and reports whether a field actually changed.
    ///
    /// A `true` result means the current program no longer matches the
    /// configuration and must be regenerated.
    pub fn apply(&mut self, action: ConfigAction) -> bool {
        match action {
            ConfigAction::SetColorModel(value) => replace_if_changed(&mut self.color_model, value),
            ConfigAction::SetNormalizer(value) => replace_if_changed(&mut self.normalizer, value),
            ConfigAction::SetCoordinateSystem(value) => {
                replace_if_changed(&mut self.coordinates, value)
            }
            ConfigAction::SetDimensionality(value) => {
                replace_if_changed(&mut self.dimensions, value)
            }
        }
    }

    /// Action flipping the color model to its other value.
    pub fn toggled_color_model(&self) -> ConfigAction {
        ConfigAction::SetColorModel(match self.color_model {
            ColorModel::Rgb => ColorModel::Hsv,
            ColorModel::Hsv => ColorModel::Rgb,
        })
    }

    pub fn toggled_normalizer(&self) -> ConfigAction {
        ConfigAction::SetNormalizer(match self.normalizer {
            Normalizer::Mod => Normalizer::Sigmoid,
            Normalizer::Sigmoid => Normalizer::Mod,
        })
    }

    pub fn toggled_coordinates(&self) -> ConfigAction {
        ConfigAction::SetCoordinateSystem(match self.coordinates {
            CoordinateSystem::Cartesian => CoordinateSystem::Polar,
            CoordinateSystem::Polar => CoordinateSystem::Cartesian,
        })
    }

    pub fn toggled_dimensions(&self) -> ConfigAction {
        ConfigAction::SetDimensionality(match self.dimensions {
            Dimensionality::ThreeD => Dimensionality::FourD,
            Dimensionality::FourD => Dimensionality::ThreeD,
        })
    }

    /// Enumerates every valid configuration.
    pub fn all() -> impl Iterator<Item = RenderConfiguration> {
        let colors = [ColorModel::Rgb, ColorModel::Hsv];
        let normalizers = [Normalizer::Mod, Normalizer::Sigmoid];
        let coordinates = [CoordinateSystem::Cartesian, CoordinateSystem::Polar];
        let dimensions = [Dimensionality::ThreeD, Dimensionality::FourD];
        colors.into_iter().flat_map(move |color_model| {
            normalizers.into_iter().flat_map(move |normalizer| {
                coordinates.into_iter().flat_map(move |coordinates| {
                    dimensions
                        .into_iter()
                        .map(move |dimensions| RenderConfiguration {
                            color_model,
                            normalizer,
                            coordinates,
                            dimensions,
                        })
                })
            })
        })
    }
}

impl fmt::Display for RenderConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.color_model, self.normalizer, self.coordinates, self.dimensions
        )
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// Largest complexity whose three-channel worst case fits the source ceiling.
pub fn max_complexity() -> usize {
    let budget = MAX_SOURCE_BYTES - BOILERPLATE_ALLOWANCE;
    let mut complexity = 0;
    while 3 * worst_case_len(complexity + 1) <= budget {
        complexity += 1;
    }
    complexity
}

/// Rejects complexities that could overflow the source ceiling.
pub fn validate_complexity(requested: usize) -> Result<usize, ConfigError> {
    let max = max_complexity();
    if requested > max {
        return Err(ConfigError::ComplexityTooHigh {
            requested,
            max,
            limit: MAX_SOURCE_BYTES,
        });
    }
    Ok(requested)
}
