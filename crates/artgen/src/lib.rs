//! Procedural shader art generator.
//!
//! Builds a random per-pixel color formula from a small expression grammar
//! over screen coordinates and time, and wraps it into a complete GLSL
//! program:
//!
//! ```text
//!   RenderConfiguration ──▶ Assembler ──▶ ShaderSources ──▶ ShaderBackend
//!                               │                              │
//!                               └─ expr::generate (x3)         └─▶ CompiledProgram
//! ```
//!
//! [`Regenerator`] owns the single live [`CompiledProgram`] and rebuilds it on
//! request; [`ArtSession`] ties it to the configuration state machine so a
//! changed toggle always yields a matching program. Nothing here touches the
//! GPU directly: the `renderer` crate plugs a `wgpu` backend into
//! [`ShaderBackend`].

pub mod assemble;
pub mod config;
pub mod expr;
pub mod random;
pub mod regenerate;
pub mod session;

pub use assemble::{Assembler, GlslDialect, ShaderSources, ShaderStage, MAX_SOURCE_BYTES};
pub use config::{
    max_complexity, validate_complexity, ColorModel, ConfigAction, ConfigError, CoordinateSystem,
    Dimensionality, Normalizer, RenderConfiguration, DEFAULT_COMPLEXITY,
};
pub use expr::{generate, Expr};
pub use random::{Draw, RandomSource, ScriptedSource, SeededSource};
pub use regenerate::{
    CompiledProgram, RegenerateError, Regenerator, ShaderBackend, TIME_UNIFORM, W_UNIFORM,
};
pub use session::ArtSession;
