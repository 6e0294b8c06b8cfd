use std::path::PathBuf;

use artgen::{RenderConfiguration, DEFAULT_COMPLEXITY};

/// Scales wall-clock seconds into the shader's `t` uniform.
pub const DEFAULT_TIME_SCALE: f32 = 0.01;
/// How fast `w` moves per second while an arrow key is held.
pub const DEFAULT_W_RATE: f32 = 0.1;

/// `RendererConfig` mirrors the resolved CLI/file settings and tells the
/// renderer how large the window is, which toggles to start from and how to
/// seed the generator.
#[derive(Clone, Debug)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Start in borderless fullscreen.
    pub fullscreen: bool,
    /// Expression depth for each color channel.
    pub complexity: usize,
    /// Initial toggle state.
    pub render_config: RenderConfiguration,
    /// Seed for the expression generator.
    pub seed: u64,
    pub time_scale: f32,
    pub w_rate: f32,
    /// Write each regenerated fragment source to this path.
    pub dump_source: Option<PathBuf>,
}

impl Default for RendererConfig {
    /// A 1280x720 window with the default toggles and seed 0.
    fn default() -> Self {
        Self {
            surface_size: (1280, 720),
            fullscreen: false,
            complexity: DEFAULT_COMPLEXITY,
            render_config: RenderConfiguration::default(),
            seed: 0,
            time_scale: DEFAULT_TIME_SCALE,
            w_rate: DEFAULT_W_RATE,
            dump_source: None,
        }
    }
}
