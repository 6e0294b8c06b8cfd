//! Windowed renderer for generated shader art.
//!
//! ```text
//!   autoart CLI
//!        │ RendererConfig
//!        ▼
//!   Renderer::run ──▶ WindowState ──▶ winit event loop ──▶ render_frame()
//!                         │                 │                   │
//!                         │                 └─ key releases ─▶ ArtSession::apply / regenerate
//!                         └─ ArtSession<WgpuBackend>            └─▶ t / w ─▶ uniform buffer
//! ```
//!
//! `artgen` decides what the shader says; this crate only compiles it through
//! wgpu's GLSL frontend, feeds it time and `w`, and draws one full-screen
//! triangle per frame.

mod gpu;
mod input;
mod types;
mod window;

use anyhow::Result;

pub use gpu::{StageModule, UniformSlot, WgpuBackend, WgpuProgram};
pub use types::{RendererConfig, DEFAULT_TIME_SCALE, DEFAULT_W_RATE};

/// High-level entry point that owns the chosen configuration.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Opens the window and runs until the user quits.
    ///
    /// Fails before any window appears when the complexity is out of range,
    /// and afterwards when the GPU cannot be initialised or a generated
    /// program fails to compile or link.
    pub fn run(&mut self) -> Result<()> {
        let complexity = artgen::validate_complexity(self.config.complexity)?;
        tracing::info!(
            seed = self.config.seed,
            complexity,
            config = %self.config.render_config,
            "starting renderer"
        );
        window::run(&self.config, complexity)
    }
}
