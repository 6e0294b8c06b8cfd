//! GPU side of the renderer.
//!
//! - `context` owns the wgpu instance, device and surface and reconfigures the
//!   swapchain when the window resizes.
//! - `backend` implements [`artgen::ShaderBackend`] on top of wgpu's GLSL
//!   frontend, reflecting the uniform block layout with naga.
//! - `uniforms` computes the per-frame `t`/`w` values and writes them through
//!   the queue.
//! - `frame` encodes the single full-screen draw.

mod backend;
mod context;
mod frame;
mod uniforms;

pub use backend::{StageModule, UniformSlot, WgpuBackend, WgpuProgram};
pub(crate) use context::GpuContext;
pub(crate) use frame::render;
pub(crate) use uniforms::FrameUniforms;
