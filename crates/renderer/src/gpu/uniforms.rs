use std::time::Duration;

use artgen::CompiledProgram;

use super::backend::WgpuBackend;

/// Per-frame values fed to the generated program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FrameUniforms {
    pub t: f32,
    pub w: f32,
}

impl FrameUniforms {
    /// `t` is the time since the program was built, scaled by `time_scale`.
    pub(crate) fn at(elapsed: Duration, time_scale: f32, w: f32) -> Self {
        Self {
            t: elapsed.as_secs_f32() * time_scale,
            w,
        }
    }

    /// Writes the values to every uniform the live program declares.
    pub(crate) fn upload(&self, backend: &WgpuBackend, program: &CompiledProgram<WgpuBackend>) {
        if let Some(slot) = program.time_location() {
            backend.set_uniform(program.program(), slot, self.t);
        }
        if let Some(slot) = program.w_location() {
            backend.set_uniform(program.program(), slot, self.w);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_is_scaled_elapsed_seconds() {
        let uniforms = FrameUniforms::at(Duration::from_millis(2500), 0.01, 0.0);
        assert!((uniforms.t - 0.025).abs() < 1e-6);
    }

    #[test]
    fn fresh_program_starts_at_zero() {
        let uniforms = FrameUniforms::at(Duration::ZERO, 0.01, 0.75);
        assert_eq!(uniforms, FrameUniforms { t: 0.0, w: 0.75 });
    }
}
