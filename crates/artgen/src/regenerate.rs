use std::time::{Duration, Instant};

use crate::assemble::{Assembler, ShaderSources, ShaderStage};
use crate::config::RenderConfiguration;
use crate::random::RandomSource;

/// Name of the time uniform every program declares.
pub const TIME_UNIFORM: &str = "t";
/// Name of the extra uniform declared only in 4D.
pub const W_UNIFORM: &str = "w";

/// Shader compiler/linker the regenerator drives.
///
/// Mirrors the handful of GL-style entry points the art program needs:
/// compile a stage, link stages into a program, look up uniform locations and
/// release objects again.
pub trait ShaderBackend {
    type Shader;
    type Program;
    type Uniform: Copy;

    /// Compiles one stage. On failure returns the compiler's diagnostic log.
    fn compile(&mut self, stage: ShaderStage, source: &str) -> Result<Self::Shader, String>;
    /// Links compiled stages into a program. On failure returns the linker log.
    fn link(&mut self, shaders: &[&Self::Shader]) -> Result<Self::Program, String>;
    fn uniform_location(&mut self, program: &Self::Program, name: &str) -> Option<Self::Uniform>;
    fn delete_shader(&mut self, shader: Self::Shader);
    fn delete_program(&mut self, program: Self::Program);
}

#[derive(Debug, thiserror::Error)]
pub enum RegenerateError {
    #[error("error compiling {stage} shader: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("error linking shader program: {log}")]
    Link { log: String },
}

impl RegenerateError {
    /// Diagnostic text reported by the backend.
    pub fn log(&self) -> &str {
        match self {
            RegenerateError::Compile { log, .. } | RegenerateError::Link { log } => log,
        }
    }
}

/// A linked program together with the stage objects it was built from.
pub struct CompiledProgram<B: ShaderBackend> {
    vertex: B::Shader,
    fragment: B::Shader,
    program: B::Program,
    time_location: Option<B::Uniform>,
    w_location: Option<B::Uniform>,
    sources: ShaderSources,
}

impl<B: ShaderBackend> CompiledProgram<B> {
    pub fn program(&self) -> &B::Program {
        &self.program
    }

    pub fn vertex_shader(&self) -> &B::Shader {
        &self.vertex
    }

    pub fn fragment_shader(&self) -> &B::Shader {
        &self.fragment
    }

    /// Location of `t`. `None` when the compiler optimised it away.
    pub fn time_location(&self) -> Option<B::Uniform> {
        self.time_location
    }

    /// Location of `w`; always `None` for 3D programs.
    pub fn w_location(&self) -> Option<B::Uniform> {
        self.w_location
    }

    pub fn sources(&self) -> &ShaderSources {
        &self.sources
    }

    fn release(self, backend: &mut B) {
        backend.delete_shader(self.vertex);
        backend.delete_shader(self.fragment);
        backend.delete_program(self.program);
    }
}

/// Owns the single live program and rebuilds it on request.
///
/// At most one program exists at a time: the previous one is fully released
/// before the replacement is compiled.
pub struct Regenerator<B: ShaderBackend> {
    backend: B,
    assembler: Assembler,
    rng: Box<dyn RandomSource>,
    current: Option<CompiledProgram<B>>,
    started_at: Instant,
    generation: u64,
}

impl<B: ShaderBackend> Regenerator<B> {
    pub fn new(backend: B, assembler: Assembler, rng: Box<dyn RandomSource>) -> Self {
        Self {
            backend,
            assembler,
            rng,
            current: None,
            started_at: Instant::now(),
            generation: 0,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn assembler(&self) -> &Assembler {
        &self.assembler
    }

    pub fn current(&self) -> Option<&CompiledProgram<B>> {
        self.current.as_ref()
    }

    /// Number of programs successfully built so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Time since the last regeneration started; feeds the `t` uniform.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Releases the current program (if any), then assembles, compiles and
    /// links a new one for `config`.
    ///
    /// On error no program is live; callers must treat the error as fatal and
    /// not render.
    pub fn regenerate(
        &mut self,
        config: &RenderConfiguration,
    ) -> Result<&CompiledProgram<B>, RegenerateError> {
        self.release();
        self.started_at = Instant::now();

        let sources = self.assembler.assemble(config, self.rng.as_mut());
        tracing::debug!(
            generation = self.generation + 1,
            config = %config,
            fragment = %sources.fragment,
            "assembled fragment source"
        );

        let program = self.build(sources, config.four_d())?;
        self.generation += 1;
        tracing::info!(
            generation = self.generation,
            config = %config,
            fragment_bytes = program.sources.fragment.len(),
            "generated new art"
        );
        Ok(self.current.insert(program))
    }

    /// Drops the live program, if any. Safe to call repeatedly.
    pub fn release(&mut self) {
        if let Some(previous) = self.current.take() {
            previous.release(&mut self.backend);
        }
    }

    fn build(
        &mut self,
        sources: ShaderSources,
        four_d: bool,
    ) -> Result<CompiledProgram<B>, RegenerateError> {
        let backend = &mut self.backend;
        let vertex = backend
            .compile(ShaderStage::Vertex, &sources.vertex)
            .map_err(|log| RegenerateError::Compile {
                stage: ShaderStage::Vertex,
                log,
            })?;
        let fragment = match backend.compile(ShaderStage::Fragment, &sources.fragment) {
            Ok(shader) => shader,
            Err(log) => {
                backend.delete_shader(vertex);
                return Err(RegenerateError::Compile {
                    stage: ShaderStage::Fragment,
                    log,
                });
            }
        };
        let program = match backend.link(&[&vertex, &fragment]) {
            Ok(program) => program,
            Err(log) => {
                backend.delete_shader(vertex);
                backend.delete_shader(fragment);
                return Err(RegenerateError::Link { log });
            }
        };

        let time_location = backend.uniform_location(&program, TIME_UNIFORM);
        let w_location = if four_d {
            backend.uniform_location(&program, W_UNIFORM)
        } else {
            None
        };

        Ok(CompiledProgram {
            vertex,
            fragment,
            program,
            time_location,
            w_location,
            sources,
        })
    }
}

impl<B: ShaderBackend> Drop for Regenerator<B> {
    fn drop(&mut self) {
        self.release();
    }
}
