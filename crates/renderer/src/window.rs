use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use artgen::{ArtSession, Assembler, GlslDialect, Regenerator, SeededSource};
use tracing::{info, warn};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Fullscreen, Window, WindowBuilder};

use crate::gpu::{self, FrameUniforms, GpuContext, WgpuBackend};
use crate::input::{command_for_key, InputCommand, WDrift};
use crate::types::RendererConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Everything the event loop needs to draw and react to input.
///
/// Fields drop in declaration order: the session's pipelines go first, then
/// the surface, and the window last since the surface borrows its handles.
struct WindowState {
    session: ArtSession<WgpuBackend>,
    gpu: GpuContext,
    drift: WDrift,
    fullscreen: bool,
    time_scale: f32,
    last_frame: Instant,
    dump_source: Option<PathBuf>,
    window: Arc<Window>,
}

impl WindowState {
    fn new(window: Arc<Window>, config: &RendererConfig, complexity: usize) -> Result<Self> {
        let gpu = GpuContext::new(window.as_ref(), window.inner_size())?;
        let backend = WgpuBackend::new(&gpu.device, &gpu.queue, gpu.surface_format);
        let regenerator = Regenerator::new(
            backend,
            Assembler::new(complexity, GlslDialect::Glsl450),
            Box::new(SeededSource::new(config.seed)),
        );
        let session = ArtSession::start(config.render_config, regenerator)
            .context("failed to build the initial program")?;

        let state = Self {
            session,
            gpu,
            drift: WDrift::new(config.w_rate),
            fullscreen: config.fullscreen,
            time_scale: config.time_scale,
            last_frame: Instant::now(),
            dump_source: config.dump_source.clone(),
            window,
        };
        state.dump_fragment();
        Ok(state)
    }

    fn window(&self) -> &Window {
        self.window.as_ref()
    }

    fn handle_command(&mut self, command: InputCommand) -> Result<Flow> {
        match command {
            InputCommand::Quit => return Ok(Flow::Exit),
            InputCommand::ToggleFullscreen => {
                self.fullscreen = !self.fullscreen;
                self.window
                    .set_fullscreen(self.fullscreen.then_some(Fullscreen::Borderless(None)));
                info!(fullscreen = self.fullscreen, "toggled fullscreen");
            }
            InputCommand::Regenerate => {
                self.session
                    .regenerate()
                    .context("failed to regenerate art")?;
                self.dump_fragment();
            }
            toggle => {
                if let Some(action) = toggle.action(self.session.config()) {
                    let regenerated = self
                        .session
                        .apply(action)
                        .context("failed to regenerate art after a configuration change")?;
                    if regenerated {
                        self.dump_fragment();
                    }
                }
            }
        }
        Ok(Flow::Continue)
    }

    fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        let dt = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;

        let w = if self.session.config().four_d() {
            self.drift.advance(dt)
        } else {
            self.drift.value()
        };

        let regenerator = self.session.regenerator();
        let Some(program) = regenerator.current() else {
            return Ok(());
        };
        FrameUniforms::at(regenerator.elapsed(), self.time_scale, w)
            .upload(regenerator.backend(), program);
        gpu::render(&self.gpu, program.program())
    }

    fn dump_fragment(&self) {
        let (Some(path), Some(program)) = (self.dump_source.as_ref(), self.session.program())
        else {
            return;
        };
        match fs::write(path, &program.sources().fragment) {
            Ok(()) => info!(path = %path.display(), "wrote fragment source"),
            Err(err) => warn!(path = %path.display(), error = %err, "failed to write fragment source"),
        }
    }
}

/// Opens the art window and drives the `winit` event loop until the user
/// quits or a regeneration fails.
pub(crate) fn run(config: &RendererConfig, complexity: usize) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title("AutoArt")
        .with_inner_size(window_size)
        .with_fullscreen(config.fullscreen.then_some(Fullscreen::Borderless(None)))
        .build(&event_loop)
        .context("failed to create window")?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window, config, complexity)?;
    state.window().request_redraw();

    let mut fatal: Option<anyhow::Error> = None;
    let run_result = event_loop.run(|event, elwt| {
        elwt.set_control_flow(ControlFlow::Wait);

        match event {
            Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        elwt.exit();
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if state.drift.handle_key(&event.logical_key, event.state) {
                            return;
                        }
                        if event.state != ElementState::Released {
                            return;
                        }
                        let Some(command) = command_for_key(&event.logical_key) else {
                            return;
                        };
                        match state.handle_command(command) {
                            Ok(Flow::Continue) => {}
                            Ok(Flow::Exit) => elwt.exit(),
                            Err(err) => {
                                fatal = Some(err);
                                elwt.exit();
                            }
                        }
                    }
                    WindowEvent::Resized(new_size) => {
                        state.gpu.resize(new_size);
                    }
                    WindowEvent::ScaleFactorChanged {
                        mut inner_size_writer,
                        ..
                    } => {
                        let _ = inner_size_writer.request_inner_size(state.gpu.size);
                    }
                    WindowEvent::RedrawRequested => match state.render_frame() {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            state.gpu.reconfigure();
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            fatal = Some(anyhow!("surface out of memory"));
                            elwt.exit();
                        }
                        Err(wgpu::SurfaceError::Timeout) => {
                            warn!("surface timeout; retrying next frame");
                        }
                        Err(other) => {
                            warn!(error = ?other, "surface error; retrying next frame");
                        }
                    },
                    _ => {}
                }
            }
            Event::AboutToWait => {
                state.window().request_redraw();
            }
            _ => {}
        }
    });

    drop(state);

    if let Some(err) = fatal {
        return Err(err);
    }
    run_result.map_err(|err| anyhow!("event loop error: {err}"))
}
