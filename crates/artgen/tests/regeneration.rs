use artgen::{
    ArtSession, Assembler, ColorModel, ConfigAction, Dimensionality, GlslDialect,
    RegenerateError, Regenerator, RenderConfiguration, ScriptedSource, SeededSource,
    ShaderBackend, ShaderStage,
};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Compile(ShaderStage, u32),
    Link(u32),
    Uniform(u32, String),
    DeleteShader(u32),
    DeleteProgram(u32),
}

/// Hands out numbered handles and records every call in order.
#[derive(Default)]
struct RecordingBackend {
    calls: Vec<Call>,
    next_handle: u32,
    fail_fragment: Option<String>,
    fail_link: Option<String>,
}

impl RecordingBackend {
    fn handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    fn links(&self) -> usize {
        self.count(|call| matches!(call, Call::Link(_)))
    }
}

impl ShaderBackend for RecordingBackend {
    type Shader = u32;
    type Program = u32;
    type Uniform = i32;

    fn compile(&mut self, stage: ShaderStage, source: &str) -> Result<u32, String> {
        assert!(!source.is_empty());
        if stage == ShaderStage::Fragment {
            if let Some(log) = self.fail_fragment.clone() {
                return Err(log);
            }
        }
        let handle = self.handle();
        self.calls.push(Call::Compile(stage, handle));
        Ok(handle)
    }

    fn link(&mut self, shaders: &[&u32]) -> Result<u32, String> {
        assert_eq!(shaders.len(), 2);
        if let Some(log) = self.fail_link.clone() {
            return Err(log);
        }
        let handle = self.handle();
        self.calls.push(Call::Link(handle));
        Ok(handle)
    }

    fn uniform_location(&mut self, program: &u32, name: &str) -> Option<i32> {
        self.calls.push(Call::Uniform(*program, name.to_string()));
        match name {
            "t" => Some(0),
            "w" => Some(1),
            _ => None,
        }
    }

    fn delete_shader(&mut self, shader: u32) {
        self.calls.push(Call::DeleteShader(shader));
    }

    fn delete_program(&mut self, program: u32) {
        self.calls.push(Call::DeleteProgram(program));
    }
}

fn regenerator(backend: RecordingBackend, seed: u64) -> Regenerator<RecordingBackend> {
    Regenerator::new(
        backend,
        Assembler::new(4, GlslDialect::Glsl110),
        Box::new(SeededSource::new(seed)),
    )
}

#[test]
fn first_regeneration_releases_nothing() {
    let mut regen = regenerator(RecordingBackend::default(), 1);
    let program = regen
        .regenerate(&RenderConfiguration::default())
        .expect("program builds");
    assert_eq!(*program.vertex_shader(), 1);
    assert_eq!(*program.fragment_shader(), 2);
    assert_eq!(*program.program(), 3);
    assert_eq!(program.time_location(), Some(0));
    assert_eq!(program.w_location(), None);

    assert_eq!(
        regen.backend().calls,
        vec![
            Call::Compile(ShaderStage::Vertex, 1),
            Call::Compile(ShaderStage::Fragment, 2),
            Call::Link(3),
            Call::Uniform(3, "t".into()),
        ]
    );
}

#[test]
fn previous_program_is_released_before_the_next_is_built() {
    let mut regen = regenerator(RecordingBackend::default(), 2);
    let config = RenderConfiguration::default();
    regen.regenerate(&config).unwrap();
    regen.regenerate(&config).unwrap();

    let calls = &regen.backend().calls;
    assert_eq!(
        calls[4..],
        [
            Call::DeleteShader(1),
            Call::DeleteShader(2),
            Call::DeleteProgram(3),
            Call::Compile(ShaderStage::Vertex, 4),
            Call::Compile(ShaderStage::Fragment, 5),
            Call::Link(6),
            Call::Uniform(6, "t".into()),
        ]
    );
    assert_eq!(
        regen
            .backend()
            .count(|call| matches!(call, Call::DeleteProgram(_))),
        1
    );
    assert_eq!(regen.generation(), 2);
}

#[test]
fn regeneration_restarts_the_time_baseline() {
    let pause = Duration::from_millis(20);
    let mut regen = regenerator(RecordingBackend::default(), 6);
    let config = RenderConfiguration::default();

    regen.regenerate(&config).unwrap();
    thread::sleep(pause);
    assert!(regen.elapsed() >= pause);

    regen.regenerate(&config).unwrap();
    assert!(regen.elapsed() < pause, "elapsed {:?}", regen.elapsed());
}

#[test]
fn failed_regeneration_still_restarts_the_time_baseline() {
    let pause = Duration::from_millis(20);
    let mut regen = regenerator(RecordingBackend::default(), 7);
    let config = RenderConfiguration::default();

    regen.regenerate(&config).unwrap();
    thread::sleep(pause);
    regen.backend_mut().fail_link = Some("out of resources".into());

    assert!(regen.regenerate(&config).is_err());
    assert!(regen.current().is_none());
    assert!(regen.elapsed() < pause, "elapsed {:?}", regen.elapsed());
}

#[test]
fn four_d_programs_resolve_w() {
    let mut regen = regenerator(RecordingBackend::default(), 3);
    let config = RenderConfiguration {
        dimensions: Dimensionality::FourD,
        ..RenderConfiguration::default()
    };
    let program = regen.regenerate(&config).unwrap();
    assert_eq!(program.w_location(), Some(1));
    assert!(program.sources().fragment.contains("uniform float w;"));
}

#[test]
fn fragment_failure_is_reported_and_cleans_up() {
    let backend = RecordingBackend {
        fail_fragment: Some("0:3: syntax error".into()),
        ..RecordingBackend::default()
    };
    let mut regen = regenerator(backend, 4);
    let err = match regen.regenerate(&RenderConfiguration::default()) {
        Ok(_) => panic!("fragment compile should fail"),
        Err(err) => err,
    };
    assert!(matches!(
        err,
        RegenerateError::Compile {
            stage: ShaderStage::Fragment,
            ..
        }
    ));
    assert_eq!(err.log(), "0:3: syntax error");
    assert!(regen.current().is_none());
    assert_eq!(
        regen.backend().calls,
        vec![
            Call::Compile(ShaderStage::Vertex, 1),
            Call::DeleteShader(1),
        ]
    );
}

#[test]
fn link_failure_releases_both_stages() {
    let backend = RecordingBackend {
        fail_link: Some("varying mismatch".into()),
        ..RecordingBackend::default()
    };
    let mut regen = regenerator(backend, 5);
    let err = match regen.regenerate(&RenderConfiguration::default()) {
        Ok(_) => panic!("link should fail"),
        Err(err) => err,
    };
    assert!(err.to_string().contains("varying mismatch"));
    assert_eq!(
        regen.backend().count(|call| matches!(call, Call::DeleteShader(_))),
        2
    );
}

#[test]
fn changing_color_model_regenerates_exactly_once() {
    let session = ArtSession::start(
        RenderConfiguration::default(),
        regenerator(RecordingBackend::default(), 6),
    );
    let mut session = match session {
        Ok(session) => session,
        Err(err) => panic!("initial build failed: {err}"),
    };
    assert_eq!(session.regenerator().backend().links(), 1);

    let changed = session
        .apply(ConfigAction::SetColorModel(ColorModel::Hsv))
        .unwrap();
    assert!(changed);
    assert_eq!(session.regenerator().backend().links(), 2);

    let fragment = &session.program().expect("live program").sources().fragment;
    assert!(fragment.contains("float H = o.x * 6.0;"));
    assert!(!fragment.contains("gl_FragColor = vec4(o, 1.0);"));
}

#[test]
fn unchanged_action_keeps_program() {
    let mut session = match ArtSession::start(
        RenderConfiguration::default(),
        regenerator(RecordingBackend::default(), 7),
    ) {
        Ok(session) => session,
        Err(err) => panic!("initial build failed: {err}"),
    };
    let before = session.program().map(|program| *program.program());
    let changed = session
        .apply(ConfigAction::SetColorModel(ColorModel::Rgb))
        .unwrap();
    assert!(!changed);
    assert_eq!(session.regenerator().backend().links(), 1);
    assert_eq!(session.program().map(|program| *program.program()), before);
}

#[test]
fn same_script_reproduces_the_same_program() {
    let build = || {
        let mut regen = Regenerator::new(
            RecordingBackend::default(),
            Assembler::new(0, GlslDialect::Glsl110),
            Box::new(ScriptedSource::picks([0, 1, 2])),
        );
        let program = regen.regenerate(&RenderConfiguration::default()).unwrap();
        program.sources().clone()
    };
    let first = build();
    assert_eq!(first, build());
    assert!(first.fragment.contains("vec3 o = vec3(n(x), n(y), n(t));"));
}
