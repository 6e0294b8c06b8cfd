use std::borrow::Cow;

use artgen::assemble::block;
use artgen::{ShaderBackend, ShaderStage};
use wgpu::naga;

/// std140 blocks are sized in 16-byte steps.
const BLOCK_ALIGNMENT: u64 = 16;

/// Member of the art uniform block as laid out by the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BlockMember {
    name: String,
    offset: u32,
}

/// One compiled GLSL stage plus the uniform block layout it declares.
pub struct StageModule {
    stage: ShaderStage,
    module: wgpu::ShaderModule,
    members: Vec<BlockMember>,
    block_size: u64,
}

/// Linked render pipeline with its own uniform buffer.
pub struct WgpuProgram {
    pub(crate) pipeline: wgpu::RenderPipeline,
    pub(crate) bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    members: Vec<BlockMember>,
}

/// Byte offset of a uniform inside the program's uniform buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformSlot {
    offset: u64,
}

/// [`ShaderBackend`] that compiles GLSL through wgpu's naga frontend.
///
/// Compile and link failures are caught with validation error scopes so they
/// surface as diagnostics instead of device-loss panics.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    uniform_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
}

impl WgpuBackend {
    pub(crate) fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("art uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: block::BINDING,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("art pipeline layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        Self {
            device: device.clone(),
            queue: queue.clone(),
            surface_format,
            uniform_layout,
            pipeline_layout,
        }
    }

    /// Writes one float uniform; the GPU sees it on the next submit.
    pub(crate) fn set_uniform(&self, program: &WgpuProgram, slot: UniformSlot, value: f32) {
        self.queue
            .write_buffer(&program.uniform_buffer, slot.offset, bytemuck::bytes_of(&value));
    }

    fn with_validation<T>(&self, build: impl FnOnce(&wgpu::Device) -> T) -> Result<T, String> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = build(&self.device);
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(err) => Err(err.to_string()),
            None => Ok(value),
        }
    }
}

impl ShaderBackend for WgpuBackend {
    type Shader = StageModule;
    type Program = WgpuProgram;
    type Uniform = UniformSlot;

    fn compile(&mut self, stage: ShaderStage, source: &str) -> Result<StageModule, String> {
        let naga_stage = naga_stage(stage);
        let module = self.with_validation(|device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(match stage {
                    ShaderStage::Vertex => "art vertex",
                    ShaderStage::Fragment => "art fragment",
                }),
                source: wgpu::ShaderSource::Glsl {
                    shader: Cow::Owned(source.to_owned()),
                    stage: naga_stage,
                    defines: &[],
                },
            })
        })?;
        let (members, block_size) = reflect_uniform_block(naga_stage, source)?;
        tracing::trace!(%stage, members = members.len(), block_size, "compiled shader stage");

        Ok(StageModule {
            stage,
            module,
            members,
            block_size,
        })
    }

    fn link(&mut self, shaders: &[&StageModule]) -> Result<WgpuProgram, String> {
        let find = |stage: ShaderStage| {
            shaders
                .iter()
                .copied()
                .find(|shader| shader.stage == stage)
                .ok_or_else(|| format!("no {stage} stage attached"))
        };
        let vertex = find(ShaderStage::Vertex)?;
        let fragment = find(ShaderStage::Fragment)?;

        let layout = &self.pipeline_layout;
        let surface_format = self.surface_format;
        let pipeline = self.with_validation(|device| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("art pipeline"),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: &vertex.module,
                    entry_point: Some("main"),
                    buffers: &[],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &fragment.module,
                    entry_point: Some("main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                multiview: None,
                cache: None,
            })
        })?;

        let block_size = shaders
            .iter()
            .map(|shader| shader.block_size)
            .max()
            .unwrap_or(0)
            .max(BLOCK_ALIGNMENT);
        let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("art uniform buffer"),
            size: block_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("art uniform bind group"),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: block::BINDING,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let mut members: Vec<BlockMember> = Vec::new();
        for member in shaders.iter().flat_map(|shader| shader.members.iter()) {
            if !members.contains(member) {
                members.push(member.clone());
            }
        }

        Ok(WgpuProgram {
            pipeline,
            bind_group,
            uniform_buffer,
            members,
        })
    }

    fn uniform_location(&mut self, program: &WgpuProgram, name: &str) -> Option<UniformSlot> {
        let member = block::member_name(name);
        program
            .members
            .iter()
            .find(|candidate| candidate.name == member)
            .map(|candidate| UniformSlot {
                offset: u64::from(candidate.offset),
            })
    }

    fn delete_shader(&mut self, shader: StageModule) {
        tracing::trace!(stage = %shader.stage, "releasing shader stage");
        drop(shader);
    }

    fn delete_program(&mut self, program: WgpuProgram) {
        tracing::trace!("releasing shader program");
        program.uniform_buffer.destroy();
        drop(program);
    }
}

fn naga_stage(stage: ShaderStage) -> naga::ShaderStage {
    match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
    }
}

/// Parses `source` with naga and lists the members of its uniform blocks.
///
/// Returns the members with their byte offsets and the block size rounded up
/// to the std140 alignment.
fn reflect_uniform_block(
    stage: naga::ShaderStage,
    source: &str,
) -> Result<(Vec<BlockMember>, u64), String> {
    let mut frontend = naga::front::glsl::Frontend::default();
    let module = frontend
        .parse(&naga::front::glsl::Options::from(stage), source)
        .map_err(|errors| format!("{errors:?}"))?;

    let mut members = Vec::new();
    let mut block_size = 0u64;
    for (_, global) in module.global_variables.iter() {
        if global.space != naga::AddressSpace::Uniform {
            continue;
        }
        if let naga::TypeInner::Struct {
            members: fields,
            span,
        } = &module.types[global.ty].inner
        {
            block_size = block_size.max(u64::from(*span));
            members.extend(fields.iter().filter_map(|field| {
                Some(BlockMember {
                    name: field.name.clone()?,
                    offset: field.offset,
                })
            }));
        }
    }

    let rounded = block_size.div_ceil(BLOCK_ALIGNMENT) * BLOCK_ALIGNMENT;
    Ok((members, rounded))
}
