//! Turns a [`RenderConfiguration`] plus three random expressions into a
//! complete vertex/fragment program pair.
//!
//! The fragment stage is concatenated in a fixed order:
//!
//! 1. header: version line, `pos` input, the `t` uniform and, in 4D, `w`;
//!    the 450 dialect also defines the constant pass-through `k`
//! 2. the normalizer `float n(float v)`
//! 3. `x`/`y` bound from screen position (cartesian or polar)
//! 4. `vec3 o` built from three normalized expressions
//! 5. the color block writing the output color exactly once

use std::fmt;

use crate::config::{
    ColorModel, CoordinateSystem, Normalizer, RenderConfiguration, DEFAULT_COMPLEXITY,
};
use crate::expr::{self, ConstantStyle, Expr, OPAQUE_CONSTANT_FN};
use crate::random::RandomSource;
use crate::regenerate::{TIME_UNIFORM, W_UNIFORM};

/// Hard ceiling on the size of an assembled fragment source.
pub const MAX_SOURCE_BYTES: usize = 1 << 20;

/// GLSL flavour the assembler emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlslDialect {
    /// `#version 110` with `varying`, plain uniforms and `gl_FragColor`.
    #[default]
    Glsl110,
    /// `#version 450` with explicit locations and a std140 uniform block, as
    /// accepted by naga's GLSL frontend.
    Glsl450,
}

impl GlslDialect {
    /// Name of the variable the fragment stage writes its color into.
    pub fn output_name(self) -> &'static str {
        match self {
            GlslDialect::Glsl110 => "gl_FragColor",
            GlslDialect::Glsl450 => "frag_color",
        }
    }

    /// naga folds literal-only subtrees while parsing and rejects infinite
    /// results, so the 450 dialect keeps constants opaque.
    pub fn constant_style(self) -> ConstantStyle {
        match self {
            GlslDialect::Glsl110 => ConstantStyle::Bare,
            GlslDialect::Glsl450 => ConstantStyle::Opaque,
        }
    }
}

/// Shader stage a source string belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Vertex and fragment sources produced by one assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    pub fn stage(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }
}

/// Uniform block layout shared with the GPU side for [`GlslDialect::Glsl450`].
pub mod block {
    pub const SET: u32 = 0;
    pub const BINDING: u32 = 0;
    /// Block members are named `<prefix><uniform>` and aliased back to the
    /// bare uniform name with `#define`.
    pub const MEMBER_PREFIX: &str = "autoart_";

    /// Block member name backing uniform `name`.
    pub fn member_name(name: &str) -> String {
        format!("{MEMBER_PREFIX}{name}")
    }
}

/// Builds shader programs for a given complexity and dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assembler {
    complexity: usize,
    dialect: GlslDialect,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new(DEFAULT_COMPLEXITY, GlslDialect::default())
    }
}

impl Assembler {
    /// Panics if three worst-case channels at `complexity` cannot fit in
    /// [`MAX_SOURCE_BYTES`]; validate user input with
    /// [`crate::config::validate_complexity`] first.
    pub fn new(complexity: usize, dialect: GlslDialect) -> Self {
        assert!(
            complexity <= crate::config::max_complexity(),
            "complexity {complexity} exceeds the source size ceiling"
        );
        Self {
            complexity,
            dialect,
        }
    }

    pub fn complexity(&self) -> usize {
        self.complexity
    }

    pub fn dialect(&self) -> GlslDialect {
        self.dialect
    }

    /// Generates three channel expressions and assembles both stages.
    pub fn assemble<R: RandomSource + ?Sized>(
        &self,
        config: &RenderConfiguration,
        rng: &mut R,
    ) -> ShaderSources {
        let four_d = config.four_d();
        let channels: [String; 3] = std::array::from_fn(|_| {
            let mut text = String::new();
            expr::generate_into(
                rng,
                self.complexity,
                four_d,
                self.dialect.constant_style(),
                &mut text,
            );
            text
        });
        self.assemble_with(config, &channels)
    }

    /// Renders `expr` the way [`Assembler::assemble`] spells channels in this
    /// dialect.
    pub fn render_channel(&self, expr: &Expr) -> String {
        let mut text = String::new();
        expr.write_styled(&mut text, self.dialect.constant_style());
        text
    }

    /// Assembles both stages around caller-supplied channel expressions.
    pub fn assemble_with(
        &self,
        config: &RenderConfiguration,
        channels: &[String; 3],
    ) -> ShaderSources {
        ShaderSources {
            vertex: self.vertex_source().to_string(),
            fragment: self.fragment_source(config, channels),
        }
    }

    pub fn vertex_source(&self) -> &'static str {
        match self.dialect {
            GlslDialect::Glsl110 => VERTEX_110,
            GlslDialect::Glsl450 => VERTEX_450,
        }
    }

    fn fragment_source(&self, config: &RenderConfiguration, channels: &[String; 3]) -> String {
        let mut source = SourceBuffer::with_capacity(
            channels.iter().map(String::len).sum::<usize>() + 2048,
        );

        self.write_header(&mut source, config.four_d());

        source.push_str(match config.normalizer {
            Normalizer::Mod => NORMALIZE_MOD,
            Normalizer::Sigmoid => NORMALIZE_SIGMOID,
        });

        source.push_str("void main() {\n");
        source.push_str(match config.coordinates {
            CoordinateSystem::Cartesian => COORDS_CARTESIAN,
            CoordinateSystem::Polar => COORDS_POLAR,
        });

        source.push_str("\tvec3 o = vec3(");
        for (index, channel) in channels.iter().enumerate() {
            if index > 0 {
                source.push_str(", ");
            }
            source.push_str("n(");
            source.push_str(channel);
            source.push(')');
        }
        source.push_str(");\n");

        let output = self.dialect.output_name();
        match config.color_model {
            ColorModel::Rgb => {
                source.push_str(&format!("\t{output} = vec4(o, 1.0);\n"));
            }
            ColorModel::Hsv => {
                source.push_str(HSV_TO_RGB);
                source.push_str(&format!("\t{output} = vec4(rgb + m, 1.0);\n"));
            }
        }
        source.push_str("}\n");

        source.into_string()
    }

    fn write_header(&self, source: &mut SourceBuffer, four_d: bool) {
        match self.dialect {
            GlslDialect::Glsl110 => {
                source.push_str("#version 110\n");
                source.push_str("varying vec2 pos;\n");
                source.push_str("uniform float t;\n");
                if four_d {
                    source.push_str("uniform float w;\n");
                }
            }
            GlslDialect::Glsl450 => {
                source.push_str("#version 450\n");
                source.push_str("layout(location = 0) in vec2 pos;\n");
                source.push_str("layout(location = 0) out vec4 frag_color;\n");
                source.push_str(&format!(
                    "layout(std140, set = {}, binding = {}) uniform AutoArtParams {{\n",
                    block::SET,
                    block::BINDING
                ));
                let mut uniforms = vec![TIME_UNIFORM];
                if four_d {
                    uniforms.push(W_UNIFORM);
                }
                for name in &uniforms {
                    source.push_str(&format!("\tfloat {};\n", block::member_name(name)));
                }
                source.push_str("} params;\n");
                for name in &uniforms {
                    source.push_str(&format!(
                        "#define {name} params.{}\n",
                        block::member_name(name)
                    ));
                }
                source.push_str(&format!(
                    "float {OPAQUE_CONSTANT_FN}(float v) {{\n\treturn v;\n}}\n"
                ));
            }
        }
    }
}

/// Growable text buffer that refuses to exceed [`MAX_SOURCE_BYTES`].
///
/// Crossing the ceiling means the complexity validation is wrong, so it is
/// treated as a bug and panics rather than truncating.
#[derive(Debug, Default)]
pub struct SourceBuffer {
    text: String,
}

impl SourceBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity.min(MAX_SOURCE_BYTES)),
        }
    }

    pub fn push_str(&mut self, text: &str) {
        assert!(
            self.text.len() + text.len() <= MAX_SOURCE_BYTES,
            "assembled source would exceed {MAX_SOURCE_BYTES} bytes"
        );
        self.text.push_str(text);
    }

    pub fn push(&mut self, ch: char) {
        assert!(
            self.text.len() + ch.len_utf8() <= MAX_SOURCE_BYTES,
            "assembled source would exceed {MAX_SOURCE_BYTES} bytes"
        );
        self.text.push(ch);
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

const VERTEX_110: &str = "#version 110
varying vec2 pos;
void main() {
	pos = gl_Vertex.xy;
	gl_Position = gl_Vertex;
}
";

/// Full-screen triangle; `pos` carries clip-space position to the fragment stage.
const VERTEX_450: &str = "#version 450
layout(location = 0) out vec2 pos;

const vec2 positions[3] = vec2[3](
	vec2(-1.0, -3.0),
	vec2(3.0, 1.0),
	vec2(-1.0, 1.0)
);

void main() {
	uint vertex_index = uint(gl_VertexIndex);
	vec2 p = positions[vertex_index];
	pos = p;
	gl_Position = vec4(p, 0.0, 1.0);
}
";

const NORMALIZE_MOD: &str = "float n(float v) {
	return mod(v, 1.0);
}
";

const NORMALIZE_SIGMOID: &str = "float n(float v) {
	return 1.0 / (1.0 + exp(-v));
}
";

const COORDS_CARTESIAN: &str = "\tfloat x = pos.x;
	float y = pos.y;
";

const COORDS_POLAR: &str = "\tfloat x = length(pos);
	float y = atan(pos.y, pos.x);
";

/// Piecewise HSV to RGB over six hue sextants. Leaves `rgb` and `m` in scope.
const HSV_TO_RGB: &str = "\tfloat H = o.x * 6.0;
	float C = o.z * o.y;
	float X = C * (1.0 - abs(mod(H, 2.0) - 1.0));
	float m = o.z - C;
	vec3 rgb = vec3(0.0);
	if (H < 1.0) {
		rgb = vec3(C, X, 0.0);
	} else if (H < 2.0) {
		rgb = vec3(X, C, 0.0);
	} else if (H < 3.0) {
		rgb = vec3(0.0, C, X);
	} else if (H < 4.0) {
		rgb = vec3(0.0, X, C);
	} else if (H < 5.0) {
		rgb = vec3(X, 0.0, C);
	} else {
		rgb = vec3(C, 0.0, X);
	}
";
