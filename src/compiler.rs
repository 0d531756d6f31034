//! Gradient and pattern shader program generation.
//!
//! [`compile`] maps a gradient configuration to a self-contained fragment
//! program (SkSL dialect, the host renderer's shading language) plus the
//! ordered uniform table the program declares. The table is computed first
//! and the source is templated over it, so declared names and bound names
//! can never drift apart, and identical input always yields byte-identical
//! output.
//!
//! The generated program frames a screen coordinate into `(s, t)` gradient
//! space — `s` along the axis, `t` across it — then samples either the plain
//! interpolated gradient or one of the repeating pattern functions.

use crate::gradient::{GradientMetadata, GradientShape, Pattern};
use crate::math::Vec2;
use smallvec::SmallVec;

/// A named parameter bound into a generated program.
#[derive(Debug, Clone, PartialEq)]
pub struct Uniform {
    pub name: String,
    pub value: UniformValue,
}

/// The value bound to a [`Uniform`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// A 2D point, or an `(alpha, left)` pair packed into one.
    Vec2(Vec2),
    /// A normalized RGB color.
    Vec3([f32; 3]),
}

/// A generated fragment program with its uniform table.
///
/// # Examples
///
/// ```
/// use smallvec::smallvec;
/// use tinta::{compile, Color, GradientMetadata, GradientShape, GradientStop, Vec2};
///
/// let metadata = GradientMetadata {
///     shape: GradientShape::Linear,
///     control_point_offsets: smallvec![Vec2::new(0.0, -10.0), Vec2::new(0.0, 10.0)],
///     stops: vec![
///         GradientStop { color: Color::BLACK, alpha: 1.0, left: 0.0 },
///         GradientStop { color: Color::WHITE, alpha: 1.0, left: 1.0 },
///     ],
///     ..GradientMetadata::default()
/// };
/// let program = compile(&metadata).unwrap();
/// assert_eq!(program.uniforms.len(), 6);
/// assert!(program.source.contains("linearSt"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledProgram {
    /// Fragment program source text.
    pub source: String,
    /// Uniforms in declaration order: `cp0`, `cp1`, stop colors, stop
    /// `(alpha, left)` pairs.
    pub uniforms: SmallVec<[Uniform; 8]>,
}

// ── Uniform naming ───────────────────────────────────────────────────────────

pub(crate) fn control_point_uniform(index: usize) -> String {
    format!("cp{index}")
}

fn stop_color_uniform(index: usize) -> String {
    format!("s{index}c")
}

fn stop_alpha_left_uniform(index: usize) -> String {
    format!("s{index}al")
}

/// Premultiplied color expression for stop `index`: alpha lives in `.x` of
/// the packed pair.
fn stop_color_expr(index: usize) -> String {
    format!("(vec4(s{index}c,1.0) * s{index}al.x)")
}

fn stop_left_expr(index: usize) -> String {
    format!("s{index}al.y")
}

fn frame_function(shape: GradientShape) -> &'static str {
    match shape {
        GradientShape::Linear => "linearSt",
        GradientShape::Radial => "radialSt",
    }
}

fn pattern_function(pattern: Option<Pattern>) -> &'static str {
    match pattern {
        None => "gradient",
        Some(Pattern::Stripe) => "stripe",
        Some(Pattern::Sin) => "sinWave",
        Some(Pattern::TriangleWave) => "triangleWave",
        Some(Pattern::Hatch) => "hatch",
        Some(Pattern::Checker) => "checker",
    }
}

// ── Compilation ──────────────────────────────────────────────────────────────

/// Compiles a gradient configuration into a fragment program.
///
/// Pure and deterministic. Returns `None` for a structurally incomplete
/// configuration (fewer than two stops or control points) — the no-effect
/// case, not an error. Coincident control points are defined behavior: the
/// generated framers map every coordinate to the origin instead of dividing
/// by zero.
pub fn compile(metadata: &GradientMetadata) -> Option<CompiledProgram> {
    if !metadata.is_complete() {
        return None;
    }
    let uniforms = uniform_table(metadata);
    let source = emit_source(metadata, &uniforms);
    Some(CompiledProgram { source, uniforms })
}

fn uniform_table(metadata: &GradientMetadata) -> SmallVec<[Uniform; 8]> {
    let mut uniforms = SmallVec::new();
    for (i, offset) in metadata.control_point_offsets.iter().enumerate() {
        uniforms.push(Uniform {
            name: control_point_uniform(i),
            value: UniformValue::Vec2(*offset),
        });
    }
    for (i, stop) in metadata.stops.iter().enumerate() {
        uniforms.push(Uniform {
            name: stop_color_uniform(i),
            value: UniformValue::Vec3(stop.color.normalize()),
        });
    }
    for (i, stop) in metadata.stops.iter().enumerate() {
        uniforms.push(Uniform {
            name: stop_alpha_left_uniform(i),
            value: UniformValue::Vec2(Vec2::new(stop.alpha, stop.left)),
        });
    }
    uniforms
}

// ── Source emission ──────────────────────────────────────────────────────────

/// Coordinate framers shared by every program. Both define coincident
/// control points to map everywhere to the origin.
const FRAMING_FUNCTIONS: &str = "const float PI = 3.1415926538;

vec2 linearSt(vec2 p, vec2 a, vec2 b) {
    vec2 ab = b - a;
    vec2 ap = p - a;
    float denom = dot(ab, ab);
    if (denom == 0.0) { return vec2(0.0); }

    vec2 perpab = vec2(ab.y, -ab.x);
    return vec2(dot(ap, ab) / denom, dot(ap, perpab) / denom);
}

vec2 radialSt(vec2 p, vec2 a, vec2 b) {
    vec2 ab = b - a;
    vec2 ap = p - a;
    if (a == b) { return vec2(0.0); }
    float det = ab.x * ap.y - ab.y * ap.x;
    float angle = atan(det, dot(ab, ap));
    return vec2(length(ap) / length(ab), 4.0 * angle / PI);
}
";

fn emit_source(metadata: &GradientMetadata, uniforms: &[Uniform]) -> String {
    let mut src = String::new();
    for uniform in uniforms {
        let ty = match uniform.value {
            UniformValue::Vec2(_) => "vec2",
            UniformValue::Vec3(_) => "vec3",
        };
        src.push_str(&format!("uniform {ty} {};\n", uniform.name));
    }
    src.push('\n');
    src.push_str(FRAMING_FUNCTIONS);
    src.push('\n');
    src.push_str(&emit_gradient_function(metadata.stops.len()));
    src.push('\n');
    src.push_str(&emit_pattern_functions(metadata.stops.len()));
    src.push('\n');
    src.push_str(&emit_entry_point(metadata));
    src
}

/// The N-stop interpolation chain. Bracketing is closed on the left:
/// `st.s <= left[i]` selects the bracket ending at stop `i`, everything past
/// the last stop clamps to it.
fn emit_gradient_function(stop_count: usize) -> String {
    let mut src = String::new();
    src.push_str("vec4 gradient(vec2 st) {\n");
    src.push_str(&format!(
        "    if (st.s <= {}) return {};\n",
        stop_left_expr(0),
        stop_color_expr(0),
    ));
    for i in 1..stop_count {
        let prev = i - 1;
        src.push_str(&format!(
            "    else if (st.s <= {left}) {{\n        float a = (st.s - {prev_left}) / ({left} - {prev_left});\n        return mix({prev_color}, {color}, a);\n    }}\n",
            left = stop_left_expr(i),
            prev_left = stop_left_expr(prev),
            prev_color = stop_color_expr(prev),
            color = stop_color_expr(i),
        ));
    }
    src.push_str(&format!(
        "    else return {};\n}}\n",
        stop_color_expr(stop_count - 1),
    ));
    src
}

/// The repeating pattern functions. All are two-color, built from the first
/// and last stop; the wave variants perturb `s` by a function of `t` before
/// thresholding.
fn emit_pattern_functions(stop_count: usize) -> String {
    let first = stop_color_expr(0);
    let last = stop_color_expr(stop_count - 1);
    format!(
        "vec4 stripe(vec2 st) {{
    return mix({first}, {last},
        smoothstep(-0.01, 0.01, sin(st.s * 2.0 * PI)));
}}

vec4 sinWave(vec2 st) {{
    return stripe(st + vec2(0.2 * sin(st.t * PI)));
}}

vec4 triangleWave(vec2 st) {{
    float a = 0.2;
    float wave = 4.0 * a * abs(fract(st.t - 0.25) - 0.5) - a;
    return stripe(st + vec2(wave));
}}

vec4 hatch(vec2 st) {{
    return any(lessThan(fract(st), vec2(0.1)))
        ? {first} : {last};
}}

vec4 checker(vec2 st) {{
    bvec2 b = lessThan(fract(st), vec2(0.5));
    return b[0] != b[1] ? {first} : {last};
}}
"
    )
}

fn emit_entry_point(metadata: &GradientMetadata) -> String {
    format!(
        "half4 main(in vec2 coord) {{
    vec2 st = {frame}(coord, cp0, cp1);
    return {pattern}(st);
}}
",
        frame = frame_function(metadata.shape),
        pattern = pattern_function(metadata.pattern),
    )
}
