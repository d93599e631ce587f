//! Per-particle pulse shading.
//!
//! Each particle twinkles by modulating its point size with a sine wave whose
//! phase is decorrelated through the per-particle `random_phase` attribute,
//! and fades radially from the sprite center in the fragment stage. The
//! shader runs on the GPU; this module also keeps CPU mirrors of both curves
//! so their properties can be tested without a device.

use crate::config::FieldConfig;

/// Parameters of the twinkle oscillation.
///
/// The pulse evaluated at time `t` for a particle with phase seed `r` is
/// `sin(t * frequency + r * phase_spread) * amplitude + bias`, so it stays
/// within `[bias - amplitude, bias + amplitude]` and repeats with period
/// `2pi / frequency`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PulseParams {
    /// Angular frequency of the twinkle in radians per second.
    pub frequency: f32,
    /// Half-range of the size modulation.
    pub amplitude: f32,
    /// Center of the size modulation. Keep `bias > amplitude` so the pulse
    /// never collapses a particle to zero size.
    pub bias: f32,
    /// How far apart `random_phase` values spread particle phases.
    pub phase_spread: f32,
}

impl Default for PulseParams {
    fn default() -> Self {
        Self {
            frequency: 3.0,
            amplitude: 0.3,
            bias: 0.9,
            phase_spread: 15.0,
        }
    }
}

impl PulseParams {
    /// CPU mirror of the vertex-stage size pulse.
    #[inline]
    pub fn pulse(&self, time: f32, phase: f32) -> f32 {
        (time * self.frequency + phase * self.phase_spread).sin() * self.amplitude + self.bias
    }

    /// Period of the pulse in seconds.
    #[inline]
    pub fn period(&self) -> f32 {
        std::f32::consts::TAU / self.frequency
    }
}

/// CPU mirror of the fragment-stage radial falloff.
///
/// `d` is the distance from the sprite center in point-coordinate units
/// (center `0`, edge `0.5`). Returns `1` at the center, decreases
/// monotonically, and is exactly zero past the circular mask.
#[inline]
pub fn falloff(d: f32, exponent: f32) -> f32 {
    if d > 0.5 {
        0.0
    } else {
        (1.0 - 2.0 * d).powf(exponent)
    }
}

/// Generate the WGSL render shader for the particle field.
///
/// Pulse and falloff constants are baked into the source; everything that
/// changes per frame arrives through the uniform block. The vertex stage
/// billboards each particle into a screen-facing quad whose pixel size is
/// `point_base_size * size_scale * pulse * pixel_ratio / depth`, matching
/// point-sprite semantics under perspective.
pub fn render_shader(cfg: &FieldConfig) -> String {
    let PulseParams {
        frequency,
        amplitude,
        bias,
        phase_spread,
    } = cfg.pulse;
    let falloff_exponent = cfg.falloff_exponent;

    format!(
        r#"struct Uniforms {{
    view_proj: mat4x4<f32>,
    time: f32,
    pixel_ratio: f32,
    point_base_size: f32,
    field_scale: f32,
    resolution: vec2<f32>,
    _pad: vec2<f32>,
}};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexOutput {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
    @location(1) point_coord: vec2<f32>,
}};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) position: vec3<f32>,
    @location(1) random_phase: f32,
    @location(2) color: vec3<f32>,
    @location(3) size_scale: f32,
) -> VertexOutput {{
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-0.5, -0.5),
        vec2<f32>( 0.5, -0.5),
        vec2<f32>(-0.5,  0.5),
        vec2<f32>(-0.5,  0.5),
        vec2<f32>( 0.5, -0.5),
        vec2<f32>( 0.5,  0.5),
    );
    let quad = quad_vertices[vertex_index];

    // The heartbeat scales the whole field, never individual particles.
    let world_pos = vec4<f32>(position * uniforms.field_scale, 1.0);
    var clip_pos = uniforms.view_proj * world_pos;

    // Twinkle: per-particle phase offset decorrelates the sine waves.
    let pulse = sin(uniforms.time * {frequency}f + random_phase * {phase_spread}f) * {amplitude}f + {bias}f;

    // Perspective-corrected point size in pixels. clip_pos.w equals the
    // negated view-space z for a standard projection.
    let depth = max(clip_pos.w, 0.1);
    let size_px = uniforms.point_base_size * size_scale * pulse * uniforms.pixel_ratio / depth;

    clip_pos.x += quad.x * size_px * 2.0 / uniforms.resolution.x * clip_pos.w;
    clip_pos.y += quad.y * size_px * 2.0 / uniforms.resolution.y * clip_pos.w;

    var out: VertexOutput;
    out.clip_position = clip_pos;
    out.color = color;
    out.point_coord = quad + vec2<f32>(0.5);
    return out;
}}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let d = distance(in.point_coord, vec2<f32>(0.5));
    if d > 0.5 {{
        discard;
    }}

    // Soft glow gradient from the sprite center outward.
    let strength = pow(1.0 - 2.0 * d, {falloff_exponent}f);
    return vec4<f32>(in.color * strength, 1.0);
}}
"#
    )
}
