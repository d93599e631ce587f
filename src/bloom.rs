//! Bloom threshold coupling and the post-process glow shader.
//!
//! The whole visual trick of the heart cloud is that shell particles carry
//! HDR colors above the bloom luminance threshold while core particles stay
//! below it even when dozens of them overlap under additive blending. That
//! separation is a generation-time contract, not a runtime behavior: the
//! color constants and the threshold are chosen together, checked once at
//! startup via [`check_contract`], and the glow pass simply trusts them.

use bytemuck::{Pod, Zeroable};

use crate::error::ConfigError;

/// Tuning for the post-process glow pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BloomConfig {
    /// Brightness cutoff. Only fragments whose largest color channel exceeds
    /// this value feed the glow chain. Must satisfy the shell/core contract.
    pub threshold: f32,
    /// Overall glow intensity applied at composite time.
    pub intensity: f32,
    /// Blur tap radius multiplier. Smaller values give a tighter halo.
    pub radius: f32,
    /// Number of half-resolution mip levels in the blur chain.
    pub levels: u32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            threshold: 1.5,
            intensity: 1.5,
            radius: 0.3,
            levels: 8,
        }
    }
}

/// Verify the threshold strictly separates shell and core intensities.
///
/// `shell_floor` is the smallest max-channel value any shell particle can be
/// assigned; `core_ceiling` is the largest max-channel value any core
/// particle can be assigned. The contract requires
/// `shell_floor > threshold > core_ceiling`.
pub fn check_contract(
    shell_floor: f32,
    core_ceiling: f32,
    threshold: f32,
) -> Result<(), ConfigError> {
    if shell_floor > threshold && threshold > core_ceiling {
        Ok(())
    } else {
        Err(ConfigError::BloomContract {
            shell_floor,
            core_ceiling,
            threshold,
        })
    }
}

/// GPU uniform for the bloom passes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct BloomParams {
    pub threshold: f32,
    pub intensity: f32,
    pub radius: f32,
    pub _pad: f32,
}

impl BloomParams {
    pub(crate) fn from_config(cfg: &BloomConfig) -> Self {
        Self {
            threshold: cfg.threshold,
            intensity: cfg.intensity,
            radius: cfg.radius,
            _pad: 0.0,
        }
    }
}

/// WGSL source for every bloom pass: extract, downsample, upsample, composite.
///
/// The extract cutoff uses the max channel rather than perceptual luminance
/// so it matches the generation-time contract exactly. The composite pass
/// tonemaps the HDR sum and darkens the frame edges with a vignette.
pub(crate) const BLOOM_SHADER: &str = r#"
struct BloomParams {
    threshold: f32,
    intensity: f32,
    radius: f32,
    _pad: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> params: BloomParams;
@group(1) @binding(0)
var input_tex: texture_2d<f32>;
@group(1) @binding(1)
var input_sampler: sampler;
@group(2) @binding(0)
var bloom_tex: texture_2d<f32>;

@vertex
fn vs_fullscreen(@builtin(vertex_index) idx: u32) -> VertexOutput {
    let uv = vec2<f32>(f32((idx << 1u) & 2u), f32(idx & 2u));
    var out: VertexOutput;
    out.clip_position = vec4<f32>(uv * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(uv.x, 1.0 - uv.y);
    return out;
}

@fragment
fn fs_extract(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(input_tex, input_sampler, in.uv).rgb;
    let peak = max(color.r, max(color.g, color.b));
    let factor = max(peak - params.threshold, 0.0) / max(peak, 0.0001);
    return vec4<f32>(color * factor, 1.0);
}

@fragment
fn fs_downsample(in: VertexOutput) -> @location(0) vec4<f32> {
    let dims = vec2<f32>(textureDimensions(input_tex));
    let texel = params.radius / dims;
    let a = textureSample(input_tex, input_sampler, in.uv + vec2(-texel.x, -texel.y)).rgb;
    let b = textureSample(input_tex, input_sampler, in.uv + vec2( texel.x, -texel.y)).rgb;
    let c = textureSample(input_tex, input_sampler, in.uv + vec2(-texel.x,  texel.y)).rgb;
    let d = textureSample(input_tex, input_sampler, in.uv + vec2( texel.x,  texel.y)).rgb;
    return vec4<f32>((a + b + c + d) * 0.25, 1.0);
}

@fragment
fn fs_upsample(in: VertexOutput) -> @location(0) vec4<f32> {
    // Blended additively into the level above by the pipeline.
    let color = textureSample(input_tex, input_sampler, in.uv).rgb;
    return vec4<f32>(color, 1.0);
}

fn aces_tonemap(hdr: vec3<f32>) -> vec3<f32> {
    let a = 2.51;
    let b = 0.03;
    let c = 2.43;
    let d = 0.59;
    let e = 0.14;
    return clamp(
        (hdr * (a * hdr + b)) / (hdr * (c * hdr + d) + e),
        vec3<f32>(0.0),
        vec3<f32>(1.0),
    );
}

@fragment
fn fs_composite(in: VertexOutput) -> @location(0) vec4<f32> {
    let scene = textureSample(input_tex, input_sampler, in.uv).rgb;
    let glow = textureSample(bloom_tex, input_sampler, in.uv).rgb;
    var color = aces_tonemap(scene + glow * params.intensity);

    // Edge vignette.
    let offset = 0.1;
    let darkness = 1.1;
    let dist = length(in.uv - vec2<f32>(0.5)) * darkness;
    color *= 1.0 - smoothstep(offset, 1.0, dist);

    return vec4<f32>(color, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_satisfies_contract() {
        let cfg = BloomConfig::default();
        // Default shell accent floor 3.5, core ceiling 0.4.
        assert!(check_contract(3.5, 0.4, cfg.threshold).is_ok());
    }

    #[test]
    fn test_contract_rejects_low_threshold() {
        let err = check_contract(3.5, 0.4, 0.2).unwrap_err();
        assert!(matches!(err, ConfigError::BloomContract { .. }));
    }

    #[test]
    fn test_contract_rejects_high_threshold() {
        assert!(check_contract(3.5, 0.4, 4.0).is_err());
    }

    #[test]
    fn test_contract_rejects_equal_bounds() {
        // Strict inequality on both sides.
        assert!(check_contract(1.5, 0.4, 1.5).is_err());
        assert!(check_contract(3.5, 1.5, 1.5).is_err());
    }

    #[test]
    fn test_bloom_shader_is_valid_wgsl() {
        let module = naga::front::wgsl::parse_str(BLOOM_SHADER).expect("bloom WGSL parses");
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .expect("bloom WGSL validates");
    }
}
