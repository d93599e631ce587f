//! Particle field generation.
//!
//! A [`ParticleField`] is the one-shot batch output of the generator: four
//! parallel flat buffers (positions, HDR colors, twinkle phases, size
//! scales) partitioned into a shell block followed by a core block. Shell
//! particles sit directly on the heart surface and carry colors above the
//! bloom threshold; core particles are pulled radially inward by a power-law
//! factor and share one dim color that stays below the threshold even under
//! heavy additive overlap.
//!
//! The field is immutable once generated. A configuration change regenerates
//! a whole new field and swaps it in; nothing is edited in place. The random
//! source is injected so a seeded RNG reproduces a field bit for bit.

use bytemuck::{Pod, Zeroable};
use rand::Rng;
use std::f32::consts::{PI, TAU};

use crate::config::FieldConfig;
use crate::error::ConfigError;
use crate::surface;

/// Interleaved per-particle vertex record uploaded to the GPU.
///
/// Field order keeps the struct at 32 bytes with natural alignment; the
/// vertex attribute offsets in the render pipeline must match this layout.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleVertex {
    /// World-space position.
    pub position: [f32; 3],
    /// Twinkle phase seed in [0, 1).
    pub random_phase: f32,
    /// HDR emissive color; shell channels intentionally exceed 1.0.
    pub color: [f32; 3],
    /// Relative point size multiplier.
    pub size_scale: f32,
}

/// An immutable generated particle set.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleField {
    positions: Vec<f32>,
    colors: Vec<f32>,
    random_phase: Vec<f32>,
    size_scale: Vec<f32>,
    shell_count: usize,
    core_count: usize,
}

impl ParticleField {
    /// Generate a field from a configuration and an injected random source.
    ///
    /// Draw order per particle is fixed (u, v, then color choice for shell or
    /// radial pull for core, then phase), so the same seed always reproduces
    /// identical buffers. Fails with [`ConfigError`] before any allocation if
    /// the configuration is invalid.
    pub fn generate<R: Rng>(cfg: &FieldConfig, rng: &mut R) -> Result<Self, ConfigError> {
        cfg.validate()?;

        let shell_count = cfg.shell_count() as usize;
        let core_count = cfg.core_count() as usize;
        let total = shell_count + core_count;

        let mut positions = Vec::with_capacity(total * 3);
        let mut colors = Vec::with_capacity(total * 3);
        let mut random_phase = Vec::with_capacity(total);
        let mut size_scale = Vec::with_capacity(total);

        let mut push_position = |p: glam::Vec3| {
            // A NaN here would upload as an invisible corrupted particle with
            // no diagnostic, so fail loudly in testing builds instead.
            debug_assert!(
                p.is_finite(),
                "surface sampling produced a non-finite position: {:?}",
                p
            );
            positions.extend_from_slice(&[p.x, p.y, p.z]);
        };

        // Shell block: directly on the surface, HDR colors, larger points.
        for _ in 0..shell_count {
            let u = rng.gen::<f32>() * TAU;
            let v = rng.gen::<f32>() * PI;
            let p = surface::heart_point(u, v, cfg.normalize_factor, cfg.z_scale);
            push_position(p);

            let color = if rng.gen::<f32>() < cfg.highlight_probability {
                cfg.shell_highlight_color
            } else {
                cfg.shell_accent_color
            };
            colors.extend_from_slice(&[color.x, color.y, color.z]);
            random_phase.push(rng.gen::<f32>());
            size_scale.push(cfg.shell_size_scale);
        }

        // Core block: same surface sampling, then pulled toward the origin by
        // a power-law radius so the interior fills without looking uniform.
        for _ in 0..core_count {
            let u = rng.gen::<f32>() * TAU;
            let v = rng.gen::<f32>() * PI;
            let p = surface::heart_point(u, v, cfg.normalize_factor, cfg.z_scale);
            let r = rng.gen::<f32>().powf(cfg.core_exponent);
            push_position(p * r);

            let color = cfg.core_color;
            colors.extend_from_slice(&[color.x, color.y, color.z]);
            random_phase.push(rng.gen::<f32>());
            size_scale.push(cfg.core_size_scale);
        }

        Ok(Self {
            positions,
            colors,
            random_phase,
            size_scale,
            shell_count,
            core_count,
        })
    }

    /// Total number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.shell_count + self.core_count
    }

    /// True only for a field that was generated with zero particles, which
    /// `generate` refuses to do.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of shell particles. The shell block occupies indices
    /// `0..shell_count()`.
    #[inline]
    pub fn shell_count(&self) -> usize {
        self.shell_count
    }

    /// Number of core particles. The core block occupies indices
    /// `shell_count()..len()`.
    #[inline]
    pub fn core_count(&self) -> usize {
        self.core_count
    }

    /// Flat xyz position buffer, three floats per particle.
    #[inline]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Flat rgb HDR color buffer, three floats per particle.
    #[inline]
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// Per-particle twinkle phase seeds in [0, 1).
    #[inline]
    pub fn random_phase(&self) -> &[f32] {
        &self.random_phase
    }

    /// Per-particle point size multipliers.
    #[inline]
    pub fn size_scale(&self) -> &[f32] {
        &self.size_scale
    }

    /// Position of one particle.
    pub fn position(&self, index: usize) -> glam::Vec3 {
        let i = index * 3;
        glam::Vec3::new(self.positions[i], self.positions[i + 1], self.positions[i + 2])
    }

    /// Largest color channel of one particle. Shell particles exceed the
    /// bloom threshold here; core particles stay below it.
    pub fn max_channel(&self, index: usize) -> f32 {
        let i = index * 3;
        self.colors[i].max(self.colors[i + 1]).max(self.colors[i + 2])
    }

    /// Interleave the four buffers into GPU vertex records.
    pub fn vertices(&self) -> Vec<ParticleVertex> {
        (0..self.len())
            .map(|i| ParticleVertex {
                position: [
                    self.positions[i * 3],
                    self.positions[i * 3 + 1],
                    self.positions[i * 3 + 2],
                ],
                random_phase: self.random_phase[i],
                color: [
                    self.colors[i * 3],
                    self.colors[i * 3 + 1],
                    self.colors[i * 3 + 2],
                ],
                size_scale: self.size_scale[i],
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn small_config(count: u32) -> FieldConfig {
        FieldConfig {
            count,
            ..FieldConfig::default()
        }
    }

    #[test]
    fn test_buffer_lengths_match_count() {
        let cfg = small_config(500);
        let mut rng = SmallRng::seed_from_u64(7);
        let field = ParticleField::generate(&cfg, &mut rng).unwrap();

        assert_eq!(field.len(), 500);
        assert_eq!(field.positions().len(), 1500);
        assert_eq!(field.colors().len(), 1500);
        assert_eq!(field.random_phase().len(), 500);
        assert_eq!(field.size_scale().len(), 500);
    }

    #[test]
    fn test_shell_block_precedes_core_block() {
        let cfg = small_config(200);
        let mut rng = SmallRng::seed_from_u64(3);
        let field = ParticleField::generate(&cfg, &mut rng).unwrap();

        for i in 0..field.shell_count() {
            assert!((field.size_scale()[i] - cfg.shell_size_scale).abs() < 1e-6);
        }
        for i in field.shell_count()..field.len() {
            assert!((field.size_scale()[i] - cfg.core_size_scale).abs() < 1e-6);
        }
    }

    #[test]
    fn test_random_phase_in_unit_interval() {
        let cfg = small_config(1000);
        let mut rng = SmallRng::seed_from_u64(11);
        let field = ParticleField::generate(&cfg, &mut rng).unwrap();

        for &phase in field.random_phase() {
            assert!((0.0..1.0).contains(&phase));
        }
    }

    #[test]
    fn test_core_positions_strictly_inside_shell_bound() {
        let cfg = small_config(2000);
        let mut rng = SmallRng::seed_from_u64(19);
        let field = ParticleField::generate(&cfg, &mut rng).unwrap();
        let bound = cfg.bounding_radius() + 1e-3;

        for i in field.shell_count()..field.len() {
            assert!(field.position(i).length() <= bound);
        }
    }

    #[test]
    fn test_shell_colors_are_configured_constants() {
        let cfg = small_config(300);
        let mut rng = SmallRng::seed_from_u64(23);
        let field = ParticleField::generate(&cfg, &mut rng).unwrap();

        let highlight = cfg.shell_highlight_color;
        let accent = cfg.shell_accent_color;
        for i in 0..field.shell_count() {
            let c = glam::Vec3::new(
                field.colors()[i * 3],
                field.colors()[i * 3 + 1],
                field.colors()[i * 3 + 2],
            );
            assert!(c == highlight || c == accent, "unexpected shell color {:?}", c);
        }
    }

    #[test]
    fn test_invalid_config_fails_before_generation() {
        let mut rng = SmallRng::seed_from_u64(1);
        let cfg = FieldConfig {
            count: 0,
            ..FieldConfig::default()
        };
        assert!(ParticleField::generate(&cfg, &mut rng).is_err());
    }

    #[test]
    fn test_vertices_interleave_in_order() {
        let cfg = small_config(64);
        let mut rng = SmallRng::seed_from_u64(5);
        let field = ParticleField::generate(&cfg, &mut rng).unwrap();
        let verts = field.vertices();

        assert_eq!(verts.len(), 64);
        for (i, v) in verts.iter().enumerate() {
            assert_eq!(v.position, [
                field.positions()[i * 3],
                field.positions()[i * 3 + 1],
                field.positions()[i * 3 + 2],
            ]);
            assert_eq!(v.random_phase, field.random_phase()[i]);
            assert_eq!(v.size_scale, field.size_scale()[i]);
        }
    }

    #[test]
    fn test_vertex_record_is_32_bytes() {
        // The render pipeline's attribute offsets depend on this layout.
        assert_eq!(std::mem::size_of::<ParticleVertex>(), 32);
    }
}
