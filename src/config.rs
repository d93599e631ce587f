//! Field configuration and presets.
//!
//! A [`FieldConfig`] fully determines a generated particle field: population
//! split, surface scaling, HDR color constants, point sizing, pulse motion,
//! and the bloom tuning that the color constants must stay coupled to.
//! Configurations are validated once up front; generation and rendering then
//! trust them.

use glam::Vec3;

use crate::bloom::{self, BloomConfig};
use crate::error::ConfigError;
use crate::shading::PulseParams;
use crate::surface;

/// Complete configuration for a heart particle field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldConfig {
    /// Total number of particles generated.
    pub count: u32,
    /// Fraction of particles placed on the glowing shell. Strictly in (0, 1);
    /// the shell count is `floor(count * shell_fraction)`.
    pub shell_fraction: f32,
    /// Power-law exponent for the core radial pull. Larger values bias more
    /// core particles toward the center.
    pub core_exponent: f32,
    /// Uniform scale applied to raw surface coordinates.
    pub normalize_factor: f32,
    /// Depth scale of the heart surface extrusion.
    pub z_scale: f32,

    /// Probability that a shell particle gets the highlight color instead of
    /// the accent color.
    pub highlight_probability: f32,
    /// Near-white HDR highlight for sparkling shell particles.
    pub shell_highlight_color: Vec3,
    /// Saturated HDR accent for the remaining shell particles.
    pub shell_accent_color: Vec3,
    /// Single dim color shared by every core particle. Its max channel must
    /// stay well below the bloom threshold so that additive overlap near the
    /// origin cannot wash the core out.
    pub core_color: Vec3,
    /// Relative point size for shell particles.
    pub shell_size_scale: f32,
    /// Relative point size for core particles.
    pub core_size_scale: f32,

    /// Base point size in pixels before per-particle scaling.
    pub point_base_size: f32,
    /// Twinkle oscillation parameters.
    pub pulse: PulseParams,
    /// Sharpness of the radial sprite falloff.
    pub falloff_exponent: f32,
    /// Whole-field scale the heartbeat oscillates around.
    pub base_scale: f32,

    /// Post-process glow tuning.
    pub bloom: BloomConfig,
    /// Background clear color.
    pub background_color: Vec3,
    /// Closest the orbit camera may zoom in.
    pub camera_min_distance: f32,
    /// Farthest the orbit camera may zoom out.
    pub camera_max_distance: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self::ember()
    }
}

impl FieldConfig {
    /// The tuned preset: a mostly hollow heart with a high threshold and a
    /// tight, intense glow around the shell.
    pub fn ember() -> Self {
        Self {
            count: 15_000,
            shell_fraction: 0.92,
            core_exponent: 0.5,
            normalize_factor: 0.8,
            z_scale: surface::Z_SCALE,
            highlight_probability: 0.4,
            shell_highlight_color: Vec3::new(4.0, 4.0, 4.5),
            shell_accent_color: Vec3::new(3.5, 0.2, 1.8),
            core_color: Vec3::new(0.4, 0.05, 0.15),
            shell_size_scale: 1.5,
            core_size_scale: 0.6,
            point_base_size: 200.0,
            pulse: PulseParams::default(),
            falloff_exponent: 2.0,
            base_scale: 1.0,
            bloom: BloomConfig::default(),
            background_color: Vec3::new(0.02, 0.004, 0.02),
            camera_min_distance: 15.0,
            camera_max_distance: 60.0,
        }
    }

    /// The earlier, denser preset: a fuller core, a lower threshold, and a
    /// wider glow.
    pub fn classic() -> Self {
        Self {
            shell_fraction: 0.85,
            bloom: BloomConfig {
                threshold: 1.2,
                intensity: 1.2,
                radius: 0.5,
                levels: 6,
            },
            ..Self::ember()
        }
    }

    /// Number of particles assigned to the shell.
    pub fn shell_count(&self) -> u32 {
        (self.count as f64 * self.shell_fraction as f64).floor() as u32
    }

    /// Number of particles assigned to the core.
    pub fn core_count(&self) -> u32 {
        self.count - self.shell_count()
    }

    /// Smallest max-channel value a shell particle can be assigned.
    pub fn shell_color_floor(&self) -> f32 {
        self.shell_highlight_color
            .max_element()
            .min(self.shell_accent_color.max_element())
    }

    /// Largest max-channel value a core particle can be assigned.
    pub fn core_color_ceiling(&self) -> f32 {
        self.core_color.max_element()
    }

    /// Radius of the bounding sphere every generated position lies within.
    pub fn bounding_radius(&self) -> f32 {
        self.normalize_factor * surface::max_extent(self.z_scale)
    }

    /// Check the structural parameters, failing before any allocation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count == 0 {
            return Err(ConfigError::ParticleCount(self.count));
        }
        if !(self.shell_fraction > 0.0 && self.shell_fraction < 1.0) {
            return Err(ConfigError::ShellFraction(self.shell_fraction));
        }
        if !(self.core_exponent.is_finite() && self.core_exponent > 0.0) {
            return Err(ConfigError::CoreExponent(self.core_exponent));
        }
        if !(self.normalize_factor.is_finite() && self.normalize_factor > 0.0) {
            return Err(ConfigError::NormalizeFactor(self.normalize_factor));
        }
        Ok(())
    }

    /// Check the bloom separation invariant: every shell color must land
    /// above the threshold and the core color below it. Call once at startup,
    /// never per frame.
    pub fn check_bloom_contract(&self) -> Result<(), ConfigError> {
        bloom::check_contract(
            self.shell_color_floor(),
            self.core_color_ceiling(),
            self.bloom.threshold,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = FieldConfig::default();
        assert!(cfg.validate().is_ok());
        assert!(cfg.check_bloom_contract().is_ok());
    }

    #[test]
    fn test_classic_preset_is_valid() {
        let cfg = FieldConfig::classic();
        assert!(cfg.validate().is_ok());
        assert!(cfg.check_bloom_contract().is_ok());
        assert!((cfg.shell_fraction - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_population_split_floors() {
        let cfg = FieldConfig {
            count: 1000,
            shell_fraction: 0.92,
            ..FieldConfig::default()
        };
        assert_eq!(cfg.shell_count(), 920);
        assert_eq!(cfg.core_count(), 80);
    }

    #[test]
    fn test_zero_count_rejected() {
        let cfg = FieldConfig {
            count: 0,
            ..FieldConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ParticleCount(0)));
    }

    #[test]
    fn test_shell_fraction_bounds_are_exclusive() {
        for bad in [0.0, 1.0, -0.1, 1.5] {
            let cfg = FieldConfig {
                shell_fraction: bad,
                ..FieldConfig::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::ShellFraction(_))
            ));
        }
    }

    #[test]
    fn test_bloom_contract_violation_detected() {
        let cfg = FieldConfig {
            core_color: Vec3::new(2.0, 2.0, 2.0),
            ..FieldConfig::default()
        };
        assert!(cfg.check_bloom_contract().is_err());
    }

    #[test]
    fn test_color_floor_uses_dimmest_shell_variant() {
        let cfg = FieldConfig::default();
        // Accent max channel (3.5) is below highlight max channel (4.5).
        assert!((cfg.shell_color_floor() - 3.5).abs() < 1e-6);
    }
}
