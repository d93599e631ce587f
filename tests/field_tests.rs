//! Integration tests for field generation and the bloom contract.
//!
//! These tests exercise the public API end to end: configuration validation,
//! seeded generation, the shell/core population split, the bounding sphere,
//! and the color inequality that keeps the glow on the shell.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use heartfield::{ConfigError, FieldConfig, ParticleField};

fn generate(cfg: &FieldConfig, seed: u64) -> ParticleField {
    let mut rng = SmallRng::seed_from_u64(seed);
    ParticleField::generate(cfg, &mut rng).unwrap()
}

// ============================================================================
// Population Split
// ============================================================================

#[test]
fn test_population_split_matches_config() {
    let cfg = FieldConfig {
        count: 1000,
        shell_fraction: 0.92,
        ..FieldConfig::default()
    };
    let field = generate(&cfg, 1);

    assert_eq!(field.len(), 1000);
    assert_eq!(field.shell_count(), 920);
    assert_eq!(field.core_count(), 80);
}

#[test]
fn test_single_particle_field() {
    let cfg = FieldConfig {
        count: 1,
        ..FieldConfig::default()
    };
    let field = generate(&cfg, 1);

    // floor(1 * 0.92) = 0 shell particles; the lone particle lands in the core.
    assert_eq!(field.len(), 1);
    assert_eq!(field.shell_count(), 0);
    assert_eq!(field.core_count(), 1);
}

#[test]
fn test_buffers_are_parallel() {
    let cfg = FieldConfig {
        count: 500,
        ..FieldConfig::default()
    };
    let field = generate(&cfg, 7);

    assert_eq!(field.positions().len(), 500 * 3);
    assert_eq!(field.colors().len(), 500 * 3);
    assert_eq!(field.random_phase().len(), 500);
    assert_eq!(field.size_scale().len(), 500);
}

// ============================================================================
// Bounding Sphere
// ============================================================================

#[test]
fn test_all_particles_inside_bounding_sphere() {
    let cfg = FieldConfig {
        count: 5000,
        ..FieldConfig::default()
    };
    let field = generate(&cfg, 3);
    let radius = cfg.bounding_radius();

    for i in 0..field.len() {
        let p = field.position(i);
        assert!(
            p.length() <= radius + 1e-4,
            "particle {} at {:?} outside radius {}",
            i,
            p,
            radius
        );
    }
}

#[test]
fn test_core_particles_are_pulled_inward() {
    let cfg = FieldConfig {
        count: 4000,
        ..FieldConfig::default()
    };
    let field = generate(&cfg, 9);

    // Core positions are shell samples scaled by r in [0, 1), so the mean
    // core distance from the origin must fall below the mean shell distance.
    let shell = field.shell_count();
    let mean = |range: std::ops::Range<usize>| {
        let len = range.len() as f32;
        range.map(|i| field.position(i).length()).sum::<f32>() / len
    };
    let shell_mean = mean(0..shell);
    let core_mean = mean(shell..field.len());

    assert!(core_mean < shell_mean);
}

// ============================================================================
// Bloom Contract
// ============================================================================

#[test]
fn test_every_particle_honors_the_bloom_contract() {
    let cfg = FieldConfig {
        count: 3000,
        ..FieldConfig::default()
    };
    let field = generate(&cfg, 5);
    let shell = field.shell_count();
    let threshold = cfg.bloom.threshold;

    for i in 0..shell {
        assert!(
            field.max_channel(i) > threshold,
            "shell particle {} below threshold",
            i
        );
    }
    for i in shell..field.len() {
        assert!(
            field.max_channel(i) < threshold,
            "core particle {} above threshold",
            i
        );
    }
}

#[test]
fn test_shell_colors_come_from_the_two_palette_entries() {
    let cfg = FieldConfig {
        count: 2000,
        ..FieldConfig::default()
    };
    let field = generate(&cfg, 11);
    let shell = field.shell_count();

    let mut highlights = 0usize;
    for i in 0..shell {
        let c = Vec3::from_slice(&field.colors()[i * 3..i * 3 + 3]);
        if c == cfg.shell_highlight_color {
            highlights += 1;
        } else {
            assert_eq!(c, cfg.shell_accent_color, "shell particle {} off-palette", i);
        }
    }
    // With p = 0.4 over ~1840 draws, both outcomes show up.
    assert!(highlights > 0 && highlights < shell);

    for i in shell..field.len() {
        let c = Vec3::from_slice(&field.colors()[i * 3..i * 3 + 3]);
        assert_eq!(c, cfg.core_color, "core particle {} off-palette", i);
    }
}

#[test]
fn test_size_scales_follow_population() {
    let cfg = FieldConfig {
        count: 1000,
        ..FieldConfig::default()
    };
    let field = generate(&cfg, 13);
    let shell = field.shell_count();

    for i in 0..shell {
        assert_eq!(field.size_scale()[i], cfg.shell_size_scale);
    }
    for i in shell..field.len() {
        assert_eq!(field.size_scale()[i], cfg.core_size_scale);
    }
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_same_seed_reproduces_field_exactly() {
    let cfg = FieldConfig {
        count: 2500,
        ..FieldConfig::default()
    };
    let a = generate(&cfg, 42);
    let b = generate(&cfg, 42);

    assert_eq!(a, b);
    assert_eq!(a.vertices(), b.vertices());
}

#[test]
fn test_different_seeds_differ() {
    let cfg = FieldConfig {
        count: 2500,
        ..FieldConfig::default()
    };
    let a = generate(&cfg, 1);
    let b = generate(&cfg, 2);

    assert_ne!(a.positions(), b.positions());
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_zero_count_is_rejected() {
    let cfg = FieldConfig {
        count: 0,
        ..FieldConfig::default()
    };
    let mut rng = SmallRng::seed_from_u64(0);
    assert_eq!(
        ParticleField::generate(&cfg, &mut rng),
        Err(ConfigError::ParticleCount(0))
    );
}

#[test]
fn test_out_of_range_shell_fraction_is_rejected() {
    for bad in [0.0_f32, 1.0, 1.5, -0.25] {
        let cfg = FieldConfig {
            shell_fraction: bad,
            ..FieldConfig::default()
        };
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(
            ParticleField::generate(&cfg, &mut rng),
            Err(ConfigError::ShellFraction(bad))
        );
    }
}

#[test]
fn test_threshold_above_shell_floor_breaks_the_contract() {
    let mut cfg = FieldConfig::default();
    cfg.bloom.threshold = cfg.shell_color_floor();
    let err = cfg.check_bloom_contract().unwrap_err();
    assert!(matches!(err, ConfigError::BloomContract { .. }));
}

#[test]
fn test_threshold_below_core_ceiling_breaks_the_contract() {
    let mut cfg = FieldConfig::default();
    cfg.bloom.threshold = cfg.core_color_ceiling() * 0.5;
    assert!(cfg.check_bloom_contract().is_err());
}

#[test]
fn test_presets_pass_the_contract() {
    for cfg in [FieldConfig::ember(), FieldConfig::classic()] {
        cfg.validate().unwrap();
        cfg.check_bloom_contract().unwrap();
    }
}
