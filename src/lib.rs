//! # Heartfield
//!
//! A real-time heart-shaped particle cloud with HDR bloom.
//!
//! Thousands of point sprites are scattered over and inside a parametric
//! heart surface. A bright, mostly hollow shell carries HDR colors above the
//! bloom threshold while a dim interior core stays below it, so the glow
//! traces the outline of the heart instead of flooding the volume. The whole
//! field breathes with a two-harmonic heartbeat and each particle twinkles
//! on its own phase.
//!
//! ## Quick Start
//!
//! ```ignore
//! use heartfield::FieldConfig;
//!
//! fn main() {
//!     if let Err(e) = heartfield::run(FieldConfig::default()) {
//!         eprintln!("Error: {}", e);
//!     }
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### The bloom contract
//!
//! Generation and post-processing are coupled through one inequality: the
//! dimmest shell channel must sit strictly above the bloom threshold and the
//! brightest core channel strictly below it. [`FieldConfig::check_bloom_contract`]
//! verifies this once at startup; a configuration that breaks it never
//! reaches the GPU.
//!
//! ### Deterministic generation
//!
//! [`ParticleField::generate`] takes any [`rand::Rng`], so a seeded
//! [`rand::rngs::SmallRng`] reproduces a field bit for bit. The viewer seeds
//! from entropy and regenerates on Space.
//!
//! ### Presets
//!
//! [`FieldConfig::ember`] is the tuned default; [`FieldConfig::classic`]
//! keeps an earlier, softer look with a fuller shell and wider glow.

pub mod animation;
pub mod bloom;
pub mod config;
pub mod error;
pub mod field;
mod gpu;
pub mod shading;
pub mod surface;

mod app;

pub use animation::{heartbeat_scale, AnimationDriver, FrameState};
pub use app::run;
pub use bloom::BloomConfig;
pub use config::FieldConfig;
pub use error::{AppError, ConfigError, GpuError};
pub use field::{ParticleField, ParticleVertex};
pub use glam::{Vec2, Vec3, Vec4};
pub use shading::PulseParams;

/// Commonly used types, glob-importable.
pub mod prelude {
    pub use crate::animation::{heartbeat_scale, AnimationDriver, FrameState};
    pub use crate::bloom::BloomConfig;
    pub use crate::config::FieldConfig;
    pub use crate::error::{AppError, ConfigError, GpuError};
    pub use crate::field::{ParticleField, ParticleVertex};
    pub use crate::run;
    pub use crate::shading::PulseParams;
    pub use glam::{Vec2, Vec3, Vec4};
}
