//! Parametric heart surface sampling.
//!
//! The shell of the particle cloud lies on the classic parametric heart
//! surface. The 2D heart curve
//!
//! ```text
//! x(u) = 16 sin^3 u
//! y(u) = 13 cos u - 5 cos 2u - 2 cos 3u - cos 4u
//! ```
//!
//! is swept into 3D by scaling the planar coordinates with `sin v` and
//! extruding along z with `cos v`, for `u in [0, 2pi)` and `v in [0, pi)`.

use glam::Vec3;

/// Scale applied to `cos v` for the z coordinate. Matches the flattened
/// depth of the heart relative to its planar extent.
pub const Z_SCALE: f32 = 8.0;

/// Largest planar radius of the raw (unnormalized) heart curve.
///
/// The curve reaches its extreme at `u = pi`, where `x = 0` and
/// `y = -13 - 5 + 2 - 1 = -17`.
pub const PLANAR_MAX_EXTENT: f32 = 17.0;

/// Map a parameter pair onto the heart surface.
///
/// Pure and deterministic: the same `(u, v)` always yields the same point.
/// `normalize_factor` uniformly scales the raw surface coordinates and
/// `z_scale` sets the depth of the extrusion.
pub fn heart_point(u: f32, v: f32, normalize_factor: f32, z_scale: f32) -> Vec3 {
    let x_base = 16.0 * u.sin().powi(3);
    let y_base = 13.0 * u.cos() - 5.0 * (2.0 * u).cos() - 2.0 * (3.0 * u).cos() - (4.0 * u).cos();

    let sin_v = v.sin();
    let cos_v = v.cos();

    Vec3::new(
        x_base * sin_v * normalize_factor,
        y_base * sin_v * normalize_factor,
        cos_v * z_scale * normalize_factor,
    )
}

/// Bounding-sphere radius of the raw surface for a given depth scale.
///
/// On the surface, `|p|^2 = r_planar^2 sin^2 v + z_scale^2 cos^2 v`, which is
/// bounded by the larger of the planar extent and the depth extent.
pub fn max_extent(z_scale: f32) -> f32 {
    PLANAR_MAX_EXTENT.max(z_scale.abs())
}
