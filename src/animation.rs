//! Frame timing, heartbeat scale, and pixel-ratio tracking.
//!
//! The driver owns the single monotonically increasing clock the shading
//! model consumes, and derives the slow whole-field "heartbeat" scale from
//! it each frame. The heartbeat is a two-harmonic oscillation applied to the
//! field transform as one scalar, entirely separate from the fast
//! per-particle twinkle. Per-frame work here is O(1): scalars only, never
//! the particle buffers.

use std::time::Instant;

/// Upper clamp for the device pixel ratio uniform. High-density displays
/// stop paying extra fill cost beyond this.
pub const DEFAULT_MAX_PIXEL_RATIO: f32 = 2.0;

/// Scalar uniforms produced for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameState {
    /// Elapsed time in seconds since the driver started.
    pub time: f32,
    /// Time since the previous frame in seconds.
    pub delta: f32,
    /// Whole-field heartbeat scale for this frame.
    pub field_scale: f32,
    /// Clamped device pixel ratio for this frame.
    pub pixel_ratio: f32,
}

/// Two-harmonic heartbeat around a base scale.
///
/// Bounded by `base_scale ± 0.006`, with period `pi` seconds (the slower
/// harmonic at angular frequency 2 dominates; the faster one at 4 adds the
/// double-thump character).
#[inline]
pub fn heartbeat_scale(elapsed: f32, base_scale: f32) -> f32 {
    let beat = (elapsed * 2.0).sin() * 0.05 + (elapsed * 4.0).sin() * 0.01;
    base_scale + beat * 0.1
}

/// Clamp a window scale factor into the pixel ratio uniform.
///
/// Queried every frame rather than cached: the density changes when the
/// window moves between displays or the OS zoom level changes.
#[inline]
pub fn clamp_pixel_ratio(scale_factor: f64, max: f32) -> f32 {
    (scale_factor as f32).min(max).max(0.1)
}

/// Advances time once per display tick and derives the frame uniforms.
#[derive(Debug)]
pub struct AnimationDriver {
    start: Instant,
    last_frame: Instant,
    elapsed: f32,
    frame_count: u64,
    base_scale: f32,
    max_pixel_ratio: f32,
}

impl AnimationDriver {
    /// Create a driver starting from now.
    pub fn new(base_scale: f32) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed: 0.0,
            frame_count: 0,
            base_scale,
            max_pixel_ratio: DEFAULT_MAX_PIXEL_RATIO,
        }
    }

    /// Advance the clock and compute this frame's uniforms.
    ///
    /// `scale_factor` is the display environment's current pixel density.
    pub fn advance(&mut self, scale_factor: f64) -> FrameState {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.elapsed = now.duration_since(self.start).as_secs_f32();
        self.frame_count += 1;

        self.frame_state(delta, scale_factor)
    }

    /// Derive a frame state from the current clock without touching it.
    /// `advance` is the real per-tick entry point; this exists so tests can
    /// inspect the mapping deterministically.
    fn frame_state(&self, delta: f32, scale_factor: f64) -> FrameState {
        FrameState {
            time: self.elapsed,
            delta,
            field_scale: heartbeat_scale(self.elapsed, self.base_scale),
            pixel_ratio: clamp_pixel_ratio(scale_factor, self.max_pixel_ratio),
        }
    }

    /// Total elapsed time in seconds.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Total frames advanced.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_heartbeat_bounds() {
        let mut t = 0.0f32;
        while t < 10.0 {
            let s = heartbeat_scale(t, 1.0);
            assert!(s >= 1.0 - 0.006 - 1e-6);
            assert!(s <= 1.0 + 0.006 + 1e-6);
            t += 0.007;
        }
    }

    #[test]
    fn test_heartbeat_periodic() {
        for i in 0..40 {
            let t = i as f32 * 0.23;
            let a = heartbeat_scale(t, 1.0);
            let b = heartbeat_scale(t + PI, 1.0);
            assert!((a - b).abs() < 1e-4);
        }
    }

    #[test]
    fn test_heartbeat_centers_on_base_scale() {
        assert!((heartbeat_scale(0.0, 1.0) - 1.0).abs() < 1e-6);
        assert!((heartbeat_scale(0.0, 2.5) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_pixel_ratio_clamped() {
        assert_eq!(clamp_pixel_ratio(1.0, 2.0), 1.0);
        assert_eq!(clamp_pixel_ratio(3.0, 2.0), 2.0);
        assert_eq!(clamp_pixel_ratio(1.5, 2.0), 1.5);
    }

    #[test]
    fn test_driver_time_is_monotonic() {
        let mut driver = AnimationDriver::new(1.0);
        let a = driver.advance(1.0);
        thread::sleep(Duration::from_millis(5));
        let b = driver.advance(1.0);

        assert!(b.time > a.time);
        assert!(b.delta > 0.0);
        assert_eq!(driver.frame(), 2);
    }

    #[test]
    fn test_frame_state_uses_heartbeat() {
        let mut driver = AnimationDriver::new(1.0);
        thread::sleep(Duration::from_millis(2));
        let frame = driver.advance(2.0);
        assert!((frame.field_scale - heartbeat_scale(frame.time, 1.0)).abs() < 1e-6);
    }
}
