//! Free-flight camera for the ray-marching viewer.
//!
//! Position integrates from held controls once per frame; orientation
//! accumulates raw pointer deltas per motion event.
//!
//! # Invariants
//! - `speed` is a pure function of the Precision control, recomputed every
//!   tick. Nothing else writes it.
//! - `lon`/`lat` never wrap or clamp. They are unbounded accumulators and
//!   consumers must only apply periodic functions to them.
//! - The camera reads [`InputState`] but holds no reference to the event
//!   layer; ownership lives in the app state, not a global.

use glam::Vec3;
use marcher_input::{Control, InputState};

/// Movement rate per tick without the Precision modifier.
pub const BASE_SPEED: f32 = 0.04;
/// Movement rate per tick while Precision is held (3x base).
pub const FAST_SPEED: f32 = 0.12;
/// Yaw accumulated per horizontal pointer device unit.
pub const LON_SPEED: f32 = 0.008;
/// Pitch accumulated per vertical pointer device unit.
pub const LAT_SPEED: f32 = 0.012;

/// Fly camera: world-space position plus yaw (`lon`) and pitch (`lat`)
/// accumulators. Free flight in unbounded space; no collision, no terrain.
#[derive(Debug, Clone, Copy)]
pub struct FlyCamera {
    pub position: Vec3,
    /// Yaw accumulator. Drives both the view direction in the shader and
    /// the horizontal movement basis here.
    pub lon: f32,
    /// Pitch accumulator. Consumed only by the shader contract.
    pub lat: f32,
    /// Current movement rate. Derived state; see [`FlyCamera::advance`].
    pub speed: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -2.0),
            lon: 0.0,
            lat: 0.0,
            speed: BASE_SPEED,
        }
    }
}

impl FlyCamera {
    /// Apply one pointer-motion event with deltas in device units.
    pub fn look(&mut self, dx: f32, dy: f32) {
        self.lon += dx * LON_SPEED;
        self.lat += dy * LAT_SPEED;
    }

    /// One integration tick: select the speed, then apply every held
    /// movement control additively.
    ///
    /// Horizontal motion is yaw-relative; vertical motion is world-axis.
    /// The six checks are independent, so opposite controls cancel exactly
    /// and combined controls stack without normalization (diagonal movement
    /// is faster than axis-aligned, as in the original viewer).
    pub fn advance(&mut self, input: &InputState) {
        self.speed = if input.is_held(Control::Precision) {
            FAST_SPEED
        } else {
            BASE_SPEED
        };

        let fx = self.lon.sin() * self.speed;
        let fz = self.lon.cos() * self.speed;

        if input.is_held(Control::Forward) {
            self.position.z += fz;
            self.position.x += fx;
        }
        if input.is_held(Control::Back) {
            self.position.z -= fz;
            self.position.x -= fx;
        }
        if input.is_held(Control::StrafeRight) {
            self.position.z -= fx;
            self.position.x += fz;
        }
        if input.is_held(Control::StrafeLeft) {
            self.position.z += fx;
            self.position.x -= fz;
        }
        if input.is_held(Control::Descend) {
            self.position.y -= self.speed;
        }
        if input.is_held(Control::Ascend) {
            self.position.y += self.speed;
        }
    }

    /// The two-component rotation value the shader contract expects.
    ///
    /// The first component multiplies the raw pitch accumulator by the
    /// cosine of its own degree-converted value. That coupling is part of
    /// the observed shader contract and is reproduced verbatim.
    pub fn rotation_uniform(&self) -> [f32; 2] {
        [self.lat.to_radians().cos() * self.lat, self.lon]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPS: f32 = 1e-6;

    fn held(controls: &[Control]) -> InputState {
        let mut input = InputState::new();
        for &c in controls {
            input.press(c);
        }
        input
    }

    #[test]
    fn initial_pose() {
        let cam = FlyCamera::default();
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, -2.0));
        assert_eq!(cam.lon, 0.0);
        assert_eq!(cam.lat, 0.0);
    }

    #[test]
    fn forward_tick_from_origin_heading() {
        // lon = 0: forward is pure +z.
        let mut cam = FlyCamera::default();
        cam.advance(&held(&[Control::Forward]));
        assert!((cam.position.z - (-1.96)).abs() < EPS);
        assert_eq!(cam.position.x, 0.0);
        assert_eq!(cam.position.y, 0.0);
    }

    #[test]
    fn forward_tick_at_quarter_turn() {
        // sin(lon) = 1, cos(lon) = 0: forward is pure +x.
        let mut cam = FlyCamera::default();
        cam.lon = FRAC_PI_2;
        cam.advance(&held(&[Control::Forward]));
        assert!((cam.position.x - BASE_SPEED).abs() < EPS);
        assert!((cam.position.z - (-2.0)).abs() < EPS);
    }

    #[test]
    fn opposite_controls_cancel() {
        let mut cam = FlyCamera::default();
        cam.lon = 1.234;
        let start = cam.position;
        cam.advance(&held(&[Control::Forward, Control::Back]));
        assert_eq!(cam.position, start);
    }

    #[test]
    fn strafe_and_vertical_combine_additively() {
        let mut cam = FlyCamera::default();
        cam.advance(&held(&[Control::Forward, Control::StrafeRight, Control::Ascend]));
        // lon = 0: forward adds +z, strafe-right adds +x, ascend adds +y.
        // No normalization of the combined direction.
        assert!((cam.position.x - BASE_SPEED).abs() < EPS);
        assert!((cam.position.y - BASE_SPEED).abs() < EPS);
        assert!((cam.position.z - (-1.96)).abs() < EPS);
    }

    #[test]
    fn precision_triples_speed() {
        let mut slow = FlyCamera::default();
        slow.advance(&held(&[Control::Forward]));
        let slow_dz = slow.position.z - (-2.0);

        let mut fast = FlyCamera::default();
        fast.advance(&held(&[Control::Forward, Control::Precision]));
        let fast_dz = fast.position.z - (-2.0);

        assert!((fast_dz - 3.0 * slow_dz).abs() < EPS);
        assert_eq!(fast.speed, FAST_SPEED);
    }

    #[test]
    fn speed_resets_when_precision_released() {
        let mut cam = FlyCamera::default();
        cam.advance(&held(&[Control::Precision]));
        assert_eq!(cam.speed, FAST_SPEED);
        cam.advance(&held(&[]));
        assert_eq!(cam.speed, BASE_SPEED);
    }

    #[test]
    fn look_accumulates_linearly_without_bound() {
        let mut cam = FlyCamera::default();
        for _ in 0..1000 {
            cam.look(2.0, -3.0);
        }
        assert!((cam.lon - 1000.0 * 2.0 * LON_SPEED).abs() < 1e-2);
        assert!((cam.lat - 1000.0 * -3.0 * LAT_SPEED).abs() < 1e-2);
        // No clamp: pitch may exceed a full turn in either direction.
        assert!(cam.lat < -4.0 * std::f32::consts::PI);
    }

    #[test]
    fn rotation_uniform_couples_pitch_with_its_own_cosine() {
        let mut cam = FlyCamera::default();
        cam.lat = 30.0;
        cam.lon = 0.5;
        let [pitch, yaw] = cam.rotation_uniform();
        assert!((pitch - 30.0_f32.to_radians().cos() * 30.0).abs() < EPS);
        assert_eq!(yaw, 0.5);
    }

    #[test]
    fn vertical_motion_ignores_yaw() {
        let mut cam = FlyCamera::default();
        cam.lon = 2.5;
        cam.advance(&held(&[Control::Ascend]));
        assert_eq!(cam.position.x, 0.0);
        assert!((cam.position.y - BASE_SPEED).abs() < EPS);
    }
}
