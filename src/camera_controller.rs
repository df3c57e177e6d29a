//! First-person free-look and walk controller.
//!
//! The controller does not place the camera directly. It pushes a focus point
//! around and keeps the camera trailing a fixed distance behind it, the way an
//! orbit rig would:
//!
//! ```text
//!   camera ----- trail_distance ----> focus
//!          forward (heading, pitch)
//! ```
//!
//! Mouse look is emulated by reading the pointer offset from the viewport center
//! and warping the pointer back to the center every frame.
//!
//! # Example
//!
//! ```ignore
//! let mut controller = CameraController::new(CameraConfig::default());
//!
//! // In frame loop:
//! let outcome = controller.step(now, &mut input, &mut camera);
//! if outcome.switch_requested {
//!     // hand off to the scene manager
//! }
//! ```

use glam::{Vec2, Vec3};

use crate::camera::Camera;
use crate::config::CameraConfig;
use crate::input::{Button, InputSource};

/// What happened during one controller step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepOutcome {
    /// Seconds since the previous step (0 on the first one).
    pub elapsed: f32,
    /// The switch-scene button went down this frame.
    ///
    /// Edge-triggered: holding the key requests one switch, not one per frame,
    /// which would bounce between two scenes for as long as the key is held.
    pub switch_requested: bool,
}

/// Free-look camera state that persists across scene switches.
#[derive(Clone, Debug)]
pub struct CameraController {
    /// Horizontal angle in degrees.
    pub heading: f32,
    /// Vertical angle in degrees, clamped to `[-pitch_limit, pitch_limit]`.
    pub pitch: f32,
    /// The point the camera trails behind.
    pub focus: Vec3,
    /// Timestamp of the previous step. `None` until the first step.
    pub last: Option<f64>,
    config: CameraConfig,
}

impl CameraController {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            heading: 0.0,
            pitch: 0.0,
            focus: config.start_focus,
            last: None,
            config,
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Run one frame of free-look and locomotion, writing the result into `camera`.
    pub fn step(&mut self, now: f64, input: &mut dyn InputSource, camera: &mut Camera) -> StepOutcome {
        let elapsed = match self.last {
            Some(last) => (now - last).max(0.0) as f32,
            None => 0.0,
        };

        let delta = input
            .pointer_position()
            .map(|p| p - input.viewport_center())
            .unwrap_or(Vec2::ZERO);
        input.recenter_pointer();
        self.heading -= delta.x * self.config.sensitivity;
        self.pitch -= delta.y * self.config.sensitivity;

        let moving_forward = input.button_down(Button::Forward);
        let moving_backward = input.button_down(Button::Backward);

        if moving_forward {
            self.pitch += self.bob(now, elapsed);
        }
        self.pitch = self
            .pitch
            .clamp(-self.config.pitch_limit, self.config.pitch_limit);

        camera.set_hpr(self.heading, self.pitch, 0.0);
        let forward = camera.forward();

        let stride = forward * elapsed * self.config.move_speed;
        if moving_forward {
            self.focus += stride;
        }
        if moving_backward {
            self.focus -= stride;
        }

        camera.position = self.focus - forward * self.config.trail_distance;

        let switch_requested = input.button_pressed(Button::SwitchScene);

        self.focus = camera.position + forward * self.config.trail_distance;
        self.last = Some(now);

        StepOutcome {
            elapsed,
            switch_requested,
        }
    }

    /// Pitch offset for this frame's walking bob, normalized to the nominal frame.
    fn bob(&self, now: f64, elapsed: f32) -> f32 {
        let phase = (now * f64::from(self.config.bob_frequency)).sin() as f32;
        self.config.bob_amplitude * phase * (elapsed / self.config.nominal_frame)
    }

    /// Adopt a camera pose produced elsewhere (e.g. by a motion path).
    ///
    /// The frame clock restarts so the first free-look step after the handoff does not jump.
    pub fn sync_from_camera(&mut self, camera: &Camera) {
        let (heading, pitch) = camera.heading_pitch();
        self.heading = heading;
        self.pitch = pitch.clamp(-self.config.pitch_limit, self.config.pitch_limit);
        self.focus = camera.position + camera.forward() * self.config.trail_distance;
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedInput;
    use approx::assert_relative_eq;

    fn controller() -> CameraController {
        CameraController::new(CameraConfig::default())
    }

    #[test]
    fn first_step_forces_zero_elapsed() {
        let mut controller = controller();
        let mut input = ScriptedInput::new();
        let mut camera = Camera::new();
        let start = controller.focus;
        input.hold(Button::Forward);

        let outcome = controller.step(5_000.0, &mut input, &mut camera);

        assert_eq!(outcome.elapsed, 0.0);
        assert!(controller.focus.abs_diff_eq(start, 1e-4));
        assert_eq!(controller.last, Some(5_000.0));
    }

    #[test]
    fn pointer_delta_turns_and_recentres() {
        let mut controller = controller();
        let mut input = ScriptedInput::new();
        let mut camera = Camera::new();
        input.move_pointer(Vec2::new(10.0, -5.0));

        controller.step(1.0, &mut input, &mut camera);

        assert_relative_eq!(controller.heading, -2.0);
        assert_relative_eq!(controller.pitch, 1.0);
        assert_eq!(input.recentred, 1);
        assert_eq!(input.pointer, Some(input.center));
    }

    #[test]
    fn missing_pointer_means_no_rotation() {
        let mut controller = controller();
        let mut input = ScriptedInput::new();
        let mut camera = Camera::new();
        input.pointer = None;

        controller.step(1.0, &mut input, &mut camera);

        assert_eq!(controller.heading, 0.0);
        assert_eq!(controller.pitch, 0.0);
    }

    #[test]
    fn pitch_stays_clamped_for_any_pointer_travel() {
        let mut controller = controller();
        let mut input = ScriptedInput::new();
        let mut camera = Camera::new();

        for (i, dy) in [-1.0e6_f32, 3.0e4, 1.0e9, -7.5].into_iter().enumerate() {
            input.move_pointer(Vec2::new(0.0, dy));
            controller.step(i as f64, &mut input, &mut camera);
            assert!(controller.pitch.abs() <= 75.0, "pitch {}", controller.pitch);
        }

        input.move_pointer(Vec2::new(0.0, -1.0e6));
        controller.step(10.0, &mut input, &mut camera);
        assert_eq!(controller.pitch, 75.0);
    }

    #[test]
    fn focus_leads_camera_by_trail_distance() {
        let mut controller = controller();
        let mut input = ScriptedInput::new();
        let mut camera = Camera::new();
        input.hold(Button::Forward);

        for frame in 0..20 {
            input.move_pointer(Vec2::new(3.0, -1.5));
            controller.step(frame as f64 * 0.05, &mut input, &mut camera);
            let expected = camera.position + camera.forward() * 5.0;
            assert!(controller.focus.abs_diff_eq(expected, 1e-3));
        }
    }

    #[test]
    fn forward_moves_focus_along_view() {
        let mut controller = controller();
        let mut input = ScriptedInput::new();
        let mut camera = Camera::new();
        controller.step(1.0, &mut input, &mut camera);
        let before = controller.focus;

        input.hold(Button::Backward);
        controller.step(1.5, &mut input, &mut camera);

        // Backward only: no bob, so pitch and heading are unchanged.
        let expected = before - Vec3::Y * 0.5 * 30.0;
        assert!(controller.focus.abs_diff_eq(expected, 1e-3));
    }

    #[test]
    fn forward_and_backward_cancel_but_still_look() {
        let mut controller = controller();
        let mut input = ScriptedInput::new();
        let mut camera = Camera::new();
        controller.step(1.0, &mut input, &mut camera);
        let before = controller.focus;

        input.hold(Button::Forward);
        input.hold(Button::Backward);
        input.move_pointer(Vec2::new(25.0, 0.0));
        controller.step(1.1, &mut input, &mut camera);

        assert!(controller.focus.abs_diff_eq(before, 1e-4));
        assert_relative_eq!(controller.heading, -5.0);
    }

    #[test]
    fn bob_only_applies_while_moving_forward() {
        let mut still = controller();
        let mut walking = controller();
        let mut input = ScriptedInput::new();
        let mut camera = Camera::new();

        still.step(1.0, &mut input, &mut camera);
        still.step(1.1, &mut input, &mut camera);
        assert_eq!(still.pitch, 0.0);

        input.hold(Button::Forward);
        walking.step(1.0, &mut input, &mut camera);
        walking.step(1.1, &mut input, &mut camera);
        let expected = 0.35 * (1.1_f64 * 9.0).sin() as f32 * (0.1 / 0.167);
        assert_relative_eq!(walking.pitch, expected, epsilon = 1e-4);
    }

    #[test]
    fn switch_triggers_on_press_edge_only() {
        let mut controller = controller();
        let mut input = ScriptedInput::new();
        let mut camera = Camera::new();

        input.hold(Button::SwitchScene);
        assert!(controller.step(1.0, &mut input, &mut camera).switch_requested);
        input.end_frame();
        assert!(!controller.step(1.1, &mut input, &mut camera).switch_requested);
    }

    #[test]
    fn sync_adopts_external_pose_and_restarts_clock() {
        let mut controller = controller();
        controller.last = Some(3.0);
        let camera = Camera::new()
            .at(Vec3::new(10.0, 0.0, 2.0))
            .with_hpr(90.0, -20.0, 0.0);

        controller.sync_from_camera(&camera);

        assert_relative_eq!(controller.heading, 90.0, epsilon = 1e-3);
        assert_relative_eq!(controller.pitch, -20.0, epsilon = 1e-3);
        assert!(controller.focus.abs_diff_eq(camera.position + camera.forward() * 5.0, 1e-4));
        assert_eq!(controller.last, None);
    }
}
