//! Scripted camera motion.
//!
//! A [`MotionController`] owns the camera while it is posed or playing a path.
//! Scenes start paths fire-and-forget; the scene manager advances the controller
//! every frame and the player controller takes over once the path is done.

use std::collections::HashMap;

use glam::Vec3;

use crate::camera::Camera;
use crate::error::MotionError;

/// A camera position and heading/pitch in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub heading: f32,
    pub pitch: f32,
}

impl Pose {
    pub fn new(position: Vec3, heading: f32, pitch: f32) -> Self {
        Self {
            position,
            heading,
            pitch,
        }
    }

    pub fn apply(&self, camera: &mut Camera) {
        camera.position = self.position;
        camera.set_hpr(self.heading, self.pitch, 0.0);
    }

    fn lerp(&self, other: &Pose, t: f32) -> Pose {
        Pose {
            position: self.position.lerp(other.position, t),
            heading: self.heading + (other.heading - self.heading) * t,
            pitch: self.pitch + (other.pitch - self.pitch) * t,
        }
    }
}

/// Contract for the motion-path player.
pub trait MotionController {
    /// Hold the camera at a fixed pose until a path starts.
    fn set_pose(&mut self, pose: Pose);

    /// Start playing a named path over `duration` seconds, beginning at `now`.
    fn start(&mut self, path: &str, duration: f64, now: f64) -> Result<(), MotionError>;

    /// Stop playing and release the camera.
    fn stop(&mut self);

    fn is_playing(&self) -> bool;

    /// Returns true while the controller owns the camera (posed or playing).
    fn has_control(&self) -> bool;

    /// Write this frame's pose into `camera` if the controller has control.
    fn advance(&mut self, now: f64, camera: &mut Camera);
}

/// A key pose at normalized time `t` in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    pub t: f32,
    pub pose: Pose,
}

/// A pre-authored camera trajectory, sampled by normalized time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MotionPath {
    keyframes: Vec<Keyframe>,
}

impl MotionPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key pose. Keyframes are kept sorted by `t`.
    pub fn key(mut self, t: f32, pose: Pose) -> Self {
        let t = t.clamp(0.0, 1.0);
        let index = self.keyframes.partition_point(|k| k.t <= t);
        self.keyframes.insert(index, Keyframe { t, pose });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Pose at normalized time `u`, linearly interpolated between keyframes.
    pub fn sample(&self, u: f32) -> Option<Pose> {
        let first = self.keyframes.first()?;
        let last = self.keyframes.last()?;
        if u <= first.t {
            return Some(first.pose);
        }
        if u >= last.t {
            return Some(last.pose);
        }

        let next = self.keyframes.partition_point(|k| k.t <= u);
        let a = &self.keyframes[next - 1];
        let b = &self.keyframes[next];
        let span = b.t - a.t;
        if span <= f32::EPSILON {
            return Some(b.pose);
        }
        Some(a.pose.lerp(&b.pose, (u - a.t) / span))
    }
}

#[derive(Clone, Debug)]
enum MotionState {
    Idle,
    Posed(Pose),
    Playing {
        path: String,
        started: f64,
        duration: f64,
    },
}

/// Plays [`MotionPath`]s registered by name.
#[derive(Clone, Debug)]
pub struct KeyframeMotion {
    paths: HashMap<String, MotionPath>,
    state: MotionState,
}

impl Default for KeyframeMotion {
    fn default() -> Self {
        Self {
            paths: HashMap::new(),
            state: MotionState::Idle,
        }
    }
}

impl KeyframeMotion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a path under a name.
    pub fn with_path(mut self, name: impl Into<String>, path: MotionPath) -> Self {
        self.paths.insert(name.into(), path);
        self
    }
}

impl MotionController for KeyframeMotion {
    fn set_pose(&mut self, pose: Pose) {
        self.state = MotionState::Posed(pose);
    }

    fn start(&mut self, path: &str, duration: f64, now: f64) -> Result<(), MotionError> {
        match self.paths.get(path) {
            Some(p) if !p.is_empty() => {}
            _ => return Err(MotionError::UnknownPath(path.to_string())),
        }
        if duration <= 0.0 {
            return Err(MotionError::InvalidDuration {
                path: path.to_string(),
                duration,
            });
        }
        log::info!("motion path `{}` started ({:.1}s)", path, duration);
        self.state = MotionState::Playing {
            path: path.to_string(),
            started: now,
            duration,
        };
        Ok(())
    }

    fn stop(&mut self) {
        self.state = MotionState::Idle;
    }

    fn is_playing(&self) -> bool {
        matches!(self.state, MotionState::Playing { .. })
    }

    fn has_control(&self) -> bool {
        !matches!(self.state, MotionState::Idle)
    }

    fn advance(&mut self, now: f64, camera: &mut Camera) {
        match &self.state {
            MotionState::Idle => {}
            MotionState::Posed(pose) => pose.apply(camera),
            MotionState::Playing {
                path,
                started,
                duration,
            } => {
                let u = ((now - started) / duration).clamp(0.0, 1.0) as f32;
                if let Some(pose) = self.paths.get(path).and_then(|p| p.sample(u)) {
                    pose.apply(camera);
                }
                if u >= 1.0 {
                    log::info!("motion path `{}` finished", path);
                    self.state = MotionState::Idle;
                }
            }
        }
    }
}
