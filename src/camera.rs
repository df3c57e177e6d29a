use glam::{Quat, Vec3};

/// The view transform handed to the renderer.
///
/// World space is Z-up. A camera with zero heading and pitch looks down +Y.
/// Heading turns counterclockwise about +Z, pitch raises the view toward +Z.
/// All angles are in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub orientation: Quat,
    pub fov: f32, // degrees
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            fov: 75.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Orientation from heading, pitch and roll in degrees.
    pub fn orientation_from_hpr(heading: f32, pitch: f32, roll: f32) -> Quat {
        Quat::from_rotation_z(heading.to_radians())
            * Quat::from_rotation_x(pitch.to_radians())
            * Quat::from_rotation_y(roll.to_radians())
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_hpr(mut self, heading: f32, pitch: f32, roll: f32) -> Self {
        self.set_hpr(heading, pitch, roll);
        self
    }

    pub fn set_hpr(&mut self, heading: f32, pitch: f32, roll: f32) {
        self.orientation = Self::orientation_from_hpr(heading, pitch, roll);
    }

    /// Point the camera at a target. Roll is zero.
    pub fn look_at(&mut self, target: Vec3) {
        let dir = (target - self.position).normalize_or_zero();
        if dir != Vec3::ZERO {
            let (heading, pitch) = heading_pitch_of(dir);
            self.set_hpr(heading, pitch, 0.0);
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }

    /// Heading and pitch (degrees) of the current forward vector.
    pub fn heading_pitch(&self) -> (f32, f32) {
        heading_pitch_of(self.forward())
    }
}

/// Heading and pitch in degrees for a unit direction.
fn heading_pitch_of(dir: Vec3) -> (f32, f32) {
    let pitch = dir.z.clamp(-1.0, 1.0).asin();
    let heading = (-dir.x).atan2(dir.y);
    (heading.to_degrees(), pitch.to_degrees())
}
