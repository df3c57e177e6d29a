//! Runtime configuration loaded from TOML.
//!
//! Every section has defaults, so an empty file (or no file at all) yields a
//! playable setup.
//!
//! ```toml
//! [window]
//! title = "PoultryGeist"
//!
//! [assets]
//! root = "resources"
//! quality = "high"
//!
//! [camera]
//! sensitivity = 0.2
//! move_speed = 30.0
//!
//! [bindings]
//! forward = "KeyW"
//! backward = "KeyS"
//! switch_scene = "Tab"
//! ```

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use winit::keyboard::KeyCode;

use crate::assets::QualityTier;
use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub window: WindowConfig,
    pub assets: AssetConfig,
    pub camera: CameraConfig,
    pub bindings: KeyBindings,
    pub intro: IntroConfig,
}

impl RuntimeConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from a TOML string and check value ranges.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.camera.validate()?;
        Ok(config)
    }
}

/// Window settings used by the demo binary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "PoultryGeist".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Where assets come from and which quality tier to use.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Asset directory. `None` uses the built-in placeholder catalog.
    pub root: Option<PathBuf>,
    pub quality: QualityTier,
}

/// Tunables for the free-look camera controller.
///
/// Angles are in degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Degrees of heading/pitch per pixel of pointer travel.
    pub sensitivity: f32,
    /// Focus displacement in units per second while moving.
    pub move_speed: f32,
    /// Distance the camera trails behind its focus point.
    pub trail_distance: f32,
    /// Pitch is clamped to `[-pitch_limit, pitch_limit]`.
    pub pitch_limit: f32,
    /// Peak pitch offset of the walking bob at the nominal frame duration.
    pub bob_amplitude: f32,
    /// Bob angular frequency in radians per second.
    pub bob_frequency: f32,
    /// Frame duration the bob amplitude is normalized against.
    pub nominal_frame: f32,
    /// Initial focus point.
    pub start_focus: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            sensitivity: 0.2,
            move_speed: 30.0,
            trail_distance: 5.0,
            pitch_limit: 75.0,
            bob_amplitude: 0.35,
            bob_frequency: 9.0,
            nominal_frame: 0.167,
            start_focus: Vec3::new(0.0, 5.0, 2.0),
        }
    }
}

impl CameraConfig {
    /// Reject values the controller step cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.pitch_limit.is_finite() || !(0.0..90.0).contains(&self.pitch_limit) {
            return Err(ConfigError::Invalid {
                field: "camera.pitch_limit",
                reason: format!("must be in [0, 90), got {}", self.pitch_limit),
            });
        }
        for (field, value) in [
            ("camera.nominal_frame", self.nominal_frame),
            ("camera.trail_distance", self.trail_distance),
            ("camera.sensitivity", self.sensitivity),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {}", value),
                });
            }
        }
        Ok(())
    }
}

/// Keyboard keys behind the logical buttons.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: KeyCode,
    pub backward: KeyCode,
    pub switch_scene: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: KeyCode::KeyW,
            backward: KeyCode::KeyS,
            switch_scene: KeyCode::Tab,
        }
    }
}

/// Settings for the intro level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroConfig {
    /// Seconds to let the freshly attached tree settle before the motion path starts.
    pub settle_seconds: f64,
    pub motion_path: String,
    pub motion_duration: f64,
    /// Corn field is `field_size x field_size` instances.
    pub field_size: u32,
    pub field_spacing: f32,
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            settle_seconds: 1.0,
            motion_path: "intro".to_string(),
            motion_duration: 12.0,
            field_size: 50,
            field_spacing: 5.0,
        }
    }
}
