//! Error types for scene construction, asset resolution, configuration and motion paths.

use std::path::PathBuf;

use thiserror::Error;

use crate::scene::{ModelKey, SceneId};

/// Errors raised while building or switching scenes.
///
/// Every variant is fatal for the scene being constructed. The manager rolls the
/// partial build back and keeps the previous scene active.
#[derive(Error, Debug)]
pub enum SceneError {
    /// An instanced model referenced a source key that was never registered.
    #[error("instancing source `{0}` is not registered in this scene")]
    MissingInstanceSource(ModelKey),

    /// The asset loader could not resolve a model or actor.
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// No factory is registered for the requested scene.
    #[error("no scene registered for `{0}`")]
    UnknownScene(SceneId),
}

/// Errors surfaced by an [`AssetLoader`](crate::AssetLoader).
#[derive(Error, Debug)]
pub enum AssetError {
    /// The resolved file does not exist.
    #[error("asset `{name}` not found at {}", path.display())]
    NotFound {
        /// Name the scene asked for.
        name: String,
        /// Path after quality-tier resolution.
        path: PathBuf,
    },

    /// The loader has no entry for this name.
    #[error("asset `{0}` is not known to the loader")]
    Unknown(String),

    /// An actor clip could not be resolved.
    #[error("animation clip `{clip}` for actor `{actor}` could not be resolved")]
    MissingClip {
        /// Actor asset name.
        actor: String,
        /// Clip name from the actor's clip table.
        clip: String,
    },
}

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is out of range
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending key, e.g. `camera.pitch_limit`.
        field: &'static str,
        reason: String,
    },
}

/// Errors from a [`MotionController`](crate::MotionController).
#[derive(Error, Debug, PartialEq)]
pub enum MotionError {
    /// The requested motion path was never registered.
    #[error("motion path `{0}` is not registered")]
    UnknownPath(String),

    /// Motion paths need a positive duration.
    #[error("motion path `{path}` has a non-positive duration ({duration}s)")]
    InvalidDuration {
        /// Path name.
        path: String,
        /// Requested duration in seconds.
        duration: f64,
    },
}
