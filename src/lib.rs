//! # PoultryGeist
//!
//! **Scene runtime for a first-person walk through a haunted corn field.**
//!
//! The crate switches between discrete scenes, builds their content into a shared
//! render tree (static meshes, animated actors, instanced props, lights, fog) and
//! drives a free-look camera while a scene is active. Rendering, asset decoding and
//! motion-path playback are collaborators behind traits.
//!
//! ## Quick Start
//!
//! ```no_run
//! use poultrygeist::scene::{self, SceneId, SceneManager};
//! use poultrygeist::{HeadlessPipeline, QualityTier, RenderContext, RuntimeConfig};
//!
//! let config = RuntimeConfig::default();
//! let mut manager = SceneManager::new(
//!     scene::standard_catalog(&config),
//!     RenderContext::new(Box::new(HeadlessPipeline::new())),
//!     Box::new(scene::bundled_asset_loader(QualityTier::High)),
//!     Box::new(scene::intro_motion(&config.intro)),
//!     config.camera.clone(),
//! );
//! manager.load_scene(SceneId::Intro).unwrap();
//! poultrygeist::run(config.window, config.bindings, manager).unwrap();
//! ```
//!
//! ## Pieces
//!
//! - [`scene::SceneManager`]: scene lifecycle, frame dispatch, camera ownership
//! - [`scene::ModelRegistry`]: per-scene models and instancing
//! - [`CameraController`]: free-look and walking
//! - [`MotionController`]: scripted camera paths
//! - [`RenderPipeline`]: prepared meshes, lights and fog

mod app;
mod assets;
mod camera;
mod camera_controller;
mod config;
mod error;
mod input;
mod motion;
mod render;
pub mod scene;

#[cfg(test)]
mod testing;

pub use app::run;
pub use assets::{
    ActorAsset, AssetLoader, FileAssetLoader, GeometryId, MemoryAssetLoader, ModelAsset,
    QualityTier,
};
pub use camera::Camera;
pub use camera_controller::{CameraController, StepOutcome};
pub use config::{
    AssetConfig, CameraConfig, IntroConfig, KeyBindings, RuntimeConfig, WindowConfig,
};
pub use error::{AssetError, ConfigError, MotionError, SceneError};
pub use input::{Button, Input, InputSource};
pub use motion::{Keyframe, KeyframeMotion, MotionController, MotionPath, Pose};
pub use render::{
    Fog, HeadlessPipeline, HeadlessState, LightColor, LightDescriptor, LightHandle, LightKind,
    RenderContext, RenderPipeline, SceneEffect,
};

// Re-export glam math types for convenience
pub use glam::{Quat, Vec2, Vec3};

// Re-export commonly used winit types for convenience
pub use winit::keyboard::KeyCode;

pub use hecs::Entity;
