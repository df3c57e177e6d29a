//! Scene management for PoultryGeist.
//!
//! A scene is built once by a factory registered in a [`SceneCatalog`], becomes
//! active through [`SceneManager::load_scene`], and is then driven one frame at a
//! time by [`SceneManager::run_frame`].
//!
//! # Overview
//!
//! Each scene owns:
//! - A subtree of the shared [`RenderTree`], reachable through its [`ModelRegistry`]
//! - Lights and fog, recorded at build time and installed only while it is active
//! - A [`SceneBehavior`] with an `init_scene` hook (second frame) and an `event_run` hook (every frame)
//!
//! Camera heading, pitch and focus belong to the manager, not the scene, and
//! carry over scene switches.
//!
//! # Example
//!
//! ```ignore
//! use poultrygeist::scene::*;
//!
//! let mut catalog = SceneCatalog::new();
//! catalog
//!     .register(SceneId::Custom("barn"), |setup| {
//!         let floor = setup.add_model(ModelSpec::mesh("barn-floor.egg"))?;
//!         setup.prepare(floor);
//!         setup.add_model(ModelSpec::actor("hen.egg").clip("peck", "hen-peck.egg").key("hen"))?;
//!         Ok(Box::new(Barn::default()))
//!     })
//!     .register(SceneId::Menu, MenuScene::build)
//!     .toggle(SceneId::Custom("barn"), SceneId::Menu);
//! ```

mod catalog;
pub mod graph;
mod intro;
mod manager;
mod menu;
mod registry;
pub mod scene;

pub use catalog::{SceneCatalog, SceneFactory};
pub use graph::{Actor, Children, Geometry, InstanceOf, Node, Parent, RenderTree, Transform};
pub use intro::{IntroScene, IntroStage, START_POSE, flythrough, intro_motion};
pub use manager::SceneManager;
pub use menu::MenuScene;
pub use registry::{ModelKey, ModelRegistry, ModelSpec};
pub use scene::{
    FrameContext, FrameControl, PlayerControl, Scene, SceneBehavior, SceneId, SceneSetup,
    SwitchRequest,
};

use crate::assets::{MemoryAssetLoader, QualityTier};
use crate::config::RuntimeConfig;

/// Asset names the bundled scenes load.
pub const BUNDLED_ASSETS: &[&str] = &[
    "backdrop.egg",
    "title.egg",
    "terrain.egg",
    "farmhouse.egg",
    "corn.egg",
    "corn-sway.egg",
];

/// An in-memory loader that resolves every bundled asset.
pub fn bundled_asset_loader(quality: QualityTier) -> MemoryAssetLoader {
    MemoryAssetLoader::new(quality).with_assets(BUNDLED_ASSETS.iter().copied())
}

/// Menu and intro, switching to each other.
pub fn standard_catalog(config: &RuntimeConfig) -> SceneCatalog {
    let intro = config.intro.clone();
    let mut catalog = SceneCatalog::new();
    catalog
        .register(SceneId::Menu, MenuScene::build)
        .register(SceneId::Intro, move |setup| IntroScene::build(setup, &intro))
        .toggle(SceneId::Intro, SceneId::Menu);
    catalog
}
