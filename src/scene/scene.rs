//! Scene definition, identifiers and the contexts handed to scene code.

use hecs::Entity;

use super::graph::RenderTree;
use super::registry::{ModelKey, ModelRegistry, ModelSpec};
use crate::assets::{AssetLoader, QualityTier};
use crate::camera::Camera;
use crate::error::SceneError;
use crate::input::InputSource;
use crate::motion::MotionController;
use crate::render::{Fog, LightDescriptor, SceneEffect};

/// Identity of a scene.
///
/// Transitions between scenes are looked up by id in a
/// [`SceneCatalog`](super::SceneCatalog), never by inspecting scene types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneId {
    Menu,
    Intro,
    /// Any other scene an application registers.
    Custom(&'static str),
}

impl std::fmt::Display for SceneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneId::Menu => f.write_str("menu"),
            SceneId::Intro => f.write_str("intro"),
            SceneId::Custom(name) => f.write_str(name),
        }
    }
}

/// Whether the frame task should keep being scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Stop,
}

/// A scene switch requested during a frame. Applied after the frame finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchRequest {
    /// Whatever the transition table lists after the active scene.
    Next,
    To(SceneId),
}

/// Lets a scene take the camera away from the player, e.g. during a motion path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerControl {
    suspended: bool,
}

impl PlayerControl {
    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    pub fn resume(&mut self) {
        self.suspended = false;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }
}

/// Per-frame behavior of a scene.
///
/// Content is built by the scene's factory through a [`SceneSetup`]; this trait
/// only covers what happens once the scene is live.
pub trait SceneBehavior {
    /// Runs once, on the first frame after the scene became active, when its
    /// subtree is attached and the engine has had a frame to settle.
    fn init_scene(&mut self, _ctx: &mut FrameContext<'_>) {}

    /// Runs every frame the scene is active.
    fn event_run(&mut self, _ctx: &mut FrameContext<'_>) -> FrameControl {
        FrameControl::Continue
    }
}

/// Everything scene code may touch during a frame.
pub struct FrameContext<'a> {
    /// Frame timestamp in seconds.
    pub now: f64,
    /// Frames since the scene was loaded, starting at 1.
    pub scene_frame: u32,
    pub input: &'a mut dyn InputSource,
    pub camera: &'a mut Camera,
    pub motion: &'a mut dyn MotionController,
    pub controls: &'a mut PlayerControl,
    pub tree: &'a mut RenderTree,
    pub models: &'a ModelRegistry,
    pub(crate) switch: &'a mut Option<SwitchRequest>,
}

impl FrameContext<'_> {
    /// Look up one of the scene's models.
    pub fn model(&self, key: impl Into<ModelKey>) -> Option<Entity> {
        self.models.get(key)
    }

    /// Switch to the scene the transition table lists next.
    pub fn request_next_scene(&mut self) {
        *self.switch = Some(SwitchRequest::Next);
    }

    /// Switch to a specific scene.
    pub fn switch_to(&mut self, id: SceneId) {
        *self.switch = Some(SwitchRequest::To(id));
    }
}

/// A built scene: its models, the global effects it wants while active, and its behavior.
pub struct Scene {
    pub(crate) id: SceneId,
    pub(crate) models: ModelRegistry,
    pub(crate) player_controlled: bool,
    pub(crate) effects: Vec<SceneEffect>,
    pub(crate) behavior: Box<dyn SceneBehavior>,
}

impl Scene {
    pub fn id(&self) -> SceneId {
        self.id
    }

    pub fn is_player_controlled(&self) -> bool {
        self.player_controlled
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    pub fn effects(&self) -> &[SceneEffect] {
        &self.effects
    }

    /// Release every registry entry and detach the scene's subtree.
    pub fn teardown(&mut self, tree: &mut RenderTree) -> usize {
        self.models.teardown(tree)
    }
}

/// Construction context handed to a scene factory.
///
/// Models are created immediately. Prepared meshes, lights and fog are only
/// recorded; they reach the pipeline when the scene activates.
///
/// # Example
///
/// ```ignore
/// catalog.register(SceneId::Custom("barn"), |setup| {
///     let floor = setup.add_model(ModelSpec::mesh("barn-floor.egg"))?;
///     setup.prepare(floor);
///     setup.add_light(LightDescriptor::point(Vec3::new(0.0, 0.0, 4.0)));
///     Ok(Box::new(BarnScene::default()))
/// });
/// ```
pub struct SceneSetup<'a> {
    id: SceneId,
    tree: &'a mut RenderTree,
    assets: &'a mut dyn AssetLoader,
    models: ModelRegistry,
    effects: Vec<SceneEffect>,
    player_controlled: bool,
}

impl<'a> SceneSetup<'a> {
    pub(crate) fn new(
        id: SceneId,
        tree: &'a mut RenderTree,
        assets: &'a mut dyn AssetLoader,
    ) -> Self {
        let models = ModelRegistry::new(tree, format!("{}-root", id));
        Self {
            id,
            tree,
            assets,
            models,
            effects: Vec::new(),
            player_controlled: true,
        }
    }

    pub fn id(&self) -> SceneId {
        self.id
    }

    pub fn quality(&self) -> QualityTier {
        self.assets.quality()
    }

    /// Create and register a model. See [`ModelRegistry::add_model`].
    pub fn add_model(&mut self, spec: ModelSpec) -> Result<Entity, SceneError> {
        self.models.add_model(self.tree, self.assets, spec)
    }

    pub fn model(&self, key: impl Into<ModelKey>) -> Option<Entity> {
        self.models.get(key)
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    /// Hand a static-mesh node to the render pipeline once the scene activates.
    pub fn prepare(&mut self, node: Entity) {
        self.effects.push(SceneEffect::Prepare(node));
    }

    pub fn add_light(&mut self, light: LightDescriptor) {
        self.effects.push(SceneEffect::Light(light));
    }

    pub fn fog(&mut self, fog: Fog) {
        self.effects.push(SceneEffect::Fog(fog));
    }

    /// Whether the free-look controller drives the camera in this scene. Defaults to true.
    pub fn player_controlled(&mut self, enabled: bool) {
        self.player_controlled = enabled;
    }

    /// Mutable access to the tree for post-construction tweaks (clips, transforms).
    pub fn tree(&mut self) -> &mut RenderTree {
        &mut *self.tree
    }

    pub(crate) fn finish(self, behavior: Box<dyn SceneBehavior>) -> Scene {
        Scene {
            id: self.id,
            models: self.models,
            player_controlled: self.player_controlled,
            effects: self.effects,
            behavior,
        }
    }

    /// Throw away a partial build. Returns nodes removed.
    pub(crate) fn abort(mut self) -> usize {
        self.models.teardown(self.tree)
    }
}
